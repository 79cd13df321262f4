//! Command implementations for the CLI.
//!
//! Each command reports its own failures through the reporter before
//! returning them, so `main` only has to pick the exit status.

/// `mediashim doctor`: survey the external executables.
pub mod doctor;

/// `mediashim list`: print the tool table.
pub mod list;

/// `mediashim <tool> ...`: run one tool front-end.
pub mod run_tool;
