// ============================================================================
// mediashim-cli/src/lib.rs
// ============================================================================
//
// MEDIASHIM CLI LIBRARY
//
// Holds the argument definitions and command logic the binary uses, so
// they can be tested without spawning the binary.

/// Command-line interface definitions using clap
pub mod cli;

/// Command implementations for each subcommand
pub mod commands;

/// Error handling utilities for the CLI
pub mod error;

/// Logging setup and helpers
pub mod logging;

// Re-exports for convenience
pub use cli::{Cli, Commands, parse_cli, parse_cli_from};
pub use commands::doctor::run_doctor;
pub use commands::list::run_list;
pub use commands::run_tool::run_tool_command;
