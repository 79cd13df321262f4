//! Run-wide configuration.
//!
//! Built once at startup by the CLI (from global flags and the environment)
//! and passed by reference into every tool run.

use std::ffi::OsString;
use std::path::PathBuf;

/// Environment variable that overrides `PATH` for executable lookup.
pub const TOOL_PATH_ENV: &str = "MEDIASHIM_PATH";

/// Program name used in usage and help output.
pub const PROGRAM_NAME: &str = "mediashim";

#[derive(Debug, Clone)]
pub struct FrontEndConfig {
    /// Directory batch tools scan for input files.
    pub working_dir: PathBuf,
    /// Search path used instead of `PATH` when locating executables.
    pub tool_path: Option<OsString>,
    /// Whether terminal output may use color.
    pub color: bool,
    /// Whether debug logging is on.
    pub verbose: bool,
}

impl FrontEndConfig {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            tool_path: None,
            color: true,
            verbose: false,
        }
    }
}
