//! Error types for the mediashim front-end.
//!
//! Every failure a tool run can hit is a `CoreError` variant. Variants are
//! grouped into five kinds (see [`ErrorKind`]) which drive how the CLI
//! reports them and which exit status it uses.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Coarse classification of a `CoreError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad, missing or unknown flag, or missing/surplus positional argument.
    Usage,
    /// A required external executable could not be located.
    DependencyMissing,
    /// A named input file or directory does not exist.
    InputNotFound,
    /// A delegated process failed, could not start, or produced unusable output.
    DelegatedFailure,
    /// The run was cancelled by SIGINT/SIGTERM.
    Interrupted,
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("unknown option: {0}")]
    UnknownOption(String),

    #[error("argument required for option: {0}")]
    MissingValue(String),

    #[error("option {0} does not take a value")]
    UnexpectedValue(String),

    #[error("{0} must be provided")]
    MissingArgument(&'static str),

    #[error("unexpected argument: {0}")]
    UnexpectedArgument(String),

    #[error("invalid value '{value}' for {name}: {reason}")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("{executable} ({role}) not found; install it from {hint}")]
    DependencyMissing {
        role: &'static str,
        executable: &'static str,
        hint: &'static str,
    },

    #[error("not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("no files matching *.{extension} in {}", .dir.display())]
    NoFilesFound { extension: String, dir: PathBuf },

    #[error("failed to start {program}: {source}")]
    CommandStart {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} exited with {status}{}", format_stderr_tail(.stderr))]
    CommandFailed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("failed to parse {program} output: {message}")]
    OutputParse { program: String, message: String },

    #[error("{failed} of {total} items failed")]
    BatchFailed { failed: usize, total: usize },

    #[error("interrupted by signal")]
    Interrupted,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for mediashim operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Maps the variant onto the five-way taxonomy.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownOption(_)
            | Self::MissingValue(_)
            | Self::UnexpectedValue(_)
            | Self::MissingArgument(_)
            | Self::UnexpectedArgument(_)
            | Self::InvalidValue { .. }
            | Self::UnknownTool(_) => ErrorKind::Usage,
            Self::DependencyMissing { .. } => ErrorKind::DependencyMissing,
            Self::InputNotFound(_) | Self::NoFilesFound { .. } => ErrorKind::InputNotFound,
            Self::CommandStart { .. }
            | Self::CommandFailed { .. }
            | Self::OutputParse { .. }
            | Self::BatchFailed { .. }
            | Self::Io(_) => ErrorKind::DelegatedFailure,
            Self::Interrupted => ErrorKind::Interrupted,
        }
    }

    /// Process exit status for this error. Every failure exits 1.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        1
    }

    pub fn invalid_value(
        name: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            name: name.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Error for a process that ran to completion with a non-zero status.
pub fn command_failed_error(
    program: impl Into<String>,
    status: impl Into<String>,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed {
        program: program.into(),
        status: status.into(),
        stderr: stderr.into(),
    }
}

/// Error for a process that could not be spawned at all.
pub fn command_start_error(program: impl Into<String>, source: io::Error) -> CoreError {
    CoreError::CommandStart {
        program: program.into(),
        source,
    }
}

const STDERR_TAIL_LINES: usize = 5;

fn format_stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return String::new();
    }
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    format!(": {}", lines[start..].join(" | "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_variants_share_a_kind() {
        assert_eq!(CoreError::UnknownOption("-x".into()).kind(), ErrorKind::Usage);
        assert_eq!(CoreError::MissingArgument("filename").kind(), ErrorKind::Usage);
        assert_eq!(
            CoreError::invalid_value("--rate", "abc", "not a bitrate").kind(),
            ErrorKind::Usage
        );
    }

    #[test]
    fn missing_argument_message_names_the_argument() {
        assert_eq!(
            CoreError::MissingArgument("filename").to_string(),
            "filename must be provided"
        );
    }

    #[test]
    fn dependency_message_names_tool_and_hint() {
        let err = CoreError::DependencyMissing {
            role: "transcoder",
            executable: "ffmpeg",
            hint: "https://ffmpeg.org/download.html",
        };
        let msg = err.to_string();
        assert!(msg.contains("ffmpeg"));
        assert!(msg.contains("https://ffmpeg.org/download.html"));
        assert_eq!(err.kind(), ErrorKind::DependencyMissing);
    }

    #[test]
    fn command_failed_keeps_only_the_stderr_tail() {
        let stderr = (1..=8).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let msg = command_failed_error("ffmpeg", "exit status: 1", stderr).to_string();
        assert!(msg.starts_with("ffmpeg exited with exit status: 1: line 4"));
        assert!(msg.ends_with("line 8"));
        assert!(!msg.contains("line 3"));
    }

    #[test]
    fn command_failed_without_stderr_has_no_trailing_colon() {
        let msg = command_failed_error("exiftool", "exit status: 2", "  \n").to_string();
        assert_eq!(msg, "exiftool exited with exit status: 2");
    }

    #[test]
    fn every_error_exits_one() {
        assert_eq!(CoreError::Interrupted.exit_code(), 1);
        assert_eq!(CoreError::InputNotFound(PathBuf::from("x")).exit_code(), 1);
    }
}
