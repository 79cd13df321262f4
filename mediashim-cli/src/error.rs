// ============================================================================
// mediashim-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING: Result alias and error presentation
//
// The CLI reuses `CoreError` as its error type. This module turns an error
// into the title/message/suggestion triple the reporters print.

use mediashim_core::{CoreError, CoreResult, ErrorKind, Reporter, ReporterError};

/// Type alias for CLI results using CoreError.
pub type CliResult<T> = CoreResult<T>;

fn title(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Usage => "Invalid usage",
        ErrorKind::DependencyMissing => "Missing dependency",
        ErrorKind::InputNotFound => "Input not found",
        ErrorKind::DelegatedFailure => "Command failed",
        ErrorKind::Interrupted => "Interrupted",
    }
}

/// Builds the reporter view of `error`. `usage` is attached to usage errors.
pub fn describe_error(error: &CoreError, usage: Option<String>) -> ReporterError {
    let kind = error.kind();
    let suggestion = match (kind, error) {
        (_, CoreError::UnknownTool(_)) => {
            Some("Run 'mediashim list' to see the available tools.".to_string())
        }
        (ErrorKind::Usage, _) => usage,
        (ErrorKind::DependencyMissing, _) => {
            Some("Run 'mediashim doctor' to check every external tool.".to_string())
        }
        _ => None,
    };
    ReporterError {
        title: title(kind).to_string(),
        message: error.to_string(),
        suggestion,
    }
}

/// Logs `error` and hands it to the reporter.
pub fn report_error(reporter: &dyn Reporter, error: &CoreError, usage: Option<String>) {
    log::debug!("Run failed: {:?}", error);
    reporter.error(&describe_error(error, usage));
}
