// ============================================================================
// mediashim-cli/src/logging.rs
// ============================================================================
//
// LOGGING: fern setup for console and optional log file
//
// Console records go to stderr at `warn` (`debug` with --verbose) so they
// never mix with tool output on stdout. With --log-dir every run also writes
// a timestamped debug log.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::LevelFilter;

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// File name of the log written for one run.
pub fn log_file_name() -> String {
    format!("mediashim_run_{}.log", get_timestamp())
}

/// Installs the global logger. Returns the log file path when one is written.
pub fn setup_logging(verbose: bool, log_dir: Option<&Path>) -> Result<Option<PathBuf>> {
    let console_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let console = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("[{}] {}", record.level().as_str().to_lowercase(), message))
        })
        .level(console_level)
        .chain(std::io::stderr());

    let mut root = fern::Dispatch::new()
        .level(LevelFilter::Debug)
        .chain(console);

    let mut log_path = None;
    if let Some(dir) = log_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create log directory {}", dir.display()))?;
        let path = dir.join(log_file_name());
        let file = fern::log_file(&path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;
        root = root.chain(
            fern::Dispatch::new()
                .format(|out, message, record| {
                    out.finish(format_args!(
                        "{} [{}] {}",
                        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                        record.level(),
                        message
                    ))
                })
                .level(LevelFilter::Debug)
                .chain(file),
        );
        log_path = Some(path);
    }

    root.apply().context("logger already initialized")?;
    Ok(log_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_name_has_timestamp() {
        let name = log_file_name();
        assert!(name.starts_with("mediashim_run_"));
        assert!(name.ends_with(".log"));
        // mediashim_run_ + YYYYMMDD_HHMMSS + .log
        assert_eq!(name.len(), "mediashim_run_".len() + 15 + ".log".len());
    }
}
