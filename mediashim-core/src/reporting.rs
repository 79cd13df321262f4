//! Progress and failure output for terminal and JSON consumers.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// High-level error shown when a run fails.
#[derive(Clone, Debug)]
pub struct ReporterError {
    pub title: String,
    pub message: String,
    pub suggestion: Option<String>,
}

/// Reporter interface implemented by both human-readable and JSON reporters.
///
/// Status-like updates are only sent when the run is not quiet; failures are
/// always sent.
pub trait Reporter: Send + Sync {
    fn status(&self, _message: &str) {}
    fn step_started(&self, _label: &str) {}
    fn step_finished(&self) {}
    fn item_succeeded(&self, _input: &Path, _output: &Path) {}
    fn item_failed(&self, _input: &Path, _error: &str) {}
    fn warning(&self, _message: &str) {}
    fn operation_complete(&self, _message: &str) {}
    fn error(&self, _error: &ReporterError) {}
}

/// No-op reporter that discards all updates.
pub struct NullReporter;

impl Reporter for NullReporter {}

/// Human-friendly reporter that prints concise text output.
pub struct TerminalReporter {
    spinner: Mutex<Option<ProgressBar>>,
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    fn clear_spinner(&self) {
        if let Ok(mut guard) = self.spinner.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for TerminalReporter {
    fn status(&self, message: &str) {
        println!("{}{}", style("› ").magenta(), message);
    }

    fn step_started(&self, label: &str) {
        self.clear_spinner();
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message(label.to_string());
        pb.enable_steady_tick(Duration::from_millis(120));
        if let Ok(mut guard) = self.spinner.lock() {
            *guard = Some(pb);
        }
    }

    fn step_finished(&self) {
        self.clear_spinner();
    }

    fn item_succeeded(&self, input: &Path, output: &Path) {
        println!(
            "  {} {} -> {}",
            style("ok").green(),
            input.display(),
            style(output.display()).bold()
        );
    }

    fn item_failed(&self, input: &Path, error: &str) {
        self.clear_spinner();
        eprintln!(
            "  {} {}: {}",
            style("failed").red().bold(),
            input.display(),
            error
        );
    }

    fn warning(&self, message: &str) {
        eprintln!("{}", style(format!("WARN: {}", message)).yellow().bold());
    }

    fn operation_complete(&self, message: &str) {
        println!("{} {}", style("✓").green().bold(), style(message).bold());
    }

    fn error(&self, error: &ReporterError) {
        self.clear_spinner();
        eprintln!(
            "{} {}",
            style("ERROR").red().bold(),
            style(&error.title).red().bold()
        );
        eprintln!("  {}", error.message);
        if let Some(suggestion) = &error.suggestion {
            for line in suggestion.lines() {
                eprintln!("  {}", line);
            }
        }
    }
}

/// JSON-lines reporter for scripting.
pub struct JsonReporter {
    out: Mutex<Box<dyn Write + Send>>,
    err: Mutex<Box<dyn Write + Send>>,
}

impl JsonReporter {
    /// Progress events go to stdout, failures to stderr.
    pub fn new() -> Self {
        Self::with_writers(Box::new(io::stdout()), Box::new(io::stderr()))
    }

    pub fn with_writers(out: Box<dyn Write + Send>, err: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
            err: Mutex::new(err),
        }
    }

    fn timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }

    fn write_to(stream: &Mutex<Box<dyn Write + Send>>, value: serde_json::Value) {
        if let Ok(mut writer) = stream.lock() {
            let _ = writeln!(writer, "{}", value);
            let _ = writer.flush();
        }
    }

    fn write_value(&self, value: serde_json::Value) {
        Self::write_to(&self.out, value);
    }

    fn write_failure(&self, value: serde_json::Value) {
        Self::write_to(&self.err, value);
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for JsonReporter {
    fn status(&self, message: &str) {
        self.write_value(json!({
            "type": "status",
            "message": message,
            "timestamp": Self::timestamp(),
        }));
    }

    fn step_started(&self, label: &str) {
        self.write_value(json!({
            "type": "step_started",
            "label": label,
            "timestamp": Self::timestamp(),
        }));
    }

    fn item_succeeded(&self, input: &Path, output: &Path) {
        self.write_value(json!({
            "type": "item_succeeded",
            "input": input.display().to_string(),
            "output": output.display().to_string(),
            "timestamp": Self::timestamp(),
        }));
    }

    fn item_failed(&self, input: &Path, error: &str) {
        self.write_failure(json!({
            "type": "item_failed",
            "input": input.display().to_string(),
            "error": error,
            "timestamp": Self::timestamp(),
        }));
    }

    fn warning(&self, message: &str) {
        self.write_value(json!({
            "type": "warning",
            "message": message,
            "timestamp": Self::timestamp(),
        }));
    }

    fn operation_complete(&self, message: &str) {
        self.write_value(json!({
            "type": "operation_complete",
            "message": message,
            "timestamp": Self::timestamp(),
        }));
    }

    fn error(&self, error: &ReporterError) {
        self.write_failure(json!({
            "type": "error",
            "title": error.title,
            "message": error.message,
            "suggestion": error.suggestion,
            "timestamp": Self::timestamp(),
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn json_lines(&self) -> Vec<serde_json::Value> {
            let text = String::from_utf8(self.0.lock().unwrap().clone()).unwrap();
            text.lines().map(|l| serde_json::from_str(l).unwrap()).collect()
        }
    }

    fn json_reporter() -> (JsonReporter, SharedBuffer, SharedBuffer) {
        let out = SharedBuffer::default();
        let err = SharedBuffer::default();
        let reporter = JsonReporter::with_writers(Box::new(out.clone()), Box::new(err.clone()));
        (reporter, out, err)
    }

    #[test]
    fn json_reporter_writes_one_object_per_line() {
        let (reporter, out, err) = json_reporter();
        reporter.status("Converting 2 *.wmv file(s)");
        reporter.item_succeeded(Path::new("a.wmv"), Path::new("converted/a.mp4"));

        let lines = out.json_lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["type"], "item_succeeded");
        assert_eq!(lines[1]["output"], "converted/a.mp4");
        assert!(err.json_lines().is_empty());
    }

    #[test]
    fn json_failures_go_to_the_error_stream() {
        let (reporter, out, err) = json_reporter();
        reporter.item_failed(Path::new("b.wmv"), "ffmpeg exited with exit status 1");

        assert!(out.json_lines().is_empty());
        let lines = err.json_lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["type"], "item_failed");
        assert_eq!(lines[0]["input"], "b.wmv");
    }

    #[test]
    fn json_error_carries_suggestion() {
        let (reporter, _out, buffer) = json_reporter();
        reporter.error(&ReporterError {
            title: "Usage error".into(),
            message: "filename must be provided".into(),
            suggestion: Some("Usage: mediashim strip <FILE>".into()),
        });
        let text = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        let value: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
        assert_eq!(value["message"], "filename must be provided");
        assert_eq!(value["suggestion"], "Usage: mediashim strip <FILE>");
    }
}
