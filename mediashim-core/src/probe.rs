//! Media probing through ffprobe.
//!
//! Only the container duration is needed (trim end, fade-out start), so the
//! probe asks ffprobe for `format=duration` as JSON and nothing else.

use std::path::Path;

use serde::Deserialize;

use crate::error::{CoreError, CoreResult, command_failed_error};
use crate::process::Invocation;
use crate::session::Session;

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Builds the ffprobe invocation that prints the container duration.
pub fn duration_invocation(ffprobe: &Path, input: &Path) -> Invocation {
    Invocation::new("probe-tool", ffprobe)
        .args(["-v", "error", "-show_entries", "format=duration", "-of", "json"])
        .arg(input)
}

/// Parses ffprobe's JSON output into a duration in seconds.
pub fn parse_duration(json: &str) -> CoreResult<f64> {
    let parse_error = |message: String| CoreError::OutputParse {
        program: "ffprobe".to_string(),
        message,
    };
    let output: ProbeOutput =
        serde_json::from_str(json).map_err(|e| parse_error(e.to_string()))?;
    let raw = output
        .format
        .and_then(|f| f.duration)
        .ok_or_else(|| parse_error("no duration reported".to_string()))?;
    let seconds: f64 = raw
        .trim()
        .parse()
        .map_err(|_| parse_error(format!("invalid duration '{raw}'")))?;
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(parse_error(format!("invalid duration '{raw}'")));
    }
    Ok(seconds)
}

/// Probes the duration of `input` with the session's probe tool.
pub fn probe_duration(session: &Session<'_>, input: &Path) -> CoreResult<f64> {
    let invocation = duration_invocation(session.executable("probe-tool")?, input);
    let result = session.capture(&invocation)?;
    if !result.success() {
        return Err(command_failed_error(
            invocation.program_name(),
            result.status_text(),
            result.stderr,
        ));
    }
    let seconds = parse_duration(&result.stdout)?;
    log::debug!("Probed duration of {}: {:.3}s", input.display(), seconds);
    Ok(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ffprobe_json() {
        let json = r#"{ "format": { "duration": "123.456000" } }"#;
        assert_eq!(parse_duration(json).unwrap(), 123.456);
    }

    #[test]
    fn rejects_missing_or_bad_duration() {
        assert!(parse_duration(r#"{ "format": {} }"#).is_err());
        assert!(parse_duration(r#"{}"#).is_err());
        assert!(parse_duration(r#"{ "format": { "duration": "N/A" } }"#).is_err());
        assert!(parse_duration("not json").is_err());
    }

    #[test]
    fn invocation_shape() {
        let inv = duration_invocation(Path::new("/bin/ffprobe"), Path::new("clip.mp4"));
        assert_eq!(
            inv.to_string(),
            "/bin/ffprobe -v error -show_entries format=duration -of json clip.mp4"
        );
    }
}
