//! Utility functions for timestamps and file discovery.

use std::path::{Path, PathBuf};

use crate::error::{CoreError, CoreResult};

/// Parses `SS[.ms]`, `MM:SS[.ms]` or `HH:MM:SS[.ms]` into seconds.
/// Returns None for negative, non-finite or malformed input.
#[must_use]
pub fn parse_timestamp(text: &str) -> Option<f64> {
    let parts: Vec<&str> = text.trim().split(':').collect();
    if parts.len() > 3 || parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    let (units, last) = parts.split_at(parts.len() - 1);
    let seconds = last[0].parse::<f64>().ok()?;
    if !seconds.is_finite() || seconds < 0.0 || (!units.is_empty() && seconds >= 60.0) {
        return None;
    }
    let mut minutes = 0.0;
    for (pos, part) in units.iter().enumerate() {
        let value = part.parse::<u32>().ok()?;
        // minutes in HH:MM:SS must stay below an hour
        if units.len() == 2 && pos == 1 && value >= 60 {
            return None;
        }
        minutes = minutes * 60.0 + f64::from(value);
    }
    Some(minutes * 60.0 + seconds)
}

/// Formats seconds for an ffmpeg `-ss`/`-to` argument (e.g. `60`, `12.5`).
#[must_use]
pub fn format_seconds(seconds: f64) -> String {
    let rounded = (seconds * 1000.0).round() / 1000.0;
    format!("{rounded}")
}

/// Files in the top level of `dir` whose extension matches `extension`
/// case-insensitively, skipping hidden files, sorted by lowercase file name.
pub fn find_files_with_extension(dir: &Path, extension: &str) -> CoreResult<Vec<PathBuf>> {
    let wanted = extension.trim_start_matches('.');
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            if !path.is_file() {
                return None;
            }
            let name = path.file_name()?.to_str()?;
            if name.starts_with('.') {
                return None;
            }
            path.extension()
                .and_then(|ext| ext.to_str())
                .filter(|ext| ext.eq_ignore_ascii_case(wanted))
                .map(|_| path.clone())
        })
        .collect();

    if files.is_empty() {
        return Err(CoreError::NoFilesFound {
            extension: wanted.to_string(),
            dir: dir.to_path_buf(),
        });
    }

    files.sort_by_key(|p| {
        p.file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    });
    log::debug!("Found {} *.{} files in {}", files.len(), wanted, dir.display());
    Ok(files)
}

/// Rejects extension tokens that are empty or contain path separators.
pub fn validate_extension_token(token: &str) -> CoreResult<String> {
    let ext = token.trim_start_matches('.');
    if ext.is_empty() || ext.contains(['/', '\\', '*']) {
        return Err(CoreError::invalid_value(
            "extension",
            token,
            "expected a bare file extension such as 'wmv'",
        ));
    }
    Ok(ext.to_string())
}

/// Checks an ffmpeg bitrate such as `1500k`, `1M` or `2.5M`.
pub fn validate_bitrate(name: &str, raw: &str) -> CoreResult<String> {
    let number = raw.strip_suffix(['k', 'K', 'm', 'M']).unwrap_or(raw);
    match number.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 && !number.starts_with('+') => {
            Ok(raw.to_string())
        }
        _ => Err(CoreError::invalid_value(
            name,
            raw,
            "expected a bitrate such as 1500k or 2M",
        )),
    }
}

/// Parses `WIDTHxHEIGHT` (e.g. `1920x1080`) into non-zero dimensions.
#[must_use]
pub fn parse_resolution(text: &str) -> Option<(u32, u32)> {
    let (width, height) = text.trim().split_once(['x', 'X'])?;
    let width = width.parse::<u32>().ok().filter(|w| *w > 0)?;
    let height = height.parse::<u32>().ok().filter(|h| *h > 0)?;
    Some((width, height))
}
