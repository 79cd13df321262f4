//! Locating the external executables a tool delegates to.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, CoreResult};

/// An external executable a tool needs, with the logical role it plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolRequirement {
    /// Logical name used by tools to fetch the resolved path, e.g. "transcoder".
    pub role: &'static str,
    pub executable: &'static str,
    /// Where to obtain the executable, shown when it is missing.
    pub hint: &'static str,
}

pub const TRANSCODER: ToolRequirement = ToolRequirement {
    role: "transcoder",
    executable: "ffmpeg",
    hint: "https://ffmpeg.org/download.html",
};

pub const PROBE: ToolRequirement = ToolRequirement {
    role: "probe-tool",
    executable: "ffprobe",
    hint: "https://ffmpeg.org/download.html",
};

pub const IMAGEMAGICK: ToolRequirement = ToolRequirement {
    role: "rasterizer",
    executable: "magick",
    hint: "https://imagemagick.org/script/download.php",
};

pub const TRIMAGE: ToolRequirement = ToolRequirement {
    role: "lossless-compressor",
    executable: "trimage",
    hint: "https://trimage.org",
};

pub const EXIFTOOL: ToolRequirement = ToolRequirement {
    role: "metadata-editor",
    executable: "exiftool",
    hint: "https://exiftool.org",
};

pub const CWEBP: ToolRequirement = ToolRequirement {
    role: "webp-encoder",
    executable: "cwebp",
    hint: "https://developers.google.com/speed/webp/download",
};

pub const AVIFENC: ToolRequirement = ToolRequirement {
    role: "avif-encoder",
    executable: "avifenc",
    hint: "https://github.com/AOMediaCodec/libavif",
};

pub const CJXL: ToolRequirement = ToolRequirement {
    role: "jxl-encoder",
    executable: "cjxl",
    hint: "https://github.com/libjxl/libjxl",
};

pub const PDFTOPPM: ToolRequirement = ToolRequirement {
    role: "pdf-rasterizer",
    executable: "pdftoppm",
    hint: "https://poppler.freedesktop.org",
};

/// Looks up executables by name.
pub trait ExecutableLocator {
    fn locate(&self, executable: &str) -> Option<PathBuf>;
}

/// Standard lookup on `PATH`, or on an explicit search path when configured.
#[derive(Debug, Clone)]
pub struct PathLocator {
    search_path: Option<OsString>,
    cwd: PathBuf,
}

impl PathLocator {
    pub fn new(search_path: Option<OsString>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            search_path,
            cwd: cwd.into(),
        }
    }
}

impl ExecutableLocator for PathLocator {
    fn locate(&self, executable: &str) -> Option<PathBuf> {
        let found = match &self.search_path {
            Some(paths) => which::which_in(executable, Some(paths), &self.cwd),
            None => which::which(executable),
        };
        match found {
            Ok(path) => {
                log::debug!("Found {} at {}", executable, path.display());
                Some(path)
            }
            Err(e) => {
                log::debug!("Lookup of {} failed: {}", executable, e);
                None
            }
        }
    }
}

/// Resolved executables for one run, keyed by role.
#[derive(Debug, Clone, Default)]
pub struct DependencyCheck {
    resolved: BTreeMap<&'static str, PathBuf>,
}

impl DependencyCheck {
    /// Path of the executable resolved for `role`.
    pub fn path(&self, role: &str) -> CoreResult<&Path> {
        self.resolved
            .get(role)
            .map(PathBuf::as_path)
            .ok_or_else(|| CoreError::UnknownTool(role.to_string()))
    }

    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }
}

/// Resolves every requirement, failing on the first one that is missing.
pub fn resolve_dependencies(
    requirements: &[ToolRequirement],
    locator: &dyn ExecutableLocator,
) -> CoreResult<DependencyCheck> {
    let mut check = DependencyCheck::default();
    for req in requirements {
        let path = locator.locate(req.executable).ok_or_else(|| {
            log::warn!("Dependency '{}' not found.", req.executable);
            CoreError::DependencyMissing {
                role: req.role,
                executable: req.executable,
                hint: req.hint,
            }
        })?;
        check.resolved.insert(req.role, path);
    }
    Ok(check)
}

/// Status of every requirement, for reporting rather than failing.
pub fn survey_dependencies(
    requirements: &[ToolRequirement],
    locator: &dyn ExecutableLocator,
) -> Vec<(ToolRequirement, Option<PathBuf>)> {
    requirements
        .iter()
        .map(|req| (*req, locator.locate(req.executable)))
        .collect()
}
