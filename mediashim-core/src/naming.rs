//! Output naming conventions.
//!
//! Outputs are always derived from the input path: a suffix before the
//! extension (`clip.mov` -> `clip-trim.mov`), a replaced extension
//! (`clip.mov` -> `clip.mp4`), or a file of the same stem inside a
//! subdirectory next to the input (`clip.wmv` -> `converted/clip.mp4`).

use std::ffi::OsString;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputName {
    /// Append to the stem, keep the extension.
    Suffix(&'static str),
    /// Replace the extension.
    Extension(&'static str),
    /// Same stem inside `dir` next to the input, optionally with a new extension.
    Subdirectory {
        dir: &'static str,
        extension: Option<&'static str>,
    },
}

impl OutputName {
    /// Derives the output path for `input`.
    #[must_use]
    pub fn derive(&self, input: &Path) -> PathBuf {
        let parent = input.parent().unwrap_or_else(|| Path::new(""));
        let stem = input.file_stem().map(OsString::from).unwrap_or_default();
        let extension = input.extension();

        let (dir, mut name, new_ext) = match *self {
            Self::Suffix(suffix) => {
                let mut name = stem;
                name.push(suffix);
                (parent.to_path_buf(), name, extension.map(OsString::from))
            }
            Self::Extension(ext) => (parent.to_path_buf(), stem, Some(OsString::from(ext))),
            Self::Subdirectory { dir, extension: ext } => (
                parent.join(dir),
                stem,
                ext.map(OsString::from).or_else(|| extension.map(OsString::from)),
            ),
        };

        if let Some(ext) = new_ext {
            name.push(".");
            name.push(ext);
        }
        dir.join(name)
    }
}

/// Directory that will hold `output`, for tools that create it on demand.
#[must_use]
pub fn output_dir(output: &Path) -> Option<&Path> {
    output.parent().filter(|p| !p.as_os_str().is_empty())
}
