//! Removal of partial outputs on failure.
//!
//! A tool registers every output path before the delegated process that
//! writes it starts. If the run fails or is interrupted the guard is dropped
//! without being committed and removes whatever was written. Temporary
//! working files live in a `tempfile::TempDir` and are removed on drop
//! regardless of outcome.

use std::path::{Component, Path, PathBuf};

use tempfile::{Builder as TempFileBuilder, TempDir};

use crate::error::CoreResult;

#[derive(Debug, Default)]
pub struct PartialOutputs {
    paths: Vec<PathBuf>,
    protected: Vec<PathBuf>,
    committed: bool,
}

impl PartialOutputs {
    /// Creates a guard that will never delete any of `inputs`, however the
    /// output paths later handed to `track` are spelled.
    #[must_use]
    pub fn protecting(inputs: &[PathBuf]) -> Self {
        Self {
            paths: Vec::new(),
            protected: inputs.iter().map(|p| resolve_path(p)).collect(),
            committed: false,
        }
    }

    /// Registers an output to remove if the run does not complete.
    pub fn track(&mut self, path: &Path) {
        let resolved = resolve_path(path);
        if self.protected.iter().any(|p| *p == resolved) {
            log::warn!("Refusing to track input {} as a partial output", path.display());
            return;
        }
        self.paths.push(path.to_path_buf());
    }

    /// Keeps every tracked output.
    pub fn commit(mut self) -> Vec<PathBuf> {
        self.committed = true;
        std::mem::take(&mut self.paths)
    }
}

impl Drop for PartialOutputs {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        for path in &self.paths {
            if path.is_file() {
                match std::fs::remove_file(path) {
                    Ok(()) => log::debug!("Removed partial output {}", path.display()),
                    Err(e) => log::warn!("Could not remove partial output {}: {}", path.display(), e),
                }
            }
        }
    }
}

/// Resolves `path` to the file it names on disk. Symlinks and `..` in the
/// directory part are followed even when the file itself does not exist yet.
pub fn resolve_path(path: &Path) -> PathBuf {
    if let Ok(real) = path.canonicalize() {
        return real;
    }
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    match (parent.canonicalize(), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => {
            let lexical = normalize_lexically(path);
            match (lexical.parent().map(Path::canonicalize), lexical.file_name()) {
                (Some(Ok(dir)), Some(name)) => dir.join(name),
                _ => lexical,
            }
        }
    }
}

/// True when `a` and `b` name the same file.
pub fn same_path(a: &Path, b: &Path) -> bool {
    a == b || resolve_path(a) == resolve_path(b)
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

/// Creates a temporary working directory next to `near`. Removed on drop.
pub fn create_temp_dir(near: &Path, prefix: &str) -> CoreResult<TempDir> {
    let base = near
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    Ok(TempFileBuilder::new().prefix(prefix).tempdir_in(base)?)
}
