//! The tool front-ends and their registry.
//!
//! Each submodule defines one [`Tool`] implementation. [`registry`] lists them
//! in the order `mediashim list` prints them.

use std::path::{Path, PathBuf};

use crate::dependency::ToolRequirement;
use crate::error::{CoreError, CoreResult};
use crate::frontend::{Outcome, RunReport, Tool, run_tool, usage_text};
use crate::session::{Environment, Session};

pub mod convert;
pub mod fade;
pub mod mark;
pub mod minify;
pub mod modimg;
pub mod pdfimg;
pub mod strip;
pub mod trim;
pub mod twopass;

pub use convert::Convert;
pub use fade::Fade;
pub use mark::Mark;
pub use minify::Minify;
pub use modimg::ModImg;
pub use pdfimg::PdfImg;
pub use strip::Strip;
pub use trim::Trim;
pub use twopass::TwoPass;

type RunFn = fn(&Environment<'_>, &[String]) -> CoreResult<Outcome>;

/// Type-erased handle on one tool, for dispatch by name.
#[derive(Clone, Copy)]
pub struct ToolEntry {
    pub name: &'static str,
    pub summary: &'static str,
    pub requirements: &'static [ToolRequirement],
    usage: fn() -> String,
    run: RunFn,
}

impl ToolEntry {
    fn of<T: Tool>() -> Self {
        Self {
            name: T::NAME,
            summary: T::SUMMARY,
            requirements: T::REQUIREMENTS,
            usage: usage_text::<T>,
            run: run_tool::<T>,
        }
    }

    /// Runs the tool with `args` (tool name already removed).
    pub fn run(&self, env: &Environment<'_>, args: &[String]) -> CoreResult<Outcome> {
        (self.run)(env, args)
    }

    /// Short usage text shown after usage errors.
    pub fn usage(&self) -> String {
        (self.usage)()
    }
}

impl std::fmt::Debug for ToolEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolEntry").field("name", &self.name).finish()
    }
}

/// Every tool, in listing order.
pub fn registry() -> Vec<ToolEntry> {
    vec![
        ToolEntry::of::<Trim>(),
        ToolEntry::of::<Fade>(),
        ToolEntry::of::<Mark>(),
        ToolEntry::of::<Strip>(),
        ToolEntry::of::<Minify>(),
        ToolEntry::of::<Convert>(),
        ToolEntry::of::<TwoPass>(),
        ToolEntry::of::<ModImg>(),
        ToolEntry::of::<PdfImg>(),
    ]
}

/// Looks a tool up by subcommand name.
pub fn find_tool(name: &str) -> CoreResult<ToolEntry> {
    registry()
        .into_iter()
        .find(|entry| entry.name == name)
        .ok_or_else(|| CoreError::UnknownTool(name.to_string()))
}

/// Every distinct executable any tool may need, in first-use order.
pub fn all_requirements() -> Vec<ToolRequirement> {
    let mut all: Vec<ToolRequirement> = Vec::new();
    for entry in registry() {
        for req in entry.requirements {
            if !all.iter().any(|r| r.executable == req.executable) {
                all.push(*req);
            }
        }
    }
    all
}

/// Processes `files` one after another with `process`, which returns the
/// output it wrote. A failed item is reported and the batch moves on;
/// an interruption stops the batch immediately.
pub(crate) fn run_batch<F>(session: &Session<'_>, files: &[PathBuf], mut process: F) -> CoreResult<RunReport>
where
    F: FnMut(&Path) -> CoreResult<PathBuf>,
{
    let mut report = RunReport::default();
    for (index, file) in files.iter().enumerate() {
        session.status(&format!(
            "[{}/{}] {}",
            index + 1,
            files.len(),
            file.file_name().unwrap_or(file.as_os_str()).to_string_lossy()
        ));
        match process(file) {
            Ok(output) => {
                session.item_succeeded(file, &output);
                report.outputs.push(output);
            }
            Err(CoreError::Interrupted) => return Err(CoreError::Interrupted),
            Err(e) => {
                let message = e.to_string();
                session.item_failed(file, &message);
                report.failures.push((file.clone(), message));
            }
        }
    }
    Ok(report)
}
