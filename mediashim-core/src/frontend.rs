//! The per-run state machine shared by every tool.
//!
//! ```text
//! parse options -> help? -> build spec -> resolve dependencies
//!   -> check inputs exist -> execute -> report
//! ```
//!
//! Every error transition is terminal. Nothing external is launched before
//! the spec is built, the executables are resolved and the inputs are known
//! to exist.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::{FrontEndConfig, PROGRAM_NAME};
use crate::dependency::{ToolRequirement, resolve_dependencies};
use crate::error::{CoreError, CoreResult};
use crate::options::{OptionSpec, ParseOutcome, ParsedArgs, parse_args, render_help, render_usage};
use crate::session::{Environment, Session};

/// What kind of filesystem entry an input must be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    File,
    Directory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPath {
    pub path: PathBuf,
    pub kind: InputKind,
}

impl InputPath {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: InputKind::File,
        }
    }

    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: InputKind::Directory,
        }
    }

    fn ensure_exists(&self) -> CoreResult<()> {
        let exists = match self.kind {
            InputKind::File => self.path.is_file(),
            InputKind::Directory => self.path.is_dir(),
        };
        if exists {
            Ok(())
        } else {
            Err(CoreError::InputNotFound(self.path.clone()))
        }
    }
}

/// Validated inputs of one run. Only produced by a tool's `build`, after
/// every positional and option has been checked; read-only afterwards.
#[derive(Debug, Clone)]
pub struct InvocationSpec<P> {
    inputs: Vec<InputPath>,
    params: P,
    quiet: bool,
}

impl<P> InvocationSpec<P> {
    pub fn new(primary: InputPath, params: P, quiet: bool) -> Self {
        Self {
            inputs: vec![primary],
            params,
            quiet,
        }
    }

    /// Adds a secondary input (e.g. a watermark image).
    #[must_use]
    pub fn with_input(mut self, input: InputPath) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn inputs(&self) -> &[InputPath] {
        &self.inputs
    }

    pub fn primary_input(&self) -> &Path {
        &self.inputs[0].path
    }

    pub fn input_paths(&self) -> Vec<PathBuf> {
        self.inputs.iter().map(|i| i.path.clone()).collect()
    }

    pub fn params(&self) -> &P {
        &self.params
    }

    pub fn quiet(&self) -> bool {
        self.quiet
    }
}

/// Outputs written and per-item failures of one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub outputs: Vec<PathBuf>,
    pub failures: Vec<(PathBuf, String)>,
}

impl RunReport {
    pub fn single(output: PathBuf) -> Self {
        Self {
            outputs: vec![output],
            failures: Vec::new(),
        }
    }

    pub fn items(&self) -> usize {
        self.outputs.len() + self.failures.len()
    }
}

/// How a run ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// `-h`/`--help` was given; the rendered help page.
    Help(String),
    Completed(RunReport),
}

/// A single-purpose command-line tool built on the shared front-end.
pub trait Tool {
    type Params: fmt::Debug;

    /// Subcommand name.
    const NAME: &'static str;
    /// One-line description for `list` and help output.
    const SUMMARY: &'static str;
    /// Usage line after the program name, e.g. `[OPTIONS] <FILE>`.
    const USAGE: &'static str;
    /// Recognized options, not counting `-h/--help`.
    const OPTIONS: &'static [OptionSpec];
    /// Every executable the tool may delegate to.
    const REQUIREMENTS: &'static [ToolRequirement];

    /// Validates positionals and option values into a spec. May read the
    /// filesystem to compare paths but must not modify it.
    fn build(args: &ParsedArgs, config: &FrontEndConfig) -> CoreResult<InvocationSpec<Self::Params>>;

    /// Executables this particular run needs.
    fn requirements(_spec: &InvocationSpec<Self::Params>) -> Vec<ToolRequirement> {
        Self::REQUIREMENTS.to_vec()
    }

    /// Performs the delegated work.
    fn execute(spec: &InvocationSpec<Self::Params>, session: &Session<'_>) -> CoreResult<RunReport>;
}

/// `mediashim <tool>`, as shown in usage lines.
pub fn program_label(tool: &str) -> String {
    format!("{PROGRAM_NAME} {tool}")
}

/// Help page of tool `T`.
pub fn help_text<T: Tool>() -> String {
    render_help(&program_label(T::NAME), T::USAGE, T::SUMMARY, T::OPTIONS)
}

/// Short usage of tool `T`, printed after usage errors.
pub fn usage_text<T: Tool>() -> String {
    render_usage(&program_label(T::NAME), T::USAGE)
}

/// Runs tool `T` against `args` (tool name already removed).
pub fn run_tool<T: Tool>(env: &Environment<'_>, args: &[String]) -> CoreResult<Outcome> {
    log::debug!("{} arguments: {:?}", T::NAME, args);

    let parsed = match parse_args(T::OPTIONS, args)? {
        ParseOutcome::Help => return Ok(Outcome::Help(help_text::<T>())),
        ParseOutcome::Parsed(parsed) => parsed,
    };

    let spec = T::build(&parsed, env.config)?;
    log::debug!("{} spec: {:?}", T::NAME, spec);

    let deps = resolve_dependencies(&T::requirements(&spec), env.locator)?;

    for input in spec.inputs() {
        input.ensure_exists()?;
    }

    let session = Session::new(env, deps, spec.quiet());
    let report = T::execute(&spec, &session)?;

    if !report.failures.is_empty() {
        return Err(CoreError::BatchFailed {
            failed: report.failures.len(),
            total: report.items(),
        });
    }

    let message = match report.outputs.as_slice() {
        [single] => format!("{} wrote {}", T::NAME, single.display()),
        many => format!("{} wrote {} files", T::NAME, many.len()),
    };
    session.complete(&message);
    Ok(Outcome::Completed(report))
}
