//! Execution context handed to a tool once validation has passed.

use std::path::Path;

use crate::cancel::CancelToken;
use crate::config::FrontEndConfig;
use crate::dependency::{DependencyCheck, ExecutableLocator};
use crate::error::{CoreResult, command_failed_error};
use crate::process::{CommandRunner, ExecutionResult, Invocation};
use crate::reporting::Reporter;

/// Collaborators shared by every tool run: configuration, executable lookup,
/// process runner, output and the cancellation flag.
pub struct Environment<'a> {
    pub config: &'a FrontEndConfig,
    pub locator: &'a dyn ExecutableLocator,
    pub runner: &'a dyn CommandRunner,
    pub reporter: &'a dyn Reporter,
    pub cancel: CancelToken,
}

/// A validated run: resolved executables plus the quiet setting.
pub struct Session<'a> {
    env: &'a Environment<'a>,
    deps: DependencyCheck,
    quiet: bool,
}

impl<'a> Session<'a> {
    pub(crate) fn new(env: &'a Environment<'a>, deps: DependencyCheck, quiet: bool) -> Self {
        Self { env, deps, quiet }
    }

    pub fn config(&self) -> &FrontEndConfig {
        self.env.config
    }

    pub fn quiet(&self) -> bool {
        self.quiet
    }

    /// Resolved path of the executable playing `role`.
    pub fn executable(&self, role: &str) -> CoreResult<&Path> {
        self.deps.path(role)
    }

    pub fn status(&self, message: &str) {
        log::info!("{}", message);
        if !self.quiet {
            self.env.reporter.status(message);
        }
    }

    pub fn warning(&self, message: &str) {
        log::warn!("{}", message);
        self.env.reporter.warning(message);
    }

    pub fn item_succeeded(&self, input: &Path, output: &Path) {
        if !self.quiet {
            self.env.reporter.item_succeeded(input, output);
        }
    }

    pub fn item_failed(&self, input: &Path, error: &str) {
        log::error!("{}: {}", input.display(), error);
        self.env.reporter.item_failed(input, error);
    }

    pub(crate) fn complete(&self, message: &str) {
        if !self.quiet {
            self.env.reporter.operation_complete(message);
        }
    }

    /// Runs one step of the tool's work. A non-zero exit is an error.
    pub fn invoke(&self, invocation: &Invocation) -> CoreResult<ExecutionResult> {
        self.env.cancel.check()?;
        if !self.quiet {
            self.env
                .reporter
                .step_started(&format!("Running {}", invocation.program_name()));
        }
        let result = self.env.runner.run(invocation, &self.env.cancel);
        if !self.quiet {
            self.env.reporter.step_finished();
        }

        let result = result?;
        if !result.success() {
            return Err(command_failed_error(
                invocation.program_name(),
                result.status_text(),
                result.stderr,
            ));
        }
        Ok(result)
    }

    /// Runs a query (e.g. a probe) and returns its result whatever the status.
    pub fn capture(&self, invocation: &Invocation) -> CoreResult<ExecutionResult> {
        self.env.cancel.check()?;
        self.env.runner.run(invocation, &self.env.cancel)
    }
}
