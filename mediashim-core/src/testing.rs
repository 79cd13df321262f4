//! Test doubles for the process runner, executable lookup and reporter.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::cancel::CancelToken;
use crate::config::FrontEndConfig;
use crate::dependency::ExecutableLocator;
use crate::error::CoreResult;
use crate::process::{CommandRunner, ExecutionResult, Invocation};
use crate::reporting::Reporter;
use crate::session::Environment;

struct Expectation {
    pattern: String,
    result: CoreResult<ExecutionResult>,
}

/// Records every invocation instead of running it.
///
/// Invocations matching a registered pattern (a substring of the rendered
/// command line) get that canned result, once. Anything else succeeds with
/// empty output. With `create_outputs`, a successful call creates its last
/// argument as an empty file, standing in for the tool's output.
#[derive(Default)]
pub(crate) struct RecordingRunner {
    expectations: RefCell<Vec<Expectation>>,
    calls: RefCell<Vec<Invocation>>,
    create_outputs: bool,
}

impl RecordingRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn creating_outputs() -> Self {
        Self {
            create_outputs: true,
            ..Self::default()
        }
    }

    pub(crate) fn respond(&self, pattern: &str, stdout: &str) {
        self.expect(
            pattern,
            Ok(ExecutionResult {
                code: Some(0),
                stdout: stdout.to_string(),
                stderr: String::new(),
            }),
        );
    }

    pub(crate) fn fail(&self, pattern: &str, code: i32, stderr: &str) {
        self.expect(
            pattern,
            Ok(ExecutionResult {
                code: Some(code),
                stdout: String::new(),
                stderr: stderr.to_string(),
            }),
        );
    }

    pub(crate) fn expect(&self, pattern: &str, result: CoreResult<ExecutionResult>) {
        self.expectations.borrow_mut().push(Expectation {
            pattern: pattern.to_string(),
            result,
        });
    }

    pub(crate) fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    /// Rendered command lines of every call, in order.
    pub(crate) fn lines(&self) -> Vec<String> {
        self.calls.borrow().iter().map(ToString::to_string).collect()
    }

    fn create_dummy_output(invocation: &Invocation) {
        let Some(last) = invocation.get_args().last() else {
            return;
        };
        let output = PathBuf::from(last);
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = std::fs::create_dir_all(parent) {
                log::error!("RecordingRunner could not create {}: {}", parent.display(), e);
            }
        }
        if let Err(e) = std::fs::write(&output, b"") {
            log::error!("RecordingRunner could not create {}: {}", output.display(), e);
        }
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, invocation: &Invocation, _cancel: &CancelToken) -> CoreResult<ExecutionResult> {
        self.calls.borrow_mut().push(invocation.clone());
        let line = invocation.to_string();

        let matched = {
            let mut expectations = self.expectations.borrow_mut();
            expectations
                .iter()
                .position(|exp| line.contains(&exp.pattern))
                .map(|index| expectations.remove(index).result)
        };
        let result = matched.unwrap_or_else(|| {
            Ok(ExecutionResult {
                code: Some(0),
                ..ExecutionResult::default()
            })
        });

        if self.create_outputs && result.as_ref().is_ok_and(ExecutionResult::success) {
            Self::create_dummy_output(invocation);
        }
        result
    }
}

/// Resolves only the listed executables, to `/stub/bin/<name>`.
#[derive(Default)]
pub(crate) struct StaticLocator {
    available: Vec<String>,
    lookups: RefCell<Vec<String>>,
}

impl StaticLocator {
    pub(crate) fn with(names: &[&str]) -> Self {
        Self {
            available: names.iter().map(|n| n.to_string()).collect(),
            lookups: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn lookups(&self) -> Vec<String> {
        self.lookups.borrow().clone()
    }
}

impl ExecutableLocator for StaticLocator {
    fn locate(&self, executable: &str) -> Option<PathBuf> {
        self.lookups.borrow_mut().push(executable.to_string());
        self.available
            .iter()
            .any(|n| n == executable)
            .then(|| Path::new("/stub/bin").join(executable))
    }
}

/// Keeps every reporter event as a line of text.
#[derive(Default)]
pub(crate) struct CapturingReporter {
    events: Mutex<Vec<String>>,
}

impl CapturingReporter {
    pub(crate) fn events(&self) -> Vec<String> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    fn push(&self, event: String) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl Reporter for CapturingReporter {
    fn status(&self, message: &str) {
        self.push(format!("status: {message}"));
    }

    fn step_started(&self, label: &str) {
        self.push(format!("step: {label}"));
    }

    fn item_succeeded(&self, input: &Path, output: &Path) {
        self.push(format!("ok: {} -> {}", input.display(), output.display()));
    }

    fn item_failed(&self, input: &Path, error: &str) {
        self.push(format!("failed: {}: {}", input.display(), error));
    }

    fn warning(&self, message: &str) {
        self.push(format!("warning: {message}"));
    }

    fn operation_complete(&self, message: &str) {
        self.push(format!("complete: {message}"));
    }
}

/// Owns the collaborators of one test run.
pub(crate) struct Harness {
    pub config: FrontEndConfig,
    pub locator: StaticLocator,
    pub runner: RecordingRunner,
    pub reporter: CapturingReporter,
    pub cancel: CancelToken,
}

impl Harness {
    pub(crate) fn new(working_dir: &Path, executables: &[&str]) -> Self {
        Self {
            config: FrontEndConfig::new(working_dir),
            locator: StaticLocator::with(executables),
            runner: RecordingRunner::creating_outputs(),
            reporter: CapturingReporter::default(),
            cancel: CancelToken::new(),
        }
    }

    pub(crate) fn env(&self) -> Environment<'_> {
        Environment {
            config: &self.config,
            locator: &self.locator,
            runner: &self.runner,
            reporter: &self.reporter,
            cancel: self.cancel.clone(),
        }
    }
}

/// Owned argument vector from string literals.
pub(crate) fn args(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
