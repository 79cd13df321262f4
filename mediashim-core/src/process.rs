//! Running delegated tools.
//!
//! An `Invocation` is the fully built command line of one delegated call.
//! `CommandRunner` runs it to completion and hands back an `ExecutionResult`;
//! `SystemRunner` is the real implementation and the test suite swaps in a
//! recording runner.
//!
//! The system runner reads stdout and stderr on helper threads so a chatty
//! tool can never block on a full pipe, while the calling thread polls the
//! child for exit and the cancel token for SIGINT/SIGTERM.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use crate::cancel::CancelToken;
use crate::error::{CoreError, CoreResult, command_start_error};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Command line of one delegated call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    role: &'static str,
    program: PathBuf,
    args: Vec<OsString>,
}

impl Invocation {
    pub fn new(role: &'static str, program: impl Into<PathBuf>) -> Self {
        Self {
            role,
            program: program.into(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn role(&self) -> &'static str {
        self.role
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    /// Executable file name, used in messages.
    pub fn program_name(&self) -> String {
        self.program
            .file_name()
            .unwrap_or(self.program.as_os_str())
            .to_string_lossy()
            .into_owned()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            let arg = arg.to_string_lossy();
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{arg}'")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Exit status and captured output of a delegated process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Exit code, `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ExecutionResult {
    #[must_use]
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Human-readable status for error messages.
    #[must_use]
    pub fn status_text(&self) -> String {
        match self.code {
            Some(code) => format!("exit status {code}"),
            None => "termination by signal".to_string(),
        }
    }
}

/// Something that can run an invocation to completion.
pub trait CommandRunner {
    /// Runs `invocation` and blocks until it exits or `cancel` fires.
    ///
    /// A non-zero exit is not an error at this level; callers decide.
    fn run(&self, invocation: &Invocation, cancel: &CancelToken) -> CoreResult<ExecutionResult>;
}

/// Runs invocations as real child processes.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner;

fn drain<R: Read + Send + 'static>(
    stream: Option<R>,
    label: &'static str,
) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut collected = String::new();
        let Some(stream) = stream else {
            return collected;
        };
        for line in BufReader::new(stream).lines().map_while(Result::ok) {
            log::debug!("{}: {}", label, line);
            collected.push_str(&line);
            collected.push('\n');
        }
        collected
    })
}

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation, cancel: &CancelToken) -> CoreResult<ExecutionResult> {
        cancel.check()?;
        log::debug!("Running: {}", invocation);

        let mut child = Command::new(invocation.program())
            .args(invocation.get_args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| command_start_error(invocation.program_name(), e))?;

        let stdout_handle = drain(child.stdout.take(), "STDOUT");
        let stderr_handle = drain(child.stderr.take(), "STDERR");

        let status = loop {
            if cancel.is_cancelled() {
                log::warn!("Stopping {} after interrupt", invocation.program_name());
                let _ = child.kill();
                let _ = child.wait();
                // Grandchildren may still hold the pipes; leave the readers detached.
                return Err(CoreError::Interrupted);
            }
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(e.into());
                }
            }
        };

        let result = ExecutionResult {
            code: status.code(),
            stdout: stdout_handle.join().unwrap_or_default(),
            stderr: stderr_handle.join().unwrap_or_default(),
        };
        log::debug!(
            "{} finished with {}",
            invocation.program_name(),
            result.status_text()
        );
        settle(result, cancel)
    }
}

/// A child that exits on the same signal that cancelled the run reports
/// its own status; the run is still interrupted.
fn settle(result: ExecutionResult, cancel: &CancelToken) -> CoreResult<ExecutionResult> {
    if cancel.is_cancelled() {
        return Err(CoreError::Interrupted);
    }
    Ok(result)
}
