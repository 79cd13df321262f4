//! Front-ends for external media tools.
//!
//! Every tool follows the same contract: parse options from a declarative
//! table, show help if asked, validate positionals, resolve the executables it
//! delegates to, check the inputs exist and only then run anything. Outputs
//! are named after the input and removed again if the run fails.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use mediashim_core::{
//!     CancelToken, Environment, FrontEndConfig, NullReporter, PathLocator, SystemRunner,
//!     find_tool,
//! };
//!
//! let config = FrontEndConfig::new(std::env::current_dir().unwrap());
//! let locator = PathLocator::new(None, &config.working_dir);
//! let env = Environment {
//!     config: &config,
//!     locator: &locator,
//!     runner: &SystemRunner,
//!     reporter: &NullReporter,
//!     cancel: CancelToken::new(),
//! };
//!
//! let args = vec!["clip.mp4".to_string(), "00:01:00".to_string()];
//! let outcome = find_tool("trim").and_then(|tool| tool.run(&env, &args)).unwrap();
//! println!("{outcome:?}");
//! ```

pub mod cancel;
pub mod cleanup;
pub mod config;
pub mod dependency;
pub mod error;
pub mod frontend;
pub mod naming;
pub mod options;
pub mod probe;
pub mod process;
pub mod reporting;
pub mod session;
pub mod tools;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for public API
pub use cancel::{CancelToken, install_signal_handler};
pub use cleanup::{PartialOutputs, create_temp_dir, same_path};
pub use config::{FrontEndConfig, PROGRAM_NAME, TOOL_PATH_ENV};
pub use dependency::{
    DependencyCheck, ExecutableLocator, PathLocator, ToolRequirement, resolve_dependencies,
    survey_dependencies,
};
pub use error::{CoreError, CoreResult, ErrorKind};
pub use frontend::{InputKind, InputPath, InvocationSpec, Outcome, RunReport, Tool, run_tool};
pub use naming::OutputName;
pub use options::{Arity, OptionSpec, ParseOutcome, ParsedArgs, parse_args, render_help};
pub use process::{CommandRunner, ExecutionResult, Invocation, SystemRunner};
pub use reporting::{JsonReporter, NullReporter, Reporter, ReporterError, TerminalReporter};
pub use session::{Environment, Session};
pub use tools::{ToolEntry, all_requirements, find_tool, registry};
