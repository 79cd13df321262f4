//! Running a tool subcommand by name.

use mediashim_core::{CoreError, Environment, Outcome, find_tool};

use crate::error::{CliResult, report_error};

/// Runs the tool named by `args[0]` with the remaining arguments.
pub fn run_tool_command(env: &Environment<'_>, args: &[String]) -> CliResult<()> {
    let Some((name, tool_args)) = args.split_first() else {
        let err = CoreError::MissingArgument("tool name");
        report_error(env.reporter, &err, None);
        return Err(err);
    };

    let tool = match find_tool(name) {
        Ok(tool) => tool,
        Err(err) => {
            report_error(env.reporter, &err, None);
            return Err(err);
        }
    };

    log::debug!("Running {} with {:?}", tool.name, tool_args);
    match tool.run(env, tool_args) {
        Ok(Outcome::Help(text)) => {
            print!("{text}");
            Ok(())
        }
        Ok(Outcome::Completed(report)) => {
            for output in &report.outputs {
                log::info!("wrote {}", output.display());
            }
            Ok(())
        }
        Err(err) => {
            report_error(env.reporter, &err, Some(tool.usage()));
            Err(err)
        }
    }
}
