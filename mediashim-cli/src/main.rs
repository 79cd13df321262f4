// ============================================================================
// mediashim-cli/src/main.rs
// ============================================================================
//
// MEDIASHIM CLI: Main entry point
//
// Parses the global flags, sets up logging and signal handling, builds the
// run configuration and dispatches to a command. Exit status is 0 on
// success or help and 1 on any failure.

use std::process;

use mediashim::error::CliResult;
use mediashim::logging::setup_logging;
use mediashim::{Cli, Commands, parse_cli, run_doctor, run_list, run_tool_command};
use mediashim_core::{
    CoreError, Environment, FrontEndConfig, JsonReporter, PathLocator, Reporter, SystemRunner,
    TerminalReporter, install_signal_handler,
};

fn main() {
    let cli = parse_cli();
    let code = match run(cli) {
        Ok(()) => 0,
        Err(e) => e.exit_code(),
    };
    process::exit(code);
}

fn run(cli: Cli) -> CliResult<()> {
    if cli.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    match setup_logging(cli.verbose, cli.log_dir.as_deref()) {
        Ok(Some(path)) => log::info!("Logging to {}", path.display()),
        Ok(None) => {}
        Err(e) => eprintln!("mediashim: logging disabled: {e:#}"),
    }
    log::debug!("mediashim {} starting", env!("CARGO_PKG_VERSION"));

    let reporter: Box<dyn Reporter> = if cli.json {
        Box::new(JsonReporter::new())
    } else {
        Box::new(TerminalReporter::new())
    };

    let startup = install_signal_handler().and_then(|cancel| {
        let working_dir = std::env::current_dir().map_err(CoreError::from)?;
        Ok((cancel, working_dir))
    });
    let (cancel, working_dir) = match startup {
        Ok(parts) => parts,
        Err(e) => {
            mediashim::error::report_error(reporter.as_ref(), &e, None);
            return Err(e);
        }
    };

    let mut config = FrontEndConfig::new(working_dir);
    config.tool_path = cli.tool_path;
    config.color = !cli.no_color;
    config.verbose = cli.verbose;
    log::debug!("Configuration: {:?}", config);

    let locator = PathLocator::new(config.tool_path.clone(), &config.working_dir);
    let env = Environment {
        config: &config,
        locator: &locator,
        runner: &SystemRunner,
        reporter: reporter.as_ref(),
        cancel,
    };

    match cli.command {
        Commands::List => {
            run_list();
            Ok(())
        }
        Commands::Doctor => run_doctor(&env),
        Commands::Tool(args) => run_tool_command(&env, &args),
    }
}
