// ============================================================================
// mediashim-cli/src/cli.rs
// ============================================================================
//
// CLI DEFINITION: Global flags and subcommands
//
// clap only handles the global flags and picks the subcommand. Everything
// after a tool name is handed to that tool's own option table untouched.

use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "mediashim",
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Front-ends for ffmpeg, ImageMagick, exiftool and other media tools",
    long_about = "Runs small single-purpose media tools that delegate to external \
                  executables. Run `mediashim list` to see them and \
                  `mediashim <tool> --help` for a tool's options."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Also write a debug log file into DIR
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Report progress and results as JSON lines on stdout
    #[arg(long)]
    pub json: bool,

    /// Search path for external executables, instead of PATH
    #[arg(long, value_name = "PATH", env = "MEDIASHIM_PATH")]
    pub tool_path: Option<OsString>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the available tools
    List,
    /// Check which external executables are installed
    Doctor,
    /// Run a tool: mediashim <TOOL> [ARGS]...
    #[command(external_subcommand)]
    Tool(Vec<String>),
}

/// Parses the process arguments. Help and version exit 0, any other parse
/// error exits 1.
pub fn parse_cli() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    }
}

/// Parses an explicit argument list, for tests.
pub fn parse_cli_from<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::try_parse_from(args)
}
