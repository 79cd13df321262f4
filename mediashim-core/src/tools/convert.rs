//! `convert`: transcode every `*.EXT` video in the working directory to MP4.

use std::path::{Path, PathBuf};

use crate::cleanup::PartialOutputs;
use crate::config::FrontEndConfig;
use crate::dependency::{TRANSCODER, ToolRequirement};
use crate::error::CoreResult;
use crate::frontend::{InputPath, InvocationSpec, RunReport, Tool};
use crate::naming::{OutputName, output_dir};
use crate::options::{OptionSpec, ParsedArgs, QUIET};
use crate::process::Invocation;
use crate::session::Session;
use crate::tools::run_batch;
use crate::utils::{find_files_with_extension, validate_bitrate, validate_extension_token};

pub const DEFAULT_VIDEO_BITRATE: &str = "1500k";

const OUTPUT_NAME: OutputName = OutputName::Subdirectory {
    dir: "converted",
    extension: Some("mp4"),
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertParams {
    pub extension: String,
    pub bitrate: String,
}

pub struct Convert;

fn convert_one(session: &Session<'_>, file: &Path, bitrate: &str) -> CoreResult<PathBuf> {
    let output = OUTPUT_NAME.derive(file);
    if let Some(dir) = output_dir(&output) {
        std::fs::create_dir_all(dir)?;
    }

    let mut partial = PartialOutputs::protecting(&[file.to_path_buf()]);
    partial.track(&output);

    let invocation = Invocation::new("transcoder", session.executable("transcoder")?)
        .args(["-hide_banner", "-y", "-i"])
        .arg(file)
        .args(["-c:v", "libx264", "-b:v", bitrate, "-c:a", "aac"])
        .arg(&output);
    session.invoke(&invocation)?;

    partial.commit();
    Ok(output)
}

impl Tool for Convert {
    type Params = ConvertParams;

    const NAME: &'static str = "convert";
    const SUMMARY: &'static str = "Convert every *.EXT video in the current directory to MP4";
    const USAGE: &'static str = "[OPTIONS] <EXT>";
    const OPTIONS: &'static [OptionSpec] = &[
        OptionSpec::value("rate", Some('r'), "BITRATE", "video bitrate (default 1500k)"),
        QUIET,
    ];
    const REQUIREMENTS: &'static [ToolRequirement] = &[TRANSCODER];

    fn build(args: &ParsedArgs, config: &FrontEndConfig) -> CoreResult<InvocationSpec<ConvertParams>> {
        let token = args.required_positional(0, "extension")?;
        args.expect_at_most(1)?;

        let extension = validate_extension_token(token)?;
        let bitrate = validate_bitrate("--rate", args.value("rate").unwrap_or(DEFAULT_VIDEO_BITRATE))?;

        Ok(InvocationSpec::new(
            InputPath::directory(&config.working_dir),
            ConvertParams { extension, bitrate },
            args.flag("quiet"),
        ))
    }

    fn execute(spec: &InvocationSpec<ConvertParams>, session: &Session<'_>) -> CoreResult<RunReport> {
        let params = spec.params();
        let files = find_files_with_extension(spec.primary_input(), &params.extension)?;
        session.status(&format!(
            "Converting {} *.{} file(s) at {}",
            files.len(),
            params.extension,
            params.bitrate
        ));
        run_batch(session, &files, |file| convert_one(session, file, &params.bitrate))
    }
}
