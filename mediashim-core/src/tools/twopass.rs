//! `twopass`: two-pass H.264 encode to a target bitrate.

use std::path::PathBuf;

use crate::cleanup::{PartialOutputs, create_temp_dir, same_path};
use crate::config::FrontEndConfig;
use crate::dependency::{TRANSCODER, ToolRequirement};
use crate::error::{CoreError, CoreResult};
use crate::frontend::{InputPath, InvocationSpec, RunReport, Tool};
use crate::naming::OutputName;
use crate::options::{OptionSpec, ParsedArgs, QUIET};
use crate::process::Invocation;
use crate::session::Session;
use crate::utils::validate_bitrate;

pub const DEFAULT_VIDEO_BITRATE: &str = "1M";

const OUTPUT_NAME: OutputName = OutputName::Extension("mp4");

#[cfg(windows)]
const NULL_DEVICE: &str = "NUL";
#[cfg(not(windows))]
const NULL_DEVICE: &str = "/dev/null";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwoPassParams {
    pub bitrate: String,
    pub output: PathBuf,
}

pub struct TwoPass;

impl Tool for TwoPass {
    type Params = TwoPassParams;

    const NAME: &'static str = "twopass";
    const SUMMARY: &'static str = "Two-pass encode a video to MP4 at a target bitrate";
    const USAGE: &'static str = "[OPTIONS] <FILE>";
    const OPTIONS: &'static [OptionSpec] = &[
        OptionSpec::value("rate", Some('r'), "BITRATE", "target video bitrate (default 1M)"),
        QUIET,
    ];
    const REQUIREMENTS: &'static [ToolRequirement] = &[TRANSCODER];

    fn build(args: &ParsedArgs, _config: &FrontEndConfig) -> CoreResult<InvocationSpec<TwoPassParams>> {
        let file = args.required_positional(0, "filename")?;
        args.expect_at_most(1)?;

        let bitrate = validate_bitrate("--rate", args.value("rate").unwrap_or(DEFAULT_VIDEO_BITRATE))?;

        let input = PathBuf::from(file);
        let output = OUTPUT_NAME.derive(&input);
        if same_path(&output, &input) {
            return Err(CoreError::invalid_value(
                "filename",
                file,
                "input is already named .mp4; rename it first",
            ));
        }

        Ok(InvocationSpec::new(
            InputPath::file(input),
            TwoPassParams { bitrate, output },
            args.flag("quiet"),
        ))
    }

    fn execute(spec: &InvocationSpec<TwoPassParams>, session: &Session<'_>) -> CoreResult<RunReport> {
        let input = spec.primary_input();
        let params = spec.params();
        let ffmpeg = session.executable("transcoder")?;

        // Pass logs live here and go away with it, whatever the outcome.
        let work_dir = create_temp_dir(input, ".mediashim-twopass-")?;
        let passlog = work_dir.path().join("ffmpeg2pass");

        let mut partial = PartialOutputs::protecting(&spec.input_paths());
        partial.track(&params.output);

        let encode = |pass: &str| {
            Invocation::new("transcoder", ffmpeg)
                .args(["-hide_banner", "-y", "-i"])
                .arg(input)
                .args(["-c:v", "libx264", "-b:v", params.bitrate.as_str(), "-pass", pass])
                .arg("-passlogfile")
                .arg(&passlog)
        };

        session.status(&format!("Pass 1/2: analysing {}", input.display()));
        session.invoke(&encode("1").args(["-an", "-f", "null", NULL_DEVICE]))?;

        session.status(&format!("Pass 2/2: encoding at {}", params.bitrate));
        session.invoke(&encode("2").args(["-c:a", "aac"]).arg(&params.output))?;

        partial.commit();
        session.item_succeeded(input, &params.output);
        Ok(RunReport::single(params.output.clone()))
    }
}
