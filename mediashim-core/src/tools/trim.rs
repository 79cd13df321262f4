//! `trim`: cut a clip between two timestamps without re-encoding.

use std::path::PathBuf;

use crate::cleanup::{PartialOutputs, same_path};
use crate::config::FrontEndConfig;
use crate::dependency::{PROBE, TRANSCODER, ToolRequirement};
use crate::error::{CoreError, CoreResult};
use crate::frontend::{InputPath, InvocationSpec, RunReport, Tool};
use crate::naming::OutputName;
use crate::options::{OptionSpec, ParsedArgs, QUIET};
use crate::probe::probe_duration;
use crate::process::Invocation;
use crate::session::Session;
use crate::utils::{format_seconds, parse_timestamp};

const OUTPUT_NAME: OutputName = OutputName::Suffix("-trim");

#[derive(Debug, Clone, PartialEq)]
pub struct TrimParams {
    pub start: f64,
    /// End of the cut; `None` runs to the end of the clip.
    pub end: Option<f64>,
    pub output: PathBuf,
}

pub struct Trim;

fn parse_time(what: &str, raw: &str) -> CoreResult<f64> {
    parse_timestamp(raw).ok_or_else(|| {
        CoreError::invalid_value(what, raw, "expected SS, MM:SS or HH:MM:SS")
    })
}

impl Tool for Trim {
    type Params = TrimParams;

    const NAME: &'static str = "trim";
    const SUMMARY: &'static str = "Cut a clip between two timestamps without re-encoding";
    const USAGE: &'static str = "[OPTIONS] <FILE> <START> [END]";
    const OPTIONS: &'static [OptionSpec] = &[
        OptionSpec::value("output", Some('o'), "PATH", "write to PATH instead of NAME-trim.EXT"),
        QUIET,
    ];
    const REQUIREMENTS: &'static [ToolRequirement] = &[TRANSCODER, PROBE];

    fn build(args: &ParsedArgs, _config: &FrontEndConfig) -> CoreResult<InvocationSpec<TrimParams>> {
        let file = args.required_positional(0, "filename")?;
        let start_raw = args.required_positional(1, "start time")?;
        args.expect_at_most(3)?;

        let start = parse_time("start time", start_raw)?;
        let end = match args.positional(2) {
            Some(raw) => {
                let end = parse_time("end time", raw)?;
                if end <= start {
                    return Err(CoreError::invalid_value(
                        "end time",
                        raw,
                        "must be after the start time",
                    ));
                }
                Some(end)
            }
            None => None,
        };

        let input = PathBuf::from(file);
        let output = match args.value("output") {
            Some(path) => PathBuf::from(path),
            None => OUTPUT_NAME.derive(&input),
        };
        if same_path(&output, &input) {
            return Err(CoreError::invalid_value(
                "--output",
                output.display().to_string(),
                "must differ from the input file",
            ));
        }

        let params = TrimParams { start, end, output };
        Ok(InvocationSpec::new(InputPath::file(input), params, args.flag("quiet")))
    }

    fn requirements(spec: &InvocationSpec<TrimParams>) -> Vec<ToolRequirement> {
        if spec.params().end.is_some() {
            vec![TRANSCODER]
        } else {
            vec![TRANSCODER, PROBE]
        }
    }

    fn execute(spec: &InvocationSpec<TrimParams>, session: &Session<'_>) -> CoreResult<RunReport> {
        let input = spec.primary_input();
        let params = spec.params();

        let end = match params.end {
            Some(end) => end,
            None => probe_duration(session, input)?,
        };
        if params.start >= end {
            return Err(CoreError::invalid_value(
                "start time",
                format_seconds(params.start),
                format!("clip is only {}s long", format_seconds(end)),
            ));
        }

        let mut partial = PartialOutputs::protecting(&spec.input_paths());
        partial.track(&params.output);

        session.status(&format!(
            "Trimming {} from {}s to {}s",
            input.display(),
            format_seconds(params.start),
            format_seconds(end)
        ));
        let invocation = Invocation::new("transcoder", session.executable("transcoder")?)
            .args(["-hide_banner", "-y", "-ss"])
            .arg(format_seconds(params.start))
            .arg("-to")
            .arg(format_seconds(end))
            .arg("-i")
            .arg(input)
            .args(["-map", "0", "-c", "copy"])
            .arg(&params.output);
        session.invoke(&invocation)?;

        partial.commit();
        session.item_succeeded(input, &params.output);
        Ok(RunReport::single(params.output.clone()))
    }
}
