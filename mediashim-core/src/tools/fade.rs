//! `fade`: fade video and audio in at the start and out at the end.

use std::path::PathBuf;

use crate::cleanup::PartialOutputs;
use crate::config::FrontEndConfig;
use crate::dependency::{PROBE, TRANSCODER, ToolRequirement};
use crate::error::{CoreError, CoreResult};
use crate::frontend::{InputPath, InvocationSpec, RunReport, Tool};
use crate::naming::OutputName;
use crate::options::{OptionSpec, ParsedArgs, QUIET};
use crate::probe::probe_duration;
use crate::process::Invocation;
use crate::session::Session;
use crate::utils::format_seconds;

/// Default fade length in seconds.
pub const DEFAULT_FADE_SECONDS: f64 = 1.0;

const OUTPUT_NAME: OutputName = OutputName::Suffix("-faded");

#[derive(Debug, Clone, PartialEq)]
pub struct FadeParams {
    pub seconds: f64,
    pub output: PathBuf,
}

pub struct Fade;

/// Video and audio filter chains for a clip of `duration` seconds.
fn filters(seconds: f64, duration: f64) -> (String, String) {
    let d = format_seconds(seconds);
    let out_start = format_seconds(duration - seconds);
    (
        format!("fade=t=in:st=0:d={d},fade=t=out:st={out_start}:d={d}"),
        format!("afade=t=in:st=0:d={d},afade=t=out:st={out_start}:d={d}"),
    )
}

impl Tool for Fade {
    type Params = FadeParams;

    const NAME: &'static str = "fade";
    const SUMMARY: &'static str = "Fade video and audio in and out";
    const USAGE: &'static str = "[OPTIONS] <FILE>";
    const OPTIONS: &'static [OptionSpec] = &[
        OptionSpec::value("time", Some('t'), "SECS", "fade length in seconds (default 1)"),
        QUIET,
    ];
    const REQUIREMENTS: &'static [ToolRequirement] = &[TRANSCODER, PROBE];

    fn build(args: &ParsedArgs, _config: &FrontEndConfig) -> CoreResult<InvocationSpec<FadeParams>> {
        let file = args.required_positional(0, "filename")?;
        args.expect_at_most(1)?;

        let seconds = args.parse_value::<f64>("time")?.unwrap_or(DEFAULT_FADE_SECONDS);
        if !seconds.is_finite() || seconds <= 0.0 {
            return Err(CoreError::invalid_value(
                "--time",
                args.value("time").unwrap_or_default(),
                "must be a positive number of seconds",
            ));
        }

        let input = PathBuf::from(file);
        let output = OUTPUT_NAME.derive(&input);
        Ok(InvocationSpec::new(
            InputPath::file(input),
            FadeParams { seconds, output },
            args.flag("quiet"),
        ))
    }

    fn execute(spec: &InvocationSpec<FadeParams>, session: &Session<'_>) -> CoreResult<RunReport> {
        let input = spec.primary_input();
        let params = spec.params();

        let duration = probe_duration(session, input)?;
        if params.seconds * 2.0 > duration {
            return Err(CoreError::invalid_value(
                "--time",
                format_seconds(params.seconds),
                format!(
                    "fades would overlap in a {}s clip",
                    format_seconds(duration)
                ),
            ));
        }

        let mut partial = PartialOutputs::protecting(&spec.input_paths());
        partial.track(&params.output);

        let (video, audio) = filters(params.seconds, duration);
        session.status(&format!(
            "Fading {} in and out over {}s",
            input.display(),
            format_seconds(params.seconds)
        ));
        let invocation = Invocation::new("transcoder", session.executable("transcoder")?)
            .args(["-hide_banner", "-y", "-i"])
            .arg(input)
            .arg("-vf")
            .arg(video)
            .arg("-af")
            .arg(audio)
            .arg(&params.output);
        session.invoke(&invocation)?;

        partial.commit();
        session.item_succeeded(input, &params.output);
        Ok(RunReport::single(params.output.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::run_tool;
    use crate::testing::{Harness, args};
    use tempfile::tempdir;

    #[test]
    fn filter_chains() {
        let (video, audio) = filters(2.0, 30.5);
        assert_eq!(video, "fade=t=in:st=0:d=2,fade=t=out:st=28.5:d=2");
        assert_eq!(audio, "afade=t=in:st=0:d=2,afade=t=out:st=28.5:d=2");
    }

    #[test]
    fn fades_with_probed_duration() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("talk.mkv");
        std::fs::write(&input, b"video").unwrap();
        let h = Harness::new(dir.path(), &["ffmpeg", "ffprobe"]);
        h.runner.respond("ffprobe", r#"{"format": {"duration": "10"}}"#);

        let input_arg = input.to_string_lossy().into_owned();
        run_tool::<Fade>(&h.env(), &args(&["-t", "1.5", &input_arg])).unwrap();

        let lines = h.runner.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("-vf fade=t=in:st=0:d=1.5,fade=t=out:st=8.5:d=1.5"));
        assert!(lines[1].ends_with("talk-faded.mkv"));
    }

    #[test]
    fn overlapping_fades_are_rejected() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("short.mp4");
        std::fs::write(&input, b"video").unwrap();
        let h = Harness::new(dir.path(), &["ffmpeg", "ffprobe"]);
        h.runner.respond("ffprobe", r#"{"format": {"duration": "3"}}"#);

        let input_arg = input.to_string_lossy().into_owned();
        let err = run_tool::<Fade>(&h.env(), &args(&["--time=2", &input_arg])).unwrap_err();
        assert!(err.to_string().contains("fades would overlap"));
        assert_eq!(h.runner.calls().len(), 1);
    }

    #[test]
    fn non_numeric_time_is_rejected() {
        let dir = tempdir().unwrap();
        let h = Harness::new(dir.path(), &["ffmpeg", "ffprobe"]);
        let err = run_tool::<Fade>(&h.env(), &args(&["--time=slow", "a.mp4"])).unwrap_err();
        assert!(err.to_string().starts_with("invalid value 'slow' for --time"));
        let err = run_tool::<Fade>(&h.env(), &args(&["--time=0", "a.mp4"])).unwrap_err();
        assert!(err.to_string().contains("positive"));
    }
}
