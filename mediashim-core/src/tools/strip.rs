//! `strip`: write a copy of a file with all metadata removed.

use std::path::PathBuf;

use crate::cleanup::PartialOutputs;
use crate::config::FrontEndConfig;
use crate::dependency::{EXIFTOOL, ToolRequirement};
use crate::error::CoreResult;
use crate::frontend::{InputPath, InvocationSpec, RunReport, Tool};
use crate::naming::OutputName;
use crate::options::{OptionSpec, ParsedArgs, QUIET};
use crate::process::Invocation;
use crate::session::Session;

const OUTPUT_NAME: OutputName = OutputName::Suffix("-stripped");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripParams {
    pub output: PathBuf,
}

pub struct Strip;

impl Tool for Strip {
    type Params = StripParams;

    const NAME: &'static str = "strip";
    const SUMMARY: &'static str = "Remove all metadata from an image or video";
    const USAGE: &'static str = "[OPTIONS] <FILE>";
    const OPTIONS: &'static [OptionSpec] = &[QUIET];
    const REQUIREMENTS: &'static [ToolRequirement] = &[EXIFTOOL];

    fn build(args: &ParsedArgs, _config: &FrontEndConfig) -> CoreResult<InvocationSpec<StripParams>> {
        let file = args.required_positional(0, "filename")?;
        args.expect_at_most(1)?;

        let input = PathBuf::from(file);
        let output = OUTPUT_NAME.derive(&input);
        Ok(InvocationSpec::new(
            InputPath::file(input),
            StripParams { output },
            args.flag("quiet"),
        ))
    }

    fn execute(spec: &InvocationSpec<StripParams>, session: &Session<'_>) -> CoreResult<RunReport> {
        let input = spec.primary_input();
        let output = &spec.params().output;

        let mut partial = PartialOutputs::protecting(&spec.input_paths());
        // exiftool -o fails instead of overwriting; a file already there is not ours
        if !output.exists() {
            partial.track(output);
        }

        session.status(&format!("Stripping metadata from {}", input.display()));
        let invocation = Invocation::new("metadata-editor", session.executable("metadata-editor")?)
            .args(["-all=", "-o"])
            .arg(output)
            .arg(input);
        session.invoke(&invocation)?;

        partial.commit();
        session.item_succeeded(input, output);
        Ok(RunReport::single(output.clone()))
    }
}
