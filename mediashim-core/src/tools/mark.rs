//! `mark`: composite a watermark onto an image.

use std::path::PathBuf;

use crate::cleanup::PartialOutputs;
use crate::config::FrontEndConfig;
use crate::dependency::{IMAGEMAGICK, ToolRequirement};
use crate::error::{CoreError, CoreResult};
use crate::frontend::{InputPath, InvocationSpec, RunReport, Tool};
use crate::naming::OutputName;
use crate::options::{OptionSpec, ParsedArgs, QUIET};
use crate::process::Invocation;
use crate::session::Session;

pub const DEFAULT_GRAVITY: &str = "southeast";

/// Placements ImageMagick understands for `-gravity`.
const GRAVITIES: &[&str] = &[
    "northwest",
    "north",
    "northeast",
    "west",
    "center",
    "east",
    "southwest",
    "south",
    "southeast",
];

/// Distance of the watermark from the image edge, in pixels.
const MARGIN: &str = "+10+10";

const OUTPUT_NAME: OutputName = OutputName::Suffix("-marked");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkParams {
    pub watermark: PathBuf,
    pub gravity: String,
    pub output: PathBuf,
}

pub struct Mark;

impl Tool for Mark {
    type Params = MarkParams;

    const NAME: &'static str = "mark";
    const SUMMARY: &'static str = "Stamp a watermark image onto a picture";
    const USAGE: &'static str = "[OPTIONS] <IMAGE> <WATERMARK>";
    const OPTIONS: &'static [OptionSpec] = &[
        OptionSpec::value(
            "gravity",
            Some('g'),
            "GRAVITY",
            "watermark placement, e.g. northwest or center (default southeast)",
        ),
        QUIET,
    ];
    const REQUIREMENTS: &'static [ToolRequirement] = &[IMAGEMAGICK];

    fn build(args: &ParsedArgs, _config: &FrontEndConfig) -> CoreResult<InvocationSpec<MarkParams>> {
        let image = args.required_positional(0, "filename")?;
        let watermark = args.required_positional(1, "watermark")?;
        args.expect_at_most(2)?;

        let raw = args.value("gravity").unwrap_or(DEFAULT_GRAVITY);
        let gravity = raw.to_ascii_lowercase();
        if !GRAVITIES.contains(&gravity.as_str()) {
            return Err(CoreError::invalid_value(
                "--gravity",
                raw,
                format!("expected one of {}", GRAVITIES.join(", ")),
            ));
        }

        let input = PathBuf::from(image);
        let watermark = PathBuf::from(watermark);
        let output = OUTPUT_NAME.derive(&input);
        let params = MarkParams {
            watermark: watermark.clone(),
            gravity,
            output,
        };
        Ok(InvocationSpec::new(InputPath::file(input), params, args.flag("quiet"))
            .with_input(InputPath::file(watermark)))
    }

    fn execute(spec: &InvocationSpec<MarkParams>, session: &Session<'_>) -> CoreResult<RunReport> {
        let input = spec.primary_input();
        let params = spec.params();

        let mut partial = PartialOutputs::protecting(&spec.input_paths());
        partial.track(&params.output);

        session.status(&format!(
            "Watermarking {} ({})",
            input.display(),
            params.gravity
        ));
        let invocation = Invocation::new("rasterizer", session.executable("rasterizer")?)
            .arg(input)
            .arg(&params.watermark)
            .arg("-gravity")
            .arg(&params.gravity)
            .args(["-geometry", MARGIN, "-composite"])
            .arg(&params.output);
        session.invoke(&invocation)?;

        partial.commit();
        session.item_succeeded(input, &params.output);
        Ok(RunReport::single(params.output.clone()))
    }
}
