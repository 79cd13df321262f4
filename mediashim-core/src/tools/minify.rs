//! `minify`: shrink an image for the web, then squeeze it losslessly.

use std::path::PathBuf;

use crate::cleanup::PartialOutputs;
use crate::config::FrontEndConfig;
use crate::dependency::{IMAGEMAGICK, TRIMAGE, ToolRequirement};
use crate::error::{CoreError, CoreResult};
use crate::frontend::{InputPath, InvocationSpec, RunReport, Tool};
use crate::naming::OutputName;
use crate::options::{OptionSpec, ParsedArgs, QUIET};
use crate::process::Invocation;
use crate::session::Session;
use crate::utils::parse_resolution;

pub const DEFAULT_RESOLUTION: (u32, u32) = (1920, 1080);
pub const DEFAULT_QUALITY: u8 = 82;

const OUTPUT_NAME: OutputName = OutputName::Suffix("-min");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinifyParams {
    /// Bounding box; the image is only ever scaled down.
    pub max_size: (u32, u32),
    pub quality: u8,
    pub output: PathBuf,
}

pub struct Minify;

/// Parses `--quality`, which must lie in 1..=100.
pub(crate) fn quality_option(args: &ParsedArgs, default: u8) -> CoreResult<u8> {
    let quality = args.parse_value::<u8>("quality")?.unwrap_or(default);
    if !(1..=100).contains(&quality) {
        return Err(CoreError::invalid_value(
            "--quality",
            quality.to_string(),
            "must be between 1 and 100",
        ));
    }
    Ok(quality)
}

impl Tool for Minify {
    type Params = MinifyParams;

    const NAME: &'static str = "minify";
    const SUMMARY: &'static str = "Downscale and compress an image for the web";
    const USAGE: &'static str = "[OPTIONS] <IMAGE>";
    const OPTIONS: &'static [OptionSpec] = &[
        OptionSpec::value("res", Some('r'), "WxH", "largest size to fit in (default 1920x1080)"),
        OptionSpec::value("quality", None, "N", "encoder quality 1-100 (default 82)"),
        QUIET,
    ];
    const REQUIREMENTS: &'static [ToolRequirement] = &[IMAGEMAGICK, TRIMAGE];

    fn build(args: &ParsedArgs, _config: &FrontEndConfig) -> CoreResult<InvocationSpec<MinifyParams>> {
        let file = args.required_positional(0, "filename")?;
        args.expect_at_most(1)?;

        let max_size = match args.value("res") {
            Some(raw) => parse_resolution(raw).ok_or_else(|| {
                CoreError::invalid_value("--res", raw, "expected WIDTHxHEIGHT such as 1280x720")
            })?,
            None => DEFAULT_RESOLUTION,
        };
        let quality = quality_option(args, DEFAULT_QUALITY)?;

        let input = PathBuf::from(file);
        let output = OUTPUT_NAME.derive(&input);
        Ok(InvocationSpec::new(
            InputPath::file(input),
            MinifyParams {
                max_size,
                quality,
                output,
            },
            args.flag("quiet"),
        ))
    }

    fn execute(spec: &InvocationSpec<MinifyParams>, session: &Session<'_>) -> CoreResult<RunReport> {
        let input = spec.primary_input();
        let params = spec.params();
        let (width, height) = params.max_size;

        let mut partial = PartialOutputs::protecting(&spec.input_paths());
        partial.track(&params.output);

        session.status(&format!("Resizing {} to fit {}x{}", input.display(), width, height));
        // `>` only shrinks images larger than the box
        let resize = Invocation::new("rasterizer", session.executable("rasterizer")?)
            .arg(input)
            .arg("-resize")
            .arg(format!("{width}x{height}>"))
            .arg("-strip")
            .arg("-quality")
            .arg(params.quality.to_string())
            .arg(&params.output);
        session.invoke(&resize)?;

        session.status("Optimizing losslessly");
        let optimize = Invocation::new(
            "lossless-compressor",
            session.executable("lossless-compressor")?,
        )
        .arg("-f")
        .arg(&params.output);
        session.invoke(&optimize)?;

        partial.commit();
        session.item_succeeded(input, &params.output);
        Ok(RunReport::single(params.output.clone()))
    }
}
