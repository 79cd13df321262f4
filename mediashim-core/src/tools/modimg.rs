//! `modimg`: re-encode every `*.EXT` image in the working directory to a
//! modern format (WebP, AVIF or JPEG XL).

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::cleanup::PartialOutputs;
use crate::config::FrontEndConfig;
use crate::dependency::{AVIFENC, CJXL, CWEBP, ToolRequirement};
use crate::error::CoreResult;
use crate::frontend::{InputPath, InvocationSpec, RunReport, Tool};
use crate::naming::{OutputName, output_dir};
use crate::options::{OptionSpec, ParsedArgs, QUIET};
use crate::process::Invocation;
use crate::session::Session;
use crate::tools::minify::quality_option;
use crate::tools::run_batch;
use crate::utils::{find_files_with_extension, validate_extension_token};

pub const DEFAULT_QUALITY: u8 = 80;

const OUTPUT_DIR: &str = "modimg";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    #[default]
    Webp,
    Avif,
    Jxl,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Webp => "webp",
            Self::Avif => "avif",
            Self::Jxl => "jxl",
        }
    }

    pub fn encoder(self) -> ToolRequirement {
        match self {
            Self::Webp => CWEBP,
            Self::Avif => AVIFENC,
            Self::Jxl => CJXL,
        }
    }

    fn output_name(self) -> OutputName {
        OutputName::Subdirectory {
            dir: OUTPUT_DIR,
            extension: Some(self.extension()),
        }
    }

    /// Encoder command line; the output path always comes last.
    fn invocation(self, encoder: &Path, input: &Path, output: &Path, quality: u8) -> Invocation {
        let quality = quality.to_string();
        let role = self.encoder().role;
        match self {
            Self::Webp => Invocation::new(role, encoder)
                .args(["-quiet", "-q", quality.as_str()])
                .arg(input)
                .arg("-o")
                .arg(output),
            Self::Avif | Self::Jxl => Invocation::new(role, encoder)
                .args(["-q", quality.as_str()])
                .arg(input)
                .arg(output),
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ImageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "webp" => Ok(Self::Webp),
            "avif" => Ok(Self::Avif),
            "jxl" => Ok(Self::Jxl),
            _ => Err("expected webp, avif or jxl".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModImgParams {
    pub extension: String,
    pub format: ImageFormat,
    pub quality: u8,
}

pub struct ModImg;

fn encode_one(session: &Session<'_>, file: &Path, params: &ModImgParams) -> CoreResult<PathBuf> {
    let output = params.format.output_name().derive(file);
    if let Some(dir) = output_dir(&output) {
        std::fs::create_dir_all(dir)?;
    }

    let mut partial = PartialOutputs::protecting(&[file.to_path_buf()]);
    partial.track(&output);

    let role = params.format.encoder().role;
    let invocation = params
        .format
        .invocation(session.executable(role)?, file, &output, params.quality);
    session.invoke(&invocation)?;

    partial.commit();
    Ok(output)
}

impl Tool for ModImg {
    type Params = ModImgParams;

    const NAME: &'static str = "modimg";
    const SUMMARY: &'static str = "Convert every *.EXT image in the current directory to WebP, AVIF or JPEG XL";
    const USAGE: &'static str = "[OPTIONS] <EXT>";
    const OPTIONS: &'static [OptionSpec] = &[
        OptionSpec::value("to", None, "FORMAT", "webp, avif or jxl (default webp)"),
        OptionSpec::value("quality", None, "N", "encoder quality 1-100 (default 80)"),
        QUIET,
    ];
    const REQUIREMENTS: &'static [ToolRequirement] = &[CWEBP, AVIFENC, CJXL];

    fn build(args: &ParsedArgs, config: &FrontEndConfig) -> CoreResult<InvocationSpec<ModImgParams>> {
        let token = args.required_positional(0, "extension")?;
        args.expect_at_most(1)?;

        let extension = validate_extension_token(token)?;
        let format = args.parse_value::<ImageFormat>("to")?.unwrap_or_default();
        let quality = quality_option(args, DEFAULT_QUALITY)?;

        Ok(InvocationSpec::new(
            InputPath::directory(&config.working_dir),
            ModImgParams {
                extension,
                format,
                quality,
            },
            args.flag("quiet"),
        ))
    }

    fn requirements(spec: &InvocationSpec<ModImgParams>) -> Vec<ToolRequirement> {
        vec![spec.params().format.encoder()]
    }

    fn execute(spec: &InvocationSpec<ModImgParams>, session: &Session<'_>) -> CoreResult<RunReport> {
        let params = spec.params();
        let files = find_files_with_extension(spec.primary_input(), &params.extension)?;
        if params.extension.eq_ignore_ascii_case(params.format.extension()) {
            session.warning(&format!(
                "sources are already {}; re-encoding into {}/",
                params.format, OUTPUT_DIR
            ));
        }
        session.status(&format!(
            "Encoding {} *.{} image(s) to {} at quality {}",
            files.len(),
            params.extension,
            params.format,
            params.quality
        ));
        run_batch(session, &files, |file| encode_one(session, file, params))
    }
}
