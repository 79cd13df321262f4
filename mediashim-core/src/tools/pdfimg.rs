//! `pdfimg`: render PDF pages to PNG images beside the document.

use std::path::{Path, PathBuf};

use crate::cleanup::PartialOutputs;
use crate::config::FrontEndConfig;
use crate::dependency::{PDFTOPPM, ToolRequirement};
use crate::error::{CoreError, CoreResult};
use crate::frontend::{InputPath, InvocationSpec, RunReport, Tool};
use crate::options::{OptionSpec, ParsedArgs, QUIET};
use crate::process::Invocation;
use crate::session::Session;

pub const DEFAULT_DPI: u32 = 150;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfImgParams {
    pub first: Option<u32>,
    pub last: Option<u32>,
    pub dpi: u32,
    /// Page images are written as `<prefix>-<N>.png`.
    pub prefix: PathBuf,
}

pub struct PdfImg;

fn page_option(args: &ParsedArgs, long: &str) -> CoreResult<Option<u32>> {
    match args.parse_value::<u32>(long)? {
        Some(0) => Err(CoreError::invalid_value(
            format!("--{long}"),
            "0",
            "pages are numbered from 1",
        )),
        other => Ok(other),
    }
}

/// Existing `<prefix>-<N>.png` files with their page numbers, in page order.
fn rendered_pages(prefix: &Path) -> CoreResult<Vec<(u32, PathBuf)>> {
    let dir = prefix.parent().filter(|p| !p.as_os_str().is_empty());
    let lead = format!(
        "{}-",
        prefix.file_name().unwrap_or_default().to_string_lossy()
    );

    let mut pages: Vec<(u32, PathBuf)> = Vec::new();
    for entry in std::fs::read_dir(dir.unwrap_or_else(|| Path::new(".")))? {
        let name = entry?.file_name();
        let Some(name) = name.to_str() else { continue };
        let Some(number) = name
            .strip_prefix(lead.as_str())
            .and_then(|rest| rest.strip_suffix(".png"))
        else {
            continue;
        };
        if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        let Ok(page) = number.parse::<u32>() else { continue };
        let path = match dir {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        };
        pages.push((page, path));
    }
    pages.sort();
    Ok(pages)
}

impl PdfImgParams {
    fn covers(&self, page: u32) -> bool {
        self.first.is_none_or(|first| page >= first) && self.last.is_none_or(|last| page <= last)
    }
}

impl Tool for PdfImg {
    type Params = PdfImgParams;

    const NAME: &'static str = "pdfimg";
    const SUMMARY: &'static str = "Render the pages of a PDF to PNG images";
    const USAGE: &'static str = "[OPTIONS] <FILE>";
    const OPTIONS: &'static [OptionSpec] = &[
        OptionSpec::value("first", Some('f'), "N", "first page to render"),
        OptionSpec::value("last", Some('l'), "N", "last page to render"),
        OptionSpec::value("res", Some('r'), "DPI", "resolution in DPI (default 150)"),
        QUIET,
    ];
    const REQUIREMENTS: &'static [ToolRequirement] = &[PDFTOPPM];

    fn build(args: &ParsedArgs, _config: &FrontEndConfig) -> CoreResult<InvocationSpec<PdfImgParams>> {
        let file = args.required_positional(0, "filename")?;
        args.expect_at_most(1)?;

        let first = page_option(args, "first")?;
        let last = page_option(args, "last")?;
        if let (Some(first), Some(last)) = (first, last) {
            if first > last {
                return Err(CoreError::invalid_value(
                    "--first",
                    first.to_string(),
                    format!("is after --last ({last})"),
                ));
            }
        }
        let dpi = args.parse_value::<u32>("res")?.unwrap_or(DEFAULT_DPI);
        if dpi == 0 {
            return Err(CoreError::invalid_value("--res", "0", "must be at least 1"));
        }

        let input = PathBuf::from(file);
        let prefix = input.with_extension("");
        Ok(InvocationSpec::new(
            InputPath::file(input),
            PdfImgParams {
                first,
                last,
                dpi,
                prefix,
            },
            args.flag("quiet"),
        ))
    }

    fn execute(spec: &InvocationSpec<PdfImgParams>, session: &Session<'_>) -> CoreResult<RunReport> {
        let input = spec.primary_input();
        let params = spec.params();

        let mut invocation = Invocation::new("pdf-rasterizer", session.executable("pdf-rasterizer")?)
            .args(["-png", "-r"])
            .arg(params.dpi.to_string());
        if let Some(first) = params.first {
            invocation = invocation.arg("-f").arg(first.to_string());
        }
        if let Some(last) = params.last {
            invocation = invocation.arg("-l").arg(last.to_string());
        }
        let invocation = invocation.arg(input).arg(&params.prefix);

        let before = rendered_pages(&params.prefix)?;
        session.status(&format!("Rendering {} at {} DPI", input.display(), params.dpi));
        if let Err(e) = session.invoke(&invocation) {
            // Page names are only known afterwards; remove the ones this run created.
            let mut partial = PartialOutputs::protecting(&spec.input_paths());
            for (_, page) in rendered_pages(&params.prefix).unwrap_or_default() {
                if !before.iter().any(|(_, old)| *old == page) {
                    partial.track(&page);
                }
            }
            return Err(e);
        }

        // Pages outside the requested range that were already there are
        // left over from earlier runs.
        let pages: Vec<PathBuf> = rendered_pages(&params.prefix)?
            .into_iter()
            .filter(|(number, page)| {
                params.covers(*number) || !before.iter().any(|(_, old)| old == page)
            })
            .map(|(_, page)| page)
            .collect();
        if pages.is_empty() {
            session.warning(&format!("{} rendered no pages", invocation.program_name()));
        }
        for page in &pages {
            session.item_succeeded(input, page);
        }
        Ok(RunReport {
            outputs: pages,
            failures: Vec::new(),
        })
    }
}
