//! `doctor`: check that every external executable can be found.

use console::style;
use mediashim_core::{CoreError, Environment, all_requirements, registry, survey_dependencies};

use crate::error::{CliResult, report_error};

/// Tools that delegate to `executable`.
fn used_by(executable: &str) -> Vec<&'static str> {
    registry()
        .into_iter()
        .filter(|t| t.requirements.iter().any(|r| r.executable == executable))
        .map(|t| t.name)
        .collect()
}

/// Locates every executable any tool may need. Fails when one is missing.
pub fn run_doctor(env: &Environment<'_>) -> CliResult<()> {
    let survey = survey_dependencies(&all_requirements(), env.locator);
    let width = survey.iter().map(|(r, _)| r.executable.len()).max().unwrap_or(0);

    for (req, found) in &survey {
        let name = format!("{:<width$}", req.executable);
        match found {
            Some(path) => println!(
                "  {}  {}  {}",
                style("ok     ").green(),
                name,
                path.display()
            ),
            None => println!(
                "  {}  {}  needed by {}; install from {}",
                style("missing").red().bold(),
                name,
                used_by(req.executable).join(", "),
                req.hint
            ),
        }
    }

    let missing: Vec<_> = survey.iter().filter(|(_, found)| found.is_none()).collect();
    log::debug!("doctor: {} of {} executables missing", missing.len(), survey.len());
    match missing.first() {
        None => {
            println!("{} all {} executables found", style("✓").green().bold(), survey.len());
            Ok(())
        }
        Some((req, _)) => {
            let err = CoreError::DependencyMissing {
                role: req.role,
                executable: req.executable,
                hint: req.hint,
            };
            report_error(env.reporter, &err, None);
            Err(err)
        }
    }
}
