//! `list`: every tool with its summary.

use console::style;
use mediashim_core::registry;

/// Prints every tool with its summary and the executables it uses.
pub fn run_list() {
    let tools = registry();
    let width = tools.iter().map(|t| t.name.len()).max().unwrap_or(0);
    for tool in &tools {
        let executables: Vec<&str> = tool.requirements.iter().map(|r| r.executable).collect();
        println!(
            "  {}  {} {}",
            style(format!("{:<width$}", tool.name)).bold(),
            tool.summary,
            style(format!("({})", executables.join(", "))).dim()
        );
    }
}
