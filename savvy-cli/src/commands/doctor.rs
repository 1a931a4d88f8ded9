//! Doctor command - run store health checks

use anyhow::Result;
use colored::Colorize;

use super::get_context;
use crate::output;

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let report = ctx.doctor_service.run_checks()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Check", "Result", "Detail"]);
    for check in &report.checks {
        let result = if check.passed {
            "ok".green().to_string()
        } else {
            "FAIL".red().to_string()
        };
        table.add_row(vec![
            check.name.clone(),
            result,
            check.detail.clone().unwrap_or_default(),
        ]);
    }
    println!("{}", table);

    if report.healthy {
        output::success("All checks passed.");
    } else {
        output::warning("Problems found. A backup before repairs is recommended.");
    }
    Ok(())
}
