//! Logs command - view and manage application logs

use anyhow::Result;
use chrono::{TimeZone, Utc};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;

use super::get_savvy_dir;
use crate::output;
use savvy_core::services::{EntryPoint, LoggingService};

#[derive(Subcommand)]
pub enum LogsCommands {
    /// Show recent log entries
    List {
        /// Number of entries to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
        /// Show only errors
        #[arg(long)]
        errors: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Clear old log entries
    Clear {
        /// Delete logs older than N days
        #[arg(long, default_value = "30")]
        older_than_days: u64,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },
    /// Show log statistics and file path
    Stats,
}

fn get_logging_service() -> Result<LoggingService> {
    let savvy_dir = get_savvy_dir();
    LoggingService::new(&savvy_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION"))
}

fn format_timestamp(timestamp_ms: i64) -> String {
    Utc.timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp_ms.to_string())
}

pub fn run(command: LogsCommands) -> Result<()> {
    match command {
        LogsCommands::List {
            limit,
            errors,
            json,
        } => run_list(limit, errors, json),
        LogsCommands::Clear {
            older_than_days,
            force,
        } => run_clear(older_than_days, force),
        LogsCommands::Stats => run_stats(),
    }
}

fn run_list(limit: usize, errors: bool, json: bool) -> Result<()> {
    let service = get_logging_service()?;
    let entries = if errors {
        service.get_errors(limit)?
    } else {
        service.get_recent(limit)?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No log entries found.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Time", "Event", "User", "Command", "Error"]);
    for entry in entries {
        let error_indicator = if entry.error_message.is_some() {
            "!".red().to_string()
        } else {
            String::new()
        };
        table.add_row(vec![
            format_timestamp(entry.timestamp),
            entry.event,
            entry.username.unwrap_or_default(),
            entry.command.unwrap_or_default(),
            error_indicator,
        ]);
    }
    println!("{}", table);
    Ok(())
}

fn run_clear(older_than_days: u64, force: bool) -> Result<()> {
    let service = get_logging_service()?;

    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete log entries older than {} days?",
                older_than_days
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    let cutoff_ms = Utc::now().timestamp_millis() - (older_than_days as i64) * 24 * 60 * 60 * 1000;
    let deleted = service.delete_before(cutoff_ms)?;
    output::success(&format!("Deleted {} log entries.", deleted));
    Ok(())
}

fn run_stats() -> Result<()> {
    let service = get_logging_service()?;
    let total = service.count()?;
    let errors = service.get_errors(usize::MAX)?.len();

    let mut table = output::create_table();
    table.add_row(vec!["Entries", &total.to_string()]);
    table.add_row(vec!["Errors", &errors.to_string()]);
    table.add_row(vec!["Log file", &service.log_path().display().to_string()]);
    println!("{}", table);
    Ok(())
}
