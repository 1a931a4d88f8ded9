//! Backup command - manage store backups

use anyhow::Result;
use chrono::Local;
use clap::Subcommand;
use dialoguer::Confirm;

use super::{get_context, get_logger, log_event};
use crate::output;
use savvy_core::services::LogEvent;

#[derive(Subcommand)]
pub enum BackupCommands {
    /// Create a new backup
    Create {
        /// Keep at most this many backups after creating
        #[arg(long)]
        max_backups: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List existing backups
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Restore a backup over the current stores
    Restore {
        /// Backup archive name (see `savvy backup list`)
        name: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

pub fn run(command: BackupCommands) -> Result<()> {
    match command {
        BackupCommands::Create { max_backups, json } => run_create(max_backups, json),
        BackupCommands::List { json } => run_list(json),
        BackupCommands::Restore { name, force } => run_restore(&name, force),
    }
}

fn run_create(max_backups: Option<usize>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let logger = get_logger();

    let metadata = ctx.backup_service.create(max_backups)?;
    log_event(
        &logger,
        LogEvent::new("backup_created").with_command("backup create"),
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&metadata)?);
    } else {
        output::success(&format!(
            "Backup created: {} ({})",
            metadata.name,
            output::format_size(metadata.size_bytes)
        ));
    }
    Ok(())
}

fn run_list(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let backups = ctx.backup_service.list()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&backups)?);
        return Ok(());
    }

    if backups.is_empty() {
        println!("No backups found.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Name", "Created", "Size"]);
    for backup in backups {
        table.add_row(vec![
            backup.name,
            backup
                .created_at
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            output::format_size(backup.size_bytes),
        ]);
    }
    println!("{}", table);
    Ok(())
}

fn run_restore(name: &str, force: bool) -> Result<()> {
    let ctx = get_context()?;
    let logger = get_logger();

    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Overwrite the current stores with '{}'?", name))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    let restored = ctx.backup_service.restore(name)?;
    log_event(
        &logger,
        LogEvent::new("backup_restored").with_command("backup restore"),
    );
    output::success(&format!("Restored {} file(s): {}", restored.len(), restored.join(", ")));
    Ok(())
}
