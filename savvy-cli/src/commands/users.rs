//! Users command - administrative user operations

use anyhow::Result;
use clap::Subcommand;
use dialoguer::Confirm;

use super::{get_context, get_logger, log_event};
use crate::output;
use savvy_core::services::LogEvent;

#[derive(Subcommand)]
pub enum UsersCommands {
    /// List all registered users
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete all registered users
    Clear {
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

pub fn run(command: UsersCommands) -> Result<()> {
    match command {
        UsersCommands::List { json } => run_list(json),
        UsersCommands::Clear { force } => run_clear(force),
    }
}

fn run_list(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let users = ctx.ledger.list_users();

    if json {
        println!("{}", serde_json::to_string_pretty(users)?);
        return Ok(());
    }

    if users.is_empty() {
        println!("No registered users.");
        return Ok(());
    }

    println!("User List:");
    let mut table = output::create_table();
    table.set_header(vec!["Username", "Password"]);
    for user in users {
        table.add_row(vec![user.username.clone(), user.password.clone()]);
    }
    println!("{}", table);
    Ok(())
}

fn run_clear(force: bool) -> Result<()> {
    let mut ctx = get_context()?;
    let logger = get_logger();

    let count = ctx.ledger.user_count();
    if count == 0 {
        println!("No registered users.");
        return Ok(());
    }

    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete all {} users?", count))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    ctx.ledger.clear_users();
    ctx.ledger.persist_all()?;
    log_event(&logger, LogEvent::new("users_cleared").with_command("users clear"));
    output::success("All users have been deleted.");
    Ok(())
}
