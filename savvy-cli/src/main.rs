//! Savvy CLI - a small bank in your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{account, backup, demo, doctor, logs, menu, status, users};

/// Savvy - a small flat-file bank ledger
///
/// Running without a subcommand starts the interactive menu.
#[derive(Parser)]
#[command(name = "savvy", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show ledger status and summary
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Register a new user
    Register {
        username: String,
        /// Password (prompted interactively when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Deposit into an account
    Deposit {
        username: String,
        /// Amount to deposit
        amount: String,
    },

    /// Withdraw from an account
    Withdraw {
        username: String,
        /// Amount to withdraw
        amount: String,
    },

    /// Show an account balance
    Balance { username: String },

    /// Show an account's transaction history
    History {
        username: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Administrative user operations
    Users {
        #[command(subcommand)]
        command: users::UsersCommands,
    },

    /// View and manage application logs
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },

    /// Manage backups
    Backup {
        #[command(subcommand)]
        command: backup::BackupCommands,
    },

    /// Run store health checks
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage demo mode
    Demo {
        #[command(subcommand)]
        command: Option<demo::DemoCommands>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        None => menu::run(),
        Some(Commands::Status { json }) => status::run(json),
        Some(Commands::Register { username, password }) => account::run_register(&username, password),
        Some(Commands::Deposit { username, amount }) => account::run_deposit(&username, &amount),
        Some(Commands::Withdraw { username, amount }) => account::run_withdraw(&username, &amount),
        Some(Commands::Balance { username }) => account::run_balance(&username),
        Some(Commands::History { username, json }) => account::run_history(&username, json),
        Some(Commands::Users { command }) => users::run(command),
        Some(Commands::Logs { command }) => logs::run(command),
        Some(Commands::Backup { command }) => backup::run(command),
        Some(Commands::Doctor { json }) => doctor::run(json),
        Some(Commands::Demo { command }) => demo::run(command),
    }
}
