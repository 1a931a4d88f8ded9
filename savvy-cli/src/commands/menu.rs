//! Interactive menu - the classic Savvy Bank console flow
//!
//! Outer menu (Login / Register / Exit) and a per-session account menu.
//! Invalid input is reported and re-prompted; domain failures are printed
//! and the loop continues. All rules live in the ledger - this module is
//! prompt glue.

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Input, Password, Select};
use rust_decimal::Decimal;

use savvy_core::services::{LogEvent, LoggingService};
use savvy_core::{Error, SavvyContext, User, TRANSACTION_CEILING};

use super::{account, get_context, get_logger, log_event};
use crate::output;

/// Attempts allowed when a new password collides with the current one
const PASSWORD_RETRY_LIMIT: usize = 3;

pub fn run() -> Result<()> {
    let mut ctx = get_context()?;
    let logger = get_logger();

    println!("{}", "Welcome to Savvy Bank!".bold());
    if ctx.config.demo_mode {
        output::info("Demo mode is on - using the demo stores.");
    }

    loop {
        let choice = Select::new()
            .with_prompt("Please choose from the following options")
            .items(&["Login", "Register", "Exit"])
            .default(0)
            .interact()?;

        match choice {
            0 => login(&mut ctx, &logger)?,
            1 => register(&mut ctx, &logger)?,
            _ => break,
        }
    }

    // every store is saved once more on shutdown
    ctx.ledger.persist_all()?;
    Ok(())
}

fn register(ctx: &mut SavvyContext, logger: &Option<LoggingService>) -> Result<()> {
    let username = loop {
        let candidate: String = Input::new()
            .with_prompt("Please enter a username (no spaces)")
            .interact_text()?;

        match User::validate_username(candidate.trim()) {
            Err(reason) => output::error(reason),
            Ok(()) if ctx.ledger.username_exists(candidate.trim()) => {
                output::error("Username already exists. Please enter a new username.");
            }
            Ok(()) => break candidate.trim().to_string(),
        }
    };

    let password = prompt_password("Enter a password (no spaces)")?;

    match ctx.ledger.register(&username, &password) {
        Ok(()) => {
            log_event(
                logger,
                LogEvent::new("user_registered").with_username(username.to_lowercase()),
            );
            output::success("Registration successful!");
        }
        Err(e) => output::error(&e.to_string()),
    }
    Ok(())
}

fn login(ctx: &mut SavvyContext, logger: &Option<LoggingService>) -> Result<()> {
    let username: String = Input::new()
        .with_prompt("Please enter your username")
        .interact_text()?;
    let password = Password::new()
        .with_prompt("Please enter your password")
        .interact()?;

    if ctx.ledger.authenticate(&username, &password).is_err() {
        log_event(logger, LogEvent::new("login_failed"));
        output::error("Invalid username or password. Please try again.");
        return Ok(());
    }

    // the ledger keys everything by the lowercase form
    let mut username = username.trim().to_lowercase();
    let balance = ctx.ledger.balance(&username)?;
    log_event(
        logger,
        LogEvent::new("login_succeeded").with_username(&username),
    );
    output::success(&format!(
        "Login successful! Welcome, {}! Your balance is: {}",
        username,
        output::format_amount(balance)
    ));

    loop {
        let choice = Select::new()
            .with_prompt("Please choose from the following options")
            .items(&[
                "Deposit",
                "Withdraw",
                "View Balance",
                "Transaction History",
                "Change Username",
                "Change Password",
                "Logout",
            ])
            .default(0)
            .interact()?;

        match choice {
            0 => deposit(ctx, logger, &username)?,
            1 => withdraw(ctx, logger, &username)?,
            2 => {
                let balance = ctx.ledger.balance(&username)?;
                println!("Your balance is: {}", output::format_amount(balance));
            }
            3 => history(ctx, &username)?,
            4 => {
                if let Some(new_name) = change_username(ctx, logger, &username)? {
                    username = new_name;
                }
            }
            5 => change_password(ctx, logger, &username)?,
            _ => break,
        }
    }
    Ok(())
}

fn deposit(
    ctx: &mut SavvyContext,
    logger: &Option<LoggingService>,
    username: &str,
) -> Result<()> {
    let Some(amount) = prompt_amount("Enter the amount to deposit")? else {
        output::error("Invalid input. Deposit failed.");
        return Ok(());
    };

    match ctx.ledger.deposit(username, amount) {
        Ok(new_balance) => {
            log_event(
                logger,
                LogEvent::new("deposit_completed").with_username(username),
            );
            output::success(&format!(
                "Deposit successful. Your new balance is: {}",
                output::format_amount(new_balance)
            ));
        }
        Err(Error::LimitExceeded) => output::error(&format!(
            "Deposits are limited to {} per transaction. Deposit failed.",
            output::format_amount(TRANSACTION_CEILING)
        )),
        Err(e) => output::error(&format!("{}. Deposit failed.", e)),
    }
    Ok(())
}

fn withdraw(
    ctx: &mut SavvyContext,
    logger: &Option<LoggingService>,
    username: &str,
) -> Result<()> {
    let Some(amount) = prompt_amount("Enter the amount to withdraw")? else {
        output::error("Invalid input. Withdrawal failed.");
        return Ok(());
    };

    match ctx.ledger.withdraw(username, amount) {
        Ok(new_balance) => {
            log_event(
                logger,
                LogEvent::new("withdrawal_completed").with_username(username),
            );
            output::success(&format!(
                "Withdrawal successful. Your new balance is: {}",
                output::format_amount(new_balance)
            ));
        }
        Err(Error::LimitExceeded) => output::error(&format!(
            "Withdrawals must stay under {} per transaction. Withdrawal failed.",
            output::format_amount(TRANSACTION_CEILING)
        )),
        Err(e) => output::error(&format!("{}. Withdrawal failed.", e)),
    }
    Ok(())
}

fn history(ctx: &SavvyContext, username: &str) -> Result<()> {
    let history = ctx.ledger.history(username)?;
    if history.is_empty() {
        println!("No transaction history available.");
        return Ok(());
    }
    println!("Transaction History for User: {}", username);
    println!("{}", account::render_history(history));
    Ok(())
}

fn change_username(
    ctx: &mut SavvyContext,
    logger: &Option<LoggingService>,
    username: &str,
) -> Result<Option<String>> {
    let new_username: String = Input::new()
        .with_prompt("Please enter a new username (no spaces)")
        .interact_text()?;
    let new_username = new_username.trim();

    match ctx.ledger.change_username(username, new_username) {
        Ok(()) => {
            let new_key = new_username.to_lowercase();
            log_event(
                logger,
                LogEvent::new("username_changed").with_username(&new_key),
            );
            output::success(&format!("Username changed successfully to: {}", new_key));
            Ok(Some(new_key))
        }
        Err(Error::CooldownActive { retry_after }) => {
            output::warning(&format!(
                "You can only change your username once every 30 days. You can change it again after {}.",
                retry_after
                    .with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M:%S")
            ));
            Ok(None)
        }
        Err(e) => {
            output::error(&e.to_string());
            Ok(None)
        }
    }
}

fn change_password(
    ctx: &mut SavvyContext,
    logger: &Option<LoggingService>,
    username: &str,
) -> Result<()> {
    let current = Password::new()
        .with_prompt("Enter your current password")
        .interact()?;

    // bounded retry instead of the recursive "try again" flow
    for _ in 0..PASSWORD_RETRY_LIMIT {
        let new_password = prompt_password("Enter your new password (no spaces)")?;

        match ctx.ledger.change_password(username, &current, &new_password) {
            Ok(()) => {
                log_event(
                    logger,
                    LogEvent::new("password_changed").with_username(username),
                );
                output::success("Password changed successfully!");
                return Ok(());
            }
            Err(Error::SamePassword) => {
                output::warning("New password cannot be the same as the current password.");
                let choice = Select::new()
                    .items(&["Enter a new password", "Return to the main menu"])
                    .default(0)
                    .interact()?;
                if choice == 1 {
                    return Ok(());
                }
            }
            Err(Error::IncorrectPassword) => {
                output::error("Incorrect current password. Password change failed.");
                return Ok(());
            }
            Err(e) => {
                output::error(&e.to_string());
                return Ok(());
            }
        }
    }

    output::warning("Too many attempts. Returning to the main menu.");
    Ok(())
}

/// Prompt for a money amount; None when the input is not a number
fn prompt_amount(prompt: &str) -> Result<Option<Decimal>> {
    let input: String = Input::new().with_prompt(prompt).interact_text()?;
    Ok(input.trim().parse().ok())
}

/// Prompt for a whitespace-free password, re-prompting until valid
fn prompt_password(prompt: &str) -> Result<String> {
    loop {
        let password = Password::new().with_prompt(prompt).interact()?;
        if password.chars().any(char::is_whitespace) {
            output::error("Your password contains spaces. Please enter a new valid password.");
        } else {
            return Ok(password);
        }
    }
}
