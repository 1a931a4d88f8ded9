//! Account commands - scripted register/deposit/withdraw/balance/history

use anyhow::Result;
use chrono::Local;
use dialoguer::Password;
use rust_decimal::Decimal;

use savvy_core::services::LogEvent;
use savvy_core::Transaction;

use super::{get_context, get_logger, log_event};
use crate::output;

pub fn run_register(username: &str, password: Option<String>) -> Result<()> {
    let mut ctx = get_context()?;
    let logger = get_logger();

    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()?,
    };

    ctx.ledger.register(username, &password)?;
    log_event(
        &logger,
        LogEvent::new("user_registered")
            .with_username(username.to_lowercase())
            .with_command("register"),
    );
    output::success(&format!("Registered user '{}'", username.to_lowercase()));
    Ok(())
}

pub fn run_deposit(username: &str, amount: &str) -> Result<()> {
    let mut ctx = get_context()?;
    let logger = get_logger();

    let amount = parse_amount(amount)?;
    let new_balance = ctx.ledger.deposit(username, amount)?;
    log_event(
        &logger,
        LogEvent::new("deposit_completed")
            .with_username(username.to_lowercase())
            .with_command("deposit"),
    );
    output::success(&format!(
        "Deposit successful. New balance: {}",
        output::format_amount(new_balance)
    ));
    Ok(())
}

pub fn run_withdraw(username: &str, amount: &str) -> Result<()> {
    let mut ctx = get_context()?;
    let logger = get_logger();

    let amount = parse_amount(amount)?;
    let new_balance = ctx.ledger.withdraw(username, amount)?;
    log_event(
        &logger,
        LogEvent::new("withdrawal_completed")
            .with_username(username.to_lowercase())
            .with_command("withdraw"),
    );
    output::success(&format!(
        "Withdrawal successful. New balance: {}",
        output::format_amount(new_balance)
    ));
    Ok(())
}

pub fn run_balance(username: &str) -> Result<()> {
    let ctx = get_context()?;
    let balance = ctx.ledger.balance(username)?;
    println!("{}", output::format_amount(balance));
    Ok(())
}

pub fn run_history(username: &str, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let history = ctx.ledger.history(username)?;

    if json {
        println!("{}", serde_json::to_string_pretty(history)?);
        return Ok(());
    }

    if history.is_empty() {
        println!("No transactions for '{}'.", username.to_lowercase());
        return Ok(());
    }

    println!("{}", render_history(history));
    Ok(())
}

/// Render a transaction log as a table
pub fn render_history(history: &[Transaction]) -> comfy_table::Table {
    let mut table = output::create_table();
    table.set_header(vec!["Type", "Amount", "Timestamp"]);
    for tx in history {
        table.add_row(vec![
            tx.kind.to_string(),
            output::format_amount(tx.amount),
            tx.timestamp
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
        ]);
    }
    table
}

fn parse_amount(input: &str) -> Result<Decimal> {
    input
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid amount: '{}'", input))
}
