//! Status command - show ledger status and summary

use anyhow::Result;
use colored::Colorize;

use super::get_context;
use crate::output;

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let status = ctx.status_service.get_status(&ctx.ledger);

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", "Savvy Ledger Status".bold());
    println!();

    let mut table = output::create_table();
    table.add_row(vec!["Users", &status.total_users.to_string()]);
    table.add_row(vec!["Transactions", &status.total_transactions.to_string()]);
    table.add_row(vec![
        "Total balance",
        &output::format_amount(status.total_balance),
    ]);
    table.add_row(vec!["Data directory", &status.data_dir]);
    table.add_row(vec![
        "Demo mode",
        if status.demo_mode { "on" } else { "off" },
    ]);
    println!("{}", table);

    if !status.users.is_empty() {
        println!();
        println!("{}", "Accounts".bold());
        let mut accounts = output::create_table();
        accounts.set_header(vec!["Username", "Balance", "Transactions"]);
        for user in &status.users {
            accounts.add_row(vec![
                user.username.clone(),
                output::format_amount(user.balance),
                user.transactions.to_string(),
            ]);
        }
        println!("{}", accounts);
    }

    Ok(())
}
