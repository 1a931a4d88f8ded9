//! Demo command - manage demo mode

use anyhow::Result;
use clap::Subcommand;

use savvy_core::config::Config;
use savvy_core::services::DemoService;

use super::{get_context, get_savvy_dir};
use crate::output;

#[derive(Subcommand)]
pub enum DemoCommands {
    /// Enable demo mode
    On,
    /// Disable demo mode
    Off,
    /// Seed demo accounts (demo mode must be on)
    Seed,
}

pub fn run(command: Option<DemoCommands>) -> Result<()> {
    match command {
        None => run_status(),
        Some(DemoCommands::On) => run_toggle(true),
        Some(DemoCommands::Off) => run_toggle(false),
        Some(DemoCommands::Seed) => run_seed(),
    }
}

fn run_status() -> Result<()> {
    let savvy_dir = get_savvy_dir();
    let config = Config::load(&savvy_dir)?;
    println!(
        "Demo mode is {}.",
        if config.demo_mode { "on" } else { "off" }
    );
    Ok(())
}

fn run_toggle(enable: bool) -> Result<()> {
    let savvy_dir = get_savvy_dir();
    std::fs::create_dir_all(&savvy_dir)?;

    let mut config = Config::load(&savvy_dir)?;
    if enable {
        config.enable_demo_mode();
    } else {
        config.disable_demo_mode();
    }
    config.save(&savvy_dir)?;

    output::success(&format!(
        "Demo mode {}.",
        if enable { "enabled" } else { "disabled" }
    ));
    Ok(())
}

fn run_seed() -> Result<()> {
    let mut ctx = get_context()?;
    if !ctx.config.demo_mode {
        anyhow::bail!("Demo mode is off. Enable it first with: savvy demo on");
    }

    let seeded = DemoService::seed(&mut ctx.ledger)?;
    if seeded.is_empty() {
        println!("Demo accounts already exist; nothing seeded.");
    } else {
        output::success(&format!("Seeded demo accounts: {}", seeded.join(", ")));
    }
    Ok(())
}
