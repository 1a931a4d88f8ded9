//! CLI command implementations

pub mod account;
pub mod backup;
pub mod demo;
pub mod doctor;
pub mod logs;
pub mod menu;
pub mod status;
pub mod users;

use std::path::PathBuf;

use anyhow::{Context, Result};
use savvy_core::services::{EntryPoint, LogEvent, LoggingService};
use savvy_core::SavvyContext;

/// Get the savvy data directory from environment or default
pub fn get_savvy_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SAVVY_DIR") {
        PathBuf::from(dir)
    } else {
        dirs::home_dir()
            .expect("Could not find home directory")
            .join(".savvy")
    }
}

/// Get or create savvy context
pub fn get_context() -> Result<SavvyContext> {
    let savvy_dir = get_savvy_dir();

    std::fs::create_dir_all(&savvy_dir)
        .with_context(|| format!("Failed to create savvy directory: {:?}", savvy_dir))?;

    SavvyContext::new(&savvy_dir).context("Failed to initialize savvy context")
}

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let savvy_dir = get_savvy_dir();
    std::fs::create_dir_all(&savvy_dir).ok()?;
    LoggingService::new(&savvy_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}
