//! Savvy Core - business logic for the Savvy bank ledger
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core business entities (User, Transaction) and the error type
//! - **ports**: Trait definitions for external dependencies (Store)
//! - **services**: Business logic orchestration (the ledger itself, plus
//!   status, logging, backup, doctor and demo support)
//! - **adapters**: Concrete implementations (flat text store)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use adapters::TextStore;
use config::Config;
use services::{BackupService, DoctorService, LedgerService, StatusService};

// Re-export commonly used types at crate root
pub use domain::result::Error;
pub use domain::{Transaction, TransactionKind, User};
pub use services::{TRANSACTION_CEILING, USERNAME_CHANGE_COOLDOWN_DAYS};

/// Main context for Savvy operations
///
/// This is the primary entry point for all business logic. It holds the
/// configuration, the store handle and all services, with ledger state
/// loaded and ready.
pub struct SavvyContext {
    pub config: Config,
    pub store: Arc<TextStore>,
    pub ledger: LedgerService,
    pub status_service: StatusService,
    pub backup_service: BackupService,
    pub doctor_service: DoctorService,
}

impl SavvyContext {
    /// Create a new Savvy context rooted at the data directory
    pub fn new(data_dir: &Path) -> Result<Self> {
        let config = Config::load(data_dir)?;

        let store = Arc::new(TextStore::new(data_dir, config.demo_mode));
        let ledger = LedgerService::load(Arc::clone(&store) as Arc<dyn ports::Store>)?;

        let status_service = StatusService::new(data_dir.to_path_buf(), config.demo_mode);
        let backup_service = BackupService::new(data_dir.to_path_buf());
        let doctor_service = DoctorService::new(Arc::clone(&store));

        Ok(Self {
            config,
            store,
            ledger,
            status_service,
            backup_service,
            doctor_service,
        })
    }
}
