//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. The ledger is
//! the bookkeeping core; the rest support the CLI surface.

mod backup;
mod demo;
mod doctor;
mod ledger;
pub mod logging;
mod status;

pub use backup::{BackupMetadata, BackupService};
pub use demo::DemoService;
pub use doctor::{DoctorCheck, DoctorReport, DoctorService};
pub use ledger::{LedgerService, TRANSACTION_CEILING, USERNAME_CHANGE_COOLDOWN_DAYS};
pub use logging::{EntryPoint, LogEntry, LogEvent, LoggingService};
pub use status::{StatusService, StatusSummary, UserSummary};
