//! Status service - ledger summaries

use std::path::PathBuf;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::services::LedgerService;

/// Status service for ledger summaries
pub struct StatusService {
    data_dir: PathBuf,
    demo_mode: bool,
}

impl StatusService {
    pub fn new(data_dir: PathBuf, demo_mode: bool) -> Self {
        Self {
            data_dir,
            demo_mode,
        }
    }

    /// Get overall status summary
    pub fn get_status(&self, ledger: &LedgerService) -> StatusSummary {
        let users = ledger
            .list_users()
            .iter()
            .map(|user| {
                let username = user.username.clone();
                UserSummary {
                    balance: ledger.balance(&username).unwrap_or(Decimal::ZERO),
                    transactions: ledger.history(&username).map(|h| h.len()).unwrap_or(0),
                    username,
                }
            })
            .collect();

        StatusSummary {
            total_users: ledger.user_count(),
            total_transactions: ledger.transaction_count(),
            total_balance: ledger.total_balance(),
            data_dir: self.data_dir.display().to_string(),
            demo_mode: self.demo_mode,
            users,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusSummary {
    pub total_users: usize,
    pub total_transactions: usize,
    pub total_balance: Decimal,
    pub data_dir: String,
    pub demo_mode: bool,
    pub users: Vec<UserSummary>,
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub username: String,
    pub balance: Decimal,
    pub transactions: usize,
}
