//! Demo service - sample data for demo mode
//!
//! Seeds a few demo accounts with staggered activity through the ledger,
//! so the seeded books satisfy the same invariants as real ones. Meant to
//! run against a demo-mode store (the CLI refuses to seed otherwise).

use chrono::{Duration, Utc};
use rust_decimal::Decimal;

use crate::domain::result::{Error, Result};
use crate::services::LedgerService;

const DEMO_PASSWORD: &str = "demo";

/// (username, deposits, withdrawals) seeded per account
const DEMO_ACCOUNTS: &[(&str, &[i64], &[i64])] = &[
    ("avery", &[1200, 300, 80], &[150]),
    ("blake", &[500], &[]),
    ("casey", &[1999, 45], &[600, 20]),
];

pub struct DemoService;

impl DemoService {
    /// Seed the demo accounts, returning the usernames actually created
    ///
    /// Accounts that already exist are left untouched.
    pub fn seed(ledger: &mut LedgerService) -> Result<Vec<String>> {
        let mut seeded = Vec::new();
        let start = Utc::now() - Duration::days(14);

        for (username, deposits, withdrawals) in DEMO_ACCOUNTS {
            match ledger.register(username, DEMO_PASSWORD) {
                Ok(()) => {}
                Err(Error::UsernameTaken) => continue,
                Err(e) => return Err(e),
            }

            // spread activity over the past two weeks, deposits first so
            // the balance never goes negative
            let mut clock = start;
            for amount in *deposits {
                ledger.deposit_at(username, Decimal::new(*amount, 0), clock)?;
                clock += Duration::days(2);
            }
            for amount in *withdrawals {
                ledger.withdraw_at(username, Decimal::new(*amount, 0), clock)?;
                clock += Duration::days(2);
            }
            seeded.push(username.to_string());
        }
        Ok(seeded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::TextStore;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn test_seed_creates_accounts_with_consistent_books() {
        let dir = tempdir().unwrap();
        let store = Arc::new(TextStore::new(dir.path(), true));
        let mut ledger = LedgerService::load(store).unwrap();

        let seeded = DemoService::seed(&mut ledger).unwrap();
        assert_eq!(seeded.len(), 3);

        for username in &seeded {
            let balance = ledger.balance(username).unwrap();
            assert!(balance >= Decimal::ZERO);
            let history = ledger.history(username).unwrap();
            assert!(!history.is_empty());
        }
        assert!(ledger.authenticate("avery", DEMO_PASSWORD).is_ok());
    }

    #[test]
    fn test_seed_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = Arc::new(TextStore::new(dir.path(), true));
        let mut ledger = LedgerService::load(store).unwrap();

        DemoService::seed(&mut ledger).unwrap();
        let balance_before = ledger.balance("avery").unwrap();

        let second = DemoService::seed(&mut ledger).unwrap();
        assert!(second.is_empty());
        assert_eq!(ledger.balance("avery").unwrap(), balance_before);
    }
}
