//! Doctor service - store health checks
//!
//! Verifies that the flat stores parse to the end and that the cross-store
//! invariants hold: lowercase unique usernames, a balance entry for every
//! user, no negative balances, and transaction logs that reference
//! registered users with positive amounts.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::adapters::text_store::StoreScan;
use crate::adapters::TextStore;
use crate::ports::Store;

/// One health check outcome
#[derive(Debug, Clone, Serialize)]
pub struct DoctorCheck {
    pub name: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl DoctorCheck {
    fn pass(name: &str) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            detail: None,
        }
    }

    fn fail(name: &str, detail: String) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            detail: Some(detail),
        }
    }
}

/// Full health report
#[derive(Debug, Clone, Serialize)]
pub struct DoctorReport {
    pub healthy: bool,
    pub checks: Vec<DoctorCheck>,
}

/// Doctor service running health checks over the stores
pub struct DoctorService {
    store: Arc<TextStore>,
}

impl DoctorService {
    pub fn new(store: Arc<TextStore>) -> Self {
        Self { store }
    }

    /// Run every health check
    pub fn run_checks(&self) -> Result<DoctorReport> {
        let mut checks = Vec::new();

        checks.push(Self::parse_check(
            "users store parses to the end",
            self.store.scan_users(),
        ));
        checks.push(Self::parse_check(
            "balances store parses to the end",
            self.store.scan_balances(),
        ));
        checks.push(Self::parse_check(
            "transactions store parses to the end",
            self.store.scan_transactions(),
        ));

        let users = self.store.load_users()?;
        let balances = self.store.load_balances()?;
        let transactions = self.store.load_transactions()?;

        // usernames lowercase and unique case-insensitively
        let mut seen = HashSet::new();
        let mut bad_usernames = Vec::new();
        for user in &users {
            if user.username != user.username.to_lowercase()
                || !seen.insert(user.username.to_lowercase())
            {
                bad_usernames.push(user.username.clone());
            }
        }
        checks.push(if bad_usernames.is_empty() {
            DoctorCheck::pass("usernames are lowercase and unique")
        } else {
            DoctorCheck::fail(
                "usernames are lowercase and unique",
                format!("offending usernames: {}", bad_usernames.join(", ")),
            )
        });

        // every user has a balance entry
        let missing: Vec<&str> = users
            .iter()
            .filter(|user| !balances.contains_key(&user.username))
            .map(|user| user.username.as_str())
            .collect();
        checks.push(if missing.is_empty() {
            DoctorCheck::pass("every user has a balance entry")
        } else {
            DoctorCheck::fail(
                "every user has a balance entry",
                format!("missing balances for: {}", missing.join(", ")),
            )
        });

        // balances never negative
        let negative: Vec<&str> = balances
            .iter()
            .filter(|(_, balance)| **balance < Decimal::ZERO)
            .map(|(username, _)| username.as_str())
            .collect();
        checks.push(if negative.is_empty() {
            DoctorCheck::pass("no negative balances")
        } else {
            DoctorCheck::fail(
                "no negative balances",
                format!("negative balances for: {}", negative.join(", ")),
            )
        });

        // transaction logs reference registered users
        let known: HashSet<&str> = users.iter().map(|user| user.username.as_str()).collect();
        let orphaned: Vec<&str> = transactions
            .keys()
            .filter(|username| !known.contains(username.as_str()))
            .map(String::as_str)
            .collect();
        checks.push(if orphaned.is_empty() {
            DoctorCheck::pass("transactions reference registered users")
        } else {
            DoctorCheck::fail(
                "transactions reference registered users",
                format!("orphaned logs for: {}", orphaned.join(", ")),
            )
        });

        // transaction amounts are positive
        let non_positive = transactions
            .values()
            .flatten()
            .filter(|tx| tx.amount <= Decimal::ZERO)
            .count();
        checks.push(if non_positive == 0 {
            DoctorCheck::pass("transaction amounts are positive")
        } else {
            DoctorCheck::fail(
                "transaction amounts are positive",
                format!("{non_positive} transactions with non-positive amounts"),
            )
        });

        let healthy = checks.iter().all(|check| check.passed);
        Ok(DoctorReport { healthy, checks })
    }

    fn parse_check(name: &str, scan: crate::domain::result::Result<StoreScan>) -> DoctorCheck {
        match scan {
            Ok(scan) if scan.clean => DoctorCheck::pass(name),
            Ok(scan) => DoctorCheck::fail(
                name,
                format!(
                    "stopped after {} records, trailing data ignored",
                    scan.records
                ),
            ),
            Err(e) => DoctorCheck::fail(name, e.to_string()),
        }
    }
}
