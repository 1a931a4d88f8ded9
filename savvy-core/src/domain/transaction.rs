//! Transaction domain model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The two kinds of balance mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
}

impl TransactionKind {
    /// Token used in the transactions store
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "Deposit",
            TransactionKind::Withdrawal => "Withdrawal",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Deposit" => Ok(TransactionKind::Deposit),
            "Withdrawal" => Ok(TransactionKind::Withdrawal),
            other => Err(format!("unknown transaction kind: {other}")),
        }
    }
}

/// A single balance mutation, immutable once recorded
///
/// The per-user log is append-only; insertion order is chronological order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub kind: TransactionKind,
    pub amount: Decimal,
    /// When the mutation happened (persisted as integer epoch seconds)
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    pub fn new(kind: TransactionKind, amount: Decimal, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind,
            amount,
            timestamp,
        }
    }

    /// Record a deposit
    pub fn deposit(amount: Decimal, timestamp: DateTime<Utc>) -> Self {
        Self::new(TransactionKind::Deposit, amount, timestamp)
    }

    /// Record a withdrawal
    pub fn withdrawal(amount: Decimal, timestamp: DateTime<Utc>) -> Self {
        Self::new(TransactionKind::Withdrawal, amount, timestamp)
    }
}
