//! Store port - persistence abstraction

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::domain::result::Result;
use crate::domain::{Transaction, User};

/// Persistence abstraction over the three flat stores
///
/// The ledger depends only on this trait; adapters decide the on-disk
/// format. Every method is synchronous and operates on the whole store:
/// loads read everything, saves truncate and rewrite everything. This tier
/// makes no partial-update or transactional guarantee - a crash between an
/// in-memory mutation and its save loses the mutation.
pub trait Store: Send + Sync {
    /// Load all users, preserving insertion order
    fn load_users(&self) -> Result<Vec<User>>;

    /// Rewrite the users store
    fn save_users(&self, users: &[User]) -> Result<()>;

    /// Load all balances keyed by username
    fn load_balances(&self) -> Result<BTreeMap<String, Decimal>>;

    /// Rewrite the balances store
    fn save_balances(&self, balances: &BTreeMap<String, Decimal>) -> Result<()>;

    /// Load all transaction logs keyed by username, preserving per-user
    /// insertion order
    fn load_transactions(&self) -> Result<BTreeMap<String, Vec<Transaction>>>;

    /// Rewrite the transactions store
    fn save_transactions(&self, transactions: &BTreeMap<String, Vec<Transaction>>) -> Result<()>;
}
