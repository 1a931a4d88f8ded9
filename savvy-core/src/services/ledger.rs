//! Ledger service - the account bookkeeping core
//!
//! Owns the in-memory users, balances and per-user transaction logs, plus
//! the username-rename cooldown guard. State is loaded from the store on
//! construction; every successful mutation rewrites the affected stores
//! before returning. Users keep registration order (that is the order the
//! users store is written in); balances and transaction logs are keyed by
//! username so store rewrites are deterministic.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use crate::domain::result::{Error, Result};
use crate::domain::{Transaction, User};
use crate::ports::Store;

/// Maximum amount accepted per single deposit or withdrawal
///
/// Deposits allow exactly the ceiling; withdrawals must stay strictly
/// below it.
pub const TRANSACTION_CEILING: Decimal = Decimal::from_parts(2_000, 0, 0, false, 0);

/// Minimum interval between successive username changes for one account
pub const USERNAME_CHANGE_COOLDOWN_DAYS: i64 = 30;

/// The account ledger
pub struct LedgerService {
    store: Arc<dyn Store>,
    users: Vec<User>,
    balances: BTreeMap<String, Decimal>,
    transactions: BTreeMap<String, Vec<Transaction>>,
    /// Last successful rename per account, session-scoped
    last_username_change: HashMap<String, DateTime<Utc>>,
}

impl LedgerService {
    /// Load ledger state from the store
    pub fn load(store: Arc<dyn Store>) -> Result<Self> {
        let users = store.load_users()?;
        let balances = store.load_balances()?;
        let transactions = store.load_transactions()?;
        Ok(Self {
            store,
            users,
            balances,
            transactions,
            last_username_change: HashMap::new(),
        })
    }

    /// Register a new user with a zero balance
    pub fn register(&mut self, username: &str, password: &str) -> Result<()> {
        User::validate_username(username).map_err(Error::InvalidUsername)?;
        if self.username_exists(username) {
            return Err(Error::UsernameTaken);
        }
        let user = User::new(username, password);
        self.balances.insert(user.username.clone(), Decimal::ZERO);
        self.users.push(user);
        self.store.save_users(&self.users)?;
        self.store.save_balances(&self.balances)?;
        Ok(())
    }

    /// Check credentials: case-insensitive username, exact password
    pub fn authenticate(&self, username: &str, password: &str) -> Result<()> {
        let ok = self
            .users
            .iter()
            .any(|u| u.is_named(username) && u.password == password);
        if ok {
            Ok(())
        } else {
            Err(Error::InvalidCredentials)
        }
    }

    /// Case-insensitive username lookup
    pub fn username_exists(&self, username: &str) -> bool {
        self.users.iter().any(|u| u.is_named(username))
    }

    /// Deposit into an account, returning the new balance
    pub fn deposit(&mut self, username: &str, amount: Decimal) -> Result<Decimal> {
        self.deposit_at(username, amount, Utc::now())
    }

    /// Explicit-clock variant of [`deposit`](Self::deposit), used by the
    /// demo seeder and tests
    pub fn deposit_at(
        &mut self,
        username: &str,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<Decimal> {
        let key = self.existing_key(username)?;
        if amount <= Decimal::ZERO {
            return Err(Error::InvalidAmount);
        }
        if amount > TRANSACTION_CEILING {
            return Err(Error::LimitExceeded);
        }
        let balance = self.balances.entry(key.clone()).or_insert(Decimal::ZERO);
        *balance += amount;
        let new_balance = *balance;
        self.transactions
            .entry(key)
            .or_default()
            .push(Transaction::deposit(amount, now));
        self.store.save_balances(&self.balances)?;
        self.store.save_transactions(&self.transactions)?;
        Ok(new_balance)
    }

    /// Withdraw from an account, returning the new balance
    ///
    /// Check precedence is fixed: invalid amount, then the ceiling, then
    /// insufficient funds. A rejected withdrawal leaves all state
    /// unchanged.
    pub fn withdraw(&mut self, username: &str, amount: Decimal) -> Result<Decimal> {
        self.withdraw_at(username, amount, Utc::now())
    }

    /// Explicit-clock variant of [`withdraw`](Self::withdraw)
    pub fn withdraw_at(
        &mut self,
        username: &str,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<Decimal> {
        let key = self.existing_key(username)?;
        if amount <= Decimal::ZERO {
            return Err(Error::InvalidAmount);
        }
        if amount >= TRANSACTION_CEILING {
            return Err(Error::LimitExceeded);
        }
        let balance = self.balances.entry(key.clone()).or_insert(Decimal::ZERO);
        if amount > *balance {
            return Err(Error::InsufficientFunds);
        }
        *balance -= amount;
        let new_balance = *balance;
        self.transactions
            .entry(key)
            .or_default()
            .push(Transaction::withdrawal(amount, now));
        self.store.save_balances(&self.balances)?;
        self.store.save_transactions(&self.transactions)?;
        Ok(new_balance)
    }

    /// Current balance of an account
    pub fn balance(&self, username: &str) -> Result<Decimal> {
        let key = self.existing_key(username)?;
        Ok(self.balances.get(&key).copied().unwrap_or(Decimal::ZERO))
    }

    /// Rename an account, subject to the 30-day cooldown
    ///
    /// On success the user record, balance entry and transaction log are
    /// re-keyed to the new (lowercased) name and the cooldown guard moves
    /// with them.
    pub fn change_username(&mut self, current: &str, new_username: &str) -> Result<()> {
        self.change_username_at(current, new_username, Utc::now())
    }

    /// Explicit-clock variant of [`change_username`](Self::change_username)
    pub fn change_username_at(
        &mut self,
        current: &str,
        new_username: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let old_key = self.existing_key(current)?;
        if let Some(&last) = self.last_username_change.get(&old_key) {
            let retry_after = last + Duration::days(USERNAME_CHANGE_COOLDOWN_DAYS);
            if now < retry_after {
                return Err(Error::CooldownActive { retry_after });
            }
        }
        User::validate_username(new_username).map_err(Error::InvalidUsername)?;
        // renaming to the current name is a collision too: the key exists
        if self.username_exists(new_username) {
            return Err(Error::UsernameTaken);
        }
        let new_key = new_username.to_lowercase();

        if let Some(user) = self.users.iter_mut().find(|u| u.username == old_key) {
            user.username = new_key.clone();
        }
        if let Some(balance) = self.balances.remove(&old_key) {
            self.balances.insert(new_key.clone(), balance);
        }
        if let Some(log) = self.transactions.remove(&old_key) {
            self.transactions.insert(new_key.clone(), log);
        }
        self.last_username_change.remove(&old_key);
        self.last_username_change.insert(new_key, now);

        self.store.save_users(&self.users)?;
        self.store.save_balances(&self.balances)?;
        self.store.save_transactions(&self.transactions)?;
        Ok(())
    }

    /// Change an account password
    pub fn change_password(
        &mut self,
        username: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<()> {
        let key = self.existing_key(username)?;
        let user = self
            .users
            .iter_mut()
            .find(|u| u.username == key)
            .ok_or(Error::UserNotFound)?;
        if user.password != current_password {
            return Err(Error::IncorrectPassword);
        }
        if new_password == current_password {
            return Err(Error::SamePassword);
        }
        user.password = new_password.to_string();
        self.store.save_users(&self.users)?;
        Ok(())
    }

    /// Full transaction log of an account, insertion order
    pub fn history(&self, username: &str) -> Result<&[Transaction]> {
        let key = self.existing_key(username)?;
        Ok(self
            .transactions
            .get(&key)
            .map(Vec::as_slice)
            .unwrap_or(&[]))
    }

    /// All registered users, registration order
    pub fn list_users(&self) -> &[User] {
        &self.users
    }

    /// Session-scoped bulk delete of the user map
    ///
    /// Balances and transaction logs are left in place. Callers persist
    /// afterwards if they want durability.
    pub fn clear_users(&mut self) {
        self.users.clear();
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.values().map(Vec::len).sum()
    }

    /// Sum of all account balances
    pub fn total_balance(&self) -> Decimal {
        self.balances.values().copied().sum()
    }

    /// Full rewrite of all three stores; also called at session shutdown
    pub fn persist_all(&self) -> Result<()> {
        self.store.save_users(&self.users)?;
        self.store.save_balances(&self.balances)?;
        self.store.save_transactions(&self.transactions)?;
        Ok(())
    }

    /// Resolve a username to its identity key, requiring it to exist
    fn existing_key(&self, username: &str) -> Result<String> {
        if self.username_exists(username) {
            Ok(username.to_lowercase())
        } else {
            Err(Error::UserNotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::TextStore;
    use crate::domain::TransactionKind;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use tempfile::{tempdir, TempDir};

    fn ledger(dir: &TempDir) -> LedgerService {
        let store = Arc::new(TextStore::new(dir.path(), false));
        LedgerService::load(store).unwrap()
    }

    fn utc(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(seconds, 0).single().unwrap()
    }

    #[test]
    fn test_register_stores_lowercase_with_zero_balance() {
        let dir = tempdir().unwrap();
        let mut ledger = ledger(&dir);

        ledger.register("Alice", "pw1").unwrap();

        assert_eq!(ledger.list_users()[0].username, "alice");
        assert_eq!(ledger.balance("alice").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_register_rejects_case_insensitive_duplicates() {
        let dir = tempdir().unwrap();
        let mut ledger = ledger(&dir);

        ledger.register("alice", "pw1").unwrap();
        assert!(matches!(
            ledger.register("ALICE", "pw2"),
            Err(Error::UsernameTaken)
        ));
        assert_eq!(ledger.user_count(), 1);
    }

    #[test]
    fn test_register_rejects_invalid_usernames() {
        let dir = tempdir().unwrap();
        let mut ledger = ledger(&dir);

        assert!(matches!(
            ledger.register("al ice", "pw"),
            Err(Error::InvalidUsername(_))
        ));
        assert!(matches!(
            ledger.register("", "pw"),
            Err(Error::InvalidUsername(_))
        ));
    }

    #[test]
    fn test_authenticate() {
        let dir = tempdir().unwrap();
        let mut ledger = ledger(&dir);
        ledger.register("Alice", "pw1").unwrap();

        assert!(ledger.authenticate("ALICE", "pw1").is_ok());
        assert!(matches!(
            ledger.authenticate("alice", "wrong"),
            Err(Error::InvalidCredentials)
        ));
        assert!(matches!(
            ledger.authenticate("nobody", "pw1"),
            Err(Error::InvalidCredentials)
        ));
    }

    #[test]
    fn test_deposit_mutates_balance_and_appends_one_transaction() {
        let dir = tempdir().unwrap();
        let mut ledger = ledger(&dir);
        ledger.register("alice", "pw1").unwrap();

        let new_balance = ledger.deposit("alice", dec!(500)).unwrap();

        assert_eq!(new_balance, dec!(500));
        let history = ledger.history("alice").unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].kind, TransactionKind::Deposit);
        assert_eq!(history[0].amount, dec!(500));
    }

    #[test]
    fn test_deposit_ceiling_is_inclusive() {
        let dir = tempdir().unwrap();
        let mut ledger = ledger(&dir);
        ledger.register("alice", "pw1").unwrap();

        assert_eq!(ledger.deposit("alice", dec!(2000)).unwrap(), dec!(2000));
        assert!(matches!(
            ledger.deposit("alice", dec!(2000.01)),
            Err(Error::LimitExceeded)
        ));
        // the rejected deposit left everything unchanged
        assert_eq!(ledger.balance("alice").unwrap(), dec!(2000));
        assert_eq!(ledger.history("alice").unwrap().len(), 1);
    }

    #[test]
    fn test_deposit_rejects_non_positive_amounts() {
        let dir = tempdir().unwrap();
        let mut ledger = ledger(&dir);
        ledger.register("alice", "pw1").unwrap();

        assert!(matches!(
            ledger.deposit("alice", Decimal::ZERO),
            Err(Error::InvalidAmount)
        ));
        assert!(matches!(
            ledger.deposit("alice", dec!(-5)),
            Err(Error::InvalidAmount)
        ));
        assert!(ledger.history("alice").unwrap().is_empty());
    }

    #[test]
    fn test_deposit_unknown_user() {
        let dir = tempdir().unwrap();
        let mut ledger = ledger(&dir);

        assert!(matches!(
            ledger.deposit("ghost", dec!(10)),
            Err(Error::UserNotFound)
        ));
    }

    #[test]
    fn test_withdraw_ceiling_is_strict() {
        let dir = tempdir().unwrap();
        let mut ledger = ledger(&dir);
        ledger.register("alice", "pw1").unwrap();
        ledger.deposit("alice", dec!(2000)).unwrap();
        ledger.deposit("alice", dec!(2000)).unwrap();

        assert!(matches!(
            ledger.withdraw("alice", dec!(2000)),
            Err(Error::LimitExceeded)
        ));
        assert_eq!(ledger.withdraw("alice", dec!(1999.99)).unwrap(), dec!(2000.01));
    }

    #[test]
    fn test_withdraw_rejects_overdraft() {
        let dir = tempdir().unwrap();
        let mut ledger = ledger(&dir);
        ledger.register("alice", "pw1").unwrap();
        ledger.deposit("alice", dec!(100)).unwrap();

        assert!(matches!(
            ledger.withdraw("alice", dec!(100.01)),
            Err(Error::InsufficientFunds)
        ));
        assert_eq!(ledger.balance("alice").unwrap(), dec!(100));
        assert_eq!(ledger.history("alice").unwrap().len(), 1);
    }

    #[test]
    fn test_withdraw_entire_balance_is_allowed() {
        let dir = tempdir().unwrap();
        let mut ledger = ledger(&dir);
        ledger.register("alice", "pw1").unwrap();
        ledger.deposit("alice", dec!(100)).unwrap();

        assert_eq!(ledger.withdraw("alice", dec!(100)).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_every_mutation_has_exactly_one_transaction() {
        let dir = tempdir().unwrap();
        let mut ledger = ledger(&dir);
        ledger.register("alice", "pw1").unwrap();

        ledger.deposit("alice", dec!(500)).unwrap();
        ledger.withdraw("alice", dec!(200)).unwrap();
        let _ = ledger.withdraw("alice", dec!(5000));
        let _ = ledger.deposit("alice", dec!(-1));

        let history = ledger.history("alice").unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].kind, TransactionKind::Deposit);
        assert_eq!(history[1].kind, TransactionKind::Withdrawal);
        assert_eq!(ledger.transaction_count(), 2);
    }

    #[test]
    fn test_username_change_cooldown() {
        let dir = tempdir().unwrap();
        let mut ledger = ledger(&dir);
        ledger.register("alice", "pw1").unwrap();

        let t0 = utc(1_700_000_000);
        ledger.change_username_at("alice", "alicia", t0).unwrap();

        // 29 days later: still on cooldown, under the renamed key
        let t1 = t0 + Duration::days(29);
        match ledger.change_username_at("alicia", "alison", t1) {
            Err(Error::CooldownActive { retry_after }) => {
                assert_eq!(retry_after, t0 + Duration::days(30));
            }
            other => panic!("expected CooldownActive, got {other:?}"),
        }

        // 30 days later: allowed again, and the clock resets
        let t2 = t0 + Duration::days(30);
        ledger.change_username_at("alicia", "alison", t2).unwrap();
        assert!(matches!(
            ledger.change_username_at("alison", "ally", t2 + Duration::days(1)),
            Err(Error::CooldownActive { .. })
        ));
    }

    #[test]
    fn test_username_change_rekeys_balance_and_history() {
        let dir = tempdir().unwrap();
        let mut ledger = ledger(&dir);
        ledger.register("alice", "pw1").unwrap();
        ledger.deposit("alice", dec!(500)).unwrap();

        ledger.change_username_at("alice", "Alicia", utc(0)).unwrap();

        // renamed, lowercased, with balance and history following
        assert!(!ledger.username_exists("alice"));
        assert_eq!(ledger.balance("alicia").unwrap(), dec!(500));
        assert_eq!(ledger.history("alicia").unwrap().len(), 1);
        assert!(ledger.authenticate("Alicia", "pw1").is_ok());
    }

    #[test]
    fn test_username_change_rejects_taken_names() {
        let dir = tempdir().unwrap();
        let mut ledger = ledger(&dir);
        ledger.register("alice", "pw1").unwrap();
        ledger.register("bob", "pw2").unwrap();

        assert!(matches!(
            ledger.change_username_at("alice", "BOB", utc(0)),
            Err(Error::UsernameTaken)
        ));
        // the current name is a collision with itself
        assert!(matches!(
            ledger.change_username_at("alice", "alice", utc(0)),
            Err(Error::UsernameTaken)
        ));
    }

    #[test]
    fn test_change_password() {
        let dir = tempdir().unwrap();
        let mut ledger = ledger(&dir);
        ledger.register("alice", "pw1").unwrap();

        assert!(matches!(
            ledger.change_password("alice", "wrong", "pw2"),
            Err(Error::IncorrectPassword)
        ));
        assert!(matches!(
            ledger.change_password("alice", "pw1", "pw1"),
            Err(Error::SamePassword)
        ));

        ledger.change_password("alice", "pw1", "pw2").unwrap();
        assert!(ledger.authenticate("alice", "pw2").is_ok());
        assert!(ledger.authenticate("alice", "pw1").is_err());
    }

    #[test]
    fn test_clear_users_leaves_books_in_place() {
        let dir = tempdir().unwrap();
        let mut ledger = ledger(&dir);
        ledger.register("alice", "pw1").unwrap();
        ledger.deposit("alice", dec!(500)).unwrap();

        ledger.clear_users();

        assert_eq!(ledger.user_count(), 0);
        assert_eq!(ledger.total_balance(), dec!(500));
        assert_eq!(ledger.transaction_count(), 1);
    }

    #[test]
    fn test_mutations_persist_synchronously() {
        let dir = tempdir().unwrap();
        let mut ledger = ledger(&dir);
        ledger.register("alice", "pw1").unwrap();
        ledger.deposit("alice", dec!(500)).unwrap();

        // a second ledger over the same store sees the mutation without
        // any shutdown save
        let reloaded = self::ledger(&dir);
        assert_eq!(reloaded.balance("alice").unwrap(), dec!(500));
        assert_eq!(reloaded.history("alice").unwrap().len(), 1);
    }
}
