//! Integration tests for savvy-core services
//!
//! These tests exercise full flows against the real flat-file store in a
//! temp directory - nothing is mocked.
//!
//! Run with: cargo test --test integration_tests -- --nocapture

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tempfile::TempDir;

use savvy_core::adapters::TextStore;
use savvy_core::domain::TransactionKind;
use savvy_core::services::LedgerService;
use savvy_core::{Error, SavvyContext};

// ============================================================================
// Test Helpers
// ============================================================================

/// Create a ledger backed by a real text store in the temp directory
fn create_ledger(temp_dir: &TempDir) -> LedgerService {
    let store = Arc::new(TextStore::new(temp_dir.path(), false));
    LedgerService::load(store).expect("Failed to load ledger")
}

fn utc(seconds: i64) -> chrono::DateTime<Utc> {
    Utc.timestamp_opt(seconds, 0).single().unwrap()
}

// ============================================================================
// The canonical account scenario
// ============================================================================

/// Register alice, deposit 500, bounce two withdrawals, withdraw 200
#[test]
fn test_alice_scenario() {
    let temp_dir = TempDir::new().unwrap();
    let mut ledger = create_ledger(&temp_dir);

    ledger.register("Alice", "pw1").unwrap();
    assert_eq!(ledger.balance("alice").unwrap(), Decimal::ZERO);

    let balance = ledger.deposit("alice", dec!(500)).unwrap();
    assert_eq!(balance, dec!(500));
    let history = ledger.history("alice").unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].kind, TransactionKind::Deposit);
    assert_eq!(history[0].amount, dec!(500));

    // at the ceiling: rejected, state unchanged
    assert!(ledger.withdraw("alice", dec!(2000)).is_err());
    assert_eq!(ledger.balance("alice").unwrap(), dec!(500));

    // beyond the balance: rejected, state unchanged
    assert!(ledger.withdraw("alice", dec!(2500)).is_err());
    assert_eq!(ledger.balance("alice").unwrap(), dec!(500));

    let balance = ledger.withdraw("alice", dec!(200)).unwrap();
    assert_eq!(balance, dec!(300));
    let history = ledger.history("alice").unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].kind, TransactionKind::Withdrawal);
    assert_eq!(history[1].amount, dec!(200));
}

// ============================================================================
// Persistence round-trips
// ============================================================================

/// Saving and reloading the stores reproduces the in-memory state
#[test]
fn test_round_trip_reproduces_state() {
    let temp_dir = TempDir::new().unwrap();
    let mut ledger = create_ledger(&temp_dir);

    ledger.register("alice", "pw1").unwrap();
    ledger.register("bob", "hunter2").unwrap();
    ledger.deposit_at("alice", dec!(500), utc(1_700_000_000)).unwrap();
    ledger.withdraw_at("alice", dec!(125.50), utc(1_700_000_100)).unwrap();
    ledger.deposit_at("bob", dec!(0.01), utc(1_700_000_200)).unwrap();

    let reloaded = create_ledger(&temp_dir);

    assert_eq!(reloaded.list_users(), ledger.list_users());
    assert_eq!(reloaded.balance("alice").unwrap(), dec!(374.50));
    assert_eq!(reloaded.balance("bob").unwrap(), dec!(0.01));
    assert_eq!(
        reloaded.history("alice").unwrap(),
        ledger.history("alice").unwrap()
    );
    assert_eq!(
        reloaded.history("bob").unwrap(),
        ledger.history("bob").unwrap()
    );
}

/// Each mutation persists on its own - no shutdown save required
#[test]
fn test_mutations_are_durable_without_shutdown() {
    let temp_dir = TempDir::new().unwrap();

    {
        let mut ledger = create_ledger(&temp_dir);
        ledger.register("alice", "pw1").unwrap();
        ledger.deposit("alice", dec!(42)).unwrap();
        // ledger dropped without persist_all
    }

    let reloaded = create_ledger(&temp_dir);
    assert_eq!(reloaded.balance("alice").unwrap(), dec!(42));
    assert_eq!(reloaded.history("alice").unwrap().len(), 1);
}

/// A malformed trailing line hides itself and everything after it
#[test]
fn test_partial_store_loads_best_effort() {
    let temp_dir = TempDir::new().unwrap();
    {
        let mut ledger = create_ledger(&temp_dir);
        ledger.register("alice", "pw1").unwrap();
        ledger.deposit("alice", dec!(100)).unwrap();
    }

    // corrupt the tail of the transactions store
    let tx_path = temp_dir.path().join("transactions.txt");
    let mut contents = std::fs::read_to_string(&tx_path).unwrap();
    contents.push_str("alice Deposit not-a-number 0\n");
    std::fs::write(&tx_path, contents).unwrap();

    let ledger = create_ledger(&temp_dir);
    assert_eq!(ledger.history("alice").unwrap().len(), 1);
    assert_eq!(ledger.balance("alice").unwrap(), dec!(100));
}

// ============================================================================
// Rename cooldown
// ============================================================================

/// The 30-day rename cooldown follows the account within a session
#[test]
fn test_rename_cooldown_within_session() {
    let temp_dir = TempDir::new().unwrap();
    let mut ledger = create_ledger(&temp_dir);
    ledger.register("alice", "pw1").unwrap();
    ledger.deposit("alice", dec!(500)).unwrap();

    let t0 = utc(1_700_000_000);
    ledger.change_username_at("alice", "alicia", t0).unwrap();
    assert_eq!(ledger.balance("alicia").unwrap(), dec!(500));
    assert_eq!(ledger.history("alicia").unwrap().len(), 1);

    match ledger.change_username_at("alicia", "alison", t0 + Duration::days(10)) {
        Err(Error::CooldownActive { retry_after }) => {
            assert_eq!(retry_after, t0 + Duration::days(30));
        }
        other => panic!("expected CooldownActive, got {other:?}"),
    }
}

/// The guard is session-scoped: a fresh process may rename immediately
#[test]
fn test_rename_cooldown_is_not_persisted() {
    let temp_dir = TempDir::new().unwrap();
    {
        let mut ledger = create_ledger(&temp_dir);
        ledger.register("alice", "pw1").unwrap();
        ledger
            .change_username_at("alice", "alicia", utc(1_700_000_000))
            .unwrap();
    }

    let mut reloaded = create_ledger(&temp_dir);
    assert!(reloaded
        .change_username_at("alicia", "alison", utc(1_700_000_060))
        .is_ok());
}

// ============================================================================
// Context wiring
// ============================================================================

/// The context loads config, store and services from one directory
#[test]
fn test_context_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let mut ctx = SavvyContext::new(temp_dir.path()).unwrap();

    ctx.ledger.register("alice", "pw1").unwrap();
    ctx.ledger.deposit("alice", dec!(500)).unwrap();

    let status = ctx.status_service.get_status(&ctx.ledger);
    assert_eq!(status.total_users, 1);
    assert_eq!(status.total_transactions, 1);
    assert_eq!(status.total_balance, dec!(500));

    let report = ctx.doctor_service.run_checks().unwrap();
    assert!(report.healthy, "doctor found: {:?}", report.checks);
}

/// Demo mode (settings.json) routes the context to the demo stores
#[test]
fn test_demo_mode_isolates_stores() {
    let temp_dir = TempDir::new().unwrap();

    let mut ctx = SavvyContext::new(temp_dir.path()).unwrap();
    ctx.ledger.register("realuser", "pw").unwrap();

    std::fs::write(
        temp_dir.path().join("settings.json"),
        r#"{"app": {"demoMode": true}}"#,
    )
    .unwrap();

    let mut demo_ctx = SavvyContext::new(temp_dir.path()).unwrap();
    assert!(demo_ctx.config.demo_mode);
    assert!(!demo_ctx.ledger.username_exists("realuser"));
    demo_ctx.ledger.register("demouser", "pw").unwrap();

    assert!(temp_dir.path().join("demo-users.txt").exists());
    let contents = std::fs::read_to_string(temp_dir.path().join("users.txt")).unwrap();
    assert!(!contents.contains("demouser"));
}

/// Backup and restore bring the stores back byte-for-byte
#[test]
fn test_backup_restore_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let mut ctx = SavvyContext::new(temp_dir.path()).unwrap();

    ctx.ledger.register("alice", "pw1").unwrap();
    ctx.ledger.deposit("alice", dec!(500)).unwrap();

    let metadata = ctx.backup_service.create(None).unwrap();

    // wreck the books, then restore
    ctx.ledger.deposit("alice", dec!(1)).unwrap();
    std::fs::write(temp_dir.path().join("balances.txt"), "alice -999\n").unwrap();

    ctx.backup_service.restore(&metadata.name).unwrap();

    let restored = SavvyContext::new(temp_dir.path()).unwrap();
    assert_eq!(restored.ledger.balance("alice").unwrap(), dec!(500));
    assert_eq!(restored.ledger.history("alice").unwrap().len(), 1);
    assert!(restored.doctor_service.run_checks().unwrap().healthy);
}
