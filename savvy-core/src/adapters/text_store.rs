//! Flat text store adapter
//!
//! Three whitespace-delimited stores in the data directory:
//!
//! - `users.txt` - `username password`, one user per line, insertion order
//! - `balances.txt` - `username balance`, balance as decimal
//! - `transactions.txt` - `username kind amount timestamp`, timestamp as
//!   integer epoch seconds
//!
//! Loading is a best-effort parse that stops at the first malformed record
//! and keeps what was read so far; a missing file is an empty store.
//! Saving truncates and rewrites the whole file. In demo mode every store
//! file gets a `demo-` prefix so real data is untouched.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::domain::result::Result;
use crate::domain::{Transaction, TransactionKind, User};
use crate::ports::Store;

const USERS_FILE: &str = "users.txt";
const BALANCES_FILE: &str = "balances.txt";
const TRANSACTIONS_FILE: &str = "transactions.txt";

/// Store filename prefix when demo mode is active
const DEMO_PREFIX: &str = "demo-";

/// Result of scanning a store file, used by the doctor checks
#[derive(Debug, Clone, Copy)]
pub struct StoreScan {
    /// Records parsed before the read stopped
    pub records: usize,
    /// True when the whole file parsed - no malformed trailing lines
    pub clean: bool,
}

/// Flat-file implementation of the [`Store`] port
pub struct TextStore {
    data_dir: PathBuf,
    demo_mode: bool,
}

impl TextStore {
    pub fn new(data_dir: impl Into<PathBuf>, demo_mode: bool) -> Self {
        Self {
            data_dir: data_dir.into(),
            demo_mode,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn users_path(&self) -> PathBuf {
        self.store_path(USERS_FILE)
    }

    pub fn balances_path(&self) -> PathBuf {
        self.store_path(BALANCES_FILE)
    }

    pub fn transactions_path(&self) -> PathBuf {
        self.store_path(TRANSACTIONS_FILE)
    }

    fn store_path(&self, name: &str) -> PathBuf {
        if self.demo_mode {
            self.data_dir.join(format!("{DEMO_PREFIX}{name}"))
        } else {
            self.data_dir.join(name)
        }
    }

    /// Read all lines of a store file; a missing file is an empty store
    fn read_lines(path: &Path) -> Result<Vec<String>> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let lines = BufReader::new(file)
            .lines()
            .collect::<std::io::Result<Vec<_>>>()?;
        Ok(lines)
    }

    fn parse_user(line: &str) -> Option<User> {
        let mut fields = line.split_whitespace();
        match (fields.next(), fields.next(), fields.next()) {
            (Some(username), Some(password), None) => Some(User {
                username: username.to_string(),
                password: password.to_string(),
            }),
            _ => None,
        }
    }

    fn parse_balance(line: &str) -> Option<(String, Decimal)> {
        let mut fields = line.split_whitespace();
        match (fields.next(), fields.next(), fields.next()) {
            (Some(username), Some(balance), None) => {
                Some((username.to_string(), balance.parse().ok()?))
            }
            _ => None,
        }
    }

    fn parse_transaction(line: &str) -> Option<(String, Transaction)> {
        let mut fields = line.split_whitespace();
        match (
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
        ) {
            (Some(username), Some(kind), Some(amount), Some(timestamp), None) => {
                let kind: TransactionKind = kind.parse().ok()?;
                let amount: Decimal = amount.parse().ok()?;
                let timestamp = parse_epoch_seconds(timestamp)?;
                Some((
                    username.to_string(),
                    Transaction::new(kind, amount, timestamp),
                ))
            }
            _ => None,
        }
    }

    /// Parse records until the first malformed line, reporting whether the
    /// whole file was consumed
    fn scan_records<T>(lines: &[String], parse: impl Fn(&str) -> Option<T>) -> (Vec<T>, bool) {
        let mut records = Vec::new();
        for line in lines {
            match parse(line) {
                Some(record) => records.push(record),
                // best-effort contract: stop here, keep what parsed so far
                None => return (records, false),
            }
        }
        (records, true)
    }

    /// Scan the users store without loading it into the ledger
    pub fn scan_users(&self) -> Result<StoreScan> {
        let lines = Self::read_lines(&self.users_path())?;
        let (records, clean) = Self::scan_records(&lines, Self::parse_user);
        Ok(StoreScan {
            records: records.len(),
            clean,
        })
    }

    /// Scan the balances store
    pub fn scan_balances(&self) -> Result<StoreScan> {
        let lines = Self::read_lines(&self.balances_path())?;
        let (records, clean) = Self::scan_records(&lines, Self::parse_balance);
        Ok(StoreScan {
            records: records.len(),
            clean,
        })
    }

    /// Scan the transactions store
    pub fn scan_transactions(&self) -> Result<StoreScan> {
        let lines = Self::read_lines(&self.transactions_path())?;
        let (records, clean) = Self::scan_records(&lines, Self::parse_transaction);
        Ok(StoreScan {
            records: records.len(),
            clean,
        })
    }
}

impl Store for TextStore {
    fn load_users(&self) -> Result<Vec<User>> {
        let lines = Self::read_lines(&self.users_path())?;
        let (users, _) = Self::scan_records(&lines, Self::parse_user);
        Ok(users)
    }

    fn save_users(&self, users: &[User]) -> Result<()> {
        let mut writer = BufWriter::new(File::create(self.users_path())?);
        for user in users {
            writeln!(writer, "{} {}", user.username, user.password)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn load_balances(&self) -> Result<BTreeMap<String, Decimal>> {
        let lines = Self::read_lines(&self.balances_path())?;
        let (entries, _) = Self::scan_records(&lines, Self::parse_balance);
        Ok(entries.into_iter().collect())
    }

    fn save_balances(&self, balances: &BTreeMap<String, Decimal>) -> Result<()> {
        let mut writer = BufWriter::new(File::create(self.balances_path())?);
        for (username, balance) in balances {
            writeln!(writer, "{username} {balance}")?;
        }
        writer.flush()?;
        Ok(())
    }

    fn load_transactions(&self) -> Result<BTreeMap<String, Vec<Transaction>>> {
        let lines = Self::read_lines(&self.transactions_path())?;
        let (entries, _) = Self::scan_records(&lines, Self::parse_transaction);
        let mut transactions: BTreeMap<String, Vec<Transaction>> = BTreeMap::new();
        for (username, transaction) in entries {
            transactions.entry(username).or_default().push(transaction);
        }
        Ok(transactions)
    }

    fn save_transactions(&self, transactions: &BTreeMap<String, Vec<Transaction>>) -> Result<()> {
        let mut writer = BufWriter::new(File::create(self.transactions_path())?);
        for (username, log) in transactions {
            for tx in log {
                writeln!(
                    writer,
                    "{} {} {} {}",
                    username,
                    tx.kind,
                    tx.amount,
                    tx.timestamp.timestamp()
                )?;
            }
        }
        writer.flush()?;
        Ok(())
    }
}

fn parse_epoch_seconds(token: &str) -> Option<DateTime<Utc>> {
    let seconds: i64 = token.parse().ok()?;
    Utc.timestamp_opt(seconds, 0).single()
}
