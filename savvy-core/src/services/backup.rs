//! Backup service - store backup management
//!
//! Creates ZIP archives containing the flat stores and settings.json under
//! a backups/ directory next to them.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

/// Store files to include in a backup (relative to the data dir)
const STORE_FILES: &[&str] = &[
    "users.txt",
    "balances.txt",
    "transactions.txt",
    "demo-users.txt",
    "demo-balances.txt",
    "demo-transactions.txt",
];

/// Config files to include in a backup
const CONFIG_FILES: &[&str] = &["settings.json"];

/// Metadata describing one backup archive
#[derive(Debug, Clone, Serialize)]
pub struct BackupMetadata {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub size_bytes: u64,
}

/// Backup service for the flat stores
pub struct BackupService {
    data_dir: PathBuf,
}

impl BackupService {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    fn backups_dir(&self) -> PathBuf {
        self.data_dir.join("backups")
    }

    /// Create a backup archive of every store and config file that exists
    pub fn create(&self, max_backups: Option<usize>) -> Result<BackupMetadata> {
        let backups_dir = self.backups_dir();
        fs::create_dir_all(&backups_dir)?;

        let now = Utc::now();
        let timestamp = now.format("%Y-%m-%dT%H-%M-%S");
        let micros = now.timestamp_subsec_micros();
        let backup_name = format!("savvy-{}-{:06}.zip", timestamp, micros);
        let backup_path = backups_dir.join(&backup_name);

        let file = File::create(&backup_path).context("Failed to create backup file")?;
        let mut zip = ZipWriter::new(file);
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        let mut archived = 0;
        let mut buffer = Vec::new();
        for name in STORE_FILES.iter().chain(CONFIG_FILES) {
            let path = self.data_dir.join(name);
            if !path.exists() {
                continue;
            }
            zip.start_file(*name, options)?;
            let mut source = File::open(&path)?;
            buffer.clear();
            source.read_to_end(&mut buffer)?;
            zip.write_all(&buffer)?;
            archived += 1;
        }
        zip.finish()?;

        if archived == 0 {
            fs::remove_file(&backup_path).ok();
            anyhow::bail!("Nothing to back up - no store files found");
        }

        let size_bytes = fs::metadata(&backup_path)?.len();

        if let Some(max) = max_backups {
            self.apply_retention(max)?;
        }

        Ok(BackupMetadata {
            name: backup_name,
            created_at: now,
            size_bytes,
        })
    }

    /// List all backups, newest first
    pub fn list(&self) -> Result<Vec<BackupMetadata>> {
        let backups_dir = self.backups_dir();
        if !backups_dir.exists() {
            return Ok(Vec::new());
        }

        let mut backups = Vec::new();
        for entry in fs::read_dir(&backups_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("zip") {
                continue;
            }
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("")
                .to_string();
            if !name.starts_with("savvy-") {
                continue;
            }

            let metadata = fs::metadata(&path)?;
            let size_bytes = metadata.len();
            let created_at = Self::parse_backup_time(&name).unwrap_or_else(|| {
                metadata
                    .modified()
                    .map(DateTime::<Utc>::from)
                    .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
            });

            backups.push(BackupMetadata {
                name,
                created_at,
                size_bytes,
            });
        }

        backups.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(backups)
    }

    /// Restore a backup archive over the data directory
    pub fn restore(&self, name: &str) -> Result<Vec<String>> {
        let backup_path = self.backups_dir().join(name);
        if !backup_path.exists() {
            anyhow::bail!("Backup '{}' not found", name);
        }

        let file = File::open(&backup_path)?;
        let mut archive = ZipArchive::new(file)?;

        let mut restored = Vec::new();
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            let Some(entry_name) = entry.name().split('/').next_back().map(str::to_string)
            else {
                continue;
            };
            // only restore files the backup writer produces
            if !STORE_FILES.contains(&entry_name.as_str())
                && !CONFIG_FILES.contains(&entry_name.as_str())
            {
                continue;
            }
            let mut contents = Vec::new();
            entry.read_to_end(&mut contents)?;
            fs::write(self.data_dir.join(&entry_name), contents)?;
            restored.push(entry_name);
        }

        if restored.is_empty() {
            anyhow::bail!("Backup '{}' contained no restorable files", name);
        }
        Ok(restored)
    }

    /// Keep only the newest `max` backups
    fn apply_retention(&self, max: usize) -> Result<()> {
        let backups = self.list()?;
        for stale in backups.iter().skip(max) {
            fs::remove_file(self.backups_dir().join(&stale.name)).ok();
        }
        Ok(())
    }

    /// Parse the creation time out of a `savvy-<ts>-<micros>.zip` name
    fn parse_backup_time(name: &str) -> Option<DateTime<Utc>> {
        let stem = name.strip_prefix("savvy-")?.strip_suffix(".zip")?;
        // drop the microseconds suffix
        let ts = stem.rsplit_once('-').map(|(ts, _)| ts)?;
        let naive = NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H-%M-%S").ok()?;
        Some(naive.and_utc())
    }
}
