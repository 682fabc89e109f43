// File: admitbot-core/src/sink/local_backup.rs

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Local;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{info, warn};

use admitbot_common::error::Error;
use admitbot_common::models::{BackupEntry, SubmissionRow};
use admitbot_common::traits::FallbackStore;

/// JSON-array file of rows that never reached the spreadsheet.
///
/// Every write rereads and rewrites the whole file. A missing file is created;
/// a file that does not parse as an array is treated as empty and overwritten.
#[derive(Debug)]
pub struct LocalBackup {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl LocalBackup {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Current contents; entries are kept as raw JSON so foreign fields survive rewrites.
    pub async fn load(&self) -> Vec<Value> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!("Could not read backup file {} => {}", self.path.display(), e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Value>>(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(
                    "Backup file {} is not a JSON array ({}); starting a new one",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    /// Appends one entry and returns the new entry count.
    pub async fn append(&self, entry: &BackupEntry) -> Result<usize, Error> {
        let _guard = self.write_lock.lock().await;

        let mut entries = self.load().await;
        entries.push(serde_json::to_value(entry)?);

        let body = serde_json::to_string_pretty(&entries)?;
        tokio::fs::write(&self.path, body).await?;
        Ok(entries.len())
    }
}

#[async_trait]
impl FallbackStore for LocalBackup {
    async fn persist_local(&self, row: &SubmissionRow) -> Result<(), Error> {
        let entry = BackupEntry::new(row.clone(), Local::now());
        let count = self.append(&entry).await?;
        info!(
            "Saved '{}' to local backup {} ({} pending)",
            row.applicant,
            self.path.display(),
            count
        );
        warn!(
            "Rows in {} must be transferred to the spreadsheet manually",
            self.path.display()
        );
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
