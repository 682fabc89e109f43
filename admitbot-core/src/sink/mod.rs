// File: admitbot-core/src/sink/mod.rs

pub mod local_backup;
pub mod sheets_store;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{error, info, warn};

use admitbot_common::models::SubmissionRow;
use admitbot_common::traits::{AnswerSink, FallbackStore, SinkMode, TabularStore};

use crate::config::{RetryPolicy, SinkConfig};

pub use local_backup::LocalBackup;
pub use sheets_store::SheetsStore;

/// Answer sink backed by a spreadsheet, with a local file as last resort.
///
/// `store` is `None` when the spreadsheet was unreachable at startup; the sink
/// then stays degraded for the life of the process.
pub struct SpreadsheetSink<S: TabularStore, F: FallbackStore> {
    store: Option<S>,
    fallback: F,
    retry: RetryPolicy,
}

impl<S: TabularStore, F: FallbackStore> SpreadsheetSink<S, F> {
    pub fn durable(store: S, fallback: F, retry: RetryPolicy) -> Self {
        Self {
            store: Some(store),
            fallback,
            retry,
        }
    }

    pub fn degraded(fallback: F, retry: RetryPolicy) -> Self {
        Self {
            store: None,
            fallback,
            retry,
        }
    }

    /// Bounded, fixed-delay append. Every error counts as retryable.
    async fn append_with_retry(&self, store: &S, row: &SubmissionRow) -> bool {
        let cells = row.cells();
        let max_attempts = self.retry.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            match store.append_row(&cells).await {
                Ok(()) => {
                    info!("Row for '{}' appended on attempt {attempt}", row.applicant);
                    return true;
                }
                Err(e) => {
                    error!("Append attempt {attempt}/{max_attempts} failed => {e}");
                    if attempt < max_attempts {
                        warn!("Will retry in {:?}...", self.retry.delay);
                        sleep(self.retry.delay).await;
                    }
                }
            }
        }
        false
    }

    async fn save_locally(&self, row: &SubmissionRow) {
        if let Err(e) = self.fallback.persist_local(row).await {
            error!(
                "Local backup to {} failed, row for '{}' is lost => {e}",
                self.fallback.location(),
                row.applicant
            );
        }
    }
}

#[async_trait]
impl<S: TabularStore, F: FallbackStore> AnswerSink for SpreadsheetSink<S, F> {
    async fn persist(&self, row: &SubmissionRow) -> bool {
        match &self.store {
            Some(store) => {
                if self.append_with_retry(store, row).await {
                    return true;
                }
                error!("All append attempts failed, falling back to local backup");
            }
            None => warn!("Spreadsheet unavailable, saving locally"),
        }
        self.save_locally(row).await;
        false
    }

    fn mode(&self) -> SinkMode {
        if self.store.is_some() {
            SinkMode::Durable
        } else {
            SinkMode::Degraded
        }
    }

    fn backup_location(&self) -> String {
        self.fallback.location()
    }
}

/// Connects to the configured spreadsheet once. Any startup failure yields a
/// sink in degraded mode; there is no reconnection later.
pub async fn build_sink(config: &SinkConfig) -> SpreadsheetSink<SheetsStore, LocalBackup> {
    let fallback = LocalBackup::new(&config.backup_path);

    match SheetsStore::connect(config).await {
        Ok(store) => {
            info!("Google Sheets connected, worksheet '{}'", store.worksheet_title());
            SpreadsheetSink::durable(store, fallback, config.retry)
        }
        Err(e) => {
            error!("Google Sheets setup failed => {e}");
            warn!(
                "Running in degraded mode; answers go to {}",
                config.backup_path.display()
            );
            SpreadsheetSink::degraded(fallback, config.retry)
        }
    }
}
