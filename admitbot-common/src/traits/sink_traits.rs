// File: admitbot-common/src/traits/sink_traits.rs

use std::fmt;
use async_trait::async_trait;

use crate::error::Error;
use crate::models::SubmissionRow;

/// Whether the durable store was reachable when the sink started.
/// Fixed for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkMode {
    Durable,
    Degraded,
}

impl fmt::Display for SinkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkMode::Durable => write!(f, "durable"),
            SinkMode::Degraded => write!(f, "degraded"),
        }
    }
}

/// Where finished survey rows go.
#[async_trait]
pub trait AnswerSink: Send + Sync {
    /// Persists one row. `true` only if the durable store accepted it;
    /// `false` means the row went (or was attempted to go) to local backup.
    async fn persist(&self, row: &SubmissionRow) -> bool;

    fn mode(&self) -> SinkMode;

    /// Human-readable location of the local backup, for operator messages.
    fn backup_location(&self) -> String;
}

/// An append-only table of string cells (a spreadsheet worksheet).
#[async_trait]
pub trait TabularStore: Send + Sync {
    async fn append_row(&self, cells: &[String]) -> Result<(), Error>;
}

/// Local last-resort storage for rows the tabular store did not take.
#[async_trait]
pub trait FallbackStore: Send + Sync {
    async fn persist_local(&self, row: &SubmissionRow) -> Result<(), Error>;

    fn location(&self) -> String;
}
