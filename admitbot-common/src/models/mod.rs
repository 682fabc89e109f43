// File: admitbot-common/src/models/mod.rs
pub mod answers;
pub mod credential;
pub mod submission;

pub use answers::{Answers, Field};
pub use credential::{KeyCheck, ServiceAccountKey};
pub use submission::{BackupEntry, SubmissionRow, SHEET_HEADERS};
