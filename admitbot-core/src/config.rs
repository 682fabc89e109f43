// File: admitbot-core/src/config.rs

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_SPREADSHEET_ID: &str = "1JvUD3CSFdgtsUVqir6zUfB5oC42NtP4YGOlZOVNRLho";
pub const DEFAULT_SHEET_NAME: &str = "Ответы";
pub const DEFAULT_CREDENTIALS_PATH: &str = "credentials.json";
pub const DEFAULT_BACKUP_PATH: &str = "backup_data.json";
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Fixed-delay bounded retry for spreadsheet appends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// Where the service-account key comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// JSON passed directly, e.g. through `GOOGLE_CREDENTIALS`.
    Inline(String),
    File(PathBuf),
}

impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Inline(_) => write!(f, "Inline(<redacted>)"),
            CredentialSource::File(path) => write!(f, "File({})", path.display()),
        }
    }
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Inline(_) => write!(f, "inline credentials (environment)"),
            CredentialSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Everything the answer sink needs at startup.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    pub spreadsheet_id: String,
    pub sheet_name: String,
    pub credentials_path: PathBuf,
    pub inline_credentials: Option<String>,
    pub backup_path: PathBuf,
    pub retry: RetryPolicy,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: DEFAULT_SPREADSHEET_ID.to_string(),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_PATH),
            inline_credentials: None,
            backup_path: PathBuf::from(DEFAULT_BACKUP_PATH),
            retry: RetryPolicy::default(),
        }
    }
}

impl SinkConfig {
    /// Inline credentials win over the key file when both are present.
    pub fn credential_source(&self) -> CredentialSource {
        match self.inline_credentials.as_deref().map(str::trim) {
            Some(json) if !json.is_empty() => CredentialSource::Inline(json.to_string()),
            _ => CredentialSource::File(self.credentials_path.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_source_by_default() {
        let cfg = SinkConfig::default();
        assert_eq!(
            cfg.credential_source(),
            CredentialSource::File(PathBuf::from(DEFAULT_CREDENTIALS_PATH))
        );
        assert_eq!(cfg.retry.max_attempts, 3);
        assert_eq!(cfg.retry.delay, Duration::from_secs(2));
    }

    #[test]
    fn inline_credentials_take_precedence_unless_blank() {
        let mut cfg = SinkConfig {
            inline_credentials: Some("  ".into()),
            ..SinkConfig::default()
        };
        assert!(matches!(cfg.credential_source(), CredentialSource::File(_)));

        cfg.inline_credentials = Some(r#"{"type":"service_account"}"#.into());
        let source = cfg.credential_source();
        assert!(matches!(source, CredentialSource::Inline(_)));
        assert_eq!(format!("{:?}", source), "Inline(<redacted>)");
    }
}
