// File: admitbot-core/src/sink/sheets_store.rs

use async_trait::async_trait;
use tracing::{debug, info, warn};

use admitbot_common::error::Error;
use admitbot_common::models::{ServiceAccountKey, SHEET_HEADERS};
use admitbot_common::traits::TabularStore;
use admitbot_sheets::{SheetsClient, SheetsError, Worksheet};

use crate::config::{CredentialSource, SinkConfig};

/// The answers worksheet, resolved once at startup.
#[derive(Debug, Clone)]
pub struct SheetsStore {
    worksheet: Worksheet,
}

impl SheetsStore {
    pub fn new(worksheet: Worksheet) -> Self {
        Self { worksheet }
    }

    pub fn worksheet_title(&self) -> &str {
        self.worksheet.title()
    }

    /// Runs the startup checks in order, logging each one, and returns a store
    /// ready for appends. Any error means the durable store is unusable.
    pub async fn connect(config: &SinkConfig) -> Result<Self, Error> {
        let source = config.credential_source();
        info!("Step 1: loading credentials from {}", source);
        let raw = read_credentials(&source).await?;

        info!("Step 2: checking required credential fields");
        let mut key = ServiceAccountKey::from_json(&raw)?;
        let missing = key.missing_fields();
        if !missing.is_empty() {
            warn!("Credentials are missing fields: {:?}", missing);
        }
        let check = key.validate()?;
        info!("Client email: {}", key.client_email());
        info!("Private key id: {}...", key.key_id_prefix());

        info!("Step 3: checking private key format");
        if check.unescaped_newlines {
            info!("Private key contained escaped newlines; fixed");
        }
        if check.suspicious_key_format {
            warn!("Private key does not start with a PEM header; authorization will likely fail");
        }

        let client = SheetsClient::from_service_account_json(&key.to_json()?, &config.spreadsheet_id)
            .map_err(sheets_error)?;

        info!("Step 4: authorizing service account");
        client.authorize().await.map_err(sheets_error)?;

        info!("Step 5: opening spreadsheet {}", config.spreadsheet_id);
        info!("Step 6: selecting worksheet '{}'", config.sheet_name);
        let worksheet = client.open_worksheet(&config.sheet_name).await.map_err(|e| {
            if let SheetsError::ApiError { status: 403 | 404, .. } = &e {
                warn!(
                    "Check the spreadsheet id and that it is shared with {}",
                    key.client_email()
                );
            }
            sheets_error(e)
        })?;

        info!("Step 7: checking header row of '{}'", worksheet.title());
        if worksheet.ensure_headers(&SHEET_HEADERS).await.map_err(sheets_error)? {
            info!("Header row created");
        }

        Ok(Self::new(worksheet))
    }
}

async fn read_credentials(source: &CredentialSource) -> Result<String, Error> {
    match source {
        CredentialSource::Inline(json) => Ok(json.clone()),
        CredentialSource::File(path) => tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::Credentials(format!("cannot read credentials file {}: {}", path.display(), e))
        }),
    }
}

fn sheets_error(e: SheetsError) -> Error {
    match e {
        SheetsError::CredentialsError(msg) => Error::Credentials(msg),
        SheetsError::AuthenticationFailed(msg) => Error::Auth(msg),
        SheetsError::HttpError(e) => Error::Http(e),
        other => Error::Sheets(other.to_string()),
    }
}

#[async_trait]
impl TabularStore for SheetsStore {
    async fn append_row(&self, cells: &[String]) -> Result<(), Error> {
        let response = self.worksheet.append_row(cells).await.map_err(sheets_error)?;
        if let Some(updates) = response.updates {
            debug!(
                "Appended to {} ({} cells)",
                updates.updated_range.unwrap_or_default(),
                updates.updated_cells.unwrap_or_default()
            );
        }
        Ok(())
    }
}
