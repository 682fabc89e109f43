use thiserror::Error;

#[derive(Error, Debug)]
pub enum SheetsError {
    #[error("Credentials error: {0}")]
    CredentialsError(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Sheets API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Spreadsheet has no worksheets: {0}")]
    NoWorksheets(String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl From<gcp_auth::Error> for SheetsError {
    fn from(err: gcp_auth::Error) -> Self {
        SheetsError::AuthenticationFailed(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SheetsError>;
