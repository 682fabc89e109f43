use std::sync::Arc;
use std::time::Duration;

use gcp_auth::{CustomServiceAccount, TokenProvider};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tracing::{debug, info, warn};

use crate::error::{Result, SheetsError};
use crate::models::*;

/// Sheets v4 REST root.
const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// OAuth2 scope for reading and appending spreadsheet values.
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for one spreadsheet, authenticated as a service account.
#[derive(Clone)]
pub struct SheetsClient {
    http: reqwest::Client,
    auth: Arc<CustomServiceAccount>,
    spreadsheet_id: String,
}

impl SheetsClient {
    /// Builds a client from service-account JSON. Does not touch the network;
    /// call [`SheetsClient::authorize`] to verify the key.
    pub fn from_service_account_json(credentials_json: &str, spreadsheet_id: impl Into<String>) -> Result<Self> {
        let service_account = CustomServiceAccount::from_json(credentials_json)
            .map_err(|e| SheetsError::CredentialsError(format!("Failed to parse credentials JSON: {}", e)))?;

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(SheetsError::HttpError)?;

        Ok(Self {
            http,
            auth: Arc::new(service_account),
            spreadsheet_id: spreadsheet_id.into(),
        })
    }

    /// Exchanges the service-account key for an access token.
    pub async fn authorize(&self) -> Result<()> {
        self.bearer_token().await?;
        info!("Authorized against Google Sheets API");
        Ok(())
    }

    async fn bearer_token(&self) -> Result<String> {
        let token = self.auth.token(&[SHEETS_SCOPE]).await?;
        Ok(token.as_str().to_string())
    }

    async fn headers(&self) -> Result<HeaderMap> {
        let token = self.bearer_token().await?;

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| SheetsError::AuthenticationFailed(e.to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Turns a non-2xx response into `ApiError`, keeping Google's message.
    async fn check(resp: reqwest::Response) -> Result<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<GoogleErrorEnvelope>(&body)
            .map(|env| env.error.message)
            .unwrap_or(body);
        warn!("Sheets API call failed => status={} message={}", status, message);
        Err(SheetsError::ApiError {
            status: status.as_u16(),
            message,
        })
    }

    /// Lists the worksheets of the spreadsheet. Also serves as the
    /// "can we open it" probe.
    pub async fn list_sheets(&self) -> Result<Vec<SheetProperties>> {
        let url = format!("{}/{}", SHEETS_API_BASE, self.spreadsheet_id);
        let resp = self
            .http
            .get(&url)
            .headers(self.headers().await?)
            .query(&[("fields", "sheets.properties")])
            .send()
            .await?;
        let meta: SpreadsheetMeta = Self::check(resp)
            .await?
            .json()
            .await
            .map_err(|e| SheetsError::ParseError(format!("spreadsheet metadata: {e}")))?;

        let mut sheets: Vec<SheetProperties> = meta.sheets.into_iter().map(|s| s.properties).collect();
        sheets.sort_by_key(|s| s.index);
        Ok(sheets)
    }

    /// Opens the worksheet called `preferred`, or the first worksheet if no
    /// such title exists.
    pub async fn open_worksheet(&self, preferred: &str) -> Result<Worksheet> {
        let sheets = self.list_sheets().await?;
        debug!("Spreadsheet {} has worksheets {:?}", self.spreadsheet_id,
            sheets.iter().map(|s| s.title.as_str()).collect::<Vec<_>>());

        if let Some(found) = sheets.iter().find(|s| s.title == preferred) {
            return Ok(Worksheet::new(self.clone(), found.title.clone()));
        }

        match sheets.first() {
            Some(first) => {
                warn!("Worksheet '{}' not found, using first worksheet '{}'", preferred, first.title);
                Ok(Worksheet::new(self.clone(), first.title.clone()))
            }
            None => Err(SheetsError::NoWorksheets(self.spreadsheet_id.clone())),
        }
    }

    /// Values of one 1-based row; empty when the row has no data.
    pub async fn row_values(&self, sheet_title: &str, row: u32) -> Result<Vec<String>> {
        let range = a1_range(sheet_title, &format!("{row}:{row}"));
        let resp = self
            .http
            .get(values_url(&self.spreadsheet_id, &range))
            .headers(self.headers().await?)
            .send()
            .await?;
        let values: ValueRange = Self::check(resp)
            .await?
            .json()
            .await
            .map_err(|e| SheetsError::ParseError(format!("value range: {e}")))?;
        Ok(values.first_row())
    }

    /// Appends `cells` as a new row after the last non-empty row of the table.
    pub async fn append_row(&self, sheet_title: &str, cells: &[String]) -> Result<AppendValuesResponse> {
        let resp = append_request(&self.http, &self.spreadsheet_id, sheet_title, cells)
            .headers(self.headers().await?)
            .send()
            .await?;
        let appended: AppendValuesResponse = Self::check(resp)
            .await?
            .json()
            .await
            .map_err(|e| SheetsError::ParseError(format!("append response: {e}")))?;
        Ok(appended)
    }
}

impl std::fmt::Debug for SheetsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetsClient")
            .field("spreadsheet_id", &self.spreadsheet_id)
            .finish_non_exhaustive()
    }
}

fn values_url(spreadsheet_id: &str, range: &str) -> String {
    format!(
        "{}/{}/values/{}",
        SHEETS_API_BASE,
        spreadsheet_id,
        urlencoding::encode(range)
    )
}

/// Cells are sent with `RAW` input so answers such as `=1+1` or `01.02` are
/// stored as typed, not parsed into formulas or dates.
fn append_request(
    http: &reqwest::Client,
    spreadsheet_id: &str,
    sheet_title: &str,
    cells: &[String],
) -> reqwest::RequestBuilder {
    let range = a1_range(sheet_title, "A1");
    let url = format!("{}:append", values_url(spreadsheet_id, &range));
    http.post(url)
        .query(&[
            ("valueInputOption", "RAW"),
            ("insertDataOption", "INSERT_ROWS"),
        ])
        .json(&AppendValuesRequest::single_row(cells))
}

/// A resolved worksheet of a spreadsheet.
#[derive(Debug, Clone)]
pub struct Worksheet {
    client: SheetsClient,
    title: String,
}

impl Worksheet {
    fn new(client: SheetsClient, title: String) -> Self {
        Self { client, title }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub async fn row_values(&self, row: u32) -> Result<Vec<String>> {
        self.client.row_values(&self.title, row).await
    }

    pub async fn append_row(&self, cells: &[String]) -> Result<AppendValuesResponse> {
        self.client.append_row(&self.title, cells).await
    }

    /// Writes `headers` as the first row if row 1 is empty.
    /// Returns `true` when the header row was written.
    pub async fn ensure_headers(&self, headers: &[&str]) -> Result<bool> {
        let existing = self.row_values(1).await?;
        if !existing.is_empty() {
            info!("Header row present in '{}': {:?}", self.title, existing);
            return Ok(false);
        }
        let cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        self.append_row(&cells).await?;
        info!("Wrote header row to '{}'", self.title);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_credentials_are_rejected_offline() {
        let err = SheetsClient::from_service_account_json("{\"type\":", "sheet-id").unwrap_err();
        assert!(matches!(err, SheetsError::CredentialsError(_)));
    }

    #[test]
    fn values_url_encodes_the_range() {
        let url = values_url("abc", &a1_range("Ответы", "1:1"));
        assert!(url.starts_with("https://sheets.googleapis.com/v4/spreadsheets/abc/values/"));
        assert!(!url.contains('\''));
        assert!(!url.contains('!'));
    }

    #[test]
    fn append_sends_cells_verbatim() {
        let cells = vec!["=1+1".to_string(), "+7 912 000-00-00".to_string(), "01.02".to_string()];
        let request = append_request(&reqwest::Client::new(), "abc", "Ответы", &cells)
            .build()
            .unwrap();

        assert!(request.url().path().ends_with(":append"));
        let query: Vec<(String, String)> = request
            .url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(query.contains(&("valueInputOption".into(), "RAW".into())));
        assert!(query.contains(&("insertDataOption".into(), "INSERT_ROWS".into())));

        let body: serde_json::Value =
            serde_json::from_slice(request.body().unwrap().as_bytes().unwrap()).unwrap();
        assert_eq!(body["values"][0][0], "=1+1");
        assert_eq!(body["values"][0][1], "+7 912 000-00-00");
        assert_eq!(body["values"][0][2], "01.02");
    }
}
