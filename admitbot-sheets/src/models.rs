use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `GET /v4/spreadsheets/{id}?fields=sheets.properties` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpreadsheetMeta {
    #[serde(default)]
    pub sheets: Vec<SheetEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SheetEntry {
    pub properties: SheetProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    #[serde(default)]
    pub sheet_id: i64,
    pub title: String,
    #[serde(default)]
    pub index: u32,
}

/// A block of cell values as returned by `values.get`.
/// Google omits `values` entirely for an empty range.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    pub range: Option<String>,
    pub major_dimension: Option<String>,
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl ValueRange {
    /// First row rendered as strings; numbers and booleans are stringified.
    pub fn first_row(&self) -> Vec<String> {
        self.values
            .first()
            .map(|row| {
                row.iter()
                    .map(|cell| match cell {
                        Value::String(s) => s.clone(),
                        Value::Null => String::new(),
                        other => other.to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendValuesRequest {
    pub major_dimension: String,
    pub values: Vec<Vec<String>>,
}

impl AppendValuesRequest {
    pub fn single_row(cells: &[String]) -> Self {
        Self {
            major_dimension: "ROWS".to_string(),
            values: vec![cells.to_vec()],
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendValuesResponse {
    pub spreadsheet_id: Option<String>,
    pub table_range: Option<String>,
    pub updates: Option<UpdatedValues>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedValues {
    pub updated_range: Option<String>,
    pub updated_rows: Option<u32>,
    pub updated_cells: Option<u32>,
}

/// Error body of a failed Google API call.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleErrorEnvelope {
    pub error: GoogleErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleErrorBody {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
    pub status: Option<String>,
}

/// Builds an A1 range for a worksheet, quoting the title
/// (`'Ответы'!1:1`). Single quotes inside the title are doubled.
pub fn a1_range(sheet_title: &str, cells: &str) -> String {
    let quoted = sheet_title.replace('\'', "''");
    format!("'{}'!{}", quoted, cells)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a1_range_quotes_titles() {
        assert_eq!(a1_range("Ответы", "1:1"), "'Ответы'!1:1");
        assert_eq!(a1_range("Fr. John's", "A1"), "'Fr. John''s'!A1");
    }

    #[test]
    fn empty_value_range_has_no_first_row() {
        let parsed: ValueRange =
            serde_json::from_str(r#"{"range":"'Ответы'!A1:Z1","majorDimension":"ROWS"}"#).unwrap();
        assert!(parsed.first_row().is_empty());
    }

    #[test]
    fn first_row_stringifies_cells() {
        let parsed: ValueRange =
            serde_json::from_str(r#"{"values":[["ФИО абитуриента", 2, true]]}"#).unwrap();
        assert_eq!(parsed.first_row(), vec!["ФИО абитуриента", "2", "true"]);
    }

    #[test]
    fn spreadsheet_meta_parses_titles() {
        let parsed: SpreadsheetMeta = serde_json::from_str(
            r#"{"sheets":[{"properties":{"sheetId":0,"title":"Лист1","index":0}},
                          {"properties":{"sheetId":7,"title":"Ответы","index":1}}]}"#,
        )
        .unwrap();
        let titles: Vec<_> = parsed.sheets.iter().map(|s| s.properties.title.as_str()).collect();
        assert_eq!(titles, vec!["Лист1", "Ответы"]);
    }
}
