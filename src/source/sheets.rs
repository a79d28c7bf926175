//! Google Sheets values API client.

use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::error::IngestError;
use crate::fetch::auth::{ApiKey, UrlParam};
use crate::fetch::{BasicClient, HttpClient, fetch_bytes};
use crate::table::RawTable;

pub const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com";

/// How requests to the Sheets API are authenticated. The credential itself
/// comes from an external provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetsAuth {
    /// Spreadsheet is readable without credentials (rare).
    None,
    /// API key appended as the `key` query parameter.
    ApiKey(String),
    /// OAuth access token with a read-only spreadsheets scope.
    Bearer(String),
}

impl SheetsAuth {
    /// Builds an HTTP client carrying this credential.
    pub fn client(&self) -> Result<Box<dyn HttpClient>, IngestError> {
        let basic = BasicClient::new().map_err(IngestError::unavailable)?;
        let client: Box<dyn HttpClient> = match self {
            SheetsAuth::None => Box::new(basic),
            SheetsAuth::ApiKey(key) => Box::new(UrlParam {
                inner: basic,
                param_name: "key".to_string(),
                key: key.clone(),
            }),
            SheetsAuth::Bearer(token) => Box::new(
                ApiKey::bearer(basic, token)
                    .map_err(|e| IngestError::SourceUnavailable(format!("invalid token: {e}")))?,
            ),
        };
        Ok(client)
    }
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

fn cell_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Converts a `spreadsheets.values.get` response body into a [`RawTable`].
///
/// Trailing empty cells are omitted by the API, so rows may be ragged.
pub fn parse_values_response(body: &[u8]) -> Result<RawTable, IngestError> {
    let range: ValueRange = serde_json::from_slice(body)
        .map_err(|e| IngestError::SourceUnavailable(format!("malformed Sheets response: {e}")))?;
    Ok(RawTable::new(
        range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect(),
    ))
}

/// Reads a worksheet range through the Sheets values API.
pub struct SheetsClient<C> {
    client: C,
    base_url: String,
}

impl<C: HttpClient> SheetsClient<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            base_url: SHEETS_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// URL of `GET /v4/spreadsheets/{id}/values/{range}`, with path segments
    /// percent-encoded (worksheet names are often accented).
    pub fn values_url(&self, spreadsheet_id: &str, range: &str) -> Result<Url, IngestError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| IngestError::Config(format!("invalid base url '{}': {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| IngestError::Config(format!("base url '{}' cannot have a path", self.base_url)))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", spreadsheet_id, "values", range]);
        Ok(url)
    }

    #[tracing::instrument(skip(self))]
    pub async fn fetch_table(&self, spreadsheet_id: &str, range: &str) -> Result<RawTable, IngestError> {
        let url = self.values_url(spreadsheet_id, range)?;
        let body = fetch_bytes(&self.client, url.as_str()).await?;
        let table = parse_values_response(&body)?;
        let (rows, cols) = table.dimensions();
        info!(rows, cols, "Worksheet fetched");
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_values_response() {
        let body = r#"{
            "range": "'Réponses'!A1:C3",
            "majorDimension": "ROWS",
            "values": [
                ["Horodateur", "Recommandation", "Avis"],
                ["24/03/2024 14:30:00", "9 - Enthousiaste"],
                ["25/03/2024 10:00:00", 7, null]
            ]
        }"#;
        let table = parse_values_response(body.as_bytes()).unwrap();
        assert_eq!(table.dimensions(), (2, 3));
        assert_eq!(table.data_rows()[0].len(), 2);
        assert_eq!(table.data_rows()[1], vec!["25/03/2024 10:00:00", "7", ""]);
    }

    #[test]
    fn test_parse_values_response_without_values() {
        let table = parse_values_response(br#"{ "range": "A1:A1" }"#).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_parse_values_response_malformed() {
        let err = parse_values_response(b"<html>").unwrap_err();
        assert!(matches!(err, IngestError::SourceUnavailable(_)));
    }

    #[test]
    fn test_values_url_encodes_worksheet_name() {
        let client = SheetsClient::new(BasicClient::new().unwrap())
            .with_base_url("http://localhost:8080/");
        let url = client.values_url("abc123", "Réponses").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/v4/spreadsheets/abc123/values/R%C3%A9ponses"
        );
    }

    #[test]
    fn test_auth_clients_build() {
        assert!(SheetsAuth::None.client().is_ok());
        assert!(SheetsAuth::ApiKey("k".into()).client().is_ok());
        assert!(SheetsAuth::Bearer("t".into()).client().is_ok());
        assert!(SheetsAuth::Bearer("bad\ntoken".into()).client().is_err());
    }
}
