//! Ledger backed by a Google Sheets spreadsheet.
//!
//! Each direction owns one tab. Row 1 of a tab is the header, every other
//! row is a [`TransactionRecord`] in [`HEADER`] order.

use std::sync::Arc;

use async_trait::async_trait;
use inventory::{
    Direction, HEADER, InventoryError, LedgerClient, PerDirection, RecordId, ResultInventory,
    TransactionRecord,
};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{GoogleError, TokenProvider, error::check, parse_base_url, push_segments};

pub const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRange {
    major_dimension: &'static str,
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendResponse {
    updates: UpdateValuesResponse,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateValuesResponse {
    updated_range: String,
}

#[derive(Debug, Deserialize)]
struct ValuesResponse {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

pub struct SheetsLedger {
    http: reqwest::Client,
    base_url: Url,
    token: Arc<dyn TokenProvider>,
    spreadsheet_id: String,
    sheet_names: PerDirection<String>,
}

impl SheetsLedger {
    pub fn new(
        http: reqwest::Client,
        token: Arc<dyn TokenProvider>,
        spreadsheet_id: impl Into<String>,
        sheet_names: PerDirection<String>,
    ) -> Result<Self, GoogleError> {
        Ok(Self {
            http,
            base_url: parse_base_url(SHEETS_BASE_URL)?,
            token,
            spreadsheet_id: spreadsheet_id.into(),
            sheet_names,
        })
    }

    /// Point the client at another host, e.g. a local stub.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, GoogleError> {
        self.base_url = parse_base_url(base_url)?;
        Ok(self)
    }

    fn values_url(&self, range: &str) -> Result<Url, GoogleError> {
        push_segments(
            &self.base_url,
            &["v4", "spreadsheets", &self.spreadsheet_id, "values", range],
        )
    }

    /// Append `row` after the last row of `sheet`, returning the updated
    /// range. Cells are stored as sent, so free text such as `0042` or
    /// `=1+1` is never reinterpreted.
    pub async fn append_row(&self, sheet: &str, row: Vec<Value>) -> Result<String, GoogleError> {
        let range = format!("{}!A:{}", quote_sheet(sheet), last_column());
        let mut url = self.values_url(&format!("{range}:append"))?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "RAW")
            .append_pair("insertDataOption", "INSERT_ROWS");

        let resp = self
            .http
            .post(url)
            .bearer_auth(self.token.access_token().await?)
            .json(&ValueRange {
                major_dimension: "ROWS",
                values: vec![row],
            })
            .send()
            .await?;
        let appended = check(resp).await?.json::<AppendResponse>().await?;
        Ok(appended.updates.updated_range)
    }

    /// Every row of `sheet`, header included, with cells rendered as text.
    /// Date cells come back as serial numbers, independent of the sheet's
    /// locale.
    pub async fn read_rows(&self, sheet: &str) -> Result<Vec<Vec<String>>, GoogleError> {
        let mut url = self.values_url(&quote_sheet(sheet))?;
        url.query_pairs_mut()
            .append_pair("majorDimension", "ROWS")
            .append_pair("valueRenderOption", "UNFORMATTED_VALUE")
            .append_pair("dateTimeRenderOption", "SERIAL_NUMBER");

        let resp = self
            .http
            .get(url)
            .bearer_auth(self.token.access_token().await?)
            .send()
            .await?;
        let values = check(resp).await?.json::<ValuesResponse>().await?;
        Ok(values
            .values
            .into_iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect())
    }
}

#[async_trait]
impl LedgerClient for SheetsLedger {
    async fn append(
        &self,
        direction: Direction,
        record: &TransactionRecord,
    ) -> ResultInventory<RecordId> {
        let sheet = self.sheet_names.get(direction);
        self.append_row(sheet, record.to_row())
            .await
            .map(RecordId)
            .map_err(|err| InventoryError::RemoteWrite(err.to_string()))
    }

    async fn list_all(&self, direction: Direction) -> ResultInventory<Vec<TransactionRecord>> {
        let sheet = self.sheet_names.get(direction);
        let rows = self
            .read_rows(sheet)
            .await
            .map_err(|err| InventoryError::RemoteRead(err.to_string()))?;
        Ok(parse_rows(sheet, rows))
    }
}

/// Skip the header and blank rows; rows that do not parse are logged and
/// dropped from the totals.
fn parse_rows(sheet: &str, rows: Vec<Vec<String>>) -> Vec<TransactionRecord> {
    rows.into_iter()
        .enumerate()
        .skip(1)
        .filter(|(_, row)| row.iter().any(|cell| !cell.trim().is_empty()))
        .filter_map(|(idx, row)| match TransactionRecord::from_row(&row) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::warn!("skipping {sheet} row {}: {err}", idx + 1);
                None
            }
        })
        .collect()
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_i64() {
            Some(int) => int.to_string(),
            None => n.to_string(),
        },
        other => other.to_string(),
    }
}

/// A1 notation sheet reference, quoted so names with spaces work.
fn quote_sheet(sheet: &str) -> String {
    format!("'{}'", sheet.replace('\'', "''"))
}

fn last_column() -> char {
    (b'A' + (HEADER.len() as u8 - 1)) as char
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_names_are_quoted() {
        assert_eq!(quote_sheet("Inbound"), "'Inbound'");
        assert_eq!(quote_sheet("Pak Budi's"), "'Pak Budi''s'");
    }

    #[test]
    fn header_spans_a_to_h() {
        assert_eq!(last_column(), 'H');
    }

    #[test]
    fn numbers_render_without_fraction() {
        assert_eq!(cell_text(&serde_json::json!(5)), "5");
        assert_eq!(cell_text(&serde_json::json!(2.5)), "2.5");
        assert_eq!(cell_text(&Value::Null), "");
    }

    #[test]
    fn header_blank_and_bad_rows_are_skipped() {
        let rows = vec![
            HEADER.iter().map(|h| h.to_string()).collect(),
            vec!["2025-06-06".into(), "Goat".into(), "Small".into(), "5".into()],
            vec!["".into(), " ".into()],
            vec!["2025-06-06".into(), "Goat".into(), "Small".into(), "five".into()],
            vec!["2025-06-07".into(), "Cow".into(), "A".into(), "1".into(), "ok".into()],
        ];
        let records = parse_rows("Inbound", rows);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].quantity, 5);
        assert_eq!(records[1].notes.as_deref(), Some("ok"));
    }
}
