//! Google Sheets ledger and Google Drive receipt store.

use reqwest::Url;

pub use auth::{SCOPES, ServiceAccount, ServiceAccountKey, StaticToken, TokenProvider};
pub use drive::{DRIVE_BASE_URL, DriveReceiptStore, mime_type_for};
pub use error::GoogleError;
pub use sheets::{SHEETS_BASE_URL, SheetsLedger};

mod auth;
mod drive;
mod error;
mod sheets;

fn parse_base_url(base_url: &str) -> Result<Url, GoogleError> {
    Url::parse(base_url).map_err(|err| GoogleError::Response(format!("invalid base_url: {err}")))
}

/// `base` with `segments` appended to its path, each percent-encoded.
fn push_segments(base: &Url, segments: &[&str]) -> Result<Url, GoogleError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| GoogleError::Response(format!("invalid base_url: {base}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
