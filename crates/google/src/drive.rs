//! Receipt storage in a Google Drive folder.

use std::sync::Arc;

use async_trait::async_trait;
use inventory::{InventoryError, ReceiptStore, ResultInventory, ShareableLink};
use reqwest::{Url, header::LOCATION};
use serde::{Deserialize, Serialize};

use crate::{GoogleError, TokenProvider, error::check, parse_base_url, push_segments};

pub const DRIVE_BASE_URL: &str = "https://www.googleapis.com/";

#[derive(Debug, Serialize)]
struct FileMetadata<'a> {
    name: &'a str,
    parents: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    web_view_link: Option<String>,
}

pub struct DriveReceiptStore {
    http: reqwest::Client,
    base_url: Url,
    token: Arc<dyn TokenProvider>,
    folder_id: String,
}

impl DriveReceiptStore {
    pub fn new(
        http: reqwest::Client,
        token: Arc<dyn TokenProvider>,
        folder_id: impl Into<String>,
    ) -> Result<Self, GoogleError> {
        Ok(Self {
            http,
            base_url: parse_base_url(DRIVE_BASE_URL)?,
            token,
            folder_id: folder_id.into(),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, GoogleError> {
        self.base_url = parse_base_url(base_url)?;
        Ok(self)
    }

    /// Resumable upload: open a session with the metadata, then send the
    /// bytes to the session URL.
    pub async fn upload_file(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
    ) -> Result<ShareableLink, GoogleError> {
        let mime = mime_type_for(file_name);
        let token = self.token.access_token().await?;

        let mut url = push_segments(&self.base_url, &["upload", "drive", "v3", "files"])?;
        url.query_pairs_mut()
            .append_pair("uploadType", "resumable")
            .append_pair("fields", "id,webViewLink")
            .append_pair("supportsAllDrives", "true");

        let resp = self
            .http
            .post(url)
            .bearer_auth(&token)
            .header("X-Upload-Content-Type", mime)
            .header("X-Upload-Content-Length", bytes.len())
            .json(&FileMetadata {
                name: file_name,
                parents: [self.folder_id.as_str()],
            })
            .send()
            .await?;
        let resp = check(resp).await?;
        let session = resp
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| GoogleError::Response("upload session without location".to_string()))?
            .to_string();

        let resp = self
            .http
            .put(session)
            .bearer_auth(&token)
            .header(reqwest::header::CONTENT_TYPE, mime)
            .body(bytes)
            .send()
            .await?;
        let file = check(resp).await?.json::<DriveFile>().await?;
        tracing::info!("uploaded receipt {file_name} as {}", file.id);

        file.web_view_link
            .map(ShareableLink)
            .ok_or_else(|| GoogleError::Response(format!("file {} has no web link", file.id)))
    }
}

#[async_trait]
impl ReceiptStore for DriveReceiptStore {
    async fn upload(&self, bytes: Vec<u8>, file_name: &str) -> ResultInventory<ShareableLink> {
        self.upload_file(bytes, file_name)
            .await
            .map_err(|err| InventoryError::Upload(err.to_string()))
    }
}

/// Content type of the receipt formats the forms accept.
pub fn mime_type_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_from_extension() {
        assert_eq!(mime_type_for("0042.PDF"), "application/pdf");
        assert_eq!(mime_type_for("nota.jpeg"), "image/jpeg");
        assert_eq!(mime_type_for("nota.JPG"), "image/jpeg");
        assert_eq!(mime_type_for("scan.png"), "image/png");
        assert_eq!(mime_type_for("archive.tar.gz"), "application/octet-stream");
        assert_eq!(mime_type_for("README"), "application/octet-stream");
    }
}
