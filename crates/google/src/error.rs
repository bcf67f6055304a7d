use reqwest::{Response, StatusCode};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GoogleError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{status}: {message}")]
    Api { status: StatusCode, message: String },
    #[error("invalid credentials file {path}: {reason}")]
    Credentials { path: String, reason: String },
    #[error("failed to sign token request: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
    #[error("unexpected response: {0}")]
    Response(String),
}

/// Pass successful responses through, turn the others into
/// [`GoogleError::Api`] with the most specific message the body offers.
pub(crate) async fn check(resp: Response) -> Result<Response, GoogleError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    Err(GoogleError::Api {
        status,
        message: error_message(&body),
    })
}

/// Google APIs answer `{"error": {"message": ..}}`, the token endpoint
/// `{"error": .., "error_description": ..}`.
fn error_message(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let message = parsed.as_ref().and_then(|json| {
        json.pointer("/error/message")
            .or_else(|| json.get("error_description"))
            .or_else(|| json.get("error"))
            .and_then(Value::as_str)
            .map(String::from)
    });

    match message {
        Some(message) => message,
        None if body.trim().is_empty() => "server error".to_string(),
        None => body.chars().take(200).collect(),
    }
}
