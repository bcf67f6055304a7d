use axum::{
    http::StatusCode,
    response::{Html, IntoResponse},
};
use inventory::InventoryError;

pub use server::{ServerState, router, run_with_listener, spawn_with_listener};

mod dashboard;
mod forms;
mod page;
mod server;

pub enum ServerError {
    Inventory(InventoryError),
    /// A remote failure already turned into user-visible text.
    Remote(String),
    /// A request rejected with a specific status, e.g. an oversized body.
    Status(StatusCode, String),
    Generic(String),
}

fn status_for_inventory_error(err: &InventoryError) -> StatusCode {
    match err {
        err if err.is_remote() => StatusCode::BAD_GATEWAY,
        InventoryError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_inventory_error(err: InventoryError) -> String {
    match err {
        InventoryError::ConfigNotFound(_) | InventoryError::ConfigParse { .. } => {
            tracing::error!("configuration error: {err}");
            "configuration error, please contact the administrator".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Inventory(err) => (
                status_for_inventory_error(&err),
                message_for_inventory_error(err),
            ),
            ServerError::Remote(err) => (StatusCode::BAD_GATEWAY, err),
            ServerError::Status(status, err) => (status, err),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        let body = format!(
            r#"<!DOCTYPE html><html><head><meta charset="utf-8"><title>{code}</title></head><body>{}<p><a href="/">Kembali</a></p></body></html>"#,
            page::notice(page::NoticeKind::Error, &error),
            code = status.as_u16(),
        );
        (status, Html(body)).into_response()
    }
}

impl From<InventoryError> for ServerError {
    fn from(value: InventoryError) -> Self {
        Self::Inventory(value)
    }
}

impl From<axum::extract::multipart::MultipartError> for ServerError {
    fn from(value: axum::extract::multipart::MultipartError) -> Self {
        Self::Status(value.status(), value.body_text())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn config_errors_map_to_500() {
        let res = ServerError::from(InventoryError::ConfigNotFound(PathBuf::from(
            "config/animals.json",
        )))
        .into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn remote_errors_map_to_502() {
        let res = ServerError::from(InventoryError::RemoteRead("timeout".to_string()))
            .into_response();
        assert_eq!(res.status(), StatusCode::BAD_GATEWAY);

        let res = ServerError::Remote("quota".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn validation_maps_to_422() {
        let res = ServerError::from(InventoryError::Validation("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn status_is_kept() {
        let res = ServerError::Status(StatusCode::PAYLOAD_TOO_LARGE, "too big".to_string())
            .into_response();
        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
