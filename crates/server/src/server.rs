use std::sync::Arc;

use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    response::Html,
    routing::get,
};

use crate::{ServerError, dashboard, forms, page};
use inventory::{Direction, FormController};

/// Largest accepted request body; receipts are phone photos or PDFs.
const BODY_LIMIT: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct ServerState {
    pub controller: Arc<FormController>,
    pub debug: bool,
}

impl ServerState {
    pub fn new(controller: FormController, debug: bool) -> Self {
        Self {
            controller: Arc::new(controller),
            debug,
        }
    }

    pub(crate) fn layout(&self, title: &str, body: &str) -> Html<String> {
        page::layout(title, self.controller.environment(), self.debug, body)
    }
}

async fn home(State(state): State<ServerState>) -> Result<Html<String>, ServerError> {
    let options = state.controller.options();
    let mut body = String::from("<ul>");
    for direction in Direction::ALL {
        let title = options.form_title(direction.as_str())?;
        body.push_str(&format!(
            r#"<li><a href="/{direction}">{}</a></li>"#,
            page::escape(&title)
        ));
    }
    let dashboard = options.form_title("dashboard")?;
    body.push_str(&format!(
        r#"<li><a href="/dashboard">{}</a></li></ul>"#,
        page::escape(&dashboard)
    ));
    Ok(state.layout("Master App Tim Kandang", &body))
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/", get(home))
        .route(
            "/inbound",
            get(forms::inbound_form).post(forms::inbound_submit),
        )
        .route(
            "/outbound",
            get(forms::outbound_form).post(forms::outbound_submit),
        )
        .route("/dashboard", get(dashboard::show))
        .route("/dashboard.csv", get(dashboard::export_csv))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(state)
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(state, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
