use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use google::{DriveReceiptStore, ServiceAccount, SheetsLedger};
use inventory::{
    ConfigStore, FormController, LedgerClient, ReceiptStore,
    memory::{MemoryLedger, MemoryReceiptStore},
};
use server::ServerState;
use settings::{Backend, Settings};

mod settings;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Record livestock arriving at and leaving the pens.
#[derive(Debug, Parser)]
#[command(name = "kandang", version, about)]
struct Cli {
    /// Settings file, `settings.toml` in the working directory if omitted.
    #[arg(long, env = "KANDANG_SETTINGS")]
    settings: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.settings.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "kandang={level},server={level},inventory={level},google={level}",
            level = settings.app.level
        ))
        .init();

    tracing::info!("Starting in {} environment", settings.app.environment);
    if settings.app.debug {
        tracing::warn!("Debug mode is on");
    }

    let timezone = settings.timezone()?;
    let store = Arc::new(ConfigStore::from_dir(&settings.app.config_dir));
    store.preload()?;
    tracing::info!(
        "Loaded configuration from {}",
        settings.app.config_dir.display()
    );

    let (ledger, receipts) = backend(&settings, &store)?;
    let controller = FormController::new(store, ledger, receipts)
        .with_environment(settings.app.environment)
        .with_timezone(timezone);

    let bind = settings
        .server
        .bind
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, settings.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    server::run_with_listener(ServerState::new(controller, settings.app.debug), listener).await?;
    Ok(())
}

fn backend(
    settings: &Settings,
    store: &ConfigStore,
) -> Result<(Arc<dyn LedgerClient>, Arc<dyn ReceiptStore>), BoxError> {
    match settings.backend()? {
        Backend::Google(google) => {
            let http = reqwest::Client::new();
            let token = Arc::new(ServiceAccount::from_file(
                http.clone(),
                &google.credentials_file,
            )?);
            let ledger: Arc<dyn LedgerClient> = Arc::new(SheetsLedger::new(
                http.clone(),
                token.clone(),
                &google.spreadsheet_id,
                store.sheets()?.sheet_names,
            )?);
            let receipts: Arc<dyn ReceiptStore> = Arc::new(DriveReceiptStore::new(
                http,
                token,
                &google.drive_folder_id,
            )?);
            tracing::info!("Recording to spreadsheet {}", google.spreadsheet_id);
            Ok((ledger, receipts))
        }
        Backend::Memory { missing } => {
            tracing::warn!(
                "Google settings incomplete ({}), records are kept in memory only",
                missing.join(", ")
            );
            let ledger: Arc<dyn LedgerClient> = Arc::new(MemoryLedger::new());
            let receipts: Arc<dyn ReceiptStore> = Arc::new(MemoryReceiptStore::new());
            Ok((ledger, receipts))
        }
    }
}
