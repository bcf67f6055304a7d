//! Handles settings for the application. Configuration is written in
//! `settings.toml`, every key can be overridden with a `KANDANG__`
//! environment variable, e.g. `KANDANG__SERVER__PORT=8080`.
//!
//! See `settings.example.toml` for the configuration.

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use config::{Config, ConfigError, File};
use inventory::Environment;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load settings: {0}")]
    Config(#[from] ConfigError),
    #[error("missing required settings: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
    #[error("unknown timezone {0}")]
    Timezone(String),
}

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub debug: bool,
    #[serde(default = "default_config_dir")]
    pub config_dir: PathBuf,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
            environment: Environment::default(),
            debug: false,
            config_dir: default_config_dir(),
            timezone: default_timezone(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_config_dir() -> PathBuf {
    PathBuf::from("config")
}

fn default_timezone() -> String {
    "Asia/Jakarta".to_string()
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: None,
            port: default_port(),
        }
    }
}

fn default_port() -> u16 {
    8501
}

#[derive(Debug, Default, PartialEq, Deserialize)]
pub struct Google {
    #[serde(default)]
    pub credentials_file: String,
    #[serde(default)]
    pub spreadsheet_id: String,
    #[serde(default)]
    pub drive_folder_id: String,
}

impl Google {
    fn missing(&self) -> Vec<&'static str> {
        [
            ("google.credentials_file", &self.credentials_file),
            ("google.spreadsheet_id", &self.spreadsheet_id),
            ("google.drive_folder_id", &self.drive_folder_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(key, _)| key)
        .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    #[serde(default)]
    pub server: Server,
    pub google: Option<Google>,
}

/// Where records and receipts go.
#[derive(Debug, PartialEq)]
pub enum Backend<'a> {
    Google(&'a Google),
    /// Development without complete Google settings.
    Memory { missing: Vec<&'static str> },
}

impl Settings {
    /// Load `path`, or an optional `settings.toml` in the working directory,
    /// then the environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let file = match path {
            Some(path) => File::from(path),
            None => File::with_name("settings").required(false),
        };
        let settings = Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("KANDANG")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Pick the backend, reporting every missing Google key at once.
    /// Production refuses to start without them.
    pub fn backend(&self) -> Result<Backend<'_>, SettingsError> {
        let missing = self
            .google
            .as_ref()
            .map_or_else(|| Google::default().missing(), Google::missing);

        match (&self.google, self.app.environment) {
            (Some(google), _) if missing.is_empty() => Ok(Backend::Google(google)),
            (_, Environment::Production) => Err(SettingsError::Missing(missing)),
            (_, Environment::Development) => Ok(Backend::Memory { missing }),
        }
    }

    pub fn timezone(&self) -> Result<Tz, SettingsError> {
        self.app
            .timezone
            .parse()
            .map_err(|_| SettingsError::Timezone(self.app.timezone.clone()))
    }
}
