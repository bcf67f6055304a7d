//! Errors raised by the inventory crate.
//!
//! Configuration failures ([`ConfigNotFound`], [`ConfigParse`]) are fatal for
//! the category being accessed. Remote failures ([`RemoteWrite`],
//! [`RemoteRead`], [`Upload`]) are never retried and bubble up to the
//! controller, which turns them into user-visible text.
//!
//!  [`ConfigNotFound`]: InventoryError::ConfigNotFound
//!  [`ConfigParse`]: InventoryError::ConfigParse
//!  [`RemoteWrite`]: InventoryError::RemoteWrite
//!  [`RemoteRead`]: InventoryError::RemoteRead
//!  [`Upload`]: InventoryError::Upload
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum InventoryError {
    #[error("configuration file {} not found", .0.display())]
    ConfigNotFound(PathBuf),
    #[error("invalid configuration in {file}: {reason}")]
    ConfigParse { file: String, reason: String },
    #[error("failed to write to the ledger: {0}")]
    RemoteWrite(String),
    #[error("failed to read from the ledger: {0}")]
    RemoteRead(String),
    #[error("failed to upload receipt: {0}")]
    Upload(String),
    #[error("{0}")]
    Validation(String),
}

impl InventoryError {
    /// True for failures of the external services.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::RemoteWrite(_) | Self::RemoteRead(_) | Self::Upload(_)
        )
    }
}
