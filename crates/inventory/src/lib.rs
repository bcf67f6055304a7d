//! Domain core of the farm-inventory tracker.
//!
//! The spreadsheet is the only source of truth: this crate holds no copy
//! of the ledger beyond the rows fetched for one dashboard render. Remote
//! services are reached through [`LedgerClient`] and [`ReceiptStore`];
//! configuration through [`ConfigStore`], seen by consumers as an
//! [`OptionsProvider`].

pub use config::{
    AnimalCategory, AnimalConfig, AnimalType, ConfigCategory, ConfigDocument, ConfigSource,
    ConfigStore, DayOption, DirectorySource, FormLabels, MessageKind, Messages, PerDirection,
    SheetConfig, UiLabels, VendorConfig,
};
pub use controller::{
    DashboardView, Environment, FormController, ReceiptFile, SubmissionState, SubmitForm,
    receipt_file_name,
};
pub use error::InventoryError;
pub use options::OptionsProvider;
pub use record::{Direction, HEADER, RecordId, RowError, ShareableLink, TransactionRecord};
pub use remote::{LedgerClient, ReceiptStore};
pub use summary::{AggregateSummary, Deliveries, GroupKey, Totals, VendorKey};

pub mod memory;

mod config;
mod controller;
mod error;
mod options;
mod record;
mod remote;
mod summary;

pub type ResultInventory<T> = Result<T, InventoryError>;
