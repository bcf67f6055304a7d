//! Ledger records and their row layout.

use std::fmt;

use chrono::{Days, NaiveDate};
use serde_json::Value;

/// Date format written to the ledger.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Day zero of spreadsheet date serial numbers.
const SERIAL_EPOCH: NaiveDate = match NaiveDate::from_ymd_opt(1899, 12, 30) {
    Some(date) => date,
    None => NaiveDate::MIN,
};

/// Column headers of a ledger tab, in order.
pub const HEADER: [&str; 8] = [
    "Date",
    "Animal Type",
    "Size",
    "Quantity",
    "Notes",
    "Receipt URL",
    "Vendor",
    "Receipt Number",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Inbound,
    Outbound,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Inbound, Direction::Outbound];

    /// Identifier used in configuration keys, form ids and routes.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of an appended row, as reported by the ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordId(pub String);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Shareable link to an uploaded receipt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShareableLink(pub String);

impl fmt::Display for ShareableLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One inbound or outbound movement of animals.
#[derive(Clone, Debug, PartialEq)]
pub struct TransactionRecord {
    pub date: NaiveDate,
    pub animal_type: String,
    pub category: String,
    pub quantity: u32,
    pub notes: Option<String>,
    pub receipt_url: Option<String>,
    pub vendor: Option<String>,
    pub receipt_number: Option<String>,
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum RowError {
    #[error("row has {0} cells, at least 4 are required")]
    TooShort(usize),
    #[error("invalid date {0:?}")]
    Date(String),
    #[error("invalid quantity {0:?}")]
    Quantity(String),
    #[error("missing {0}")]
    Missing(&'static str),
}

impl TransactionRecord {
    /// Cells in [`HEADER`] order, to be stored as given: the quantity is a
    /// number, every other cell text. Optional values become empty strings.
    pub fn to_row(&self) -> Vec<Value> {
        let text = |value: &Option<String>| Value::from(value.clone().unwrap_or_default());
        vec![
            Value::from(self.date.format(DATE_FORMAT).to_string()),
            Value::from(self.animal_type.clone()),
            Value::from(self.category.clone()),
            Value::from(self.quantity),
            text(&self.notes),
            text(&self.receipt_url),
            text(&self.vendor),
            text(&self.receipt_number),
        ]
    }

    /// Parse a row read back from the ledger. Missing trailing cells are
    /// treated as empty.
    pub fn from_row<S: AsRef<str>>(cells: &[S]) -> Result<Self, RowError> {
        if cells.len() < 4 {
            return Err(RowError::TooShort(cells.len()));
        }
        let cell = |idx: usize| cells.get(idx).map(|c| c.as_ref().trim()).unwrap_or("");
        let optional = |idx: usize| Some(cell(idx)).filter(|s| !s.is_empty()).map(String::from);

        let date = parse_date(cell(0)).ok_or_else(|| RowError::Date(cell(0).to_string()))?;
        let animal_type = optional(1).ok_or(RowError::Missing("animal type"))?;
        let category = optional(2).ok_or(RowError::Missing("size"))?;
        let quantity = parse_quantity(cell(3))
            .ok_or_else(|| RowError::Quantity(cell(3).to_string()))?;

        Ok(Self {
            date,
            animal_type,
            category,
            quantity,
            notes: optional(4),
            receipt_url: optional(5),
            vendor: optional(6),
            receipt_number: optional(7),
        })
    }
}

/// ISO dates as written by [`TransactionRecord::to_row`], or the serial
/// number of a date cell entered by hand. Locale formats such as `6/2/2025`
/// are ambiguous and rejected.
fn parse_date(value: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(value, DATE_FORMAT) {
        return Some(date);
    }
    let serial = value.parse::<f64>().ok().filter(|s| s.is_finite() && *s >= 1.0)?;
    SERIAL_EPOCH.checked_add_days(Days::new(serial.floor() as u64))
}

/// Accepts plain integers and integral floats ("5", "5.0"), which is how the
/// spreadsheet may render a number column.
fn parse_quantity(value: &str) -> Option<u32> {
    if let Ok(qty) = value.parse::<u32>() {
        return Some(qty);
    }
    let float = value.parse::<f64>().ok()?;
    if float.fract() == 0.0 && float >= 0.0 && float <= f64::from(u32::MAX) {
        Some(float as u32)
    } else {
        None
    }
}
