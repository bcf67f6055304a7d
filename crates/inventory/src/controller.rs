//! Form submission and dashboard logic.
//!
//! A submission moves through `Idle → Submitting → (Success | Failed)` and
//! is reset to `Idle` afterwards. Validation failures go straight back to
//! `Idle` with a notice, before any remote service is contacted.

use std::{fmt, sync::Arc};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::{
    AggregateSummary, Direction, InventoryError, LedgerClient, MessageKind, OptionsProvider,
    ReceiptStore, RecordId, ResultInventory, ShareableLink, TransactionRecord,
};

/// Deployment environment. Development marks success messages with
/// `(DEV)` and allows running without Google credentials.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => f.write_str("development"),
            Self::Production => f.write_str("production"),
        }
    }
}

/// An uploaded receipt attached to a submission.
#[derive(Clone, Debug, PartialEq)]
pub struct ReceiptFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Raw values of a submitted form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubmitForm {
    pub animal_type: String,
    pub category: String,
    pub vendor: Option<String>,
    /// Signed so that non-positive input reaches validation.
    pub quantity: i64,
    /// Label of one of the direction's day options.
    pub day: String,
    pub notes: Option<String>,
    pub receipt_number: Option<String>,
    pub receipt: Option<ReceiptFile>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SubmissionState {
    Idle {
        notice: Option<String>,
    },
    Submitting,
    Success {
        record_id: RecordId,
        receipt: Option<ShareableLink>,
        message: String,
    },
    Failed {
        message: String,
        /// Set when the receipt was stored but the ledger append failed.
        receipt: Option<ShareableLink>,
    },
}

impl Default for SubmissionState {
    fn default() -> Self {
        Self::Idle { notice: None }
    }
}

impl SubmissionState {
    /// User-visible text of the state, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Idle { notice } => notice.as_deref(),
            Self::Submitting => None,
            Self::Success { message, .. } | Self::Failed { message, .. } => Some(message),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Start a submission from `Idle`; any other state is left unchanged.
    pub fn begin(self) -> Self {
        match self {
            Self::Idle { .. } => Self::Submitting,
            other => other,
        }
    }

    /// Back to `Idle` once the outcome has been shown.
    pub fn reset(self) -> Self {
        Self::default()
    }
}

/// Result of rendering the dashboard.
#[derive(Clone, Debug, PartialEq)]
pub enum DashboardView {
    Ready(AggregateSummary),
    Failed { message: String },
}

pub struct FormController {
    options: Arc<dyn OptionsProvider>,
    ledger: Arc<dyn LedgerClient>,
    receipts: Arc<dyn ReceiptStore>,
    environment: Environment,
    timezone: Tz,
}

impl fmt::Debug for FormController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormController")
            .field("environment", &self.environment)
            .field("timezone", &self.timezone)
            .finish_non_exhaustive()
    }
}

impl FormController {
    pub fn new(
        options: Arc<dyn OptionsProvider>,
        ledger: Arc<dyn LedgerClient>,
        receipts: Arc<dyn ReceiptStore>,
    ) -> Self {
        Self {
            options,
            ledger,
            receipts,
            environment: Environment::default(),
            timezone: chrono_tz::Asia::Jakarta,
        }
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Timezone used to timestamp receipts without a receipt number.
    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn options(&self) -> &Arc<dyn OptionsProvider> {
        &self.options
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub async fn submit(&self, direction: Direction, form: SubmitForm) -> SubmissionState {
        let state = SubmissionState::default().begin();
        tracing::debug!("{direction} submission: {state:?}");

        let record = match self.validate(direction, &form) {
            Ok(record) => record,
            Err(InventoryError::Validation(notice)) => {
                tracing::debug!("{direction} submission rejected: {notice}");
                return SubmissionState::Idle {
                    notice: Some(notice),
                };
            }
            Err(err) => return self.failed(MessageKind::Error, &err, None),
        };

        let state = self.persist(direction, record, form).await;
        match &state {
            SubmissionState::Success { record_id, .. } => {
                tracing::info!("{direction} record appended at {record_id}");
            }
            SubmissionState::Failed { message, .. } => {
                tracing::error!("{direction} submission failed: {message}");
            }
            _ => {}
        }
        state
    }

    async fn persist(
        &self,
        direction: Direction,
        mut record: TransactionRecord,
        form: SubmitForm,
    ) -> SubmissionState {
        let receipt = match form.receipt {
            Some(file) => {
                let name = receipt_file_name(
                    direction,
                    form.receipt_number.as_deref(),
                    &file.file_name,
                    Utc::now().with_timezone(&self.timezone),
                );
                match self.receipts.upload(file.bytes, &name).await {
                    Ok(link) => Some(link),
                    Err(err) => return self.failed(MessageKind::UploadFailed, &err, None),
                }
            }
            None => None,
        };
        record.receipt_url = receipt.as_ref().map(|link| link.0.clone());

        match self.ledger.append(direction, &record).await {
            Ok(record_id) => SubmissionState::Success {
                record_id,
                receipt,
                message: self.success_message(),
            },
            Err(err) => self.failed(MessageKind::Error, &err, receipt),
        }
    }

    /// Check the form against the current configuration and build the
    /// record to append.
    fn validate(&self, direction: Direction, form: &SubmitForm) -> ResultInventory<TransactionRecord> {
        let quantity = u32::try_from(form.quantity)
            .ok()
            .filter(|q| *q > 0)
            .ok_or_else(|| {
                InventoryError::Validation(
                    self.options
                        .message_or(MessageKind::InvalidQuantity, "quantity must be positive"),
                )
            })?;

        let invalid = |field: &str, value: &str| {
            let text = self
                .options
                .message_or(MessageKind::Validation, "invalid input");
            InventoryError::Validation(format!("{text} ({field}: {value})"))
        };

        let animal_type = form.animal_type.trim();
        if !self.options.animal_types()?.iter().any(|a| a == animal_type) {
            return Err(invalid("animal_type", animal_type));
        }

        let category = form.category.trim();
        if !self
            .options
            .categories_for(animal_type)?
            .iter()
            .any(|c| c.name == category)
        {
            return Err(invalid("category", category));
        }

        let vendor = normalize_optional_text(form.vendor.as_deref());
        if let Some(vendor) = &vendor
            && !self.options.vendors_for(animal_type)?.contains(vendor)
        {
            return Err(invalid("vendor", vendor));
        }

        let day = form.day.trim();
        let date = self
            .options
            .day_options(direction)?
            .into_iter()
            .find(|d| d.label == day)
            .map(|d| d.date)
            .ok_or_else(|| invalid("day", day))?;

        Ok(TransactionRecord {
            date,
            animal_type: animal_type.to_string(),
            category: category.to_string(),
            quantity,
            notes: normalize_optional_text(form.notes.as_deref()),
            receipt_url: None,
            vendor,
            receipt_number: normalize_optional_text(form.receipt_number.as_deref()),
        })
    }

    fn success_message(&self) -> String {
        let mut message = self.options.message_or(MessageKind::Success, "saved");
        if self.environment == Environment::Development {
            message.push_str(" (DEV)");
        }
        message
    }

    fn failed(
        &self,
        kind: MessageKind,
        err: &InventoryError,
        receipt: Option<ShareableLink>,
    ) -> SubmissionState {
        let text = self.options.message_or(kind, "request failed");
        let message = match &receipt {
            Some(link) => format!("{text}: {err} (receipt already uploaded: {link})"),
            None => format!("{text}: {err}"),
        };
        SubmissionState::Failed { message, receipt }
    }

    /// Read both ledger tabs and aggregate them.
    pub async fn dashboard(&self) -> DashboardView {
        let rows = async {
            let inbound = self.ledger.list_all(Direction::Inbound).await?;
            let outbound = self.ledger.list_all(Direction::Outbound).await?;
            Ok::<_, InventoryError>((inbound, outbound))
        };

        match rows.await {
            Ok((inbound, outbound)) => {
                DashboardView::Ready(AggregateSummary::from_records(&inbound, &outbound))
            }
            Err(err) => {
                tracing::error!("failed to load dashboard: {err}");
                let text = self.options.message_or(MessageKind::Error, "request failed");
                DashboardView::Failed {
                    message: format!("{text}: {err}"),
                }
            }
        }
    }
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Name a receipt after its receipt number, or after the direction and the
/// upload time when no number was given. The extension of the original file
/// is kept, `jpg` when it has none.
pub fn receipt_file_name(
    direction: Direction,
    receipt_number: Option<&str>,
    original_name: &str,
    now: DateTime<Tz>,
) -> String {
    let extension = original_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
        .unwrap_or("jpg");

    match normalize_optional_text(receipt_number) {
        Some(number) => format!("{}.{extension}", number.replace(['/', '\\'], "-")),
        None => format!(
            "nota_{}_{}.{extension}",
            direction,
            now.format("%Y%m%d_%H%M%S")
        ),
    }
}
