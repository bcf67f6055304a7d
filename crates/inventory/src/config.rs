//! Static configuration documents and their read-through cache.
//!
//! Four JSON documents live in the configuration directory, one per
//! [`ConfigCategory`]. Each is parsed into a typed record the first time it
//! is requested and kept for the lifetime of the [`ConfigStore`]. There is
//! no invalidation: editing a file requires restarting the process.

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use chrono::{Days, NaiveDate};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{Direction, InventoryError, ResultInventory};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConfigCategory {
    Vendors,
    Animals,
    Sheets,
    UiLabels,
}

impl ConfigCategory {
    pub const ALL: [ConfigCategory; 4] = [
        ConfigCategory::Vendors,
        ConfigCategory::Animals,
        ConfigCategory::Sheets,
        ConfigCategory::UiLabels,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Self::Vendors => "vendors.json",
            Self::Animals => "animals.json",
            Self::Sheets => "sheets.json",
            Self::UiLabels => "ui_labels.json",
        }
    }
}

impl fmt::Display for ConfigCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Vendor names per animal type, in display order.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VendorConfig {
    pub vendors: BTreeMap<String, Vec<String>>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnimalCategory {
    pub name: String,
    /// Nominal live weight in kilograms, used for estimates.
    pub weight: f64,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnimalType {
    pub name: String,
    pub categories: Vec<AnimalCategory>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnimalConfig {
    pub animal_types: Vec<AnimalType>,
}

/// A value configured separately for each [`Direction`].
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PerDirection<T> {
    pub inbound: T,
    pub outbound: T,
}

impl<T> PerDirection<T> {
    pub fn get(&self, direction: Direction) -> &T {
        match direction {
            Direction::Inbound => &self.inbound,
            Direction::Outbound => &self.outbound,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SheetConfig {
    pub sheet_names: PerDirection<String>,
    /// "Hari H" reference date of each form.
    pub date_config: PerDirection<NaiveDate>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormLabels {
    pub title: String,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
    Validation,
    InvalidQuantity,
    UploadFailed,
    NoData,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Messages {
    pub success: String,
    pub error: String,
    pub validation: String,
    pub invalid_quantity: String,
    pub upload_failed: String,
    pub no_data: String,
}

impl Messages {
    pub fn get(&self, kind: MessageKind) -> &str {
        match kind {
            MessageKind::Success => &self.success,
            MessageKind::Error => &self.error,
            MessageKind::Validation => &self.validation,
            MessageKind::InvalidQuantity => &self.invalid_quantity,
            MessageKind::UploadFailed => &self.upload_failed,
            MessageKind::NoData => &self.no_data,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UiLabels {
    pub forms: BTreeMap<String, FormLabels>,
    pub messages: Messages,
}

/// A parsed configuration document.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigDocument {
    Vendors(VendorConfig),
    Animals(AnimalConfig),
    Sheets(SheetConfig),
    UiLabels(UiLabels),
}

impl ConfigDocument {
    pub fn category(&self) -> ConfigCategory {
        match self {
            Self::Vendors(_) => ConfigCategory::Vendors,
            Self::Animals(_) => ConfigCategory::Animals,
            Self::Sheets(_) => ConfigCategory::Sheets,
            Self::UiLabels(_) => ConfigCategory::UiLabels,
        }
    }

    fn parse(category: ConfigCategory, raw: &str) -> ResultInventory<Self> {
        Ok(match category {
            ConfigCategory::Vendors => Self::Vendors(parse_json(category, raw)?),
            ConfigCategory::Animals => {
                let animals: AnimalConfig = parse_json(category, raw)?;
                check_animals(&animals)?;
                Self::Animals(animals)
            }
            ConfigCategory::Sheets => Self::Sheets(parse_json(category, raw)?),
            ConfigCategory::UiLabels => Self::UiLabels(parse_json(category, raw)?),
        })
    }
}

fn parse_json<T: DeserializeOwned>(category: ConfigCategory, raw: &str) -> ResultInventory<T> {
    serde_json::from_str(raw).map_err(|err| InventoryError::ConfigParse {
        file: category.file_name().to_string(),
        reason: err.to_string(),
    })
}

fn check_animals(animals: &AnimalConfig) -> ResultInventory<()> {
    let invalid = |reason: String| InventoryError::ConfigParse {
        file: ConfigCategory::Animals.file_name().to_string(),
        reason,
    };
    if animals.animal_types.is_empty() {
        return Err(invalid("no animal types defined".to_string()));
    }
    for animal in &animals.animal_types {
        if animal.categories.is_empty() {
            return Err(invalid(format!("animal type {} has no categories", animal.name)));
        }
        if let Some(bad) = animal.categories.iter().find(|c| !(c.weight >= 0.0)) {
            return Err(invalid(format!(
                "category {} of {} has a negative weight",
                bad.name, animal.name
            )));
        }
    }
    Ok(())
}

/// Where configuration documents are read from.
pub trait ConfigSource: Send + Sync {
    fn read(&self, category: ConfigCategory) -> ResultInventory<String>;
}

/// Reads `<root>/<category file name>` from disk.
#[derive(Clone, Debug)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl ConfigSource for DirectorySource {
    fn read(&self, category: ConfigCategory) -> ResultInventory<String> {
        let path = self.root.join(category.file_name());
        std::fs::read_to_string(&path).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => InventoryError::ConfigNotFound(path),
            _ => InventoryError::ConfigParse {
                file: category.file_name().to_string(),
                reason: err.to_string(),
            },
        })
    }
}

/// A selectable day relative to the "Hari H" reference date.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DayOption {
    pub label: String,
    pub date: NaiveDate,
}

const DAY_OFFSETS: [(&str, i64); 6] = [
    ("H-4", -4),
    ("H-3", -3),
    ("H-1", -1),
    ("H", 0),
    ("H+1", 1),
    ("H+2", 2),
];

pub(crate) fn day_options_from(hari_h: NaiveDate) -> Vec<DayOption> {
    DAY_OFFSETS
        .iter()
        .filter_map(|(label, offset)| {
            let days = Days::new(offset.unsigned_abs());
            let date = if *offset < 0 {
                hari_h.checked_sub_days(days)
            } else {
                hari_h.checked_add_days(days)
            }?;
            Some(DayOption {
                label: (*label).to_string(),
                date,
            })
        })
        .collect()
}

/// Read-through cache over a [`ConfigSource`].
///
/// Constructed once at startup and shared behind an `Arc`.
pub struct ConfigStore {
    source: Box<dyn ConfigSource>,
    cache: Mutex<HashMap<ConfigCategory, Arc<ConfigDocument>>>,
}

impl fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigStore").finish_non_exhaustive()
    }
}

impl ConfigStore {
    pub fn new(source: impl ConfigSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Store backed by JSON files in `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(DirectorySource::new(dir))
    }

    /// Return the document for `category`, loading it on first access.
    pub fn get(&self, category: ConfigCategory) -> ResultInventory<Arc<ConfigDocument>> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(doc) = cache.get(&category) {
            return Ok(Arc::clone(doc));
        }

        let raw = self.source.read(category)?;
        let doc = Arc::new(ConfigDocument::parse(category, &raw)?);
        tracing::debug!("loaded configuration {category}");
        cache.insert(category, Arc::clone(&doc));
        Ok(doc)
    }

    /// Load every category so schema errors surface at startup.
    pub fn preload(&self) -> ResultInventory<()> {
        for category in ConfigCategory::ALL {
            self.get(category)?;
        }
        Ok(())
    }

    fn with_document<T>(
        &self,
        category: ConfigCategory,
        f: impl FnOnce(&ConfigDocument) -> Option<T>,
    ) -> ResultInventory<T> {
        let doc = self.get(category)?;
        f(&doc).ok_or_else(|| InventoryError::ConfigParse {
            file: category.file_name().to_string(),
            reason: format!("expected {category}, found {}", doc.category()),
        })
    }

    pub fn vendors(&self) -> ResultInventory<VendorConfig> {
        self.with_document(ConfigCategory::Vendors, |doc| match doc {
            ConfigDocument::Vendors(v) => Some(v.clone()),
            _ => None,
        })
    }

    pub fn animals(&self) -> ResultInventory<AnimalConfig> {
        self.with_document(ConfigCategory::Animals, |doc| match doc {
            ConfigDocument::Animals(a) => Some(a.clone()),
            _ => None,
        })
    }

    pub fn sheets(&self) -> ResultInventory<SheetConfig> {
        self.with_document(ConfigCategory::Sheets, |doc| match doc {
            ConfigDocument::Sheets(s) => Some(s.clone()),
            _ => None,
        })
    }

    pub fn ui_labels(&self) -> ResultInventory<UiLabels> {
        self.with_document(ConfigCategory::UiLabels, |doc| match doc {
            ConfigDocument::UiLabels(l) => Some(l.clone()),
            _ => None,
        })
    }

    pub fn animal_types(&self) -> ResultInventory<Vec<String>> {
        Ok(self
            .animals()?
            .animal_types
            .into_iter()
            .map(|a| a.name)
            .collect())
    }

    /// Vendors of `animal_type`, empty when none are configured.
    pub fn vendors_for(&self, animal_type: &str) -> ResultInventory<Vec<String>> {
        Ok(self
            .vendors()?
            .vendors
            .remove(animal_type)
            .unwrap_or_default())
    }

    /// Categories of `animal_type`, empty when the type is unknown.
    pub fn categories_for(&self, animal_type: &str) -> ResultInventory<Vec<AnimalCategory>> {
        Ok(self
            .animals()?
            .animal_types
            .into_iter()
            .find(|a| a.name == animal_type)
            .map(|a| a.categories)
            .unwrap_or_default())
    }

    pub fn sheet_name_for(&self, direction: Direction) -> ResultInventory<String> {
        Ok(self.sheets()?.sheet_names.get(direction).clone())
    }

    pub fn hari_h(&self, direction: Direction) -> ResultInventory<NaiveDate> {
        Ok(*self.sheets()?.date_config.get(direction))
    }

    pub fn day_options(&self, direction: Direction) -> ResultInventory<Vec<DayOption>> {
        Ok(day_options_from(self.hari_h(direction)?))
    }

    /// Display text of a form field; the field id itself when unlabelled.
    pub fn label_for(&self, form_id: &str, field_id: &str) -> ResultInventory<String> {
        let labels = self.ui_labels()?;
        Ok(labels
            .forms
            .get(form_id)
            .and_then(|form| form.fields.get(field_id))
            .cloned()
            .unwrap_or_else(|| field_id.to_string()))
    }

    pub fn form_title(&self, form_id: &str) -> ResultInventory<String> {
        let labels = self.ui_labels()?;
        Ok(labels
            .forms
            .get(form_id)
            .map(|form| form.title.clone())
            .unwrap_or_else(|| form_id.to_string()))
    }

    pub fn message(&self, kind: MessageKind) -> ResultInventory<String> {
        Ok(self.ui_labels()?.messages.get(kind).to_string())
    }
}
