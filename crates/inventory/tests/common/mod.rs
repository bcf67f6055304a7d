#![allow(dead_code)]

use std::{
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use inventory::{ConfigCategory, ConfigSource, DirectorySource, ResultInventory};

pub const VENDORS: &str = r#"{
    "vendors": {
        "Goat": ["Pak Budi", "Bu Sari"],
        "Cow": ["Haji Umar"]
    }
}"#;

pub const ANIMALS: &str = r#"{
    "animal_types": [
        {"name": "Goat", "categories": [
            {"name": "Small", "weight": 23.0},
            {"name": "Large", "weight": 35.5}
        ]},
        {"name": "Cow", "categories": [
            {"name": "A", "weight": 250.0}
        ]}
    ]
}"#;

pub const SHEETS: &str = r#"{
    "sheet_names": {"inbound": "Inbound", "outbound": "Outbound"},
    "date_config": {"inbound": "2025-06-06", "outbound": "2025-06-07"}
}"#;

pub const UI_LABELS: &str = r#"{
    "forms": {
        "inbound": {"title": "Animals in", "fields": {"quantity": "How many"}},
        "outbound": {"title": "Animals out"}
    },
    "messages": {
        "success": "Saved",
        "error": "Something went wrong",
        "validation": "Check the form",
        "invalid_quantity": "Quantity must be at least 1",
        "upload_failed": "Receipt upload failed",
        "no_data": "Nothing recorded yet"
    }
}"#;

/// Write the four configuration documents into `dir`.
pub fn write_config(dir: &Path) {
    for (category, body) in [
        (ConfigCategory::Vendors, VENDORS),
        (ConfigCategory::Animals, ANIMALS),
        (ConfigCategory::Sheets, SHEETS),
        (ConfigCategory::UiLabels, UI_LABELS),
    ] {
        std::fs::write(dir.join(category.file_name()), body).unwrap();
    }
}

/// Directory source that counts reads.
#[derive(Clone)]
pub struct CountingSource {
    inner: DirectorySource,
    pub reads: Arc<AtomicUsize>,
}

impl CountingSource {
    pub fn new(dir: &Path) -> Self {
        Self {
            inner: DirectorySource::new(dir),
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl ConfigSource for CountingSource {
    fn read(&self, category: ConfigCategory) -> ResultInventory<String> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read(category)
    }
}
