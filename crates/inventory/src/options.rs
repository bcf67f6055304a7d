//! The form options and texts the controller and pages are built from.

use crate::{
    AnimalCategory, ConfigStore, DayOption, Direction, MessageKind, ResultInventory,
};

/// Everything a form needs to know about the current configuration,
/// independent of how that configuration is stored.
pub trait OptionsProvider: Send + Sync {
    fn animal_types(&self) -> ResultInventory<Vec<String>>;
    fn categories_for(&self, animal_type: &str) -> ResultInventory<Vec<AnimalCategory>>;
    fn vendors_for(&self, animal_type: &str) -> ResultInventory<Vec<String>>;
    fn day_options(&self, direction: Direction) -> ResultInventory<Vec<DayOption>>;
    fn form_title(&self, form_id: &str) -> ResultInventory<String>;
    fn label_for(&self, form_id: &str, field_id: &str) -> ResultInventory<String>;
    fn message(&self, kind: MessageKind) -> ResultInventory<String>;

    /// Message text, or `fallback` when the labels cannot be loaded.
    fn message_or(&self, kind: MessageKind, fallback: &str) -> String {
        self.message(kind).unwrap_or_else(|err| {
            tracing::error!("failed to load message {kind:?}: {err}");
            fallback.to_string()
        })
    }
}

impl OptionsProvider for ConfigStore {
    fn animal_types(&self) -> ResultInventory<Vec<String>> {
        ConfigStore::animal_types(self)
    }

    fn categories_for(&self, animal_type: &str) -> ResultInventory<Vec<AnimalCategory>> {
        ConfigStore::categories_for(self, animal_type)
    }

    fn vendors_for(&self, animal_type: &str) -> ResultInventory<Vec<String>> {
        ConfigStore::vendors_for(self, animal_type)
    }

    fn day_options(&self, direction: Direction) -> ResultInventory<Vec<DayOption>> {
        ConfigStore::day_options(self, direction)
    }

    fn form_title(&self, form_id: &str) -> ResultInventory<String> {
        ConfigStore::form_title(self, form_id)
    }

    fn label_for(&self, form_id: &str, field_id: &str) -> ResultInventory<String> {
        ConfigStore::label_for(self, form_id, field_id)
    }

    fn message(&self, kind: MessageKind) -> ResultInventory<String> {
        ConfigStore::message(self, kind)
    }
}
