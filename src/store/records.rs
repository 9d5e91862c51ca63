//! Record operations
//!
//! Journals, fuel deviations and profile values. Every operation builds the
//! replacement record and hands it to `update_state`, so persistence and
//! notification behave exactly as for any other partial update. Operations
//! that produce a record return it together with the `SaveStatus` of the
//! write.

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::error::{StoreError, StoreResult};
use super::{AppStore, SaveStatus};
use crate::state::{
    Deviation, DeviationKind, DimensionType, JournalEntry, Mood, StatePatch,
};

/// Input for creating or replacing a journal entry
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct JournalDraft {
    pub title: Option<String>,
    pub content: String,
    pub mood: Mood,
    pub tags: Vec<String>,
    pub linked_dimensions: Vec<DimensionType>,
}

impl JournalDraft {
    pub fn new(content: impl Into<String>, mood: Mood) -> Self {
        Self {
            content: content.into(),
            mood,
            ..Default::default()
        }
    }

    /// Builder method: set the title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Builder method: add a tag
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Builder method: link a dimension
    pub fn linked(mut self, dimension: DimensionType) -> Self {
        self.linked_dimensions.push(dimension);
        self
    }

    fn into_entry(self, id: String, timestamp: i64, attachments: Vec<String>) -> JournalEntry {
        let title = self
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let mut tags: Vec<String> = Vec::new();
        for tag in self.tags {
            let tag = tag.trim().to_string();
            if !tag.is_empty() && !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        let mut linked: Vec<DimensionType> = Vec::new();
        for dim in self.linked_dimensions {
            if !linked.contains(&dim) {
                linked.push(dim);
            }
        }

        JournalEntry {
            id,
            timestamp,
            title,
            content: self.content,
            mood: self.mood,
            tags,
            attachments,
            linked_dimensions: Some(linked),
        }
    }
}

/// Input for logging a diet deviation
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct DeviationDraft {
    pub description: String,
    pub calories: Option<f64>,
    #[serde(rename = "type")]
    pub kind: DeviationKind,
}

impl DeviationDraft {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Default::default()
        }
    }

    /// Builder method: set calories
    pub fn calories(mut self, calories: f64) -> Self {
        self.calories = Some(calories);
        self
    }

    /// Builder method: set the deviation type
    pub fn kind(mut self, kind: DeviationKind) -> Self {
        self.kind = kind;
        self
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

impl AppStore {
    /// Journal entry by id
    pub fn journal(&self, id: &str) -> Option<&JournalEntry> {
        self.state().journals.iter().find(|j| j.id == id)
    }

    /// Create a journal entry and put it first
    pub fn add_journal(&mut self, draft: JournalDraft) -> StoreResult<(JournalEntry, SaveStatus)> {
        if draft.content.trim().is_empty() {
            return Err(StoreError::EmptyContent);
        }

        let entry = draft.into_entry(Uuid::new_v4().to_string(), now_millis(), Vec::new());

        let mut journals = Vec::with_capacity(self.state().journals.len() + 1);
        journals.push(entry.clone());
        journals.extend(self.state().journals.iter().cloned());
        let save = self.update_state(StatePatch::default().journals(journals));

        tracing::info!(journal_id = %entry.id, mood = %entry.mood, "Journal entry added");
        Ok((entry, save))
    }

    /// Replace a journal entry, keeping its id, timestamp and attachments
    pub fn update_journal(
        &mut self,
        id: &str,
        draft: JournalDraft,
    ) -> StoreResult<(JournalEntry, SaveStatus)> {
        if draft.content.trim().is_empty() {
            return Err(StoreError::EmptyContent);
        }

        let existing = self
            .journal(id)
            .ok_or_else(|| StoreError::journal_not_found(id))?;
        let entry = draft.into_entry(
            existing.id.clone(),
            existing.timestamp,
            existing.attachments.clone(),
        );

        let journals = self
            .state()
            .journals
            .iter()
            .map(|j| if j.id == id { entry.clone() } else { j.clone() })
            .collect();
        let save = self.update_state(StatePatch::default().journals(journals));

        tracing::info!(journal_id = %id, "Journal entry replaced");
        Ok((entry, save))
    }

    /// Delete a journal entry
    pub fn remove_journal(&mut self, id: &str) -> StoreResult<(JournalEntry, SaveStatus)> {
        let removed = self
            .journal(id)
            .cloned()
            .ok_or_else(|| StoreError::journal_not_found(id))?;

        let journals = self
            .state()
            .journals
            .iter()
            .filter(|j| j.id != id)
            .cloned()
            .collect();
        let save = self.update_state(StatePatch::default().journals(journals));

        tracing::info!(journal_id = %id, "Journal entry removed");
        Ok((removed, save))
    }

    /// Log a diet deviation and put it first
    pub fn add_deviation(&mut self, draft: DeviationDraft) -> StoreResult<(Deviation, SaveStatus)> {
        if draft.description.trim().is_empty() {
            return Err(StoreError::EmptyContent);
        }

        let deviation = Deviation {
            id: Uuid::new_v4().to_string(),
            timestamp: now_millis(),
            description: draft.description,
            calories: draft.calories,
            kind: draft.kind,
        };

        let mut fuel = self.state().fuel_system.clone();
        fuel.deviations.insert(0, deviation.clone());
        let save = self.update_state(StatePatch::default().fuel_system(fuel));

        tracing::info!(deviation_id = %deviation.id, "Deviation logged");
        Ok((deviation, save))
    }

    /// Delete a diet deviation
    pub fn remove_deviation(&mut self, id: &str) -> StoreResult<(Deviation, SaveStatus)> {
        let mut fuel = self.state().fuel_system.clone();
        let index = fuel
            .deviations
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| StoreError::deviation_not_found(id))?;
        let removed = fuel.deviations.remove(index);
        let save = self.update_state(StatePatch::default().fuel_system(fuel));

        tracing::info!(deviation_id = %id, "Deviation removed");
        Ok((removed, save))
    }

    /// Replace the diet baseline text
    pub fn set_baseline(&mut self, baseline: impl Into<String>) -> SaveStatus {
        let mut fuel = self.state().fuel_system.clone();
        fuel.baseline = baseline.into();
        self.update_state(StatePatch::default().fuel_system(fuel))
    }

    /// Append a personal value
    pub fn add_value(&mut self, value: &str) -> StoreResult<SaveStatus> {
        let value = value.trim();
        if value.is_empty() {
            return Err(StoreError::EmptyContent);
        }
        if self.state().user.values.iter().any(|v| v == value) {
            return Err(StoreError::DuplicateValue(value.to_string()));
        }

        let mut user = self.state().user.clone();
        user.values.push(value.to_string());
        Ok(self.update_state(StatePatch::default().user(user)))
    }

    /// Remove a personal value
    pub fn remove_value(&mut self, value: &str) -> StoreResult<SaveStatus> {
        let mut user = self.state().user.clone();
        let before = user.values.len();
        user.values.retain(|v| v != value);
        if user.values.len() == before {
            return Err(StoreError::NotFound {
                kind: "Value",
                id: value.to_string(),
            });
        }
        Ok(self.update_state(StatePatch::default().user(user)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{AppState, StatePatch};
    use crate::storage::MemoryStorage;

    fn store() -> AppStore {
        AppStore::load(MemoryStorage::new())
    }

    fn entry(id: &str) -> JournalEntry {
        JournalEntry {
            id: id.to_string(),
            timestamp: 1_700_000_000_000,
            title: None,
            content: format!("entry {}", id),
            mood: Mood::Neutral,
            tags: Vec::new(),
            attachments: Vec::new(),
            linked_dimensions: None,
        }
    }

    #[test]
    fn test_add_journal_to_empty_list() {
        let mut store = store();
        let before = Utc::now().timestamp_millis();

        let (added, save) = store.add_journal(JournalDraft::new("test", Mood::Good)).unwrap();
        assert!(save.is_saved());

        let journals = &store.state().journals;
        assert_eq!(journals.len(), 1);
        assert_eq!(journals[0].content, "test");
        assert_eq!(journals[0].mood, Mood::Good);
        assert!(!journals[0].id.is_empty());
        assert!(journals[0].timestamp >= before);
        assert!(journals[0].timestamp <= Utc::now().timestamp_millis());
        assert_eq!(journals[0], added);
    }

    #[test]
    fn test_add_journal_prepends_with_unique_ids() {
        let mut store = store();
        let (first, _) = store.add_journal(JournalDraft::new("one", Mood::Good)).unwrap();
        let (second, _) = store.add_journal(JournalDraft::new("two", Mood::Bad)).unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(store.state().journals[0].id, second.id);
        assert_eq!(store.state().journals[1].id, first.id);
    }

    #[test]
    fn test_add_journal_rejects_blank() {
        let mut store = store();
        assert_eq!(
            store.add_journal(JournalDraft::new("   ", Mood::Good)),
            Err(StoreError::EmptyContent)
        );
        assert!(store.state().journals.is_empty());
    }

    #[test]
    fn test_add_journal_normalizes_draft() {
        let mut store = store();
        let draft = JournalDraft::new("walked by the river", Mood::Great)
            .title("  ")
            .tag(" outdoors ")
            .tag("outdoors")
            .tag("")
            .linked(DimensionType::Physical)
            .linked(DimensionType::Physical);

        let (added, _) = store.add_journal(draft).unwrap();
        assert_eq!(added.title, None);
        assert_eq!(added.tags, vec!["outdoors".to_string()]);
        assert_eq!(added.linked_dimensions, Some(vec![DimensionType::Physical]));
    }

    #[test]
    fn test_remove_journal_by_id() {
        let mut store = store();
        store.update_state(StatePatch::default().journals(vec![entry("a"), entry("b")]));

        let (removed, _) = store.remove_journal("a").unwrap();
        assert_eq!(removed.id, "a");
        assert_eq!(store.state().journals, vec![entry("b")]);

        assert!(matches!(
            store.remove_journal("a"),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_update_journal_keeps_identity() {
        let mut store = store();
        store.update_state(StatePatch::default().journals(vec![entry("a"), entry("b")]));

        let (updated, _) = store
            .update_journal("b", JournalDraft::new("rewritten", Mood::Great).title("Evening"))
            .unwrap();

        assert_eq!(updated.id, "b");
        assert_eq!(updated.timestamp, 1_700_000_000_000);
        assert_eq!(store.state().journals[1].content, "rewritten");
        assert_eq!(store.state().journals[1].title.as_deref(), Some("Evening"));
        assert_eq!(store.state().journals[0], entry("a"));

        assert!(store
            .update_journal("missing", JournalDraft::new("x", Mood::Good))
            .is_err());
    }

    #[test]
    fn test_deviations() {
        let mut store = store();
        let (first, _) = store.add_deviation(DeviationDraft::new("skipped lunch")).unwrap();
        let (second, _) = store
            .add_deviation(
                DeviationDraft::new("party")
                    .calories(900.0)
                    .kind(DeviationKind::Excess),
            )
            .unwrap();

        let deviations = &store.state().fuel_system.deviations;
        assert_eq!(deviations.len(), 2);
        assert_eq!(deviations[0].id, second.id);
        assert_eq!(deviations[0].kind, DeviationKind::Excess);
        assert_eq!(deviations[1].kind, DeviationKind::Other);

        store.remove_deviation(&first.id).unwrap();
        assert_eq!(store.state().fuel_system.deviations.len(), 1);
        assert!(store.add_deviation(DeviationDraft::new("")).is_err());
    }

    #[test]
    fn test_baseline_keeps_deviations() {
        let mut store = store();
        store.add_deviation(DeviationDraft::new("late snack")).unwrap();
        store.set_baseline("three meals, no sugar");

        assert_eq!(store.state().fuel_system.baseline, "three meals, no sugar");
        assert_eq!(store.state().fuel_system.deviations.len(), 1);
    }

    #[test]
    fn test_profile_values() {
        let mut store = store();
        store.add_value(" honesty ").unwrap();
        store.add_value("curiosity").unwrap();

        assert_eq!(
            store.add_value("honesty"),
            Err(StoreError::DuplicateValue("honesty".to_string()))
        );
        assert_eq!(store.state().user.values, vec!["honesty", "curiosity"]);

        store.remove_value("honesty").unwrap();
        assert_eq!(store.state().user.values, vec!["curiosity"]);
        assert!(store.remove_value("honesty").is_err());
        assert_eq!(store.state().user.name, AppState::default().user.name);
    }

    #[test]
    fn test_record_operations_report_failed_writes() {
        let storage = std::sync::Arc::new(MemoryStorage::new());
        let mut store = AppStore::load(std::sync::Arc::clone(&storage));
        storage.set_fail_writes(true);

        let (entry, save) = store
            .add_journal(JournalDraft::new("offline thoughts", Mood::Neutral))
            .unwrap();
        assert!(matches!(save, SaveStatus::Failed { .. }));
        assert_eq!(store.state().journals[0], entry);

        let (_, save) = store.add_deviation(DeviationDraft::new("cake")).unwrap();
        assert!(!save.is_saved());

        storage.set_fail_writes(false);
        let (_, save) = store.remove_journal(&entry.id).unwrap();
        assert_eq!(save, SaveStatus::Saved);
    }
}
