//! Partial updates and default merging
//!
//! `StatePatch` is the shallow partial update applied by the store: every
//! top-level field is optional and a present field replaces the current
//! value wholesale. `merge_over_defaults` is the deep merge used when a
//! stored snapshot is loaded, so fields introduced after the snapshot was
//! written still get their defaults.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::types::{
    AiConfig, AppState, Dimensions, FuelSystem, JournalEntry, Language, SystemConfig, Theme,
    UserProfile,
};

/// A partial `AppState`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct StatePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_system: Option<FuelSystem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journals: Option<Vec<JournalEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_locked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_config: Option<AiConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_config: Option<SystemConfig>,
}

impl StatePatch {
    /// Check if the patch touches no field
    pub fn is_empty(&self) -> bool {
        *self == StatePatch::default()
    }

    /// Names of the fields this patch sets, for logging
    pub fn fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.user.is_some() {
            fields.push("user");
        }
        if self.dimensions.is_some() {
            fields.push("dimensions");
        }
        if self.fuel_system.is_some() {
            fields.push("fuelSystem");
        }
        if self.journals.is_some() {
            fields.push("journals");
        }
        if self.is_locked.is_some() {
            fields.push("isLocked");
        }
        if self.theme.is_some() {
            fields.push("theme");
        }
        if self.language.is_some() {
            fields.push("language");
        }
        if self.ai_config.is_some() {
            fields.push("aiConfig");
        }
        if self.system_config.is_some() {
            fields.push("systemConfig");
        }
        fields
    }

    /// Builder method: set the theme
    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = Some(theme);
        self
    }

    /// Builder method: set the lock flag
    pub fn locked(mut self, locked: bool) -> Self {
        self.is_locked = Some(locked);
        self
    }

    /// Builder method: replace the journal list
    pub fn journals(mut self, journals: Vec<JournalEntry>) -> Self {
        self.journals = Some(journals);
        self
    }

    /// Builder method: replace the fuel system
    pub fn fuel_system(mut self, fuel: FuelSystem) -> Self {
        self.fuel_system = Some(fuel);
        self
    }

    /// Builder method: replace the user profile
    pub fn user(mut self, user: UserProfile) -> Self {
        self.user = Some(user);
        self
    }

    /// Builder method: replace the dimension scores
    pub fn dimensions(mut self, dimensions: Dimensions) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    /// Shallow-merge into a state
    pub fn apply(self, state: &mut AppState) {
        if let Some(user) = self.user {
            state.user = user;
        }
        if let Some(dimensions) = self.dimensions {
            state.dimensions = dimensions;
        }
        if let Some(fuel_system) = self.fuel_system {
            state.fuel_system = fuel_system;
        }
        if let Some(journals) = self.journals {
            state.journals = journals;
        }
        if let Some(is_locked) = self.is_locked {
            state.is_locked = is_locked;
        }
        if let Some(theme) = self.theme {
            state.theme = theme;
        }
        if let Some(language) = self.language {
            state.language = language;
        }
        if let Some(ai_config) = self.ai_config {
            state.ai_config = ai_config;
        }
        if let Some(system_config) = self.system_config {
            state.system_config = system_config;
        }
    }
}

/// Recursively merge `overlay` into `base`
///
/// Objects merge key by key; arrays and scalars replace. `null` in the
/// overlay counts as absent and keeps the base value.
pub fn merge_json(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        if !value.is_null() {
                            base_map.insert(key, value);
                        }
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Deep-merge a stored snapshot over the default state
pub fn merge_over_defaults(stored: Value) -> Result<AppState, serde_json::Error> {
    let mut merged = serde_json::to_value(AppState::default())?;
    merge_json(&mut merged, stored);
    serde_json::from_value(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::types::{DimensionType, Mood};
    use serde_json::json;

    #[test]
    fn test_merge_json_nested() {
        let mut base = json!({"a": {"x": 1, "y": 2}, "b": [1, 2], "c": "keep"});
        merge_json(&mut base, json!({"a": {"y": 5}, "b": [9], "c": null, "d": true}));
        assert_eq!(base, json!({"a": {"x": 1, "y": 5}, "b": [9], "c": "keep", "d": true}));
    }

    #[test]
    fn test_merge_over_defaults_fills_missing() {
        let stored = json!({
            "user": {"name": "Lin"},
            "dimensions": {"FUEL": 80},
            "theme": "dark"
        });
        let state = merge_over_defaults(stored).unwrap();
        let defaults = AppState::default();

        assert_eq!(state.user.name, "Lin");
        assert_eq!(state.user.lifespan, defaults.user.lifespan);
        assert_eq!(state.user.birthday, defaults.user.birthday);
        assert_eq!(state.dimensions.get(DimensionType::Fuel), 80);
        assert_eq!(state.dimensions.get(DimensionType::Asset), 50);
        assert_eq!(state.theme, Theme::Dark);
        assert_eq!(state.ai_config, defaults.ai_config);
        assert_eq!(state.system_config, defaults.system_config);
    }

    #[test]
    fn test_merge_over_defaults_rejects_bad_types() {
        let stored = json!({"journals": "not a list"});
        assert!(merge_over_defaults(stored).is_err());
    }

    #[test]
    fn test_patch_apply_replaces_nested_wholesale() {
        let mut state = AppState::default();
        state.user.name = "Lin".to_string();

        let patch: StatePatch = serde_json::from_value(json!({"user": {"mbti": "INTJ"}})).unwrap();
        patch.apply(&mut state);

        assert_eq!(state.user.mbti, "INTJ");
        assert_eq!(state.user.name, "");
    }

    #[test]
    fn test_empty_patch() {
        let patch = StatePatch::default();
        assert!(patch.is_empty());
        assert!(patch.fields().is_empty());

        let mut state = AppState::default();
        patch.apply(&mut state);
        assert_eq!(state, AppState::default());
    }

    #[test]
    fn test_patch_builders() {
        let entry = JournalEntry {
            id: "a".to_string(),
            timestamp: 1,
            title: None,
            content: "hello".to_string(),
            mood: Mood::Good,
            tags: Vec::new(),
            attachments: Vec::new(),
            linked_dimensions: None,
        };
        let patch = StatePatch::default()
            .theme(Theme::Light)
            .locked(true)
            .journals(vec![entry]);
        assert_eq!(patch.fields(), vec!["journals", "isLocked", "theme"]);
    }
}
