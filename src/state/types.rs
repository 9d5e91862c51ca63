//! Core data types for the Life Canvas state model
//!
//! This module defines the records held by the store:
//! - `AppState`: the single root record
//! - `Dimensions`: the eight life-dimension scores
//! - `JournalEntry` and `Deviation`: the two record lists
//! - Profile, theme, language and configuration records
//!
//! Field names serialize in camelCase so snapshots written by earlier
//! versions of the application load unchanged.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Highest score a dimension can hold
pub const MAX_SCORE: u8 = 100;

/// Score every dimension starts with
pub const DEFAULT_SCORE: u8 = 50;

/// The complete application state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct AppState {
    pub user: UserProfile,
    pub dimensions: Dimensions,
    pub fuel_system: FuelSystem,
    pub journals: Vec<JournalEntry>,
    pub is_locked: bool,
    pub theme: Theme,
    pub language: Language,
    pub ai_config: AiConfig,
    pub system_config: SystemConfig,
}

/// User profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UserProfile {
    pub name: String,
    /// Date string, `YYYY-MM-DD`
    pub birthday: String,
    pub mbti: String,
    /// Personal values, in the order they were added
    pub values: Vec<String>,
    /// Expected lifespan in years
    pub lifespan: u32,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: String::new(),
            birthday: "2000-01-01".to_string(),
            mbti: String::new(),
            values: Vec::new(),
            lifespan: 80,
        }
    }
}

/// The eight life dimensions
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DimensionType {
    /// Diet and energy intake
    Fuel,
    /// Exercise
    Physical,
    /// Reading and learning
    Intellectual,
    /// Focused work
    Output,
    /// Sleep and rest
    Recovery,
    /// Savings and finances
    Asset,
    /// Social life
    Connection,
    /// Living space
    Environment,
}

impl DimensionType {
    /// Get all dimensions for iteration
    pub fn all() -> &'static [DimensionType] {
        &[
            DimensionType::Fuel,
            DimensionType::Physical,
            DimensionType::Intellectual,
            DimensionType::Output,
            DimensionType::Recovery,
            DimensionType::Asset,
            DimensionType::Connection,
            DimensionType::Environment,
        ]
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            DimensionType::Fuel => "Fuel",
            DimensionType::Physical => "Physical",
            DimensionType::Intellectual => "Intellectual",
            DimensionType::Output => "Output",
            DimensionType::Recovery => "Recovery",
            DimensionType::Asset => "Asset",
            DimensionType::Connection => "Connection",
            DimensionType::Environment => "Environment",
        }
    }
}

impl std::fmt::Display for DimensionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DimensionType::Fuel => write!(f, "FUEL"),
            DimensionType::Physical => write!(f, "PHYSICAL"),
            DimensionType::Intellectual => write!(f, "INTELLECTUAL"),
            DimensionType::Output => write!(f, "OUTPUT"),
            DimensionType::Recovery => write!(f, "RECOVERY"),
            DimensionType::Asset => write!(f, "ASSET"),
            DimensionType::Connection => write!(f, "CONNECTION"),
            DimensionType::Environment => write!(f, "ENVIRONMENT"),
        }
    }
}

impl std::str::FromStr for DimensionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DimensionType::all()
            .iter()
            .copied()
            .find(|d| d.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown dimension: {}", s))
    }
}

/// Clamp an arbitrary score into the valid range
///
/// Rounds to the nearest integer first; NaN maps to 0.
pub fn clamp_score(score: f64) -> u8 {
    if score.is_nan() {
        return 0;
    }
    score.round().clamp(0.0, MAX_SCORE as f64) as u8
}

/// Scores for every dimension
///
/// Always holds an entry for each `DimensionType`. Deserialization accepts
/// any JSON number, rounds and clamps it, and fills missing keys with 0.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Dimensions(BTreeMap<DimensionType, u8>);

impl Dimensions {
    /// All dimensions at the same score
    pub fn uniform(score: u8) -> Self {
        Self(
            DimensionType::all()
                .iter()
                .map(|d| (*d, score.min(MAX_SCORE)))
                .collect(),
        )
    }

    /// Score for a dimension (0 if absent)
    pub fn get(&self, dimension: DimensionType) -> u8 {
        self.0.get(&dimension).copied().unwrap_or(0)
    }

    /// Set a score, clamping it into range
    pub fn set(&mut self, dimension: DimensionType, score: f64) -> u8 {
        let clamped = clamp_score(score);
        self.0.insert(dimension, clamped);
        clamped
    }

    /// Iterate in dimension order
    pub fn iter(&self) -> impl Iterator<Item = (DimensionType, u8)> + '_ {
        DimensionType::all().iter().map(move |d| (*d, self.get(*d)))
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self::uniform(DEFAULT_SCORE)
    }
}

impl<'de> Deserialize<'de> for Dimensions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<DimensionType, f64>::deserialize(deserializer)?;
        let scores = DimensionType::all()
            .iter()
            .map(|d| (*d, raw.get(d).map(|s| clamp_score(*s)).unwrap_or(0)))
            .collect();
        Ok(Self(scores))
    }
}

/// Diet baseline and logged deviations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct FuelSystem {
    /// Free-text description of the default diet
    pub baseline: String,
    /// Newest first
    pub deviations: Vec<Deviation>,
}

/// A logged departure from the diet baseline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Deviation {
    pub id: String,
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    #[serde(rename = "type", default)]
    pub kind: DeviationKind,
}

/// Direction of a diet deviation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeviationKind {
    Excess,
    Deficit,
    /// Also absorbs unrecognized types in stored snapshots
    #[default]
    #[serde(other)]
    Other,
}

impl std::str::FromStr for DeviationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "excess" => Ok(DeviationKind::Excess),
            "deficit" => Ok(DeviationKind::Deficit),
            "other" => Ok(DeviationKind::Other),
            _ => Err(format!("Unknown deviation type: {}", s)),
        }
    }
}

/// A journal entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: String,
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub content: String,
    pub mood: Mood,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_dimensions: Option<Vec<DimensionType>>,
}

impl JournalEntry {
    /// Check if this entry is linked to a dimension
    pub fn links(&self, dimension: DimensionType) -> bool {
        self.linked_dimensions
            .as_ref()
            .map(|dims| dims.contains(&dimension))
            .unwrap_or(false)
    }
}

/// Mood recorded with a journal entry
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Great,
    #[default]
    Good,
    Neutral,
    Bad,
    Terrible,
}

impl Mood {
    /// Get all moods, best first
    pub fn all() -> &'static [Mood] {
        &[
            Mood::Great,
            Mood::Good,
            Mood::Neutral,
            Mood::Bad,
            Mood::Terrible,
        ]
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mood::Great => write!(f, "great"),
            Mood::Good => write!(f, "good"),
            Mood::Neutral => write!(f, "neutral"),
            Mood::Bad => write!(f, "bad"),
            Mood::Terrible => write!(f, "terrible"),
        }
    }
}

impl std::str::FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mood::all()
            .iter()
            .copied()
            .find(|m| m.to_string() == s.trim().to_lowercase())
            .ok_or_else(|| format!("Unknown mood: {}", s))
    }
}

/// Color theme preference
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    Auto,
}

/// Appearance actually applied by a presentation layer
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Appearance {
    Light,
    Dark,
}

impl Theme {
    /// Resolve against the system color-scheme preference
    pub fn resolve(&self, prefers_dark: bool) -> Appearance {
        match self {
            Theme::Dark => Appearance::Dark,
            Theme::Auto if prefers_dark => Appearance::Dark,
            _ => Appearance::Light,
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "auto" => Ok(Theme::Auto),
            _ => Err(format!("Unknown theme: {}", s)),
        }
    }
}

/// Interface language
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Zh,
    En,
}

/// AI insight provider settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AiConfig {
    pub provider: AiProvider,
    pub api_key: String,
    /// Requests per day
    pub frequency_limit: u32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: AiProvider::DeepSeek,
            api_key: String::new(),
            frequency_limit: 10,
        }
    }
}

impl AiConfig {
    /// API key with the middle hidden, for display
    pub fn masked_key(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.is_empty() {
            return String::new();
        }
        if chars.len() <= 10 {
            let head: String = chars.iter().take(3).collect();
            return format!("{}***", head);
        }
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}{}{}", head, "*".repeat(chars.len() - 8), tail)
    }
}

/// Supported AI providers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum AiProvider {
    #[default]
    DeepSeek,
    Doubao,
}

/// Application behavior settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SystemConfig {
    /// Seconds
    pub auto_save_interval: u32,
    pub notifications_enabled: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            auto_save_interval: 60,
            notifications_enabled: true,
        }
    }
}
