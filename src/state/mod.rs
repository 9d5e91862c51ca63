//! Life Canvas State Model
//!
//! - **types**: `AppState` and every record it holds
//! - **patch**: partial updates and the default merge applied on load

pub mod patch;
pub mod types;

pub use patch::{merge_json, merge_over_defaults, StatePatch};
pub use types::{
    clamp_score, AiConfig, AiProvider, AppState, Appearance, Deviation, DeviationKind,
    DimensionType, Dimensions, FuelSystem, JournalEntry, Language, Mood, SystemConfig, Theme,
    UserProfile, DEFAULT_SCORE, MAX_SCORE,
};
