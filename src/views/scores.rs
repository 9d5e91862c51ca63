//! Dashboard numbers

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::state::{AppState, DimensionType, Dimensions, UserProfile};
use crate::views::journal::{mood_distribution, MoodDistribution};

const MILLIS_PER_YEAR: f64 = 365.25 * 24.0 * 60.0 * 60.0 * 1000.0;

/// Points lost per logged deviation
const DEVIATION_PENALTY: usize = 5;

/// Share of the expected lifespan already lived, in percent
///
/// The birthday is a `YYYY-MM-DD` date taken at UTC midnight, or an RFC 3339
/// timestamp. Returns `None` when it is neither or the lifespan is zero.
pub fn life_progress(user: &UserProfile, now: DateTime<Utc>) -> Option<f64> {
    if user.lifespan == 0 {
        return None;
    }

    let born = parse_birthday(user.birthday.trim())?;

    let lived = (now - born).num_milliseconds() as f64;
    let total = user.lifespan as f64 * MILLIS_PER_YEAR;
    Some((lived / total * 100.0).clamp(0.0, 100.0))
}

fn parse_birthday(text: &str) -> Option<DateTime<Utc>> {
    match NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        Ok(date) => Some(date.and_hms_opt(0, 0, 0)?.and_utc()),
        Err(_) => DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
    }
}

/// Rounded mean of all dimension scores
pub fn balance_score(dimensions: &Dimensions) -> u8 {
    let count = DimensionType::all().len() as f64;
    let sum: f64 = dimensions.iter().map(|(_, score)| score as f64).sum();
    (sum / count).round() as u8
}

/// Diet consistency: 100 minus 5 per deviation, floored at 0
pub fn fuel_consistency(deviation_count: usize) -> u8 {
    100usize.saturating_sub(deviation_count.saturating_mul(DEVIATION_PENALTY)) as u8
}

/// Score for one dimension, for display
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DimensionScore {
    pub dimension: DimensionType,
    pub label: &'static str,
    pub score: u8,
}

/// Everything the dashboard shows, computed from one snapshot
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Summary {
    pub life_progress: Option<f64>,
    pub balance_score: u8,
    pub fuel_consistency: u8,
    pub dimensions: Vec<DimensionScore>,
    pub journal_count: usize,
    pub deviation_count: usize,
    pub moods: MoodDistribution,
    pub is_locked: bool,
}

impl Summary {
    pub fn compute(state: &AppState, now: DateTime<Utc>) -> Self {
        let deviation_count = state.fuel_system.deviations.len();

        Self {
            life_progress: life_progress(&state.user, now),
            balance_score: balance_score(&state.dimensions),
            fuel_consistency: fuel_consistency(deviation_count),
            dimensions: state
                .dimensions
                .iter()
                .map(|(dimension, score)| DimensionScore {
                    dimension,
                    label: dimension.label(),
                    score,
                })
                .collect(),
            journal_count: state.journals.len(),
            deviation_count,
            moods: mood_distribution(&state.journals),
            is_locked: state.is_locked,
        }
    }
}
