//! Timeline
//!
//! Journal entries and diet deviations merged into one event list, newest
//! first, then optionally bucketed by calendar day.
//!
//! ```text
//! journals ──┐
//!            ├─→ events → filter(kind) → search → sort desc → group_by_day
//! deviations ┘
//! ```

use chrono::TimeZone;
use serde::{Deserialize, Serialize};

use crate::state::{AppState, Language};
use crate::views::journal::{contains_ignore_case, group_by_day, DayGroup, Timestamped};

/// Source of a timeline event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Journal,
    Fuel,
}

impl EventKind {
    /// Event title in the interface language
    pub fn title(&self, language: Language) -> &'static str {
        match (self, language) {
            (EventKind::Journal, Language::Zh) => "日记记录",
            (EventKind::Journal, Language::En) => "Journal entry",
            (EventKind::Fuel, Language::Zh) => "饮食偏离",
            (EventKind::Fuel, Language::En) => "Diet deviation",
        }
    }
}

/// Which events a timeline shows
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimelineFilter {
    #[default]
    All,
    Journal,
    Fuel,
}

impl TimelineFilter {
    fn accepts(&self, kind: EventKind) -> bool {
        match self {
            TimelineFilter::All => true,
            TimelineFilter::Journal => kind == EventKind::Journal,
            TimelineFilter::Fuel => kind == EventKind::Fuel,
        }
    }
}

impl std::str::FromStr for TimelineFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(TimelineFilter::All),
            "journal" => Ok(TimelineFilter::Journal),
            "fuel" => Ok(TimelineFilter::Fuel),
            _ => Err(format!("Unknown timeline filter: {}", s)),
        }
    }
}

/// One entry on the timeline
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TimelineEvent {
    pub id: String,
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub title: String,
    pub content: String,
}

impl Timestamped for TimelineEvent {
    fn timestamp_millis(&self) -> i64 {
        self.timestamp
    }
}

impl TimelineEvent {
    fn matches(&self, search: &str) -> bool {
        contains_ignore_case(&self.title, search) || contains_ignore_case(&self.content, search)
    }
}

/// Journal and fuel events, newest first
///
/// Titles follow the state's language. `search` matches title or content,
/// ignoring case, and is used as given. Events with equal timestamps keep
/// journal-before-fuel order.
pub fn timeline(state: &AppState, filter: TimelineFilter, search: &str) -> Vec<TimelineEvent> {
    let language = state.language;

    let journals = state.journals.iter().map(|j| TimelineEvent {
        id: j.id.clone(),
        timestamp: j.timestamp,
        kind: EventKind::Journal,
        title: EventKind::Journal.title(language).to_string(),
        content: j.content.clone(),
    });

    let deviations = state.fuel_system.deviations.iter().map(|d| TimelineEvent {
        id: d.id.clone(),
        timestamp: d.timestamp,
        kind: EventKind::Fuel,
        title: EventKind::Fuel.title(language).to_string(),
        content: d.description.clone(),
    });

    let mut events: Vec<TimelineEvent> = journals
        .chain(deviations)
        .filter(|e| filter.accepts(e.kind))
        .filter(|e| e.matches(search))
        .collect();

    events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    events
}

/// `timeline` bucketed by calendar day in `tz`
pub fn timeline_by_day<Tz: TimeZone>(
    state: &AppState,
    filter: TimelineFilter,
    search: &str,
    tz: &Tz,
) -> Vec<DayGroup<TimelineEvent>> {
    group_by_day(timeline(state, filter, search), tz)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Deviation, DeviationKind, JournalEntry, Language, Mood};
    use chrono::Utc;

    const DAY: i64 = 24 * 60 * 60 * 1000;

    fn state() -> AppState {
        let mut state = AppState::default();
        state.language = Language::En;
        state.journals.push(JournalEntry {
            id: "j1".to_string(),
            timestamp: 1_700_000_000_000,
            title: None,
            content: "Slept well, long walk".to_string(),
            mood: Mood::Great,
            tags: Vec::new(),
            attachments: Vec::new(),
            linked_dimensions: None,
        });
        state.fuel_system.deviations.push(Deviation {
            id: "d1".to_string(),
            timestamp: 1_700_000_000_000 + DAY,
            description: "Birthday cake".to_string(),
            calories: Some(450.0),
            kind: DeviationKind::Excess,
        });
        state
    }

    #[test]
    fn test_timeline_merges_newest_first() {
        let events = timeline(&state(), TimelineFilter::All, "");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, "d1");
        assert_eq!(events[0].kind, EventKind::Fuel);
        assert_eq!(events[0].title, "Diet deviation");
        assert_eq!(events[1].id, "j1");
        assert_eq!(events[1].title, "Journal entry");
    }

    #[test]
    fn test_timeline_filter_by_kind() {
        let fuel = timeline(&state(), TimelineFilter::Fuel, "");
        assert_eq!(fuel.len(), 1);
        assert_eq!(fuel[0].id, "d1");

        let journal = timeline(&state(), TimelineFilter::Journal, "");
        assert_eq!(journal.len(), 1);
        assert_eq!(journal[0].id, "j1");
    }

    #[test]
    fn test_timeline_search() {
        let hits = timeline(&state(), TimelineFilter::All, "WALK");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "j1");

        let by_title = timeline(&state(), TimelineFilter::All, "deviation");
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].id, "d1");

        assert!(timeline(&state(), TimelineFilter::Fuel, "walk").is_empty());
    }

    #[test]
    fn test_timeline_titles_follow_language() {
        let mut state = state();
        state.language = Language::Zh;

        let events = timeline(&state, TimelineFilter::All, "");
        assert_eq!(events[0].title, "饮食偏离");
        assert_eq!(events[1].title, "日记记录");

        let hits = timeline(&state, TimelineFilter::All, "日记");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "j1");
        assert!(timeline(&state, TimelineFilter::All, "deviation").is_empty());
    }

    #[test]
    fn test_timeline_search_is_not_trimmed() {
        assert_eq!(timeline(&state(), TimelineFilter::All, " walk").len(), 1);
        assert!(timeline(&state(), TimelineFilter::All, "walk ").is_empty());
    }

    #[test]
    fn test_timeline_by_day() {
        let groups = timeline_by_day(&state(), TimelineFilter::All, "", &Utc);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].items[0].id, "d1");
        assert!(groups[0].date > groups[1].date);
    }

    #[test]
    fn test_parse_filter() {
        assert_eq!("FUEL".parse::<TimelineFilter>().unwrap(), TimelineFilter::Fuel);
        assert!("sleep".parse::<TimelineFilter>().is_err());
    }
}
