//! Derived views
//!
//! Pure functions over `AppState` snapshots. Nothing here is cached or
//! stored; every view is recomputed from the state it is given.
//!
//! - **scores**: life progress, balance score, fuel consistency, dashboard summary
//! - **journal**: search, day grouping, mood distribution, paged queries
//! - **timeline**: merged journal and fuel events

pub mod journal;
pub mod scores;
pub mod timeline;

pub use journal::{
    filter_journals, group_by_day, mood_distribution, query_journals, DayGroup, JournalPage,
    JournalQuery, MoodDistribution, MoodShare, Timestamped,
};
pub use scores::{balance_score, fuel_consistency, life_progress, Summary};
pub use timeline::{timeline, timeline_by_day, EventKind, TimelineEvent, TimelineFilter};
