//! Journal views
//!
//! Search, calendar-day grouping, mood statistics and paged queries over
//! the journal list.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{DimensionType, JournalEntry, Language, Mood};

/// Default page size for journal queries
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Largest page size a query may ask for
pub const MAX_PAGE_SIZE: usize = 100;

/// Records that carry a millisecond timestamp
pub trait Timestamped {
    fn timestamp_millis(&self) -> i64;
}

impl Timestamped for JournalEntry {
    fn timestamp_millis(&self) -> i64 {
        self.timestamp
    }
}

impl<T: Timestamped> Timestamped for &T {
    fn timestamp_millis(&self) -> i64 {
        (*self).timestamp_millis()
    }
}

/// Case-insensitive substring match; an empty needle matches everything
pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Entries whose content contains `search`, ignoring case
///
/// An empty search keeps every entry. The search is used as given, so
/// surrounding spaces are part of the match. Order is preserved.
pub fn filter_journals<'a>(journals: &'a [JournalEntry], search: &str) -> Vec<&'a JournalEntry> {
    journals
        .iter()
        .filter(|j| contains_ignore_case(&j.content, search))
        .collect()
}

/// Items that fall on one calendar day
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DayGroup<T> {
    pub date: NaiveDate,
    pub items: Vec<T>,
}

impl<T> DayGroup<T> {
    /// Date heading in the interface language
    pub fn label(&self, language: Language) -> String {
        match language {
            Language::Zh => format!(
                "{}年{}月{}日",
                self.date.year(),
                self.date.month(),
                self.date.day()
            ),
            Language::En => self.date.format("%B %-d, %Y").to_string(),
        }
    }
}

/// Calendar date of a millisecond timestamp in `tz`
fn local_date<Tz: TimeZone>(timestamp: i64, tz: &Tz) -> NaiveDate {
    DateTime::<Utc>::from_timestamp_millis(timestamp)
        .unwrap_or_default()
        .with_timezone(tz)
        .date_naive()
}

/// Bucket items by calendar day in `tz`
///
/// Groups appear in the order their first item appears; items keep their
/// relative order within a group.
pub fn group_by_day<T, Tz>(items: impl IntoIterator<Item = T>, tz: &Tz) -> Vec<DayGroup<T>>
where
    T: Timestamped,
    Tz: TimeZone,
{
    let mut groups: Vec<DayGroup<T>> = Vec::new();

    for item in items {
        let date = local_date(item.timestamp_millis(), tz);
        match groups.iter_mut().find(|g| g.date == date) {
            Some(group) => group.items.push(item),
            None => groups.push(DayGroup {
                date,
                items: vec![item],
            }),
        }
    }

    groups
}

/// Count and share of one mood
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MoodShare {
    pub mood: Mood,
    pub count: usize,
    /// Rounded to the nearest whole percent
    pub percentage: u8,
}

/// Mood statistics over a journal list
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MoodDistribution {
    pub total: usize,
    /// One entry per mood, best first
    pub moods: Vec<MoodShare>,
}

impl MoodDistribution {
    pub fn count(&self, mood: Mood) -> usize {
        self.share(mood).map(|s| s.count).unwrap_or(0)
    }

    pub fn percentage(&self, mood: Mood) -> u8 {
        self.share(mood).map(|s| s.percentage).unwrap_or(0)
    }

    fn share(&self, mood: Mood) -> Option<&MoodShare> {
        self.moods.iter().find(|s| s.mood == mood)
    }
}

/// Count entries per mood, with percentages of the total
pub fn mood_distribution(journals: &[JournalEntry]) -> MoodDistribution {
    let total = journals.len();

    let moods = Mood::all()
        .iter()
        .map(|mood| {
            let count = journals.iter().filter(|j| j.mood == *mood).count();
            let percentage = if total == 0 {
                0
            } else {
                (count as f64 / total as f64 * 100.0).round() as u8
            };
            MoodShare {
                mood: *mood,
                count,
                percentage,
            }
        })
        .collect();

    MoodDistribution { total, moods }
}

/// Filters and paging for a journal listing
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct JournalQuery {
    pub search: Option<String>,
    pub mood: Option<Mood>,
    pub dimension: Option<DimensionType>,
    /// 1-based
    pub page: usize,
    pub page_size: usize,
}

impl Default for JournalQuery {
    fn default() -> Self {
        Self {
            search: None,
            mood: None,
            dimension: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl JournalQuery {
    fn matches(&self, entry: &JournalEntry) -> bool {
        let search = self.search.as_deref().unwrap_or("");
        contains_ignore_case(&entry.content, search)
            && self.mood.map(|m| entry.mood == m).unwrap_or(true)
            && self.dimension.map(|d| entry.links(d)).unwrap_or(true)
    }
}

/// One page of journal entries
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct JournalPage {
    pub items: Vec<JournalEntry>,
    /// Matching entries across all pages
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

/// Filter journals and cut out the requested page
///
/// Page 0 is treated as page 1; the page size is kept within
/// `1..=MAX_PAGE_SIZE`.
pub fn query_journals(journals: &[JournalEntry], query: &JournalQuery) -> JournalPage {
    let page = query.page.max(1);
    let page_size = query.page_size.clamp(1, MAX_PAGE_SIZE);

    let matching: Vec<&JournalEntry> = journals.iter().filter(|j| query.matches(j)).collect();
    let total = matching.len();

    let items = matching
        .into_iter()
        .skip((page - 1).saturating_mul(page_size))
        .take(page_size)
        .cloned()
        .collect();

    JournalPage {
        items,
        total,
        page,
        page_size,
        total_pages: total.div_ceil(page_size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn entry(id: &str, timestamp: i64, content: &str, mood: Mood) -> JournalEntry {
        JournalEntry {
            id: id.to_string(),
            timestamp,
            title: None,
            content: content.to_string(),
            mood,
            tags: Vec::new(),
            attachments: Vec::new(),
            linked_dimensions: None,
        }
    }

    fn millis(y: i32, m: u32, d: u32, h: u32) -> i64 {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0)
            .unwrap()
            .timestamp_millis()
    }

    #[test]
    fn test_filter_journals_ignores_case() {
        let journals = vec![
            entry("a", 1, "Morning RUN by the lake", Mood::Good),
            entry("b", 2, "Read two chapters", Mood::Neutral),
        ];

        let hits = filter_journals(&journals, "run");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "a");

        assert_eq!(filter_journals(&journals, "").len(), 2);
        assert!(filter_journals(&journals, "swim").is_empty());
    }

    #[test]
    fn test_filter_journals_keeps_surrounding_spaces() {
        let journals = vec![
            entry("a", 1, "Morning run", Mood::Good),
            entry("b", 2, "rerun of the show", Mood::Neutral),
        ];

        let hits = filter_journals(&journals, " run");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "a");

        assert!(filter_journals(&journals, "  ").is_empty());
        assert_eq!(filter_journals(&journals, "run").len(), 2);
    }

    #[test]
    fn test_group_by_day_keeps_order() {
        let journals = vec![
            entry("a", millis(2024, 1, 15, 20), "x", Mood::Good),
            entry("b", millis(2024, 1, 15, 8), "x", Mood::Good),
            entry("c", millis(2024, 1, 14, 22), "x", Mood::Good),
        ];

        let groups = group_by_day(&journals, &Utc);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        let ids: Vec<&str> = groups[0].items.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(groups[1].items[0].id, "c");
    }

    #[test]
    fn test_group_by_day_uses_time_zone() {
        // 22:00 UTC on the 14th is already the 15th in UTC+8
        let journals = vec![
            entry("a", millis(2024, 1, 15, 8), "x", Mood::Good),
            entry("b", millis(2024, 1, 14, 22), "x", Mood::Good),
        ];
        let shanghai = FixedOffset::east_opt(8 * 3600).unwrap();

        let groups = group_by_day(&journals, &shanghai);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].items.len(), 2);
    }

    #[test]
    fn test_day_group_label() {
        let group: DayGroup<JournalEntry> = DayGroup {
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            items: Vec::new(),
        };
        assert_eq!(group.label(Language::Zh), "2024年1月5日");
        assert_eq!(group.label(Language::En), "January 5, 2024");
    }

    #[test]
    fn test_mood_distribution() {
        let journals = vec![
            entry("a", 1, "x", Mood::Good),
            entry("b", 2, "x", Mood::Good),
            entry("c", 3, "x", Mood::Bad),
        ];

        let dist = mood_distribution(&journals);
        assert_eq!(dist.total, 3);
        assert_eq!(dist.count(Mood::Good), 2);
        assert_eq!(dist.count(Mood::Bad), 1);
        assert_eq!(dist.count(Mood::Great), 0);
        assert_eq!(dist.percentage(Mood::Good), 67);
        assert_eq!(dist.percentage(Mood::Bad), 33);
        assert_eq!(dist.moods.len(), 5);
    }

    #[test]
    fn test_mood_distribution_empty() {
        let dist = mood_distribution(&[]);
        assert_eq!(dist.total, 0);
        assert!(dist.moods.iter().all(|s| s.count == 0 && s.percentage == 0));
    }

    #[test]
    fn test_query_journals_filters_and_pages() {
        let mut journals: Vec<JournalEntry> = (0..45)
            .map(|i| {
                let mood = if i % 3 == 0 { Mood::Bad } else { Mood::Good };
                entry(&format!("e{}", i), i, "daily note", mood)
            })
            .collect();
        journals[0].linked_dimensions = Some(vec![DimensionType::Recovery]);

        let first = query_journals(&journals, &JournalQuery::default());
        assert_eq!(first.total, 45);
        assert_eq!(first.items.len(), 20);
        assert_eq!(first.total_pages, 3);

        let last = query_journals(
            &journals,
            &JournalQuery {
                page: 3,
                ..Default::default()
            },
        );
        assert_eq!(last.items.len(), 5);
        assert_eq!(last.items[0].id, "e40");

        let bad = query_journals(
            &journals,
            &JournalQuery {
                mood: Some(Mood::Bad),
                ..Default::default()
            },
        );
        assert_eq!(bad.total, 15);

        let linked = query_journals(
            &journals,
            &JournalQuery {
                dimension: Some(DimensionType::Recovery),
                ..Default::default()
            },
        );
        assert_eq!(linked.total, 1);
        assert_eq!(linked.items[0].id, "e0");
    }

    #[test]
    fn test_query_journals_normalizes_paging() {
        let journals = vec![entry("a", 1, "x", Mood::Good)];
        let page = query_journals(
            &journals,
            &JournalQuery {
                page: 0,
                page_size: 0,
                ..Default::default()
            },
        );
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, 1);
        assert_eq!(page.items.len(), 1);

        let beyond = query_journals(
            &journals,
            &JournalQuery {
                page: 9,
                ..Default::default()
            },
        );
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total, 1);
    }
}
