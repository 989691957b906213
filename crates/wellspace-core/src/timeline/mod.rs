//! Symptom timeline: day grouping, filters and intensity colors.
//!
//! Everything here is a pure reduction over entries already loaded from the
//! store; nothing touches the database.

mod analytics;

pub use analytics::*;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{SymptomCategory, SymptomEntry};

/// Entries recorded on one calendar day (UTC).
#[derive(Debug, Clone, PartialEq)]
pub struct DayGroup {
    pub date: NaiveDate,
    pub entries: Vec<SymptomEntry>,
}

impl DayGroup {
    /// `yyyy-MM-dd`
    pub fn key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

/// Group entries by the calendar date of `created_at`.
///
/// Days are returned newest first. Within a day, entries keep the order
/// they were given in (submission order when read from the store).
pub fn group_by_day(entries: &[SymptomEntry]) -> Vec<DayGroup> {
    let mut groups: Vec<DayGroup> = Vec::new();

    for entry in entries {
        let date = entry.created_at.date_naive();
        match groups.iter_mut().find(|g| g.date == date) {
            Some(group) => group.entries.push(entry.clone()),
            None => groups.push(DayGroup {
                date,
                entries: vec![entry.clone()],
            }),
        }
    }

    groups.sort_by(|a, b| b.date.cmp(&a.date));
    groups
}

/// Relative date window for the timeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DateRange {
    Last7Days,
    Last30Days,
    Last90Days,
    #[default]
    All,
}

impl DateRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateRange::Last7Days => "7d",
            DateRange::Last30Days => "30d",
            DateRange::Last90Days => "90d",
            DateRange::All => "all",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "7d" => Some(DateRange::Last7Days),
            "30d" => Some(DateRange::Last30Days),
            "90d" => Some(DateRange::Last90Days),
            "all" => Some(DateRange::All),
            _ => None,
        }
    }

    /// Earliest instant inside the window, or `None` when unbounded.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let days = match self {
            DateRange::Last7Days => 7,
            DateRange::Last30Days => 30,
            DateRange::Last90Days => 90,
            DateRange::All => return None,
        };
        Some(now - Duration::days(days))
    }
}

/// In-memory timeline filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimelineFilter {
    /// `None` means all categories
    pub category: Option<SymptomCategory>,
    pub range: DateRange,
}

impl TimelineFilter {
    pub fn apply(&self, entries: &[SymptomEntry], now: DateTime<Utc>) -> Vec<SymptomEntry> {
        let cutoff = self.range.cutoff(now);
        entries
            .iter()
            .filter(|e| self.category.map_or(true, |c| e.category == c))
            .filter(|e| cutoff.map_or(true, |c| e.created_at >= c))
            .cloned()
            .collect()
    }
}

/// RGB color for an intensity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntensityColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl IntensityColor {
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Color scale from 1 (green) to 5 (red). Out-of-range levels are clamped.
pub fn intensity_color(level: u8) -> IntensityColor {
    let (r, g, b) = match level.clamp(1, 5) {
        1 => (76, 175, 80),
        2 => (139, 195, 74),
        3 => (255, 193, 7),
        4 => (255, 152, 0),
        _ => (244, 67, 54),
    };
    IntensityColor { r, g, b }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_group_by_day_newest_first() {
        let entries = vec![
            entry_at(SymptomCategory::Fatigue, moderate(), at(2024, 3, 1, 9)),
            entry_at(SymptomCategory::Pain, moderate(), at(2024, 3, 2, 8)),
            entry_at(SymptomCategory::Nausea, moderate(), at(2024, 3, 1, 18)),
        ];

        let groups = group_by_day(&entries);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key(), "2024-03-02");
        assert_eq!(groups[1].key(), "2024-03-01");

        let ids: Vec<_> = groups[1].entries.iter().map(|e| &e.id).collect();
        assert_eq!(ids, vec![&entries[0].id, &entries[2].id]);
    }

    #[test]
    fn test_group_by_day_empty() {
        assert!(group_by_day(&[]).is_empty());
    }

    #[test]
    fn test_filter_by_category_and_range() {
        let now = at(2024, 6, 30, 12);
        let entries = vec![
            entry_at(SymptomCategory::Fatigue, moderate(), at(2024, 6, 28, 9)),
            entry_at(SymptomCategory::Fatigue, moderate(), at(2024, 5, 1, 9)),
            entry_at(SymptomCategory::Pain, moderate(), at(2024, 6, 29, 9)),
        ];

        let recent = TimelineFilter {
            category: None,
            range: DateRange::Last7Days,
        };
        assert_eq!(recent.apply(&entries, now).len(), 2);

        let fatigue = TimelineFilter {
            category: Some(SymptomCategory::Fatigue),
            range: DateRange::All,
        };
        assert_eq!(fatigue.apply(&entries, now).len(), 2);

        let fatigue_month = TimelineFilter {
            category: Some(SymptomCategory::Fatigue),
            range: DateRange::Last30Days,
        };
        assert_eq!(fatigue_month.apply(&entries, now).len(), 1);
    }

    #[test]
    fn test_intensity_colors() {
        assert_eq!(intensity_color(1).hex(), "#4caf50");
        assert_eq!(intensity_color(5).hex(), "#f44336");
        assert_eq!(intensity_color(0), intensity_color(1));
        assert_eq!(intensity_color(9), intensity_color(5));
    }
}
