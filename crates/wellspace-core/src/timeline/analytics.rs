//! Clinical overview analytics over a visit's symptom entries.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{SymptomCategory, SymptomEntry};

/// One point on an intensity trend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrendPoint {
    pub at: DateTime<Utc>,
    /// 1-5
    pub level: u8,
}

/// Time-ordered intensity points for one category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendSeries {
    pub category: SymptomCategory,
    pub points: Vec<TrendPoint>,
}

impl TrendSeries {
    /// A chart needs at least two points.
    pub fn is_chartable(&self) -> bool {
        self.points.len() >= 2
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreatmentUsage {
    pub treatment: String,
    pub count: usize,
    /// Mean intensity (1-5) of the entries that used it
    pub mean_intensity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClinicalOverview {
    pub total_entries: usize,
    pub most_frequent: Option<SymptomCategory>,
    pub mean_intensity: Option<f64>,
    pub trends: Vec<TrendSeries>,
    pub top_triggers: Vec<WordCount>,
    pub treatments: Vec<TreatmentUsage>,
}

pub const TOP_TRIGGER_LIMIT: usize = 5;

/// Per-category trend series, categories in enum order, points oldest first.
pub fn trend_series(entries: &[SymptomEntry]) -> Vec<TrendSeries> {
    let mut by_category: BTreeMap<SymptomCategory, Vec<TrendPoint>> = BTreeMap::new();
    for entry in entries {
        by_category.entry(entry.category).or_default().push(TrendPoint {
            at: entry.created_at,
            level: entry.intensity.level(),
        });
    }

    by_category
        .into_iter()
        .map(|(category, mut points)| {
            points.sort_by_key(|p| p.at);
            TrendSeries { category, points }
        })
        .collect()
}

/// Most common words in trigger descriptions.
///
/// Words are split on anything that is not alphanumeric or `_`, lowercased,
/// and kept only when longer than three characters. Ties break alphabetically.
pub fn top_trigger_words(entries: &[SymptomEntry], limit: usize) -> Vec<WordCount> {
    let mut counts: HashMap<String, usize> = HashMap::new();

    for description in entries
        .iter()
        .filter_map(|e| e.trigger.description.as_deref())
    {
        for word in description
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|w| w.chars().count() > 3)
        {
            *counts.entry(word.to_lowercase()).or_default() += 1;
        }
    }

    let mut words: Vec<WordCount> = counts
        .into_iter()
        .map(|(word, count)| WordCount { word, count })
        .collect();
    words.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
    words.truncate(limit);
    words
}

/// How often each treatment was used, with the mean intensity when it was.
pub fn treatment_usage(entries: &[SymptomEntry]) -> Vec<TreatmentUsage> {
    let mut totals: HashMap<&str, (usize, u32)> = HashMap::new();
    for entry in entries {
        for treatment in &entry.treatments {
            let slot = totals.entry(treatment.as_str()).or_default();
            slot.0 += 1;
            slot.1 += u32::from(entry.intensity.level());
        }
    }

    let mut usage: Vec<TreatmentUsage> = totals
        .into_iter()
        .map(|(treatment, (count, sum))| TreatmentUsage {
            treatment: treatment.to_string(),
            count,
            mean_intensity: f64::from(sum) / count as f64,
        })
        .collect();
    usage.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.treatment.cmp(&b.treatment))
    });
    usage
}

pub fn clinical_overview(entries: &[SymptomEntry]) -> ClinicalOverview {
    let mut category_counts: BTreeMap<SymptomCategory, usize> = BTreeMap::new();
    for entry in entries {
        *category_counts.entry(entry.category).or_default() += 1;
    }
    // Highest count; enum order breaks ties
    let most_frequent = category_counts
        .iter()
        .fold(None, |best: Option<(SymptomCategory, usize)>, (&c, &n)| match best {
            Some((_, best_n)) if best_n >= n => best,
            _ => Some((c, n)),
        })
        .map(|(c, _)| c);

    let mean_intensity = if entries.is_empty() {
        None
    } else {
        let sum: u32 = entries.iter().map(|e| u32::from(e.intensity.level())).sum();
        Some(f64::from(sum) / entries.len() as f64)
    };

    ClinicalOverview {
        total_entries: entries.len(),
        most_frequent,
        mean_intensity,
        trends: trend_series(entries),
        top_triggers: top_trigger_words(entries, TOP_TRIGGER_LIMIT),
        treatments: treatment_usage(entries),
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::models::{Intensity, IntensityLevel, Trigger};

    #[test]
    fn test_trend_series_time_ordered() {
        let entries = vec![
            entry_at(SymptomCategory::Pain, Intensity::Score(4), at(2024, 3, 3, 9)),
            entry_at(SymptomCategory::Pain, Intensity::Score(2), at(2024, 3, 1, 9)),
            entry_at(SymptomCategory::Fatigue, moderate(), at(2024, 3, 2, 9)),
        ];

        let series = trend_series(&entries);
        assert_eq!(series.len(), 2);
        let pain = series
            .iter()
            .find(|s| s.category == SymptomCategory::Pain)
            .unwrap();
        let levels: Vec<u8> = pain.points.iter().map(|p| p.level).collect();
        assert_eq!(levels, vec![2, 4]);
        assert!(pain.is_chartable());
    }

    #[test]
    fn test_top_trigger_words() {
        let descriptions = [
            "Stress at work, bright lights",
            "work stress",
            "skipped lunch; stress!",
            "hot",
        ];
        let entries: Vec<_> = descriptions
            .iter()
            .map(|d| {
                let mut e = entry_at(SymptomCategory::Headache, moderate(), at(2024, 3, 1, 9));
                e.trigger = Trigger {
                    present: true,
                    description: Some(d.to_string()),
                };
                e
            })
            .collect();

        let words = top_trigger_words(&entries, TOP_TRIGGER_LIMIT);
        assert_eq!(words[0], WordCount { word: "stress".into(), count: 3 });
        assert_eq!(words[1], WordCount { word: "work".into(), count: 2 });
        assert_eq!(words.len(), 5);
        // "at" and "hot" are too short
        assert!(words.iter().all(|w| w.word.len() > 3));
        assert_eq!(words[2].word, "bright");
    }

    #[test]
    fn test_treatment_usage_mean() {
        let mut mild = entry_at(
            SymptomCategory::Headache,
            Intensity::Level(IntensityLevel::Mild),
            at(2024, 3, 1, 9),
        );
        mild.treatments = vec!["ibuprofen".into()];
        let mut severe = entry_at(
            SymptomCategory::Headache,
            Intensity::Level(IntensityLevel::Severe),
            at(2024, 3, 2, 9),
        );
        severe.treatments = vec!["ibuprofen".into(), "rest".into()];

        let usage = treatment_usage(&[mild, severe]);
        assert_eq!(usage[0].treatment, "ibuprofen");
        assert_eq!(usage[0].count, 2);
        assert!((usage[0].mean_intensity - 3.0).abs() < f64::EPSILON);
        assert_eq!(usage[1].treatment, "rest");
        assert!((usage[1].mean_intensity - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_clinical_overview() {
        let entries = vec![
            entry_at(SymptomCategory::Pain, Intensity::Score(1), at(2024, 3, 1, 9)),
            entry_at(SymptomCategory::Fatigue, Intensity::Score(5), at(2024, 3, 1, 10)),
            entry_at(SymptomCategory::Fatigue, Intensity::Score(3), at(2024, 3, 2, 10)),
        ];

        let overview = clinical_overview(&entries);
        assert_eq!(overview.total_entries, 3);
        assert_eq!(overview.most_frequent, Some(SymptomCategory::Fatigue));
        assert_eq!(overview.mean_intensity, Some(3.0));

        let empty = clinical_overview(&[]);
        assert_eq!(empty.most_frequent, None);
        assert_eq!(empty.mean_intensity, None);
    }
}
