//! Symptom entry models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Symptom category. Each program accepts a closed subset of these.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum SymptomCategory {
    // Gastroparesis
    Nausea,
    Vomiting,
    EarlySatiety,
    Bloating,
    AbdominalPain,
    Heartburn,
    LossOfAppetite,
    Constipation,
    // Myasthenia gravis
    Ptosis,
    DoubleVision,
    DifficultySwallowing,
    SlurredSpeech,
    MuscleWeakness,
    BreathingDifficulty,
    NeckWeakness,
    // General
    Fatigue,
    Pain,
    Headache,
    Dizziness,
    SleepDisturbance,
    Anxiety,
    Other,
}

impl SymptomCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymptomCategory::Nausea => "nausea",
            SymptomCategory::Vomiting => "vomiting",
            SymptomCategory::EarlySatiety => "early_satiety",
            SymptomCategory::Bloating => "bloating",
            SymptomCategory::AbdominalPain => "abdominal_pain",
            SymptomCategory::Heartburn => "heartburn",
            SymptomCategory::LossOfAppetite => "loss_of_appetite",
            SymptomCategory::Constipation => "constipation",
            SymptomCategory::Ptosis => "ptosis",
            SymptomCategory::DoubleVision => "double_vision",
            SymptomCategory::DifficultySwallowing => "difficulty_swallowing",
            SymptomCategory::SlurredSpeech => "slurred_speech",
            SymptomCategory::MuscleWeakness => "muscle_weakness",
            SymptomCategory::BreathingDifficulty => "breathing_difficulty",
            SymptomCategory::NeckWeakness => "neck_weakness",
            SymptomCategory::Fatigue => "fatigue",
            SymptomCategory::Pain => "pain",
            SymptomCategory::Headache => "headache",
            SymptomCategory::Dizziness => "dizziness",
            SymptomCategory::SleepDisturbance => "sleep_disturbance",
            SymptomCategory::Anxiety => "anxiety",
            SymptomCategory::Other => "other",
        }
    }

    /// Display label shown in timelines and reports.
    pub fn label(&self) -> &'static str {
        match self {
            SymptomCategory::Nausea => "Nausea",
            SymptomCategory::Vomiting => "Vomiting",
            SymptomCategory::EarlySatiety => "Early Satiety",
            SymptomCategory::Bloating => "Bloating",
            SymptomCategory::AbdominalPain => "Abdominal Pain",
            SymptomCategory::Heartburn => "Heartburn",
            SymptomCategory::LossOfAppetite => "Loss of Appetite",
            SymptomCategory::Constipation => "Constipation",
            SymptomCategory::Ptosis => "Drooping Eyelids",
            SymptomCategory::DoubleVision => "Double Vision",
            SymptomCategory::DifficultySwallowing => "Difficulty Swallowing",
            SymptomCategory::SlurredSpeech => "Slurred Speech",
            SymptomCategory::MuscleWeakness => "Muscle Weakness",
            SymptomCategory::BreathingDifficulty => "Breathing Difficulty",
            SymptomCategory::NeckWeakness => "Neck Weakness",
            SymptomCategory::Fatigue => "Fatigue",
            SymptomCategory::Pain => "Pain",
            SymptomCategory::Headache => "Headache",
            SymptomCategory::Dizziness => "Dizziness",
            SymptomCategory::SleepDisturbance => "Sleep Disturbance",
            SymptomCategory::Anxiety => "Anxiety",
            SymptomCategory::Other => "Other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        ALL_CATEGORIES.iter().copied().find(|c| c.as_str() == s)
    }
}

pub const ALL_CATEGORIES: &[SymptomCategory] = &[
    SymptomCategory::Nausea,
    SymptomCategory::Vomiting,
    SymptomCategory::EarlySatiety,
    SymptomCategory::Bloating,
    SymptomCategory::AbdominalPain,
    SymptomCategory::Heartburn,
    SymptomCategory::LossOfAppetite,
    SymptomCategory::Constipation,
    SymptomCategory::Ptosis,
    SymptomCategory::DoubleVision,
    SymptomCategory::DifficultySwallowing,
    SymptomCategory::SlurredSpeech,
    SymptomCategory::MuscleWeakness,
    SymptomCategory::BreathingDifficulty,
    SymptomCategory::NeckWeakness,
    SymptomCategory::Fatigue,
    SymptomCategory::Pain,
    SymptomCategory::Headache,
    SymptomCategory::Dizziness,
    SymptomCategory::SleepDisturbance,
    SymptomCategory::Anxiety,
    SymptomCategory::Other,
];

/// How often a symptom occurs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Never,
    Rarely,
    Sometimes,
    Often,
    Always,
    Daily,
    Constant,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Never => "never",
            Frequency::Rarely => "rarely",
            Frequency::Sometimes => "sometimes",
            Frequency::Often => "often",
            Frequency::Always => "always",
            Frequency::Daily => "daily",
            Frequency::Constant => "constant",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Frequency::Never => "Never",
            Frequency::Rarely => "Rarely",
            Frequency::Sometimes => "Sometimes",
            Frequency::Often => "Often",
            Frequency::Always => "Always",
            Frequency::Daily => "Daily",
            Frequency::Constant => "Constant",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "never" => Some(Frequency::Never),
            "rarely" => Some(Frequency::Rarely),
            "sometimes" => Some(Frequency::Sometimes),
            "often" => Some(Frequency::Often),
            "always" => Some(Frequency::Always),
            "daily" => Some(Frequency::Daily),
            "constant" => Some(Frequency::Constant),
            _ => None,
        }
    }
}

/// Labelled intensity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IntensityLevel {
    Mild,
    Moderate,
    Severe,
}

/// Symptom intensity, either labelled or a numeric score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    Level(IntensityLevel),
    Score(u8),
}

impl Intensity {
    /// Position on the shared 1-5 scale used for colors, trends and means.
    pub fn level(&self) -> u8 {
        match self {
            Intensity::Level(IntensityLevel::Mild) => 1,
            Intensity::Level(IntensityLevel::Moderate) => 3,
            Intensity::Level(IntensityLevel::Severe) => 5,
            Intensity::Score(score) => (*score).clamp(1, 5),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Intensity::Level(IntensityLevel::Mild) => "Mild".to_string(),
            Intensity::Level(IntensityLevel::Moderate) => "Moderate".to_string(),
            Intensity::Level(IntensityLevel::Severe) => "Severe".to_string(),
            Intensity::Score(score) => format!("{}/5", score),
        }
    }

    /// Storage and form representation: `mild`, `moderate`, `severe` or a number.
    pub fn as_storage(&self) -> String {
        match self {
            Intensity::Level(IntensityLevel::Mild) => "mild".to_string(),
            Intensity::Level(IntensityLevel::Moderate) => "moderate".to_string(),
            Intensity::Level(IntensityLevel::Severe) => "severe".to_string(),
            Intensity::Score(score) => score.to_string(),
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "mild" => Some(Intensity::Level(IntensityLevel::Mild)),
            "moderate" => Some(Intensity::Level(IntensityLevel::Moderate)),
            "severe" => Some(Intensity::Level(IntensityLevel::Severe)),
            other => other.parse::<u8>().ok().map(Intensity::Score),
        }
    }
}

/// Which parts of the day a symptom shows up.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeOfDay {
    pub morning: bool,
    pub afternoon: bool,
    pub evening: bool,
    pub night: bool,
}

impl TimeOfDay {
    pub fn labels(&self) -> Vec<&'static str> {
        let mut labels = Vec::new();
        if self.morning {
            labels.push("Morning");
        }
        if self.afternoon {
            labels.push("Afternoon");
        }
        if self.evening {
            labels.push("Evening");
        }
        if self.night {
            labels.push("Night");
        }
        labels
    }
}

/// Whether something set the symptom off, and what.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Trigger {
    pub present: bool,
    pub description: Option<String>,
}

/// Symptom form contents before submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SymptomDraft {
    pub category: SymptomCategory,
    pub frequency: Option<Frequency>,
    pub intensity: Option<Intensity>,
    pub notes: Option<String>,
    pub treatments: Vec<String>,
    pub context_answers: Vec<String>,
    pub time_of_day: TimeOfDay,
    pub trigger: Trigger,
    pub onset_date: Option<NaiveDate>,
}

impl SymptomDraft {
    /// A blank form for a category; the state the form resets to after submit.
    pub fn new(category: SymptomCategory) -> Self {
        Self {
            category,
            frequency: None,
            intensity: None,
            notes: None,
            treatments: Vec::new(),
            context_answers: Vec::new(),
            time_of_day: TimeOfDay::default(),
            trigger: Trigger::default(),
            onset_date: None,
        }
    }
}

/// One submitted symptom observation. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SymptomEntry {
    pub id: String,
    /// Owning visit record
    pub record_id: String,
    pub user_id: String,
    pub category: SymptomCategory,
    pub frequency: Frequency,
    pub intensity: Intensity,
    pub notes: Option<String>,
    pub treatments: Vec<String>,
    pub context_answers: Vec<String>,
    pub time_of_day: TimeOfDay,
    pub trigger: Trigger,
    pub onset_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl SymptomEntry {
    /// Build an entry from a validated draft.
    ///
    /// Returns `None` if the draft is missing frequency or intensity.
    pub fn from_draft(record_id: &str, user_id: &str, draft: &SymptomDraft) -> Option<Self> {
        Some(Self {
            id: uuid::Uuid::new_v4().to_string(),
            record_id: record_id.to_string(),
            user_id: user_id.to_string(),
            category: draft.category,
            frequency: draft.frequency?,
            intensity: draft.intensity?,
            notes: clean_text(draft.notes.as_deref()),
            treatments: clean_list(&draft.treatments),
            context_answers: clean_list(&draft.context_answers),
            time_of_day: draft.time_of_day,
            trigger: Trigger {
                present: draft.trigger.present,
                description: clean_text(draft.trigger.description.as_deref()),
            },
            onset_date: draft.onset_date,
            created_at: super::now(),
        })
    }
}

fn clean_text(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

fn clean_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
