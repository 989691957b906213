//! Program schemas.
//!
//! The visit wizard is one engine shared by every care program. What differs
//! between programs (which symptoms can be logged, how frequency and
//! intensity are scaled, which quality-of-life dimensions are rated, how the
//! wizard navigates) lives in a static [`ProgramSchema`].

use serde::{Deserialize, Serialize};

use super::symptom::{Frequency, Intensity, SymptomCategory};

/// A care program with its own visit questionnaire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Program {
    /// Gastroparesis program (G-PACT).
    Gpact,
    /// Myasthenia gravis program.
    Mg,
    /// General doctor-visit preparation.
    Generic,
}

impl Program {
    pub fn as_str(&self) -> &'static str {
        match self {
            Program::Gpact => "gpact",
            Program::Mg => "mg",
            Program::Generic => "generic",
        }
    }

    /// Parse a program key. Accepts `g-pact` as an alias.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "gpact" | "g-pact" => Some(Program::Gpact),
            "mg" => Some(Program::Mg),
            "generic" => Some(Program::Generic),
            _ => None,
        }
    }

    /// The static schema for this program.
    pub fn schema(&self) -> &'static ProgramSchema {
        match self {
            Program::Gpact => &GPACT_SCHEMA,
            Program::Mg => &MG_SCHEMA,
            Program::Generic => &GENERIC_SCHEMA,
        }
    }
}

/// How symptom intensity is captured.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IntensityScale {
    /// mild / moderate / severe
    Labeled,
    /// Integer score within inclusive bounds.
    Numeric { min: u8, max: u8 },
}

impl IntensityScale {
    /// Whether an intensity value is expressible on this scale.
    pub fn accepts(&self, intensity: &Intensity) -> bool {
        match (self, intensity) {
            (IntensityScale::Labeled, Intensity::Score(_)) => false,
            (IntensityScale::Labeled, _) => true,
            (IntensityScale::Numeric { min, max }, Intensity::Score(score)) => {
                (*min..=*max).contains(score)
            }
            (IntensityScale::Numeric { .. }, _) => false,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            IntensityScale::Labeled => "mild, moderate or severe".to_string(),
            IntensityScale::Numeric { min, max } => format!("{} to {}", min, max),
        }
    }
}

/// Inclusive integer rating scale for quality-of-life dimensions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RatingScale {
    pub min: u8,
    pub max: u8,
}

impl RatingScale {
    pub fn contains(&self, value: u8) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Default value for a fresh assessment form.
    pub fn midpoint(&self) -> u8 {
        (self.min + self.max) / 2
    }
}

/// Quality-of-life impact dimension.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum QolDimension {
    Work,
    Household,
    Social,
    Exercise,
    Energy,
    Sleep,
    PhysicalComfort,
    Mood,
    Anxiety,
    StressManagement,
    MedicationEffectiveness,
    SideEffects,
    TreatmentSatisfaction,
}

impl QolDimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            QolDimension::Work => "work",
            QolDimension::Household => "household",
            QolDimension::Social => "social",
            QolDimension::Exercise => "exercise",
            QolDimension::Energy => "energy",
            QolDimension::Sleep => "sleep",
            QolDimension::PhysicalComfort => "physical_comfort",
            QolDimension::Mood => "mood",
            QolDimension::Anxiety => "anxiety",
            QolDimension::StressManagement => "stress_management",
            QolDimension::MedicationEffectiveness => "medication_effectiveness",
            QolDimension::SideEffects => "side_effects",
            QolDimension::TreatmentSatisfaction => "treatment_satisfaction",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        ALL_DIMENSIONS.iter().copied().find(|d| d.as_str() == s)
    }

    pub fn label(&self) -> &'static str {
        match self {
            QolDimension::Work => "Work",
            QolDimension::Household => "Household Tasks",
            QolDimension::Social => "Social Life",
            QolDimension::Exercise => "Exercise",
            QolDimension::Energy => "Energy",
            QolDimension::Sleep => "Sleep",
            QolDimension::PhysicalComfort => "Physical Comfort",
            QolDimension::Mood => "Mood",
            QolDimension::Anxiety => "Anxiety",
            QolDimension::StressManagement => "Stress Management",
            QolDimension::MedicationEffectiveness => "Medication Effectiveness",
            QolDimension::SideEffects => "Side Effects",
            QolDimension::TreatmentSatisfaction => "Treatment Satisfaction",
        }
    }
}

/// How the wizard lets the user move between steps.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NavigationMode {
    /// Forward moves only.
    Linear,
    /// Persistent tab bar: any step once a visit is active.
    Tabbed,
}

/// How a quality-of-life assessment is written.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentPolicy {
    /// One assessment per visit; resubmission is rejected.
    InsertOnce,
    /// Resubmission overwrites the visit's assessment.
    Upsert,
}

impl AssessmentPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentPolicy::InsertOnce => "insert_once",
            AssessmentPolicy::Upsert => "upsert",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "insert_once" | "insert" => Some(AssessmentPolicy::InsertOnce),
            "upsert" => Some(AssessmentPolicy::Upsert),
            _ => None,
        }
    }
}

/// Everything that parametrizes the visit wizard for one program.
#[derive(Debug)]
pub struct ProgramSchema {
    pub program: Program,
    pub display_name: &'static str,
    pub categories: &'static [SymptomCategory],
    pub frequencies: &'static [Frequency],
    pub intensity: IntensityScale,
    pub dimensions: &'static [QolDimension],
    pub rating_scale: RatingScale,
    pub navigation: NavigationMode,
    pub assessment_policy: AssessmentPolicy,
    context_questions: fn(SymptomCategory) -> &'static [&'static str],
}

impl ProgramSchema {
    pub fn has_category(&self, category: SymptomCategory) -> bool {
        self.categories.contains(&category)
    }

    pub fn has_frequency(&self, frequency: Frequency) -> bool {
        self.frequencies.contains(&frequency)
    }

    /// Context questions asked for a category. When non-empty, at least one
    /// answer is required before the symptom can be submitted.
    pub fn context_questions(&self, category: SymptomCategory) -> &'static [&'static str] {
        (self.context_questions)(category)
    }
}

pub const ALL_DIMENSIONS: &[QolDimension] = &[
    QolDimension::Work,
    QolDimension::Household,
    QolDimension::Social,
    QolDimension::Exercise,
    QolDimension::Energy,
    QolDimension::Sleep,
    QolDimension::PhysicalComfort,
    QolDimension::Mood,
    QolDimension::Anxiety,
    QolDimension::StressManagement,
    QolDimension::MedicationEffectiveness,
    QolDimension::SideEffects,
    QolDimension::TreatmentSatisfaction,
];

const FIVE_LEVEL_FREQUENCIES: &[Frequency] = &[
    Frequency::Never,
    Frequency::Rarely,
    Frequency::Sometimes,
    Frequency::Often,
    Frequency::Always,
];

const THREE_LEVEL_FREQUENCIES: &[Frequency] =
    &[Frequency::Sometimes, Frequency::Daily, Frequency::Constant];

fn no_context_questions(_: SymptomCategory) -> &'static [&'static str] {
    &[]
}

fn generic_context_questions(category: SymptomCategory) -> &'static [&'static str] {
    match category {
        SymptomCategory::Pain => &[
            "Is the pain sharp or dull?",
            "Does the pain spread to other areas?",
            "Does movement make it worse?",
        ],
        SymptomCategory::Headache => &[
            "Is it on one side of the head?",
            "Is it accompanied by sensitivity to light?",
            "Does it wake you from sleep?",
        ],
        SymptomCategory::Dizziness => &[
            "Does the room spin?",
            "Does it happen when standing up?",
            "Have you fallen because of it?",
        ],
        _ => &[],
    }
}

static GPACT_SCHEMA: ProgramSchema = ProgramSchema {
    program: Program::Gpact,
    display_name: "G-PACT Gastroparesis Program",
    categories: &[
        SymptomCategory::Nausea,
        SymptomCategory::Vomiting,
        SymptomCategory::EarlySatiety,
        SymptomCategory::Bloating,
        SymptomCategory::AbdominalPain,
        SymptomCategory::Heartburn,
        SymptomCategory::LossOfAppetite,
        SymptomCategory::Constipation,
    ],
    frequencies: FIVE_LEVEL_FREQUENCIES,
    intensity: IntensityScale::Numeric { min: 1, max: 5 },
    dimensions: ALL_DIMENSIONS,
    rating_scale: RatingScale { min: 1, max: 10 },
    navigation: NavigationMode::Tabbed,
    assessment_policy: AssessmentPolicy::Upsert,
    context_questions: no_context_questions,
};

static MG_SCHEMA: ProgramSchema = ProgramSchema {
    program: Program::Mg,
    display_name: "Myasthenia Gravis Program",
    categories: &[
        SymptomCategory::Ptosis,
        SymptomCategory::DoubleVision,
        SymptomCategory::DifficultySwallowing,
        SymptomCategory::SlurredSpeech,
        SymptomCategory::MuscleWeakness,
        SymptomCategory::BreathingDifficulty,
        SymptomCategory::NeckWeakness,
        SymptomCategory::Fatigue,
    ],
    frequencies: THREE_LEVEL_FREQUENCIES,
    intensity: IntensityScale::Labeled,
    dimensions: &[
        QolDimension::Work,
        QolDimension::Household,
        QolDimension::Social,
        QolDimension::Exercise,
        QolDimension::Energy,
        QolDimension::Sleep,
        QolDimension::PhysicalComfort,
        QolDimension::Mood,
        QolDimension::Anxiety,
        QolDimension::StressManagement,
    ],
    rating_scale: RatingScale { min: 1, max: 5 },
    navigation: NavigationMode::Linear,
    assessment_policy: AssessmentPolicy::InsertOnce,
    context_questions: no_context_questions,
};

static GENERIC_SCHEMA: ProgramSchema = ProgramSchema {
    program: Program::Generic,
    display_name: "Doctor Visit Preparation",
    categories: &[
        SymptomCategory::Fatigue,
        SymptomCategory::Pain,
        SymptomCategory::Headache,
        SymptomCategory::Nausea,
        SymptomCategory::Dizziness,
        SymptomCategory::SleepDisturbance,
        SymptomCategory::Anxiety,
        SymptomCategory::Other,
    ],
    frequencies: FIVE_LEVEL_FREQUENCIES,
    intensity: IntensityScale::Labeled,
    dimensions: ALL_DIMENSIONS,
    rating_scale: RatingScale { min: 1, max: 5 },
    navigation: NavigationMode::Linear,
    assessment_policy: AssessmentPolicy::Upsert,
    context_questions: generic_context_questions,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IntensityLevel;

    #[test]
    fn test_program_parse() {
        assert_eq!(Program::parse("G-PACT"), Some(Program::Gpact));
        assert_eq!(Program::parse(" mg "), Some(Program::Mg));
        assert_eq!(Program::parse("generic"), Some(Program::Generic));
        assert_eq!(Program::parse("cardio"), None);
    }

    #[test]
    fn test_schema_dimension_counts() {
        assert_eq!(Program::Gpact.schema().dimensions.len(), 13);
        assert_eq!(Program::Mg.schema().dimensions.len(), 10);
        assert_eq!(Program::Generic.schema().dimensions.len(), 13);
    }

    #[test]
    fn test_rating_midpoint() {
        assert_eq!(RatingScale { min: 1, max: 5 }.midpoint(), 3);
        assert_eq!(RatingScale { min: 1, max: 10 }.midpoint(), 5);
    }

    #[test]
    fn test_intensity_scale_accepts() {
        let numeric = IntensityScale::Numeric { min: 1, max: 5 };
        assert!(numeric.accepts(&Intensity::Score(1)));
        assert!(numeric.accepts(&Intensity::Score(5)));
        assert!(!numeric.accepts(&Intensity::Score(6)));
        assert!(!numeric.accepts(&Intensity::Score(0)));
        assert!(!numeric.accepts(&Intensity::Level(IntensityLevel::Mild)));

        let labeled = IntensityScale::Labeled;
        assert!(labeled.accepts(&Intensity::Level(IntensityLevel::Severe)));
        assert!(!labeled.accepts(&Intensity::Score(3)));
    }

    #[test]
    fn test_generic_context_questions() {
        let schema = Program::Generic.schema();
        assert_eq!(schema.context_questions(SymptomCategory::Pain).len(), 3);
        assert!(schema.context_questions(SymptomCategory::Fatigue).is_empty());
        assert!(Program::Mg
            .schema()
            .context_questions(SymptomCategory::Ptosis)
            .is_empty());
    }

    #[test]
    fn test_dimension_round_trip_keys() {
        for d in ALL_DIMENSIONS {
            assert_eq!(QolDimension::parse(d.as_str()), Some(*d));
        }
    }
}
