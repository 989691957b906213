//! Health profile model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Physician {
    pub name: String,
    pub phone: Option<String>,
    pub clinic: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EmergencyContact {
    pub name: String,
    pub relationship: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Lifestyle {
    pub smoking: Option<String>,
    pub alcohol: Option<String>,
    pub exercise: Option<String>,
    pub diet: Option<String>,
}

/// One per user. Saved as a whole; there is no per-field versioning.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HealthProfile {
    pub date_of_birth: Option<String>,
    pub sex: Option<String>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub blood_type: Option<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub surgeries: Vec<String>,
    pub primary_physician: Option<Physician>,
    pub emergency_contact: Option<EmergencyContact>,
    #[serde(default)]
    pub lifestyle: Lifestyle,
}

/// A profile as stored for a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredHealthProfile {
    pub user_id: String,
    pub profile: HealthProfile,
    pub updated_at: DateTime<Utc>,
}
