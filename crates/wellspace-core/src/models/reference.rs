//! Glossary and medical document models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Shared glossary entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GlossaryTerm {
    pub term: String,
    /// e.g. "condition", "medication", "procedure"
    pub category: String,
    /// Plain-language definition
    pub definition: String,
}

impl GlossaryTerm {
    pub fn new(term: &str, category: &str, definition: &str) -> Self {
        Self {
            term: term.to_string(),
            category: category.to_string(),
            definition: definition.to_string(),
        }
    }

    /// Uppercase initial used for A-Z browsing; `#` for non-letters.
    pub fn initial(&self) -> char {
        match self.term.trim().chars().next() {
            Some(c) if c.is_alphabetic() => c.to_ascii_uppercase(),
            _ => '#',
        }
    }
}

/// An uploaded medical record file. Bytes live in blob storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicalDocument {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub file_name: String,
    /// `{user_id}/{id}/{file_name}`
    pub storage_path: String,
    pub size_bytes: u64,
    /// Hex SHA-256 of the file contents
    pub sha256: String,
    pub uploaded_at: DateTime<Utc>,
}
