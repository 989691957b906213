//! Glossary browsing and search.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strsim::{jaro_winkler, normalized_levenshtein};

use crate::db::Database;
use crate::error::WorkflowResult;
use crate::models::GlossaryTerm;

/// FTS candidates fetched before re-ranking.
const CANDIDATE_LIMIT: usize = 50;

/// Minimum similarity for the typo-tolerant fallback scan.
const FUZZY_THRESHOLD: f64 = 0.75;

/// Terms sharing an initial letter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LetterGroup {
    pub letter: char,
    pub terms: Vec<GlossaryTerm>,
}

/// A search hit with its similarity to the query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GlossaryHit {
    pub term: GlossaryTerm,
    pub score: f64,
}

/// Read-only view over the shared glossary.
pub struct Glossary<'a> {
    db: &'a Database,
}

impl<'a> Glossary<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn list(&self, category: Option<&str>) -> WorkflowResult<Vec<GlossaryTerm>> {
        Ok(self.db.list_glossary_terms(category)?)
    }

    /// A-Z browsing groups; `#` (non-letters) sorts first.
    pub fn by_letter(&self, category: Option<&str>) -> WorkflowResult<Vec<LetterGroup>> {
        let mut groups: BTreeMap<char, Vec<GlossaryTerm>> = BTreeMap::new();
        for term in self.list(category)? {
            groups.entry(term.initial()).or_default().push(term);
        }
        Ok(groups
            .into_iter()
            .map(|(letter, terms)| LetterGroup { letter, terms })
            .collect())
    }

    /// Prefix search over terms and definitions, best match first.
    ///
    /// When full-text search finds nothing the whole glossary is scanned for
    /// terms that look like the query, so small typos still land.
    pub fn search(&self, query: &str, limit: usize) -> WorkflowResult<Vec<GlossaryHit>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let candidates = self.db.search_glossary_fts(&needle, CANDIDATE_LIMIT)?;
        let fallback = candidates.is_empty();
        let pool = if fallback {
            self.db.list_glossary_terms(None)?
        } else {
            candidates
        };

        let mut hits: Vec<GlossaryHit> = pool
            .into_iter()
            .map(|term| {
                let score = similarity(&needle, &term.term.to_lowercase());
                GlossaryHit { term, score }
            })
            .filter(|hit| !fallback || hit.score >= FUZZY_THRESHOLD)
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.term.term.cmp(&b.term.term))
        });
        hits.truncate(limit);

        tracing::debug!(query = %needle, hits = hits.len(), fallback, "Glossary search");
        Ok(hits)
    }
}

fn similarity(a: &str, b: &str) -> f64 {
    jaro_winkler(a, b) * 0.6 + normalized_levenshtein(a, b) * 0.4
}
