//! Glossary database operations.

use rusqlite::params;

use super::{Database, DbResult};
use crate::models::GlossaryTerm;

impl Database {
    /// Insert or update a glossary term.
    pub fn upsert_glossary_term(&self, term: &GlossaryTerm) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO glossary_terms (term, category, definition)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(term) DO UPDATE SET
                category = excluded.category,
                definition = excluded.definition
            "#,
            params![term.term, term.category, term.definition],
        )?;
        Ok(())
    }

    /// All terms ordered by term, optionally restricted to one category.
    pub fn list_glossary_terms(&self, category: Option<&str>) -> DbResult<Vec<GlossaryTerm>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT term, category, definition
            FROM glossary_terms
            WHERE ?1 IS NULL OR category = ?1
            ORDER BY term COLLATE NOCASE ASC
            "#,
        )?;

        let rows = stmt.query_map(params![category], |row| {
            Ok(GlossaryTerm {
                term: row.get(0)?,
                category: row.get(1)?,
                definition: row.get(2)?,
            })
        })?;

        let mut terms = Vec::new();
        for row in rows {
            terms.push(row?);
        }
        Ok(terms)
    }

    /// Search terms and definitions using FTS5 (BM25 ranking).
    pub fn search_glossary_fts(&self, query: &str, limit: usize) -> DbResult<Vec<GlossaryTerm>> {
        let escaped_query = escape_fts_query(query);
        if escaped_query.is_empty() {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(
            r#"
            SELECT g.term, g.category, g.definition,
                   bm25(glossary_terms_fts) as rank
            FROM glossary_terms g
            JOIN glossary_terms_fts fts ON g.rowid = fts.rowid
            WHERE glossary_terms_fts MATCH ?
            ORDER BY rank
            LIMIT ?
            "#,
        )?;

        let rows = stmt.query_map(params![escaped_query, limit as i64], |row| {
            Ok(GlossaryTerm {
                term: row.get(0)?,
                category: row.get(1)?,
                definition: row.get(2)?,
            })
        })?;

        let mut terms = Vec::new();
        for row in rows {
            terms.push(row?);
        }
        Ok(terms)
    }
}

/// Strip FTS5 operators and turn each word into a prefix match.
/// Lowercasing keeps `AND`/`OR`/`NOT` from being read as operators.
fn escape_fts_query(query: &str) -> String {
    let cleaned: String = query
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    cleaned
        .split_whitespace()
        .map(|word| format!("{}*", word.to_lowercase()))
        .collect::<Vec<_>>()
        .join(" ")
}
