//! Symptom-to-remedy matching.
//!
//! Given a set of user-entered symptom phrases, each remedy record is scored
//! by counting how many phrases appear as substrings of its normalised
//! disease label, then ranked by match count. This is a linear scan over the
//! in-memory record list; pure and deterministic.

use crate::error::{StoreError, StoreResult};
use crate::remedies::RemedyRecord;

/// An ordered set of symptom phrases, unique case-insensitively.
///
/// Phrases are lowercased and trimmed at construction so matching is
/// case-insensitive throughout. Insertion order is display order only and
/// has no effect on ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymptomQuery {
    phrases: Vec<String>,
}

impl SymptomQuery {
    /// Builds a query from raw user phrases.
    ///
    /// Each phrase is lowercased and trimmed; blank phrases and
    /// case-insensitive duplicates are dropped, keeping the first
    /// occurrence.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::EmptySymptomQuery` if no phrases survive
    /// normalisation. An empty query is an error, never an empty success.
    pub fn new<I, S>(raw: I) -> StoreResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut phrases: Vec<String> = Vec::new();
        for phrase in raw {
            let normalised = phrase.as_ref().trim().to_lowercase();
            if normalised.is_empty() || phrases.contains(&normalised) {
                continue;
            }
            phrases.push(normalised);
        }

        if phrases.is_empty() {
            return Err(StoreError::EmptySymptomQuery);
        }
        Ok(Self { phrases })
    }

    /// The normalised phrases, in insertion order.
    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    /// Number of phrases; the denominator for match percentages.
    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

/// A scored remedy candidate, produced fresh per query and never persisted.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct MatchResult {
    pub record: RemedyRecord,
    /// Number of query phrases found in the record's disease label; >= 1.
    pub match_count: usize,
    /// Total phrases in the query, matched or not.
    pub total_queried: usize,
    /// `round(100 * match_count / total_queried)`, 0..=100.
    pub match_percentage: u8,
}

/// Scores and ranks remedy records against a symptom query.
///
/// For each record, the match count is the number of query phrases that are
/// substrings of the record's lowercased disease label; a phrase counts at
/// most once per record. Records with no matching phrase are excluded.
///
/// Results are sorted by match count descending with a **stable** sort
/// (`slice::sort_by` guarantees stability), so records with equal match
/// counts keep their relative order from the input list. Calling twice with
/// identical inputs yields identical output order.
///
/// An empty result means no record matched; the empty-query case is rejected
/// earlier, at [`SymptomQuery::new`].
pub fn match_remedies(records: &[RemedyRecord], query: &SymptomQuery) -> Vec<MatchResult> {
    let total_queried = query.len();

    let mut results: Vec<MatchResult> = records
        .iter()
        .filter_map(|record| {
            let label = record.disease_label.to_lowercase();
            let match_count = query
                .phrases()
                .iter()
                .filter(|phrase| label.contains(phrase.as_str()))
                .count();

            if match_count == 0 {
                return None;
            }
            Some(MatchResult {
                record: record.clone(),
                match_count,
                total_queried,
                match_percentage: percentage(match_count, total_queried),
            })
        })
        .collect();

    results.sort_by(|a, b| b.match_count.cmp(&a.match_count));
    results
}

fn percentage(match_count: usize, total_queried: usize) -> u8 {
    ((match_count as f64 / total_queried as f64) * 100.0).round() as u8
}
