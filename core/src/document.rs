use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

pub type DocId = i32;

/// Relative tolerance under which two relevances are treated as equal.
pub const RELEVANCE_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    #[default]
    Actual,
    Irrelevant,
    Banned,
    Removed,
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentStatus::Actual => "ACTUAL",
            DocumentStatus::Irrelevant => "IRRELEVANT",
            DocumentStatus::Banned => "BANNED",
            DocumentStatus::Removed => "REMOVED",
        };
        f.write_str(name)
    }
}

/// A ranked search hit.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub relevance: f64,
    pub rating: i32,
}

impl Document {
    pub fn new(id: DocId, relevance: f64, rating: i32) -> Self {
        Self { id, relevance, rating }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ document_id = {}, relevance = {}, rating = {} }}",
            self.id, self.relevance, self.rating
        )
    }
}

/// Ranking order: higher relevance first; relevances within
/// [`RELEVANCE_EPSILON`] of each other fall back to higher rating first.
pub fn compare_by_relevance(lhs: &Document, rhs: &Document) -> Ordering {
    let scale = lhs.relevance.abs().max(rhs.relevance.abs());
    if (lhs.relevance - rhs.relevance).abs() < RELEVANCE_EPSILON * scale {
        rhs.rating.cmp(&lhs.rating)
    } else {
        rhs.relevance.partial_cmp(&lhs.relevance).unwrap_or(Ordering::Equal)
    }
}

/// Sort hits into ranking order.
///
/// [`compare_by_relevance`] is not transitive across chains of near-equal
/// relevances, so the slice is first sorted by relevance alone with a total
/// order. An insertion pass then applies the rating tie-break; it only swaps
/// neighbours and stops at the first hit that does not rank strictly higher.
pub fn sort_by_relevance(docs: &mut [Document]) {
    docs.sort_by(|lhs, rhs| rhs.relevance.total_cmp(&lhs.relevance));
    for i in 1..docs.len() {
        let mut j = i;
        while j > 0 && compare_by_relevance(&docs[j], &docs[j - 1]) == Ordering::Less {
            docs.swap(j, j - 1);
            j -= 1;
        }
    }
}

/// Truncated mean, 0 for no ratings.
pub fn average_rating(ratings: &[i32]) -> i32 {
    if ratings.is_empty() {
        return 0;
    }
    let sum: i64 = ratings.iter().map(|&r| r as i64).sum();
    (sum / ratings.len() as i64) as i32
}
