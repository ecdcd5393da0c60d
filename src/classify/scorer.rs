//! Heuristic Scorer: keyword hit counts over added lines.
//!
//! A category's score is the number of (added line, keyword) pairs where the
//! keyword matches the line. Counts are raw and unweighted so every tie-break
//! can be reproduced by hand from the diff and the table.

use serde::Serialize;

use crate::change::ChangeSet;
use crate::rules::{Category, RuleTable};

use super::pattern::Candidates;

/// Keyword hits for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryScore {
    pub category: Category,
    pub hits: u32,
}

/// Score every candidate, preserving the candidates' rank order.
pub fn score(
    change_set: &ChangeSet,
    candidates: &Candidates,
    table: &RuleTable,
) -> Vec<CategoryScore> {
    candidates
        .categories()
        .iter()
        .map(|&category| {
            let keywords = table.keywords(category);
            let hits = change_set
                .added_lines()
                .map(|line| keywords.iter().filter(|k| k.is_match(line)).count())
                .sum::<usize>();
            CategoryScore {
                category,
                hits: u32::try_from(hits).unwrap_or(u32::MAX),
            }
        })
        .collect()
}

/// Highest-scoring category, ties going to the better rank.
///
/// Returns `None` when every score is zero.
pub fn best(scores: &[CategoryScore], table: &RuleTable) -> Option<Category> {
    scores
        .iter()
        .filter(|s| s.hits > 0)
        .min_by_key(|s| (std::cmp::Reverse(s.hits), table.rank(s.category), s.category))
        .map(|s| s.category)
}
