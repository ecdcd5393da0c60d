//! Pattern Classifier: rule table × change set → candidate categories.

use serde::Serialize;
use tracing::debug;

use crate::change::ChangeSet;
use crate::rules::{Category, RuleTable};

/// How a candidate set was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    /// A whole-changeset rule held for every file.
    WholeRule,
    /// Union of per-file rule matches.
    FileRules,
    /// Nothing matched; the fallback category stands in.
    Unmatched,
}

/// Non-empty, rank-ordered set of candidate categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidates {
    categories: Vec<Category>,
    source: CandidateSource,
}

impl Candidates {
    fn new(mut categories: Vec<Category>, source: CandidateSource, table: &RuleTable) -> Self {
        categories.sort_by_key(|c| (table.rank(*c), *c));
        categories.dedup();
        Self { categories, source }
    }

    /// Candidates, best rank first.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn source(&self) -> CandidateSource {
        self.source
    }

    /// The best-ranked candidate.
    pub fn first(&self) -> Category {
        self.categories
            .first()
            .copied()
            .unwrap_or(Category::FALLBACK)
    }

    pub fn contains(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }
}

/// Collect candidate categories for a change set.
///
/// Whole-changeset rules run first in table order and the first one that holds
/// for every file wins outright. Otherwise every per-file rule is tried against
/// every file and the union of matches is returned. When nothing matches the
/// result is the fallback category alone.
pub fn candidates(change_set: &ChangeSet, table: &RuleTable) -> Candidates {
    let files = change_set.files();

    if let Some(rule) = table
        .whole_rules()
        .find(|rule| files.iter().all(|file| rule.matcher.matches(file)))
    {
        debug!("Whole-changeset rule matched: {}", rule.category);
        return Candidates::new(vec![rule.category], CandidateSource::WholeRule, table);
    }

    let matched: Vec<Category> = table
        .file_rules()
        .filter(|rule| files.iter().any(|file| rule.matcher.matches(file)))
        .map(|rule| rule.category)
        .collect();

    if matched.is_empty() {
        debug!("No rule matched; falling back to {}", Category::FALLBACK);
        return Candidates::new(vec![Category::FALLBACK], CandidateSource::Unmatched, table);
    }

    let candidates = Candidates::new(matched, CandidateSource::FileRules, table);
    debug!("Per-file candidates: {:?}", candidates.categories());
    candidates
}
