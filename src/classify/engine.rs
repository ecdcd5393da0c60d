//! Resolution Engine: drives a change set to exactly one category.
//!
//! ```text
//! Classifying ──(1 candidate)──────────────────────────▶ Resolved
//!      │                                                    ▲
//!      └──(2+ candidates)──▶ TieBreaking ──(scores)────────┘
//! ```

use serde::Serialize;
use tracing::debug;

use crate::change::ChangeSet;
use crate::error::ClassifyError;
use crate::marker::{format_message, marker_for};
use crate::rules::{Category, MarkerEntry, RuleTable};

use super::pattern::{CandidateSource, Candidates, candidates};
use super::scorer::{CategoryScore, best, score};

/// How the category was reached. For diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// A single candidate came straight out of the rule table.
    RuleMatched,
    /// Several candidates; keyword scores picked the winner.
    HeuristicBroken,
    /// No rule or keyword signal; the best-ranked candidate stood in.
    FallbackDefault,
}

/// Final classification of a change set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationResult {
    pub category: Category,
    pub marker: MarkerEntry,
    pub confidence: Confidence,
    /// Candidate categories, best rank first.
    pub candidates: Vec<Category>,
    /// Keyword scores; empty unless tie-breaking ran.
    pub scores: Vec<CategoryScore>,
}

impl ClassificationResult {
    /// Prefix `description` with this result's marker.
    pub fn format_message(&self, description: &str) -> Result<String, ClassifyError> {
        format_message(&self.marker, description)
    }
}

/// Category chosen before the marker lookup.
#[derive(Debug, Clone)]
struct Resolution {
    category: Category,
    confidence: Confidence,
    candidates: Vec<Category>,
    scores: Vec<CategoryScore>,
}

enum State {
    Classifying,
    TieBreaking(Candidates),
    Resolved(Resolution),
}

/// Classifies change sets against a shared, read-only rule table.
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'t> {
    table: &'t RuleTable,
}

impl<'t> Classifier<'t> {
    pub fn new(table: &'t RuleTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'t RuleTable {
        self.table
    }

    /// Resolve a change set to exactly one category and its marker.
    pub fn resolve(&self, change_set: &ChangeSet) -> Result<ClassificationResult, ClassifyError> {
        let mut state = State::Classifying;

        let resolution = loop {
            state = match state {
                State::Classifying => self.classify(change_set)?,
                State::TieBreaking(found) => self.break_tie(change_set, found),
                State::Resolved(resolution) => break resolution,
            };
        };

        debug!(
            "Resolved to {} ({:?}) from {:?}",
            resolution.category, resolution.confidence, resolution.candidates
        );

        let marker = marker_for(self.table, resolution.category)?.clone();
        Ok(ClassificationResult {
            category: resolution.category,
            marker,
            confidence: resolution.confidence,
            candidates: resolution.candidates,
            scores: resolution.scores,
        })
    }

    /// Resolve and format in one step.
    pub fn annotate(
        &self,
        change_set: &ChangeSet,
        description: &str,
    ) -> Result<(ClassificationResult, String), ClassifyError> {
        let result = self.resolve(change_set)?;
        let message = result.format_message(description)?;
        Ok((result, message))
    }

    fn classify(&self, change_set: &ChangeSet) -> Result<State, ClassifyError> {
        if change_set.is_empty() {
            return Err(ClassifyError::EmptyChange);
        }

        let found = candidates(change_set, self.table);
        if found.len() > 1 {
            return Ok(State::TieBreaking(found));
        }

        let confidence = match found.source() {
            CandidateSource::Unmatched => Confidence::FallbackDefault,
            CandidateSource::WholeRule | CandidateSource::FileRules => Confidence::RuleMatched,
        };
        Ok(State::Resolved(Resolution {
            category: found.first(),
            confidence,
            candidates: found.categories().to_vec(),
            scores: Vec::new(),
        }))
    }

    fn break_tie(&self, change_set: &ChangeSet, found: Candidates) -> State {
        let scores = score(change_set, &found, self.table);
        debug!("Tie-break scores: {:?}", scores);

        let (category, confidence) = match best(&scores, self.table) {
            Some(category) => (category, Confidence::HeuristicBroken),
            None => (found.first(), Confidence::FallbackDefault),
        };

        State::Resolved(Resolution {
            category,
            confidence,
            candidates: found.categories().to_vec(),
            scores,
        })
    }
}
