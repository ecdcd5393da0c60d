//! commoji - Picks a single gitmoji and conventional type label for a change.
//!
//! # Overview
//!
//! A diff is summarized into a [`ChangeSet`], matched against an ordered,
//! data-driven [`RuleTable`], and resolved to exactly one [`Category`]. When
//! several categories are plausible, keyword hits in the added lines break the
//! tie, and the category priority rank breaks any tie that remains. The
//! category's marker then prefixes the commit description:
//! `"<glyph> <type_label>: <description>"`.

pub mod change;
pub mod classify;
pub mod error;
pub mod git;
pub mod marker;
pub mod rules;

// Re-export commonly used types
pub use change::{ChangeSet, FileChange, FileEntry, summarize_diff, summarize_entries};
pub use classify::{ClassificationResult, Classifier, Confidence, classify_batch};
pub use error::{ClassifyError, GitError, TableError};
pub use marker::{MarkerEntry, format_message, marker_for};
pub use rules::{Category, RuleTable};
