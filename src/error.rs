//! Error types for commoji modules using thiserror.

use thiserror::Error;

use crate::rules::Category;

/// Errors from turning a diff into a category and a formatted message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    #[error("Malformed diff input: {0}")]
    MalformedInput(String),

    #[error("No changes to classify (the change set has no files)")]
    EmptyChange,

    #[error(
        "No marker configured for category '{0}'. The rule table and its marker entries are out of sync."
    )]
    UnknownCategory(Category),

    #[error("Commit description must not be empty")]
    EmptyDescription,
}

/// Errors from loading and validating a rule table.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("Failed to read rule table {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse rule table: {0}")]
    ParseFailed(#[source] serde_json::Error),

    #[error("Invalid pattern '{pattern}' in rule table: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex_lite::Error,
    },

    #[error("Category '{0}' is declared more than once in the rule table")]
    DuplicateCategory(Category),

    #[error("Rank {rank} is shared by '{first}' and '{second}'; ranks must be unique")]
    DuplicateRank {
        rank: u32,
        first: Category,
        second: Category,
    },

    #[error(
        "Category '{category}' has invalid type label '{label}' (must be non-empty and contain no ':')"
    )]
    InvalidTypeLabel { category: Category, label: String },

    #[error(
        "Category '{category}' has invalid glyph '{glyph}' (must be non-empty and contain no ':')"
    )]
    InvalidGlyph { category: Category, glyph: String },
}

/// Errors from reading changes out of a git repository.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Failed to open repository: {0}")]
    OpenRepository(#[source] git2::Error),

    #[error("Failed to find reference '{0}': {1}")]
    ReferenceNotFound(String, #[source] git2::Error),

    #[error("Failed to parse commit: {0}")]
    ParseCommit(#[source] git2::Error),

    #[error("Failed to walk commit history: {0}")]
    RevwalkError(#[source] git2::Error),

    #[error("Failed to collect diff: {0}")]
    DiffFailed(#[source] git2::Error),

    #[error("No changes to classify (working tree is clean)")]
    NoChanges,
}
