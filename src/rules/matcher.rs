//! File predicates used by rules.
//!
//! [`MatcherSpec`] is the serialized pattern-spec as it appears in a rule table;
//! [`Matcher`] is its compiled form with every regex built once at load time.

use regex_lite::Regex;
use serde::Deserialize;

use crate::change::FileChange;
use crate::error::TableError;

/// A predicate over one [`FileChange`], as written in the rule table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatcherSpec {
    /// Derived extension is one of `values` (case-insensitive).
    Extension { values: Vec<String> },
    /// Final path component equals one of `values` exactly.
    FileName { values: Vec<String> },
    /// Normalized path matches `pattern`.
    PathRegex { pattern: String },
    /// At least one added line matches `pattern`.
    AddedLineRegex { pattern: String },
    /// At least one removed line matches `pattern`.
    RemovedLineRegex { pattern: String },
    /// The file lost at least one line.
    HasRemovals,
    /// The file was reported as binary.
    Binary,
    AllOf { matchers: Vec<MatcherSpec> },
    AnyOf { matchers: Vec<MatcherSpec> },
    Not { matcher: Box<MatcherSpec> },
}

/// Compiled [`MatcherSpec`].
#[derive(Debug, Clone)]
pub enum Matcher {
    Extension(Vec<String>),
    FileName(Vec<String>),
    Path(Regex),
    AddedLine(Regex),
    RemovedLine(Regex),
    HasRemovals,
    Binary,
    AllOf(Vec<Matcher>),
    AnyOf(Vec<Matcher>),
    Not(Box<Matcher>),
}

impl Matcher {
    /// Compile a matcher description, failing on the first invalid regex.
    pub fn compile(spec: &MatcherSpec) -> Result<Self, TableError> {
        Ok(match spec {
            MatcherSpec::Extension { values } => Self::Extension(
                values
                    .iter()
                    .map(|v| v.trim_start_matches('.').to_lowercase())
                    .collect(),
            ),
            MatcherSpec::FileName { values } => Self::FileName(values.clone()),
            MatcherSpec::PathRegex { pattern } => Self::Path(compile_regex(pattern)?),
            MatcherSpec::AddedLineRegex { pattern } => Self::AddedLine(compile_regex(pattern)?),
            MatcherSpec::RemovedLineRegex { pattern } => {
                Self::RemovedLine(compile_regex(pattern)?)
            }
            MatcherSpec::HasRemovals => Self::HasRemovals,
            MatcherSpec::Binary => Self::Binary,
            MatcherSpec::AllOf { matchers } => Self::AllOf(
                matchers
                    .iter()
                    .map(Self::compile)
                    .collect::<Result<_, _>>()?,
            ),
            MatcherSpec::AnyOf { matchers } => Self::AnyOf(
                matchers
                    .iter()
                    .map(Self::compile)
                    .collect::<Result<_, _>>()?,
            ),
            MatcherSpec::Not { matcher } => Self::Not(Box::new(Self::compile(matcher)?)),
        })
    }

    pub fn matches(&self, file: &FileChange) -> bool {
        match self {
            Self::Extension(values) => values.iter().any(|v| *v == file.extension),
            Self::FileName(values) => values.iter().any(|v| v == file.file_name()),
            Self::Path(re) => re.is_match(&file.path),
            Self::AddedLine(re) => file.added_lines().any(|line| re.is_match(line)),
            Self::RemovedLine(re) => file.removed_lines().any(|line| re.is_match(line)),
            Self::HasRemovals => file.lines_removed > 0,
            Self::Binary => file.is_binary,
            Self::AllOf(matchers) => matchers.iter().all(|m| m.matches(file)),
            Self::AnyOf(matchers) => matchers.iter().any(|m| m.matches(file)),
            Self::Not(matcher) => !matcher.matches(file),
        }
    }
}

/// Compile a regex from the rule table, naming the offending pattern on failure.
pub(crate) fn compile_regex(pattern: &str) -> Result<Regex, TableError> {
    Regex::new(pattern).map_err(|source| TableError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}
