//! The category rule table: ranks, markers, scoring keywords and ordered rules.
//!
//! A table is loaded once at startup, validated, and then only read. It holds
//! no interior mutability, so a single instance can be shared by reference
//! across threads.

use std::collections::HashMap;
use std::env;
use std::path::Path;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TableError;

use super::category::Category;
use super::matcher::{Matcher, MatcherSpec, compile_regex};

/// Built-in gitmoji table compiled into the binary.
pub const BUILTIN_TABLE: &str = include_str!("../../data/gitmoji.json");

/// Environment variable naming a rule table file to use instead of the built-in one.
pub const TABLE_ENV_VAR: &str = "COMMOJI_TABLE";

/// Whether a rule must hold for every file or for at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    All,
    Any,
}

/// Display marker for a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerEntry {
    pub glyph: String,
    pub type_label: String,
}

/// A category's row in the table.
#[derive(Debug, Clone)]
pub struct CategoryEntry {
    pub category: Category,
    pub rank: u32,
    pub marker: MarkerEntry,
    /// Patterns counted by the heuristic scorer.
    pub keywords: Vec<Regex>,
}

/// A compiled rule.
#[derive(Debug, Clone)]
pub struct Rule {
    pub scope: Scope,
    pub matcher: Matcher,
    pub category: Category,
}

#[derive(Debug, Deserialize)]
struct TableSpec {
    categories: Vec<CategorySpec>,
    rules: Vec<RuleSpec>,
}

#[derive(Debug, Deserialize)]
struct CategorySpec {
    name: Category,
    rank: u32,
    glyph: String,
    type_label: String,
    #[serde(default)]
    keywords: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RuleSpec {
    scope: Scope,
    matcher: MatcherSpec,
    category: Category,
}

/// Validated, immutable rule table.
#[derive(Debug, Clone)]
pub struct RuleTable {
    /// Sorted by rank.
    categories: Vec<CategoryEntry>,
    rules: Vec<Rule>,
}

impl RuleTable {
    /// Parse and validate a table from JSON.
    pub fn from_json(json: &str) -> Result<Self, TableError> {
        let spec: TableSpec = serde_json::from_str(json).map_err(TableError::ParseFailed)?;
        Self::from_spec(spec)
    }

    /// The table compiled into the binary.
    pub fn builtin() -> Result<Self, TableError> {
        Self::from_json(BUILTIN_TABLE)
    }

    /// Read a table from a JSON file.
    pub fn load(path: &Path) -> Result<Self, TableError> {
        let content = std::fs::read_to_string(path).map_err(|source| TableError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Pick the table for this process.
    ///
    /// Checks in order:
    /// 1. An explicit path (the `--table` flag)
    /// 2. The `COMMOJI_TABLE` environment variable
    /// 3. The built-in table
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, TableError> {
        if let Some(path) = explicit {
            debug!("Loading rule table from {}", path.display());
            return Self::load(path);
        }

        if let Ok(path) = env::var(TABLE_ENV_VAR)
            && !path.trim().is_empty()
        {
            debug!("Loading rule table from {}={}", TABLE_ENV_VAR, path);
            return Self::load(Path::new(path.trim()));
        }

        Self::builtin()
    }

    fn from_spec(spec: TableSpec) -> Result<Self, TableError> {
        let mut categories = Vec::with_capacity(spec.categories.len());
        let mut ranks: HashMap<u32, Category> = HashMap::new();

        for entry in spec.categories {
            if categories
                .iter()
                .any(|c: &CategoryEntry| c.category == entry.name)
            {
                return Err(TableError::DuplicateCategory(entry.name));
            }
            if let Some(&first) = ranks.get(&entry.rank) {
                return Err(TableError::DuplicateRank {
                    rank: entry.rank,
                    first,
                    second: entry.name,
                });
            }
            let label = entry.type_label.trim();
            if label.is_empty() || label.contains(':') {
                return Err(TableError::InvalidTypeLabel {
                    category: entry.name,
                    label: entry.type_label,
                });
            }
            if entry.glyph.trim().is_empty() || entry.glyph.contains(':') {
                return Err(TableError::InvalidGlyph {
                    category: entry.name,
                    glyph: entry.glyph,
                });
            }

            ranks.insert(entry.rank, entry.name);
            categories.push(CategoryEntry {
                category: entry.name,
                rank: entry.rank,
                marker: MarkerEntry {
                    glyph: entry.glyph.trim().to_string(),
                    type_label: label.to_string(),
                },
                keywords: entry
                    .keywords
                    .iter()
                    .map(|k| compile_regex(k))
                    .collect::<Result<_, _>>()?,
            });
        }
        categories.sort_by_key(|c| c.rank);

        let rules = spec
            .rules
            .into_iter()
            .map(|rule| {
                Ok(Rule {
                    scope: rule.scope,
                    matcher: Matcher::compile(&rule.matcher)?,
                    category: rule.category,
                })
            })
            .collect::<Result<Vec<_>, TableError>>()?;

        debug!(
            "Loaded rule table: {} categories, {} rules",
            categories.len(),
            rules.len()
        );

        Ok(Self { categories, rules })
    }

    /// Category rows in rank order.
    pub fn categories(&self) -> &[CategoryEntry] {
        &self.categories
    }

    /// All rules in declared order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Rules that must hold for every file, in declared order.
    pub fn whole_rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|r| r.scope == Scope::All)
    }

    /// Rules evaluated per file, in declared order.
    pub fn file_rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|r| r.scope == Scope::Any)
    }

    pub fn entry(&self, category: Category) -> Option<&CategoryEntry> {
        self.categories.iter().find(|c| c.category == category)
    }

    /// Priority rank of `category`; categories missing from the table rank last.
    pub fn rank(&self, category: Category) -> u32 {
        self.entry(category).map_or(u32::MAX, |c| c.rank)
    }

    /// Scoring patterns for `category` (empty when none are configured).
    pub fn keywords(&self, category: Category) -> &[Regex] {
        self.entry(category)
            .map(|c| c.keywords.as_slice())
            .unwrap_or(&[])
    }
}
