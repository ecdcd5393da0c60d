//! The closed set of change categories.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Primary intent of a change.
///
/// The set is closed: rule tables may omit categories but can never invent new
/// ones. Ordering between categories comes from the rule table's ranks, not
/// from declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Feature,
    Fix,
    Security,
    Performance,
    Refactor,
    Test,
    Docs,
    Style,
    Ci,
    Dependency,
    Assets,
    Config,
    Package,
    Chore,
}

impl Category {
    /// Every category, in declaration order.
    pub const ALL: [Category; 14] = [
        Self::Feature,
        Self::Fix,
        Self::Security,
        Self::Performance,
        Self::Refactor,
        Self::Test,
        Self::Docs,
        Self::Style,
        Self::Ci,
        Self::Dependency,
        Self::Assets,
        Self::Config,
        Self::Package,
        Self::Chore,
    ];

    /// Category used when no rule matches.
    pub const FALLBACK: Category = Self::Chore;

    /// Get the serialized name for the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Feature => "feature",
            Self::Fix => "fix",
            Self::Security => "security",
            Self::Performance => "performance",
            Self::Refactor => "refactor",
            Self::Test => "test",
            Self::Docs => "docs",
            Self::Style => "style",
            Self::Ci => "ci",
            Self::Dependency => "dependency",
            Self::Assets => "assets",
            Self::Config => "config",
            Self::Package => "package",
            Self::Chore => "chore",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == lower)
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}
