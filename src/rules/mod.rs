//! Category Rule Table: categories, their ranks and markers, and ordered rules.

pub mod category;
pub mod matcher;
pub mod table;

pub use category::Category;
pub use matcher::{Matcher, MatcherSpec};
pub use table::{
    BUILTIN_TABLE, CategoryEntry, MarkerEntry, Rule, RuleTable, Scope, TABLE_ENV_VAR,
};
