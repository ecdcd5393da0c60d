//! Marker Mapper: category to glyph and conventional type label.

use crate::error::ClassifyError;
use crate::rules::{Category, MarkerEntry, RuleTable};

/// Look up the marker for `category`.
///
/// A missing entry means the table's categories and its rules have drifted
/// apart; it is reported as [`ClassifyError::UnknownCategory`] and must not be
/// papered over by the caller.
pub fn marker_for(table: &RuleTable, category: Category) -> Result<&MarkerEntry, ClassifyError> {
    table
        .entry(category)
        .map(|entry| &entry.marker)
        .ok_or(ClassifyError::UnknownCategory(category))
}
