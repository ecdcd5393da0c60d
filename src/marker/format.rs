//! Message Formatter: `<glyph> <type_label>: <description>`.

use crate::error::ClassifyError;
use crate::rules::MarkerEntry;

/// Separator between the marker prefix and the description.
pub const SEPARATOR: &str = ": ";

/// `<glyph> <type_label>`, the part of the message before the separator.
pub fn marker_prefix(marker: &MarkerEntry) -> String {
    format!("{} {}", marker.glyph, marker.type_label)
}

/// Build the prefixed commit subject.
///
/// The description is emitted exactly as given. Only an empty description is
/// rejected; length and wording are the caller's business.
pub fn format_message(marker: &MarkerEntry, description: &str) -> Result<String, ClassifyError> {
    if description.is_empty() {
        return Err(ClassifyError::EmptyDescription);
    }
    Ok(format!("{}{}{}", marker_prefix(marker), SEPARATOR, description))
}

/// Split a formatted message back into its prefix and description.
pub fn split_message(message: &str) -> Option<(&str, &str)> {
    message.split_once(SEPARATOR)
}
