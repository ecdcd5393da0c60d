//! Marker lookup and commit subject formatting.

pub mod format;
pub mod mapper;

pub use crate::rules::MarkerEntry;
pub use format::{SEPARATOR, format_message, marker_prefix, split_message};
pub use mapper::marker_for;
