//! Change Summarizer: raw diff input to a normalized [`ChangeSet`].

pub mod set;
pub mod unified;

pub use set::{
    ChangeSet, FileChange, FileEntry, HunkLine, NO_EXTENSION, derive_extension, normalize_path,
    summarize_entries,
};
pub use unified::summarize_diff;
