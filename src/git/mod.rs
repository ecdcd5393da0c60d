//! Read-only git operations using git2-rs.

pub mod diff;
pub mod history;
pub mod range;

pub use diff::{WorktreeScope, collect_commit_changes, collect_worktree_changes, open_repository};
pub use history::{HistoricalCommit, fetch_history};
pub use range::{CommitRange, resolve_range};
