//! Walking past commits for batch classification.

use git2::{Oid, Repository};
use tracing::warn;

use crate::change::ChangeSet;
use crate::error::GitError;

use super::diff::collect_commit_changes;
use super::range::CommitRange;

/// A past commit and the changes it introduced.
#[derive(Debug, Clone)]
pub struct HistoricalCommit {
    pub hash: String,
    /// First line of the commit message.
    pub subject: String,
    pub changes: ChangeSet,
}

impl HistoricalCommit {
    pub fn short_hash(&self) -> &str {
        &self.hash[..self.hash.len().min(7)]
    }
}

/// Fetch commits in `range`, newest first, with their change sets.
///
/// Commits that introduce no file changes (empty or pure merge commits) are
/// skipped with a warning.
pub fn fetch_history(
    repo: &Repository,
    range: &CommitRange,
) -> Result<Vec<HistoricalCommit>, GitError> {
    let mut revwalk = repo.revwalk().map_err(GitError::RevwalkError)?;
    revwalk.push(range.to).map_err(GitError::RevwalkError)?;
    if let Some(from) = range.from {
        revwalk.hide(from).map_err(GitError::RevwalkError)?;
    }

    let mut commits = Vec::new();
    for oid_result in revwalk {
        let oid = oid_result.map_err(GitError::RevwalkError)?;
        match load_commit(repo, oid) {
            Ok(commit) => commits.push(commit),
            Err(GitError::NoChanges) => warn!("Skipping {}: commit has no file changes", oid),
            Err(e) => return Err(e),
        }
    }

    Ok(commits)
}

fn load_commit(repo: &Repository, oid: Oid) -> Result<HistoricalCommit, GitError> {
    let commit = repo.find_commit(oid).map_err(GitError::ParseCommit)?;
    let subject = commit
        .message()
        .unwrap_or("")
        .lines()
        .next()
        .unwrap_or("")
        .trim()
        .to_string();
    let changes = collect_commit_changes(repo, oid)?;

    Ok(HistoricalCommit {
        hash: oid.to_string(),
        subject,
        changes,
    })
}
