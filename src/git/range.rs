//! Commit range resolution.

use git2::{Oid, Repository};

use crate::error::GitError;

/// Resolved commit range. `from` is exclusive; `None` walks back to the root.
#[derive(Debug, Clone)]
pub struct CommitRange {
    pub from: Option<Oid>,
    pub to: Oid,
    pub from_ref: String,
    pub to_ref: String,
}

/// Resolve a commit range from user-provided references.
///
/// If `from` is None, the range reaches the root commit (inclusive).
/// If `to` is None, uses HEAD.
pub fn resolve_range(
    repo: &Repository,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<CommitRange, GitError> {
    let to_ref = to.unwrap_or("HEAD");
    let to_oid = resolve_reference(repo, to_ref)?;

    let (from_oid, from_ref) = match from {
        Some(from_str) => (
            Some(resolve_reference(repo, from_str)?),
            from_str.to_string(),
        ),
        None => (None, "root".to_string()),
    };

    Ok(CommitRange {
        from: from_oid,
        to: to_oid,
        from_ref,
        to_ref: to_ref.to_string(),
    })
}

/// Resolve a reference (tag, branch, commit hash) to an OID.
fn resolve_reference(repo: &Repository, reference: &str) -> Result<Oid, GitError> {
    // Try as a direct OID first
    if let Ok(oid) = Oid::from_str(reference)
        && repo.find_commit(oid).is_ok()
    {
        return Ok(oid);
    }

    // Try as a reference (branch, tag, HEAD~n)
    match repo.revparse_single(reference) {
        Ok(obj) => Ok(obj.peel_to_commit().map_err(GitError::ParseCommit)?.id()),
        Err(e) => Err(GitError::ReferenceNotFound(reference.to_string(), e)),
    }
}
