//! Change sets read from a repository using git2.
//!
//! Only reads: nothing here stages, commits or touches refs.

use std::collections::HashMap;
use std::path::Path;

use git2::{Delta, Diff, DiffFormat, DiffOptions, ErrorCode, Oid, Repository, Tree};
use tracing::warn;

use crate::change::{ChangeSet, FileChange};
use crate::error::GitError;

/// Which working-tree changes to collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorktreeScope {
    /// Only what is in the index (what `git commit` would record).
    Staged,
    /// Staged, unstaged and untracked changes.
    All,
}

/// Open the repository containing `path`, searching parent directories.
pub fn open_repository(path: &Path) -> Result<Repository, GitError> {
    Repository::discover(path).map_err(GitError::OpenRepository)
}

/// Resolve the HEAD tree, distinguishing empty-repo errors from real failures.
///
/// Returns `Ok(None)` for repos with no commits (unborn branch / not found),
/// `Ok(Some(tree))` for repos with a valid HEAD, or `Err(GitError::DiffFailed)`
/// for real errors (corrupt HEAD, permission issues, missing objects).
fn resolve_head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, GitError> {
    let head_ref = match repo.head() {
        Ok(r) => r,
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            return Ok(None);
        }
        Err(e) => return Err(GitError::DiffFailed(e)),
    };

    let tree = head_ref.peel_to_tree().map_err(GitError::DiffFailed)?;
    Ok(Some(tree))
}

/// Collect pending working-tree changes as a [`ChangeSet`].
///
/// Staged changes come from `diff_tree_to_index`; with [`WorktreeScope::All`]
/// the `diff_index_to_workdir` changes (untracked included) are merged in.
pub fn collect_worktree_changes(
    repo: &Repository,
    scope: WorktreeScope,
) -> Result<ChangeSet, GitError> {
    let head_tree = resolve_head_tree(repo)?;

    let staged = repo
        .diff_tree_to_index(head_tree.as_ref(), None, None)
        .map_err(GitError::DiffFailed)?;

    let mut files = Vec::new();
    collect_files(&staged, &mut files)?;

    if scope == WorktreeScope::All {
        let mut opts = DiffOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .show_untracked_content(true);
        let unstaged = repo
            .diff_index_to_workdir(None, Some(&mut opts))
            .map_err(GitError::DiffFailed)?;
        collect_files(&unstaged, &mut files)?;
    }

    ChangeSet::new(files).map_err(|_| GitError::NoChanges)
}

/// Collect the changes a commit introduced relative to its first parent.
///
/// Root commits are diffed against the empty tree.
pub fn collect_commit_changes(repo: &Repository, oid: Oid) -> Result<ChangeSet, GitError> {
    let commit = repo.find_commit(oid).map_err(GitError::ParseCommit)?;
    let tree = commit.tree().map_err(GitError::ParseCommit)?;
    let parent_tree = match commit.parent(0) {
        Ok(parent) => Some(parent.tree().map_err(GitError::ParseCommit)?),
        Err(_) => None,
    };

    let diff = repo
        .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)
        .map_err(GitError::DiffFailed)?;

    let mut files = Vec::new();
    collect_files(&diff, &mut files)?;
    ChangeSet::new(files).map_err(|_| GitError::NoChanges)
}

/// Append one [`FileChange`] per delta, with hunk lines filled in.
fn collect_files(diff: &Diff<'_>, files: &mut Vec<FileChange>) -> Result<(), GitError> {
    let start = files.len();
    let mut by_path: HashMap<String, usize> = HashMap::new();

    for delta in diff.deltas() {
        let Some(path) = delta_path(&delta) else {
            continue;
        };
        let Ok(mut file) = FileChange::new(&path) else {
            continue;
        };
        file.is_binary = delta.flags().is_binary();
        by_path.insert(path, files.len());
        files.push(file);
    }

    diff.print(DiffFormat::Patch, |delta, _hunk, line| {
        let Some(idx) = delta_path(&delta).and_then(|p| by_path.get(&p).copied()) else {
            return true;
        };
        let file = &mut files[idx];
        file.is_binary |= delta.flags().is_binary();

        let content = String::from_utf8_lossy(line.content());
        let content = content.trim_end_matches(['\n', '\r']);
        match line.origin() {
            '+' => file.push_added(content),
            '-' => file.push_removed(content),
            'B' => file.is_binary = true,
            _ => {}
        }
        true
    })
    .map_err(GitError::DiffFailed)?;

    if files.len() == start && diff.deltas().len() > 0 {
        warn!("Diff had {} delta(s) but no usable paths", diff.deltas().len());
    }

    Ok(())
}

fn delta_path(delta: &git2::DiffDelta<'_>) -> Option<String> {
    let file = match delta.status() {
        Delta::Deleted => delta.old_file(),
        _ => delta.new_file(),
    };
    file.path()
        .or_else(|| delta.old_file().path())
        .map(|p| p.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;

    fn init_repo() -> (tempfile::TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        (dir, repo)
    }

    fn commit_all(repo: &Repository, message: &str) -> Oid {
        let mut index = repo.index().unwrap();
        index
            .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
            .unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = Signature::now("Test", "test@test.com").unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
    }

    #[test]
    fn test_open_repository_from_subdirectory() {
        let (dir, _repo) = init_repo();
        let nested = dir.path().join("src/deep");
        std::fs::create_dir_all(&nested).unwrap();

        assert!(open_repository(&nested).is_ok());
    }

    #[test]
    fn test_open_repository_outside_git_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = open_repository(dir.path());
        assert!(matches!(result, Err(GitError::OpenRepository(_))));
    }

    #[test]
    fn test_clean_repo_has_no_changes() {
        let (dir, repo) = init_repo();
        std::fs::write(dir.path().join("a.txt"), "a\n").unwrap();
        commit_all(&repo, "init");

        let result = collect_worktree_changes(&repo, WorktreeScope::All);
        assert!(matches!(result, Err(GitError::NoChanges)));
    }

    #[test]
    fn test_untracked_file_lines_are_collected() {
        let (dir, repo) = init_repo();
        std::fs::write(dir.path().join("README.md"), "# Title\nBody\n").unwrap();

        let set = collect_worktree_changes(&repo, WorktreeScope::All).unwrap();
        let readme = &set.files()[0];
        assert_eq!(readme.path, "README.md");
        assert_eq!(readme.lines_added, 2);
        assert_eq!(readme.added_lines().collect::<Vec<_>>(), vec!["# Title", "Body"]);
    }

    #[test]
    fn test_staged_scope_ignores_unstaged() {
        let (dir, repo) = init_repo();
        std::fs::write(dir.path().join("a.txt"), "a\n").unwrap();
        commit_all(&repo, "init");

        std::fs::write(dir.path().join("staged.txt"), "s\n").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(std::path::Path::new("staged.txt")).unwrap();
        index.write().unwrap();
        std::fs::write(dir.path().join("loose.txt"), "l\n").unwrap();

        let set = collect_worktree_changes(&repo, WorktreeScope::Staged).unwrap();
        let paths: Vec<&str> = set.files().iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["staged.txt"]);
    }

    #[test]
    fn test_modification_counts_both_sides() {
        let (dir, repo) = init_repo();
        let path = dir.path().join("lib.rs");
        std::fs::write(&path, "fn old() {}\n").unwrap();
        commit_all(&repo, "init");
        std::fs::write(&path, "pub fn new() {}\n").unwrap();

        let set = collect_worktree_changes(&repo, WorktreeScope::All).unwrap();
        let lib = &set.files()[0];
        assert_eq!(lib.lines_added, 1);
        assert_eq!(lib.lines_removed, 1);
        assert_eq!(lib.removed_lines().collect::<Vec<_>>(), vec!["fn old() {}"]);
    }

    #[test]
    fn test_binary_file_is_flagged() {
        let (dir, repo) = init_repo();
        std::fs::write(dir.path().join("image.bin"), [0u8, 159, 146, 150]).unwrap();

        let set = collect_worktree_changes(&repo, WorktreeScope::All).unwrap();
        assert!(set.files()[0].is_binary);
    }

    #[test]
    fn test_commit_changes_against_parent() {
        let (dir, repo) = init_repo();
        std::fs::write(dir.path().join("a.txt"), "a\n").unwrap();
        let root = commit_all(&repo, "init");
        std::fs::write(dir.path().join("b.css"), ".x { color: red; }\n").unwrap();
        let second = commit_all(&repo, "style");

        let root_set = collect_commit_changes(&repo, root).unwrap();
        assert_eq!(root_set.files()[0].path, "a.txt");

        let second_set = collect_commit_changes(&repo, second).unwrap();
        assert_eq!(second_set.len(), 1);
        assert_eq!(second_set.files()[0].path, "b.css");
    }

    #[test]
    fn test_corrupt_head_propagates_error() {
        let (dir, repo) = init_repo();
        std::fs::write(dir.path().join("a.txt"), "a\n").unwrap();
        commit_all(&repo, "init");

        std::fs::write(dir.path().join(".git/HEAD"), "ref: refs/heads/\0invalid").unwrap();
        let repo = Repository::open(dir.path()).unwrap();
        let result = collect_worktree_changes(&repo, WorktreeScope::All);
        assert!(
            matches!(result, Err(GitError::DiffFailed(_))),
            "Expected DiffFailed for corrupt HEAD, got: {:?}",
            result
        );
    }
}
