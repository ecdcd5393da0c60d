//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use commoji::{ChangeSet, FileChange};
use git2::{Oid, Repository, Signature};

/// Get the path to test fixtures directory.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Get the path to a diff fixture.
pub fn diff_fixture(name: &str) -> PathBuf {
    fixtures_dir().join("diffs").join(name)
}

/// Get the path to a rule table fixture.
pub fn table_fixture(name: &str) -> PathBuf {
    fixtures_dir().join("tables").join(name)
}

/// Read a fixture file as a string.
pub fn read_fixture(path: PathBuf) -> String {
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {:?}: {}", path, e))
}

/// Build a change set from `(path, added lines, removed lines)` triples.
pub fn change_set(files: Vec<(&str, Vec<&str>, Vec<&str>)>) -> ChangeSet {
    let files = files
        .into_iter()
        .map(|(path, added, removed)| {
            let mut file = FileChange::new(path).expect("Invalid test path");
            for line in removed {
                file.push_removed(line);
            }
            for line in added {
                file.push_added(line);
            }
            file
        })
        .collect();
    ChangeSet::new(files).expect("Test change set must not be empty")
}

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository in a temp directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        Self { dir, repo }
    }

    /// Get the test signature for commits.
    fn signature(&self) -> Signature<'_> {
        Signature::now("Test User", "test@example.com").expect("Failed to create signature")
    }

    /// Write a file relative to the repository root, creating parent directories.
    pub fn write(&self, path: &str, content: &str) {
        let full = self.dir.path().join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&full, content).expect("Failed to write test file");
    }

    /// Stage a path that already exists in the working tree.
    pub fn stage(&self, path: &str) {
        let mut index = self.repo.index().expect("Failed to get index");
        index.add_path(Path::new(path)).expect("Failed to add file");
        index.write().expect("Failed to write index");
    }

    /// Write the given files, stage them and commit. Returns the commit OID.
    pub fn commit_files(&self, message: &str, files: &[(&str, &str)]) -> Oid {
        for (path, content) in files {
            self.write(path, content);
            self.stage(path);
        }
        self.commit_index(message)
    }

    /// Commit whatever is currently in the index.
    pub fn commit_index(&self, message: &str) -> Oid {
        let sig = self.signature();
        let mut index = self.repo.index().expect("Failed to get index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        // Get parent commit if exists
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Create a lightweight tag pointing to the given OID.
    pub fn tag_lightweight(&self, name: &str, oid: Oid) {
        let obj = self.repo.find_object(oid, None).expect("Failed to find object");
        self.repo
            .tag_lightweight(name, &obj, false)
            .expect("Failed to create lightweight tag");
    }
}
