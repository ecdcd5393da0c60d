//! Normalized change representation consumed by the classifier.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ClassifyError;

/// Extension reported for files without one.
pub const NO_EXTENSION: &str = "none";

/// One line of hunk content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum HunkLine {
    Added(String),
    Removed(String),
}

/// A single file touched by a change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChange {
    pub path: String,
    pub extension: String,
    pub lines_added: usize,
    pub lines_removed: usize,
    pub is_binary: bool,
    /// Added and removed lines in diff order, without the `+`/`-` origin.
    pub hunk_text: Vec<HunkLine>,
}

impl FileChange {
    /// Create an empty change for `path`, normalizing it and deriving the extension.
    ///
    /// Fails with [`ClassifyError::MalformedInput`] if nothing is left of the
    /// path after normalization.
    pub fn new(path: &str) -> Result<Self, ClassifyError> {
        let path = normalize_path(path);
        if path.is_empty() {
            return Err(ClassifyError::MalformedInput(
                "file entry has no resolvable path".to_string(),
            ));
        }

        let extension = derive_extension(&path);
        Ok(Self {
            path,
            extension,
            lines_added: 0,
            lines_removed: 0,
            is_binary: false,
            hunk_text: Vec::new(),
        })
    }

    /// Final path component.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    pub fn push_added(&mut self, line: impl Into<String>) {
        self.lines_added += 1;
        self.hunk_text.push(HunkLine::Added(line.into()));
    }

    pub fn push_removed(&mut self, line: impl Into<String>) {
        self.lines_removed += 1;
        self.hunk_text.push(HunkLine::Removed(line.into()));
    }

    /// Added line content in diff order.
    pub fn added_lines(&self) -> impl Iterator<Item = &str> {
        self.hunk_text.iter().filter_map(|line| match line {
            HunkLine::Added(text) => Some(text.as_str()),
            HunkLine::Removed(_) => None,
        })
    }

    /// Removed line content in diff order.
    pub fn removed_lines(&self) -> impl Iterator<Item = &str> {
        self.hunk_text.iter().filter_map(|line| match line {
            HunkLine::Removed(text) => Some(text.as_str()),
            HunkLine::Added(_) => None,
        })
    }

    fn absorb(&mut self, other: FileChange) {
        self.lines_added += other.lines_added;
        self.lines_removed += other.lines_removed;
        self.is_binary |= other.is_binary;
        self.hunk_text.extend(other.hunk_text);
    }
}

/// The files of one proposed change, unique by path and never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ChangeSet {
    files: Vec<FileChange>,
}

impl ChangeSet {
    /// Build a change set, merging entries that share a path into the first one.
    pub fn new(files: Vec<FileChange>) -> Result<Self, ClassifyError> {
        let mut merged: Vec<FileChange> = Vec::with_capacity(files.len());
        let mut index: HashMap<String, usize> = HashMap::new();

        for file in files {
            match index.get(&file.path) {
                Some(&idx) => merged[idx].absorb(file),
                None => {
                    index.insert(file.path.clone(), merged.len());
                    merged.push(file);
                }
            }
        }

        if merged.is_empty() {
            return Err(ClassifyError::EmptyChange);
        }

        Ok(Self { files: merged })
    }

    pub fn files(&self) -> &[FileChange] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Every added line across all files, file order first.
    pub fn added_lines(&self) -> impl Iterator<Item = &str> {
        self.files.iter().flat_map(FileChange::added_lines)
    }

    pub fn total_added(&self) -> usize {
        self.files.iter().map(|f| f.lines_added).sum()
    }

    pub fn total_removed(&self) -> usize {
        self.files.iter().map(|f| f.lines_removed).sum()
    }
}

/// Pre-parsed description of one changed file, as accepted on the JSON input path.
///
/// Line counts default to the number of supplied lines when omitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileEntry {
    pub path: String,
    #[serde(default)]
    pub lines_added: Option<usize>,
    #[serde(default)]
    pub lines_removed: Option<usize>,
    #[serde(default)]
    pub is_binary: bool,
    #[serde(default)]
    pub added: Vec<String>,
    #[serde(default)]
    pub removed: Vec<String>,
}

/// Turn a pre-parsed file list into a [`ChangeSet`].
///
/// An empty list is [`ClassifyError::EmptyChange`]; an entry whose path is blank
/// is [`ClassifyError::MalformedInput`].
pub fn summarize_entries(entries: Vec<FileEntry>) -> Result<ChangeSet, ClassifyError> {
    let mut files = Vec::with_capacity(entries.len());

    for entry in entries {
        let mut file = FileChange::new(&entry.path)?;
        file.is_binary = entry.is_binary;
        for line in entry.removed {
            file.push_removed(line);
        }
        for line in entry.added {
            file.push_added(line);
        }
        if let Some(added) = entry.lines_added {
            file.lines_added = added;
        }
        if let Some(removed) = entry.lines_removed {
            file.lines_removed = removed;
        }
        files.push(file);
    }

    ChangeSet::new(files)
}

/// Canonical forward-slash form: trimmed, no leading `./`, no doubled slashes.
pub fn normalize_path(raw: &str) -> String {
    let unified = raw.trim().replace('\\', "/");
    let mut path = unified.as_str();
    while let Some(rest) = path.strip_prefix("./") {
        path = rest;
    }

    path.split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Lower-cased text after the last `.` of the file name, or [`NO_EXTENSION`].
pub fn derive_extension(path: &str) -> String {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext.to_lowercase(),
        _ => NO_EXTENSION.to_string(),
    }
}
