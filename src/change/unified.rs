//! Unified diff text to [`ChangeSet`].
//!
//! Understands `git diff` output (`diff --git` sections with optional rename and
//! binary markers) as well as bare `---`/`+++` file pairs. Hunk bodies are
//! consumed by the line counts in their `@@` headers, so removed lines that
//! happen to start with `--` are never mistaken for file headers.

use std::sync::LazyLock;

use regex_lite::Regex;
use tracing::{debug, warn};

use crate::error::ClassifyError;

use super::set::{ChangeSet, FileChange};

const GIT_HEADER: &str = "diff --git ";
const NULL_PATH: &str = "/dev/null";

static HUNK_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@ -\d+(?:,(\d+))? \+\d+(?:,(\d+))? @@").expect("hunk header pattern is valid")
});

/// A file section whose path is not known until all its headers are read.
#[derive(Debug, Default)]
struct Section {
    git_path: Option<String>,
    old_path: Option<String>,
    new_path: Option<String>,
    rename_to: Option<String>,
    is_binary: bool,
    lines: Vec<(char, String)>,
}

impl Section {
    fn has_content(&self) -> bool {
        self.old_path.is_some() || !self.lines.is_empty() || self.is_binary
    }

    /// Pick the path the change lands on; deletions fall back to the old side.
    fn resolved_path(&self) -> Option<&str> {
        let new = self.new_path.as_deref().filter(|p| *p != NULL_PATH);
        let old = self.old_path.as_deref().filter(|p| *p != NULL_PATH);
        new.or(self.rename_to.as_deref())
            .or(old)
            .or(self.git_path.as_deref())
            .filter(|p| !p.trim().is_empty())
    }

    fn into_file_change(self, ordinal: usize) -> Result<FileChange, ClassifyError> {
        let path = self.resolved_path().ok_or_else(|| {
            ClassifyError::MalformedInput(format!(
                "file section {} has no resolvable path",
                ordinal
            ))
        })?;

        let mut file = FileChange::new(path)?;
        file.is_binary = self.is_binary;
        for (origin, text) in self.lines {
            match origin {
                '+' => file.push_added(text),
                _ => file.push_removed(text),
            }
        }
        Ok(file)
    }
}

/// Remaining old/new line budget of the hunk being read.
#[derive(Debug, Default, Clone, Copy)]
struct HunkBudget {
    old: usize,
    new: usize,
}

impl HunkBudget {
    fn parse(header: &str) -> Option<Self> {
        let caps = HUNK_HEADER.captures(header)?;
        let count = |idx: usize| {
            caps.get(idx)
                .map_or(Some(1), |m| m.as_str().parse::<usize>().ok())
        };
        Some(Self {
            old: count(1)?,
            new: count(2)?,
        })
    }

    fn is_open(&self) -> bool {
        self.old > 0 || self.new > 0
    }
}

/// Parse unified diff text into a [`ChangeSet`].
///
/// Text outside any file section (mail headers, commit preambles) is ignored.
/// Fails with [`ClassifyError::MalformedInput`] when no file section with a
/// resolvable path is found.
pub fn summarize_diff(text: &str) -> Result<ChangeSet, ClassifyError> {
    let mut sections: Vec<Section> = Vec::new();
    let mut current: Option<Section> = None;
    let mut hunk = HunkBudget::default();

    for line in text.lines() {
        if hunk.is_open() {
            if let Some(section) = current.as_mut() {
                consume_hunk_line(section, &mut hunk, line);
                continue;
            }
        }

        if let Some(rest) = line.strip_prefix(GIT_HEADER) {
            sections.extend(current.take());
            current = Some(Section {
                git_path: parse_git_header(rest),
                ..Section::default()
            });
        } else if let Some(rest) = line.strip_prefix("--- ") {
            if current.as_ref().is_none_or(Section::has_content) {
                sections.extend(current.take());
                current = Some(Section::default());
            }
            if let Some(section) = current.as_mut() {
                section.old_path = Some(parse_marker_path(rest));
            }
        } else if let Some(rest) = line.strip_prefix("+++ ") {
            match current.as_mut() {
                Some(section) => section.new_path = Some(parse_marker_path(rest)),
                None => warn!("Ignoring '+++' header without a preceding file section"),
            }
        } else if line.starts_with("@@") {
            match (current.as_ref(), HunkBudget::parse(line)) {
                (Some(_), Some(budget)) => hunk = budget,
                (None, _) => {
                    return Err(ClassifyError::MalformedInput(
                        "hunk found before any file header".to_string(),
                    ));
                }
                (Some(_), None) => {
                    return Err(ClassifyError::MalformedInput(format!(
                        "unreadable hunk header: {}",
                        line
                    )));
                }
            }
        } else if let Some(section) = current.as_mut() {
            if line.starts_with("Binary files ") || line == "GIT binary patch" {
                section.is_binary = true;
            } else if let Some(target) = line.strip_prefix("rename to ") {
                section.rename_to = Some(target.trim().to_string());
            }
        }
    }
    sections.extend(current);

    if sections.is_empty() {
        return Err(ClassifyError::MalformedInput(
            "no file sections found in diff".to_string(),
        ));
    }

    debug!("Parsed {} file section(s) from diff", sections.len());

    let files: Vec<FileChange> = sections
        .into_iter()
        .enumerate()
        .filter_map(|(idx, section)| match section.into_file_change(idx + 1) {
            Ok(file) => Some(file),
            Err(e) => {
                warn!("Skipping diff section: {}", e);
                None
            }
        })
        .collect();

    if files.is_empty() {
        return Err(ClassifyError::MalformedInput(
            "no file section has a resolvable path".to_string(),
        ));
    }

    ChangeSet::new(files)
}

fn consume_hunk_line(section: &mut Section, hunk: &mut HunkBudget, line: &str) {
    let mut chars = line.chars();
    match chars.next() {
        Some('+') => {
            hunk.new = hunk.new.saturating_sub(1);
            section.lines.push(('+', chars.as_str().to_string()));
        }
        Some('-') => {
            hunk.old = hunk.old.saturating_sub(1);
            section.lines.push(('-', chars.as_str().to_string()));
        }
        Some('\\') => {}
        // Context lines, including blank ones some tools emit without the leading space.
        _ => {
            hunk.old = hunk.old.saturating_sub(1);
            hunk.new = hunk.new.saturating_sub(1);
        }
    }
}

/// Extract the `b/` side of a `diff --git a/X b/Y` header.
fn parse_git_header(rest: &str) -> Option<String> {
    let path = match rest.rfind(" b/") {
        Some(pos) => &rest[pos + 3..],
        None => rest.split_whitespace().last()?,
    };
    Some(strip_side_prefix(path).to_string())
}

/// Path of a `---`/`+++` line, without timestamps or `a/`/`b/` prefixes.
fn parse_marker_path(rest: &str) -> String {
    let path = rest.split('\t').next().unwrap_or(rest).trim();
    if path == NULL_PATH {
        return path.to_string();
    }
    strip_side_prefix(path).to_string()
}

fn strip_side_prefix(path: &str) -> &str {
    path.strip_prefix("a/")
        .or_else(|| path.strip_prefix("b/"))
        .unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_FILE_DIFF: &str = "\
diff --git a/src/auth.ts b/src/auth.ts
index 83db48f..bf269f4 100644
--- a/src/auth.ts
+++ b/src/auth.ts
@@ -1,2 +1,3 @@
 import { db } from './db';
-export function login() {}
+export function login(user: string) {}
+export function logout() {}

diff --git a/README.md b/README.md
new file mode 100644
--- /dev/null
+++ b/README.md
@@ -0,0 +1,2 @@
+# Title
+Some text
";

    #[test]
    fn test_parses_git_sections() {
        let set = summarize_diff(TWO_FILE_DIFF).unwrap();
        assert_eq!(set.len(), 2);

        let auth = &set.files()[0];
        assert_eq!(auth.path, "src/auth.ts");
        assert_eq!(auth.extension, "ts");
        assert_eq!(auth.lines_added, 2);
        assert_eq!(auth.lines_removed, 1);
        assert_eq!(
            auth.added_lines().collect::<Vec<_>>(),
            vec!["export function login(user: string) {}", "export function logout() {}"]
        );

        let readme = &set.files()[1];
        assert_eq!(readme.path, "README.md");
        assert_eq!(readme.lines_added, 2);
        assert_eq!(readme.lines_removed, 0);
    }

    #[test]
    fn test_deleted_file_uses_old_path() {
        let diff = "\
diff --git a/old.txt b/old.txt
deleted file mode 100644
--- a/old.txt
+++ /dev/null
@@ -1 +0,0 @@
-gone
";
        let set = summarize_diff(diff).unwrap();
        assert_eq!(set.files()[0].path, "old.txt");
        assert_eq!(set.files()[0].lines_removed, 1);
    }

    #[test]
    fn test_removed_line_that_looks_like_header() {
        let diff = "\
--- a/notes.md
+++ b/notes.md
@@ -1,2 +1,1 @@
--- a horizontal rule
 kept
";
        let set = summarize_diff(diff).unwrap();
        assert_eq!(set.len(), 1);
        let notes = &set.files()[0];
        assert_eq!(notes.lines_removed, 1);
        assert_eq!(notes.removed_lines().collect::<Vec<_>>(), vec!["-- a horizontal rule"]);
    }

    #[test]
    fn test_bare_marker_pairs_split_into_files() {
        let diff = "\
--- a/one.py
+++ b/one.py
@@ -1 +1 @@
-a
+b
--- a/two.py
+++ b/two.py
@@ -1 +1 @@
-c
+d
";
        let set = summarize_diff(diff).unwrap();
        let paths: Vec<&str> = set.files().iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["one.py", "two.py"]);
    }

    #[test]
    fn test_binary_and_rename_sections() {
        let diff = "\
diff --git a/img/logo.png b/img/logo.png
index 1111111..2222222 100644
Binary files a/img/logo.png and b/img/logo.png differ
diff --git a/src/old_name.rs b/src/new_name.rs
similarity index 100%
rename from src/old_name.rs
rename to src/new_name.rs
";
        let set = summarize_diff(diff).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.files()[0].is_binary);
        assert_eq!(set.files()[0].extension, "png");
        assert_eq!(set.files()[1].path, "src/new_name.rs");
    }

    #[test]
    fn test_no_newline_marker_is_not_counted() {
        let diff = "\
--- a/a.txt
+++ b/a.txt
@@ -1 +1 @@
-x
\\ No newline at end of file
+y
\\ No newline at end of file
";
        let set = summarize_diff(diff).unwrap();
        assert_eq!(set.files()[0].lines_added, 1);
        assert_eq!(set.files()[0].lines_removed, 1);
    }

    #[test]
    fn test_preamble_is_ignored() {
        let diff = format!(
            "From abc123 Mon Sep 17 00:00:00 2001\nSubject: [PATCH] x\n\n{}",
            TWO_FILE_DIFF
        );
        assert_eq!(summarize_diff(&diff).unwrap().len(), 2);
    }

    #[test]
    fn test_empty_text_is_malformed() {
        assert!(matches!(summarize_diff(""), Err(ClassifyError::MalformedInput(_))));
        assert!(matches!(
            summarize_diff("just some words\nnot a diff\n"),
            Err(ClassifyError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_hunk_without_file_is_malformed() {
        assert!(matches!(
            summarize_diff("@@ -1 +1 @@\n-a\n+b\n"),
            Err(ClassifyError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_section_without_path_is_malformed() {
        let diff = "--- /dev/null\n+++ /dev/null\n";
        assert!(matches!(
            summarize_diff(diff),
            Err(ClassifyError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_section_without_path_is_skipped_when_others_resolve() {
        let diff = "\
--- /dev/null
+++ /dev/null
--- a/ok.md
+++ b/ok.md
@@ -0,0 +1 @@
+hi
";
        let set = summarize_diff(diff).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.files()[0].path, "ok.md");
        assert_eq!(set.files()[0].lines_added, 1);
    }
}
