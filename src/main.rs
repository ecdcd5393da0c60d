//! commoji - CLI entry point.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use commoji::git::{
    HistoricalCommit, WorktreeScope, collect_worktree_changes, fetch_history, open_repository,
    resolve_range,
};
use commoji::marker::marker_prefix;
use commoji::{
    ChangeSet, ClassificationResult, ClassifyError, Classifier, FileEntry, GitError, RuleTable,
    TableError, classify_batch, summarize_diff, summarize_entries,
};

/// Pick a gitmoji and conventional type label for a change.
#[derive(Parser, Debug)]
#[command(name = "commoji")]
#[command(about = "Pick a gitmoji and conventional type label for a change")]
#[command(version)]
struct Cli {
    /// Rule table JSON to use instead of the built-in one (or set COMMOJI_TABLE)
    #[arg(long, global = true)]
    table: Option<PathBuf>,

    /// Log classification steps to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify a change and print the prefixed commit subject
    Classify {
        /// Diff file to read; `-` or omitted reads standard input
        diff: Option<PathBuf>,

        /// Commit description to prefix
        #[arg(short = 'm', long = "message")]
        description: String,

        /// Format of the diff input
        #[arg(long, value_enum, default_value_t = InputFormat::Diff)]
        input_format: InputFormat,

        /// Read staged changes from the repository in the current directory
        #[arg(long, conflicts_with = "diff")]
        git: bool,

        /// With --git, also include unstaged and untracked changes
        #[arg(long, requires = "git")]
        all: bool,

        /// Print the full classification as JSON
        #[arg(long)]
        json: bool,
    },

    /// List categories with their rank, marker and type label
    Categories,

    /// Classify past commits in a range
    History {
        /// Start of commit range, exclusive (tag, commit hash, or branch); defaults to the root
        #[arg(long)]
        from: Option<String>,

        /// End of commit range (defaults to HEAD)
        #[arg(long, default_value = "HEAD")]
        to: String,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum InputFormat {
    /// Unified diff text
    Diff,
    /// JSON array of pre-parsed file entries
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("commoji=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Distinct exit codes per failure class: 2 for bad input, 3 for a broken
/// rule table, 1 for everything else.
///
/// Downcasting sees through `.context(...)` wrappers.
fn exit_code(err: &anyhow::Error) -> u8 {
    if let Some(classify) = err.downcast_ref::<ClassifyError>() {
        return match classify {
            ClassifyError::MalformedInput(_)
            | ClassifyError::EmptyChange
            | ClassifyError::EmptyDescription => 2,
            ClassifyError::UnknownCategory(_) => 3,
        };
    }
    if err.downcast_ref::<TableError>().is_some() {
        return 3;
    }
    // A clean working tree is a change set with zero files.
    if let Some(GitError::NoChanges) = err.downcast_ref::<GitError>() {
        return 2;
    }
    1
}

fn run(cli: Cli) -> Result<()> {
    // Loaded once and shared read-only by every classification below.
    let table = RuleTable::resolve(cli.table.as_deref()).context("Failed to load rule table")?;
    let classifier = Classifier::new(&table);

    match cli.command {
        Command::Classify {
            diff,
            description,
            input_format,
            git,
            all,
            json,
        } => {
            let change_set = if git {
                let repo = open_repository(Path::new(".")).context(
                    "Not a git repository. Run commoji --git from within a git repository.",
                )?;
                let scope = if all { WorktreeScope::All } else { WorktreeScope::Staged };
                collect_worktree_changes(&repo, scope).context("Failed to read repository changes")?
            } else {
                read_change_set(diff.as_deref(), input_format)?
            };

            debug!(
                "Classifying {} file(s), +{} -{}",
                change_set.len(),
                change_set.total_added(),
                change_set.total_removed()
            );

            let (result, message) = classifier
                .annotate(&change_set, &description)
                .context("Failed to classify change")?;

            if json {
                let output = serde_json::json!({
                    "message": message,
                    "result": result,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("{}", message);
            }
        }

        Command::Categories => {
            for entry in table.categories() {
                println!(
                    "{:>3}  {:<14} {}",
                    entry.rank,
                    marker_prefix(&entry.marker),
                    entry.category
                );
            }
        }

        Command::History { from, to, json } => {
            let repo = open_repository(Path::new(".")).context(
                "Not a git repository. Run commoji history from within a git repository.",
            )?;
            let range = resolve_range(&repo, from.as_deref(), Some(to.as_str()))
                .context("Failed to resolve commit range")?;
            let commits =
                fetch_history(&repo, &range).context("Failed to read commit history")?;

            if commits.is_empty() {
                eprintln!(
                    "No commits with changes between {} and {}.",
                    range.from_ref, range.to_ref
                );
                return Ok(());
            }

            let change_sets: Vec<ChangeSet> =
                commits.iter().map(|c| c.changes.clone()).collect();
            let results = classify_batch(&classifier, &change_sets)
                .context("Batch classification halted")?;

            let mut rows = Vec::with_capacity(commits.len());
            for (commit, result) in commits.iter().zip(results) {
                match result {
                    Ok(result) if json => rows.push(serde_json::json!({
                        "hash": commit.hash,
                        "subject": commit.subject,
                        "result": result,
                    })),
                    Ok(result) => match history_line(commit, &result) {
                        Ok(line) => println!("{}", line),
                        Err(e) => {
                            eprintln!("{} could not be formatted: {}", commit.short_hash(), e)
                        }
                    },
                    Err(e) => eprintln!("{} could not be classified: {}", commit.short_hash(), e),
                }
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            }
        }
    }

    Ok(())
}

/// Read a change set from a diff file or standard input.
fn read_change_set(path: Option<&Path>, format: InputFormat) -> Result<ChangeSet> {
    let content = match path {
        Some(p) if p != Path::new("-") => std::fs::read_to_string(p)
            .with_context(|| format!("Failed to read diff from {}", p.display()))?,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read diff from standard input")?;
            buf
        }
    };

    let change_set = match format {
        InputFormat::Diff => summarize_diff(&content).context("Failed to summarize diff")?,
        InputFormat::Json => {
            let entries: Vec<FileEntry> = serde_json::from_str(&content).map_err(|e| {
                ClassifyError::MalformedInput(format!("invalid JSON file entries: {}", e))
            })?;
            summarize_entries(entries).context("Failed to summarize file entries")?
        }
    };

    Ok(change_set)
}

/// One `history` line: `<short-hash> <glyph> <type_label>: <subject>`.
fn history_line(
    commit: &HistoricalCommit,
    result: &ClassificationResult,
) -> Result<String, ClassifyError> {
    let message = result.format_message(&commit.subject)?;
    Ok(format!("{} {}", commit.short_hash(), message))
}
