//! Read-only access to the local repository through the `git` binary.

use chrono::{DateTime, FixedOffset};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

mod error;

pub use error::GitError;

const FIELD_SEP: char = '\x1f';
const RECORD_SEP: char = '\x1e';
const LOG_FORMAT: &str = "--format=%H%x1f%an%x1f%aI%x1f%s%x1e";

#[derive(Debug, Clone, PartialEq)]
pub struct CommitRecord {
    pub hash: String,
    pub author: String,
    pub message: String,
    pub timestamp: DateTime<FixedOffset>,
}

impl CommitRecord {
    pub fn short_hash(&self) -> &str {
        let end = self.hash.len().min(7);
        &self.hash[..end]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepositoryStatus {
    pub branch: String,
    pub modified: Vec<String>,
    pub conflicted: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Remote {
    pub name: String,
    pub fetch_url: String,
}

/// Which two states a diff compares.
#[derive(Debug, Clone, PartialEq)]
pub enum DiffScope {
    /// Working tree against the index.
    WorkingTree,
    /// Index against HEAD.
    Staged,
    /// Working tree and index against HEAD.
    AgainstHead,
    /// Changes on `to` since it forked from `from` (`from...to`).
    Range { from: String, to: String },
}

/// Queries the rest of the crate needs from a repository.
pub trait RepositoryReader {
    fn is_repository(&self) -> bool;
    fn current_status(&self) -> Result<RepositoryStatus, GitError>;
    fn recent_commits(&self, n: usize) -> Result<Vec<CommitRecord>, GitError>;
    /// Commits on any branch, tag or remote-tracking ref whose message
    /// contains at least one keyword, ignoring case, most recent first.
    fn search_commits(&self, keywords: &[String], limit: usize)
        -> Result<Vec<CommitRecord>, GitError>;
    fn diff(&self, scope: &DiffScope) -> Result<String, GitError>;
    fn remotes(&self) -> Result<Vec<Remote>, GitError>;
    fn merge_head(&self) -> Result<Option<String>, GitError>;
    fn read_working_file(&self, path: &str) -> Result<String, GitError>;

    fn conflicted_files(&self) -> Result<Vec<String>, GitError> {
        Ok(self.current_status()?.conflicted)
    }
}

pub struct GitManager {
    repo_path: PathBuf,
}

impl GitManager {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            repo_path: path.as_ref().to_path_buf(),
        }
    }

    fn git(&self, args: &[&str]) -> Result<String, GitError> {
        debug!(?args, "running git");
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_path)
            .output()?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if stderr.contains("not a git repository") {
                return Err(GitError::NotARepository(self.repo_path.clone()));
            }
            Err(GitError::CommandFailed {
                command: format!("git {}", args.join(" ")),
                stderr,
            })
        }
    }

    /// Runs git and reports only whether it exited successfully.
    fn git_succeeds(&self, args: &[&str]) -> bool {
        Command::new("git")
            .args(args)
            .current_dir(&self.repo_path)
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    fn has_commits(&self) -> bool {
        self.git_succeeds(&["rev-parse", "--verify", "-q", "HEAD"])
    }

    fn current_branch(&self) -> Result<String, GitError> {
        if !self.has_commits() {
            // Unborn branch: rev-parse cannot resolve HEAD yet.
            let name = self.git(&["symbolic-ref", "--short", "HEAD"])?;
            return Ok(name.trim().to_string());
        }
        let name = self.git(&["rev-parse", "--abbrev-ref", "HEAD"])?;
        Ok(name.trim().to_string())
    }

    fn toplevel(&self) -> Result<PathBuf, GitError> {
        let root = self.git(&["rev-parse", "--show-toplevel"])?;
        Ok(PathBuf::from(root.trim()))
    }
}

impl RepositoryReader for GitManager {
    fn is_repository(&self) -> bool {
        self.git(&["rev-parse", "--is-inside-work-tree"])
            .map(|out| out.trim() == "true")
            .unwrap_or(false)
    }

    fn current_status(&self) -> Result<RepositoryStatus, GitError> {
        let branch = self.current_branch()?;
        let porcelain = self.git(&["-c", "core.quotePath=false", "status", "--porcelain", "-z"])?;
        let mut status = parse_status(&porcelain);
        status.branch = branch;
        Ok(status)
    }

    fn recent_commits(&self, n: usize) -> Result<Vec<CommitRecord>, GitError> {
        if n == 0 || !self.has_commits() {
            return Ok(Vec::new());
        }
        let count = format!("--max-count={}", n);
        let log = self.git(&["log", count.as_str(), LOG_FORMAT])?;
        parse_log(&log)
    }

    fn search_commits(
        &self,
        keywords: &[String],
        limit: usize,
    ) -> Result<Vec<CommitRecord>, GitError> {
        if keywords.is_empty() || limit == 0 || !self.has_commits() {
            return Ok(Vec::new());
        }
        let count = format!("--max-count={}", limit);
        let greps: Vec<String> = keywords.iter().map(|k| format!("--grep={}", k)).collect();

        let mut args: Vec<&str> = vec![
            "log",
            "--branches",
            "--tags",
            "--remotes",
            "--regexp-ignore-case",
            "--fixed-strings",
            count.as_str(),
            LOG_FORMAT,
        ];
        args.extend(greps.iter().map(String::as_str));

        let log = self.git(&args)?;
        parse_log(&log)
    }

    fn diff(&self, scope: &DiffScope) -> Result<String, GitError> {
        match scope {
            DiffScope::WorkingTree => self.git(&["diff"]),
            DiffScope::Staged => self.git(&["diff", "--cached"]),
            // Without a HEAD to compare to, everything staged is the change.
            DiffScope::AgainstHead if !self.has_commits() => self.git(&["diff", "--cached"]),
            DiffScope::AgainstHead => self.git(&["diff", "HEAD"]),
            DiffScope::Range { from, to } => {
                let range = format!("{}...{}", from, to);
                self.git(&["diff", range.as_str()])
            }
        }
    }

    fn remotes(&self) -> Result<Vec<Remote>, GitError> {
        let out = self.git(&["remote", "-v"])?;
        Ok(parse_remotes(&out))
    }

    fn merge_head(&self) -> Result<Option<String>, GitError> {
        if !self.git_succeeds(&["rev-parse", "-q", "--verify", "MERGE_HEAD"]) {
            return Ok(None);
        }
        let head = self.git(&["rev-parse", "MERGE_HEAD"])?;
        Ok(Some(head.trim().to_string()))
    }

    fn read_working_file(&self, path: &str) -> Result<String, GitError> {
        let full = self.toplevel()?.join(path);
        let bytes =
            std::fs::read(&full).map_err(|source| GitError::ReadFile { path: full, source })?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

pub(crate) fn parse_log(output: &str) -> Result<Vec<CommitRecord>, GitError> {
    output
        .split(RECORD_SEP)
        .map(str::trim)
        .filter(|record| !record.is_empty())
        .map(parse_commit)
        .collect()
}

fn parse_commit(record: &str) -> Result<CommitRecord, GitError> {
    let fields: Vec<&str> = record.split(FIELD_SEP).collect();
    let &[hash, author, date, message] = fields.as_slice() else {
        return Err(GitError::Parse(format!("malformed log record: {:?}", record)));
    };

    let timestamp = DateTime::parse_from_rfc3339(date)
        .map_err(|e| GitError::Parse(format!("bad commit date {:?}: {}", date, e)))?;

    Ok(CommitRecord {
        hash: hash.to_string(),
        author: author.to_string(),
        message: message.to_string(),
        timestamp,
    })
}

/// Parses `git status --porcelain -z`. Paths arrive unquoted and
/// NUL-terminated; a rename or copy is followed by its source path.
pub(crate) fn parse_status(porcelain: &str) -> RepositoryStatus {
    let mut status = RepositoryStatus::default();
    let mut entries = porcelain.split('\0');

    while let Some(entry) = entries.next() {
        let (Some(code), Some(path)) = (entry.get(..2), entry.get(3..)) else {
            continue;
        };
        if code.contains(['R', 'C']) {
            entries.next();
        }

        if matches!(code, "UU" | "AA" | "DD" | "AU" | "UA" | "DU" | "UD") {
            status.conflicted.push(path.to_string());
        }
        status.modified.push(path.to_string());
    }

    status
}

pub(crate) fn parse_remotes(output: &str) -> Vec<Remote> {
    output
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let name = parts.next()?;
            let url = parts.next()?;
            let kind = parts.next()?;
            (kind == "(fetch)").then(|| Remote {
                name: name.to_string(),
                fetch_url: url.to_string(),
            })
        })
        .collect()
}
