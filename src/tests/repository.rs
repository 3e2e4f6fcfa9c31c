//! `GitManager` against scratch repositories created with the real `git`.

use crate::context::ContextSelector;
use crate::git::{DiffScope, GitManager, RepositoryReader};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// A git command isolated from the user's configuration.
fn git_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::new("git");
    cmd.args(args)
        .current_dir(dir)
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .env("GIT_CONFIG_GLOBAL", "/dev/null")
        .env("GIT_AUTHOR_NAME", "Test Author")
        .env("GIT_AUTHOR_EMAIL", "author@example.com")
        .env("GIT_COMMITTER_NAME", "Test Author")
        .env("GIT_COMMITTER_EMAIL", "author@example.com");
    cmd
}

fn git(dir: &Path, args: &[&str]) -> Output {
    git_command(dir, args).output().expect("git is installed")
}

fn git_ok(dir: &Path, args: &[&str]) {
    let output = git(dir, args);
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

fn init_repo() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    git_ok(dir.path(), &["init", "-q"]);
    git_ok(dir.path(), &["symbolic-ref", "HEAD", "refs/heads/main"]);
    dir
}

/// Commits `content` to `file`; `minute` keeps commit dates strictly ordered.
fn commit(dir: &Path, file: &str, content: &str, message: &str, minute: u32) {
    fs::write(dir.join(file), content).unwrap();
    git_ok(dir, &["add", file]);

    let date = format!("2024-01-01T10:{:02}:00+00:00", minute);
    let output = git_command(dir, &["commit", "-q", "-m", message])
        .env("GIT_AUTHOR_DATE", &date)
        .env("GIT_COMMITTER_DATE", &date)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn test_plain_directory_is_not_a_repository() {
    let dir = tempfile::tempdir().unwrap();
    assert!(!GitManager::new(dir.path()).is_repository());
}

#[test]
fn test_empty_repository() {
    let dir = init_repo();
    let repo = GitManager::new(dir.path());

    assert!(repo.is_repository());
    assert_eq!(repo.current_status().unwrap().branch, "main");
    assert!(repo.recent_commits(10).unwrap().is_empty());
    assert!(repo.search_commits(&["anything".into()], 15).unwrap().is_empty());
    assert!(ContextSelector::new(&repo).select("what changed").unwrap().is_empty());
    assert_eq!(repo.merge_head().unwrap(), None);
}

#[test]
fn test_recent_commits_are_newest_first_and_bounded() {
    let dir = init_repo();
    for i in 0..12 {
        commit(dir.path(), "log.txt", &format!("{}", i), &format!("change {}", i), i);
    }
    let repo = GitManager::new(dir.path());

    let commits = repo.recent_commits(10).unwrap();
    assert_eq!(commits.len(), 10);
    assert_eq!(commits[0].message, "change 11");
    assert_eq!(commits[0].author, "Test Author");
    assert_eq!(commits[0].hash.len(), 40);
    assert!(commits.windows(2).all(|w| w[0].timestamp > w[1].timestamp));
}

#[test]
fn test_search_spans_branches_and_ignores_case() {
    let dir = init_repo();
    commit(dir.path(), "a.txt", "a", "initial commit", 0);
    git_ok(dir.path(), &["checkout", "-q", "-b", "feature"]);
    commit(dir.path(), "b.txt", "b", "Fix Login bug", 1);
    git_ok(dir.path(), &["checkout", "-q", "main"]);
    commit(dir.path(), "c.txt", "c", "update readme", 2);

    let repo = GitManager::new(dir.path());
    let found = repo.search_commits(&["login".into()], 15).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].message, "Fix Login bug");

    let either = repo
        .search_commits(&["readme".into(), "login".into()], 15)
        .unwrap();
    let messages: Vec<&str> = either.iter().map(|c| c.message.as_str()).collect();
    assert_eq!(messages, vec!["update readme", "Fix Login bug"]);
}

#[test]
fn test_status_and_diff_scopes() {
    let dir = init_repo();
    commit(dir.path(), "app.rs", "fn main() {}\n", "initial", 0);
    let repo = GitManager::new(dir.path());

    assert!(repo.diff(&DiffScope::Staged).unwrap().is_empty());

    fs::write(dir.path().join("app.rs"), "fn main() { run(); }\n").unwrap();
    fs::write(dir.path().join("staged.rs"), "pub fn run() {}\n").unwrap();
    git_ok(dir.path(), &["add", "staged.rs"]);

    let staged = repo.diff(&DiffScope::Staged).unwrap();
    assert!(staged.contains("staged.rs"));
    assert!(!staged.contains("app.rs"));

    let working = repo.diff(&DiffScope::WorkingTree).unwrap();
    assert!(working.contains("app.rs"));
    assert!(!working.contains("staged.rs"));

    let head = repo.diff(&DiffScope::AgainstHead).unwrap();
    assert!(head.contains("app.rs") && head.contains("staged.rs"));

    let status = repo.current_status().unwrap();
    assert_eq!(status.modified.len(), 2);
    assert!(status.conflicted.is_empty());
}

#[test]
fn test_remotes() {
    let dir = init_repo();
    git_ok(dir.path(), &["remote", "add", "origin", "https://example.com/team/app.git"]);
    let remotes = GitManager::new(dir.path()).remotes().unwrap();

    assert_eq!(remotes.len(), 1);
    assert_eq!(remotes[0].name, "origin");
    assert_eq!(remotes[0].fetch_url, "https://example.com/team/app.git");
}

#[test]
fn test_merge_conflict_is_visible() {
    let dir = init_repo();
    commit(dir.path(), "config.txt", "port = 80\n", "initial", 0);
    git_ok(dir.path(), &["checkout", "-q", "-b", "feature"]);
    commit(dir.path(), "config.txt", "port = 8080\n", "use 8080", 1);
    git_ok(dir.path(), &["checkout", "-q", "main"]);
    commit(dir.path(), "config.txt", "port = 443\n", "use 443", 2);

    let merge = git(dir.path(), &["merge", "feature"]);
    assert!(!merge.status.success());

    let repo = GitManager::new(dir.path());
    assert_eq!(repo.conflicted_files().unwrap(), vec!["config.txt"]);
    assert!(repo.read_working_file("config.txt").unwrap().contains("<<<<<<<"));

    let merge_head = repo.merge_head().unwrap().expect("merge in progress");
    let incoming = repo
        .diff(&DiffScope::Range {
            from: "HEAD".into(),
            to: merge_head,
        })
        .unwrap();
    assert!(incoming.contains("+port = 8080"));
}

#[test]
fn test_missing_working_file() {
    let dir = init_repo();
    let result = GitManager::new(dir.path()).read_working_file("gone.txt");
    assert!(matches!(result, Err(crate::git::GitError::ReadFile { .. })));
}

#[test]
fn test_conflict_on_non_ascii_path_is_readable() {
    let dir = init_repo();
    commit(dir.path(), "café.txt", "port = 80\n", "initial", 0);
    git_ok(dir.path(), &["checkout", "-q", "-b", "feature"]);
    commit(dir.path(), "café.txt", "port = 8080\n", "use 8080", 1);
    git_ok(dir.path(), &["checkout", "-q", "main"]);
    commit(dir.path(), "café.txt", "port = 443\n", "use 443", 2);
    assert!(!git(dir.path(), &["merge", "feature"]).status.success());

    let repo = GitManager::new(dir.path());
    assert_eq!(repo.conflicted_files().unwrap(), vec!["café.txt"]);
    assert_eq!(repo.current_status().unwrap().modified, vec!["café.txt"]);
    assert!(repo.read_working_file("café.txt").unwrap().contains("<<<<<<<"));
}

#[test]
fn test_renamed_file_reports_new_path() {
    let dir = init_repo();
    commit(dir.path(), "old name.txt", "x\n", "initial", 0);
    git_ok(dir.path(), &["mv", "old name.txt", "new name.txt"]);

    let status = GitManager::new(dir.path()).current_status().unwrap();
    assert_eq!(status.modified, vec!["new name.txt"]);
}

#[test]
fn test_non_utf8_file_is_read_lossily() {
    let dir = init_repo();
    fs::write(dir.path().join("latin1.txt"), b"caf\xe9 = 80\n").unwrap();

    let contents = GitManager::new(dir.path())
        .read_working_file("latin1.txt")
        .unwrap();
    assert_eq!(contents, "caf\u{FFFD} = 80\n");
}

#[test]
fn test_search_skips_stash_commits() {
    let dir = init_repo();
    commit(dir.path(), "a.txt", "a", "initial", 0);
    fs::write(dir.path().join("a.txt"), "dirty").unwrap();
    git_ok(dir.path(), &["stash", "-q"]);

    let repo = GitManager::new(dir.path());
    assert!(repo.search_commits(&["main".into()], 15).unwrap().is_empty());
    assert_eq!(repo.search_commits(&["initial".into()], 15).unwrap().len(), 1);
}
