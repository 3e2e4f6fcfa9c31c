//! Prompt templates. Repository data is cut to size before it is
//! interpolated so the instructions themselves are never truncated.

use crate::git::CommitRecord;

pub const MAX_DIFF_CHARS: usize = 5_000;
pub const MAX_CONFLICT_CHARS: usize = 8_000;
pub const MAX_MERGE_CONTEXT_CHARS: usize = 15_000;

pub const CONFLICT_START: &str = "<<<<<<<";

/// A file that git reports as unmerged, with its working-tree contents.
#[derive(Debug, Clone, PartialEq)]
pub struct ConflictRecord {
    pub path: String,
    pub contents: String,
}

impl ConflictRecord {
    pub fn has_markers(&self) -> bool {
        self.contents.contains(CONFLICT_START)
    }
}

/// Keeps at most `max` characters of `data`, cutting hard at the limit.
pub fn truncate(data: &str, max: usize) -> &str {
    match data.char_indices().nth(max) {
        Some((idx, _)) => &data[..idx],
        None => data,
    }
}

pub fn commit_message(staged_diff: &str) -> String {
    format!(
        "You are an expert software engineer writing git commit messages.\n\
         Write one concise, professional commit message for the staged changes below.\n\
         Rules:\n\
         - A single line, ideally under 72 characters.\n\
         - Use the imperative mood (\"Add\", \"Fix\", \"Remove\").\n\
         - No quotes, no markdown, no trailing period.\n\
         - Respond with the commit message only.\n\
         \n\
         Staged diff:\n\
         {}",
        truncate(staged_diff, MAX_DIFF_CHARS)
    )
}

pub fn code_review(diff: &str) -> String {
    format!(
        "You are a meticulous senior engineer reviewing a change before it is committed.\n\
         Review the diff below against the last commit and report:\n\
         1. Bugs or logic errors\n\
         2. Code smells and maintainability problems\n\
         3. Security concerns\n\
         4. Concrete suggestions for improvement\n\
         Be brief and specific; reference file names where you can.\n\
         If the change looks good, say so.\n\
         \n\
         Diff:\n\
         {}",
        truncate(diff, MAX_DIFF_CHARS)
    )
}

/// One commit per line: date, short hash, author and subject.
pub fn render_commits(commits: &[CommitRecord]) -> String {
    if commits.is_empty() {
        return "(no commits)".to_string();
    }
    commits
        .iter()
        .map(|c| {
            format!(
                "- {} {} {}: {}",
                c.timestamp.format("%Y-%m-%d"),
                c.short_hash(),
                c.author,
                c.message
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn history_chat(commits: &[CommitRecord], question: &str) -> String {
    format!(
        "You are a helpful assistant answering questions about a git repository's history.\n\
         Answer using only the commit list below; if it does not contain the answer, say so.\n\
         You may cite commit dates and hashes to support your answer.\n\
         \n\
         Commits:\n\
         {}\n\
         \n\
         Question: {}",
        render_commits(commits),
        question
    )
}

/// Joins every record that still carries a conflict-start marker, or `None`
/// when no record qualifies.
pub fn conflict_bundle(records: &[ConflictRecord]) -> Option<String> {
    let sections: Vec<String> = records
        .iter()
        .filter(|r| r.has_markers())
        .map(|r| format!("File: {}\n{}", r.path, r.contents))
        .collect();

    if sections.is_empty() {
        None
    } else {
        Some(sections.join("\n\n"))
    }
}

/// `merge_context` is the incoming branch's diff, when a merge is in progress.
pub fn merge_resolution(bundle: &str, merge_context: Option<&str>) -> String {
    let mut prompt = format!(
        "You are an expert at resolving git merge conflicts.\n\
         For each file below:\n\
         1. Explain what each side of the conflict is trying to do.\n\
         2. Suggest a resolution, showing the merged code.\n\
         Conflict markers: <<<<<<< starts our side, ======= separates, >>>>>>> ends their side.\n\
         \n\
         Conflicted files:\n\
         {}",
        truncate(bundle, MAX_CONFLICT_CHARS)
    );

    if let Some(context) = merge_context.filter(|c| !c.trim().is_empty()) {
        prompt.push_str(
            "\n\nChanges introduced by the branch being merged, for context:\n",
        );
        prompt.push_str(truncate(context, MAX_MERGE_CONTEXT_CHARS));
    }

    prompt
}
