//! The five things `git-glance` can do. Each runs reader, prompt builder,
//! completion client in that order and hands an [`Outcome`] to the presenter.

use crate::ai::{AIError, CompletionClient};
use crate::context::ContextSelector;
use crate::display::Presenter;
use crate::git::{DiffScope, GitError, RepositoryReader};
use crate::prompt::{self, ConflictRecord};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Dashboard,
    Commit,
    Review,
    Chat(String),
    MergeHelp,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardInfo {
    pub branch: String,
    pub latest_message: Option<String>,
    pub latest_author: Option<String>,
    pub modified: usize,
    pub remote: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Dashboard(DashboardInfo),
    Completion { title: String, body: String },
    /// Nothing to send to the model; not an error.
    Notice(String),
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Not a git repository!")]
    NotARepository,

    #[error("Could not read {path}: {message}")]
    Io { path: String, message: String },

    #[error("Git failed: {0}")]
    Git(GitError),

    #[error(transparent)]
    Completion(#[from] AIError),
}

impl From<GitError> for CommandError {
    fn from(error: GitError) -> Self {
        match error {
            GitError::NotARepository(_) => CommandError::NotARepository,
            GitError::ReadFile { path, source } => CommandError::Io {
                path: path.display().to_string(),
                message: source.to_string(),
            },
            other => CommandError::Git(other),
        }
    }
}

impl CommandError {
    /// The single line shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            CommandError::Completion(AIError::RateLimited(_)) => {
                "Quota exceeded: the AI service is rate limiting requests. Wait a minute and try again."
                    .to_string()
            }
            CommandError::Completion(AIError::ModelNotFound { model }) => format!(
                "Model '{}' is not available. Check the configured model name (GIT_GLANCE_MODEL or the config file).",
                model
            ),
            other => other.to_string(),
        }
    }
}

pub const NO_STAGED_CHANGES: &str = "No staged changes found. Stage files with `git add` first.";
pub const NO_CHANGES_TO_REVIEW: &str = "No changes to review since the last commit.";
pub const NO_CONFLICTS: &str = "No merge conflicts detected.";
pub const NO_CONFLICT_MARKERS: &str =
    "Git lists conflicted files, but none of them contain conflict markers any more.";

pub struct Dispatcher<'a, R: RepositoryReader, C: CompletionClient> {
    repo: &'a R,
    client: &'a C,
    presenter: &'a Presenter,
}

impl<'a, R: RepositoryReader, C: CompletionClient> Dispatcher<'a, R, C> {
    pub fn new(repo: &'a R, client: &'a C, presenter: &'a Presenter) -> Self {
        Self {
            repo,
            client,
            presenter,
        }
    }

    pub async fn run(&self, action: &Action) -> Result<Outcome, CommandError> {
        if !self.repo.is_repository() {
            return Err(CommandError::NotARepository);
        }
        info!(?action, "running command");

        match action {
            Action::Dashboard => self.dashboard(),
            Action::Commit => self.commit().await,
            Action::Review => self.review().await,
            Action::Chat(question) => self.chat(question).await,
            Action::MergeHelp => self.merge_help().await,
        }
    }

    fn dashboard(&self) -> Result<Outcome, CommandError> {
        let spinner = self.presenter.spinner("Fetching Git Info...");
        let status = self.repo.current_status()?;
        let latest = self.repo.recent_commits(1)?.into_iter().next();
        let remote = self.repo.remotes()?.into_iter().next();
        spinner.finish_and_clear();

        Ok(Outcome::Dashboard(DashboardInfo {
            branch: status.branch,
            latest_message: latest.as_ref().map(|c| c.message.clone()),
            latest_author: latest.map(|c| c.author),
            modified: status.modified.len(),
            remote: remote.map(|r| r.fetch_url),
        }))
    }

    async fn commit(&self) -> Result<Outcome, CommandError> {
        let diff = self.repo.diff(&DiffScope::Staged)?;
        if diff.trim().is_empty() {
            return Ok(Outcome::Notice(NO_STAGED_CHANGES.to_string()));
        }

        let body = self
            .complete("Writing commit message...", &prompt::commit_message(&diff))
            .await?;
        Ok(Outcome::Completion {
            title: "Suggested Commit Message".to_string(),
            body,
        })
    }

    async fn review(&self) -> Result<Outcome, CommandError> {
        let diff = self.repo.diff(&DiffScope::AgainstHead)?;
        if diff.trim().is_empty() {
            return Ok(Outcome::Notice(NO_CHANGES_TO_REVIEW.to_string()));
        }

        let body = self
            .complete("Reviewing changes...", &prompt::code_review(&diff))
            .await?;
        Ok(Outcome::Completion {
            title: "Code Review".to_string(),
            body,
        })
    }

    async fn chat(&self, question: &str) -> Result<Outcome, CommandError> {
        let commits = ContextSelector::new(self.repo).select(question)?;
        debug!(commits = commits.len(), "selected history context");

        let body = self
            .complete("Searching history...", &prompt::history_chat(&commits, question))
            .await?;
        Ok(Outcome::Completion {
            title: "History Chat".to_string(),
            body,
        })
    }

    async fn merge_help(&self) -> Result<Outcome, CommandError> {
        let paths = self.repo.conflicted_files()?;
        if paths.is_empty() {
            return Ok(Outcome::Notice(NO_CONFLICTS.to_string()));
        }

        let bar = self.presenter.progress_bar(paths.len() as u64, "files read");
        let mut records = Vec::with_capacity(paths.len());
        for path in paths {
            let contents = match self.repo.read_working_file(&path) {
                Ok(contents) => contents,
                Err(e) => {
                    bar.finish_and_clear();
                    return Err(e.into());
                }
            };
            records.push(ConflictRecord { path, contents });
            bar.inc(1);
        }
        bar.finish_and_clear();

        let Some(bundle) = prompt::conflict_bundle(&records) else {
            return Ok(Outcome::Notice(NO_CONFLICT_MARKERS.to_string()));
        };

        let merge_context = match self.repo.merge_head()? {
            Some(head) => Some(self.repo.diff(&DiffScope::Range {
                from: "HEAD".to_string(),
                to: head,
            })?),
            None => None,
        };

        let body = self
            .complete(
                "Analyzing conflicts...",
                &prompt::merge_resolution(&bundle, merge_context.as_deref()),
            )
            .await?;
        Ok(Outcome::Completion {
            title: "Merge Conflict Help".to_string(),
            body,
        })
    }

    async fn complete(&self, message: &str, prompt: &str) -> Result<String, CommandError> {
        let spinner = self.presenter.spinner(message);
        let result = self.client.generate(prompt).await;
        spinner.finish_and_clear();
        Ok(result?)
    }
}
