use crate::ai::{AIError, CompletionClient};
use crate::git::{CommitRecord, DiffScope, GitError, Remote, RepositoryReader, RepositoryStatus};
use async_trait::async_trait;
use chrono::{DateTime, Duration};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

mod repository;

/// In-memory repository. `commits` is kept most recent first.
#[derive(Default)]
pub(crate) struct FakeRepo {
    pub commits: Vec<CommitRecord>,
    pub status: RepositoryStatus,
    pub diffs: HashMap<&'static str, String>,
    pub files: HashMap<String, String>,
    pub remotes: Vec<Remote>,
    pub merge_head: Option<String>,
    pub not_a_repo: bool,
    pub searches: RefCell<Vec<Vec<String>>>,
    pub diff_requests: RefCell<Vec<DiffScope>>,
}

impl FakeRepo {
    pub fn with_messages<S: AsRef<str>>(messages: &[S]) -> Self {
        let newest = DateTime::parse_from_rfc3339("2024-06-01T12:00:00+00:00").unwrap();
        let commits = messages
            .iter()
            .enumerate()
            .map(|(i, message)| CommitRecord {
                hash: format!("{:040x}", i + 1),
                author: "Dev".to_string(),
                message: message.as_ref().to_string(),
                timestamp: newest - Duration::hours(i as i64),
            })
            .collect();

        Self {
            commits,
            status: RepositoryStatus {
                branch: "main".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn scope_key(scope: &DiffScope) -> &'static str {
        match scope {
            DiffScope::WorkingTree => "working",
            DiffScope::Staged => "staged",
            DiffScope::AgainstHead => "head",
            DiffScope::Range { .. } => "range",
        }
    }
}

impl RepositoryReader for FakeRepo {
    fn is_repository(&self) -> bool {
        !self.not_a_repo
    }

    fn current_status(&self) -> Result<RepositoryStatus, GitError> {
        Ok(self.status.clone())
    }

    fn recent_commits(&self, n: usize) -> Result<Vec<CommitRecord>, GitError> {
        Ok(self.commits.iter().take(n).cloned().collect())
    }

    fn search_commits(
        &self,
        keywords: &[String],
        limit: usize,
    ) -> Result<Vec<CommitRecord>, GitError> {
        self.searches.borrow_mut().push(keywords.to_vec());
        Ok(self
            .commits
            .iter()
            .filter(|c| {
                let message = c.message.to_lowercase();
                keywords.iter().any(|k| message.contains(&k.to_lowercase()))
            })
            .take(limit)
            .cloned()
            .collect())
    }

    fn diff(&self, scope: &DiffScope) -> Result<String, GitError> {
        self.diff_requests.borrow_mut().push(scope.clone());
        Ok(self.diffs.get(Self::scope_key(scope)).cloned().unwrap_or_default())
    }

    fn remotes(&self) -> Result<Vec<Remote>, GitError> {
        Ok(self.remotes.clone())
    }

    fn merge_head(&self) -> Result<Option<String>, GitError> {
        Ok(self.merge_head.clone())
    }

    fn read_working_file(&self, path: &str) -> Result<String, GitError> {
        self.files.get(path).cloned().ok_or_else(|| GitError::ReadFile {
            path: PathBuf::from(path),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory"),
        })
    }
}

pub(crate) enum Reply {
    Text(&'static str),
    RateLimited,
    ModelNotFound,
}

/// Records every prompt and answers with a canned reply.
pub(crate) struct FakeClient {
    reply: Reply,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeClient {
    pub fn replying(reply: Reply) -> Self {
        Self {
            reply,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for FakeClient {
    async fn generate(&self, prompt: &str) -> Result<String, AIError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Reply::Text(text) => Ok(text.to_string()),
            Reply::RateLimited => Err(AIError::RateLimited("quota".to_string())),
            Reply::ModelNotFound => Err(AIError::ModelNotFound {
                model: "gemini-nope".to_string(),
            }),
        }
    }
}
