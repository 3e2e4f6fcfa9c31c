use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while querying the local repository.
#[derive(Debug, Error)]
pub enum GitError {
    #[error("not a git repository: {0:?}")]
    NotARepository(PathBuf),

    #[error("`{command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("could not run git: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("failed to read {path:?}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unexpected git output: {0}")]
    Parse(String),
}
