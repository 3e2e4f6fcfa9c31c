//! Picks the slice of commit history that grounds a history-chat answer.

use crate::git::{CommitRecord, GitError, RepositoryReader};
use tracing::debug;

/// Most matches a keyword search may contribute.
pub const SEARCH_LIMIT: usize = 15;
/// How many recent commits to use when the search finds nothing.
pub const FALLBACK_LIMIT: usize = 10;

/// Turns a question into the keywords searched against commit messages.
pub trait KeywordExtractor {
    fn keywords(&self, question: &str) -> Vec<String>;
}

/// Lower-cased whitespace tokens longer than `min_len` characters.
#[derive(Debug, Clone)]
pub struct LengthFilter {
    pub min_len: usize,
}

impl Default for LengthFilter {
    fn default() -> Self {
        Self { min_len: 3 }
    }
}

impl KeywordExtractor for LengthFilter {
    fn keywords(&self, question: &str) -> Vec<String> {
        question
            .split_whitespace()
            .map(str::to_lowercase)
            .filter(|token| token.chars().count() > self.min_len)
            .collect()
    }
}

pub struct ContextSelector<'a, R: RepositoryReader, K: KeywordExtractor = LengthFilter> {
    repo: &'a R,
    extractor: K,
}

impl<'a, R: RepositoryReader> ContextSelector<'a, R> {
    pub fn new(repo: &'a R) -> Self {
        Self::with_extractor(repo, LengthFilter::default())
    }
}

impl<'a, R: RepositoryReader, K: KeywordExtractor> ContextSelector<'a, R, K> {
    pub fn with_extractor(repo: &'a R, extractor: K) -> Self {
        Self { repo, extractor }
    }

    /// Commits matching any keyword of the question across all refs, or the
    /// most recent commits when nothing matches.
    pub fn select(&self, question: &str) -> Result<Vec<CommitRecord>, GitError> {
        let keywords = self.extractor.keywords(question);

        if !keywords.is_empty() {
            let matches = self.repo.search_commits(&keywords, SEARCH_LIMIT)?;
            debug!(?keywords, found = matches.len(), "searched commit messages");
            if !matches.is_empty() {
                return Ok(matches);
            }
        }

        debug!("falling back to recent history");
        self.repo.recent_commits(FALLBACK_LIMIT)
    }
}
