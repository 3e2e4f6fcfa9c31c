pub mod ai;
pub mod commands;
pub mod config;
pub mod context;
pub mod display;
pub mod git;
pub mod prompt;
pub mod theme;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use ai::{AIError, CompletionClient, HttpCompletionClient};
pub use commands::{Action, CommandError, Dispatcher, Outcome};
pub use config::Config;
pub use display::Presenter;
pub use git::{GitManager, RepositoryReader};
