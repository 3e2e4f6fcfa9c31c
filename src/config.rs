use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub ai: AIConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AIConfig {
    pub provider: AIProvider,
    /// Falls back to the provider's default model when unset.
    pub model: Option<String>,
    pub max_tokens: u32,
    pub gemini_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    #[serde(skip)]
    pub api_url: Option<String>,
}

impl Default for AIConfig {
    fn default() -> Self {
        Self {
            provider: AIProvider::Gemini,
            model: None,
            max_tokens: 1024,
            gemini_api_key: None,
            anthropic_api_key: None,
            openai_api_key: None,
            api_url: None,
        }
    }
}

impl AIConfig {
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    pub fn api_key(&self) -> Option<&str> {
        match self.provider {
            AIProvider::Gemini => self.gemini_api_key.as_deref(),
            AIProvider::Anthropic => self.anthropic_api_key.as_deref(),
            AIProvider::OpenAI => self.openai_api_key.as_deref(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AIProvider {
    Gemini,
    Anthropic,
    OpenAI,
}

impl AIProvider {
    pub fn default_model(&self) -> &'static str {
        match self {
            AIProvider::Gemini => "gemini-1.5-flash",
            AIProvider::Anthropic => "claude-3-5-haiku-latest",
            AIProvider::OpenAI => "gpt-4o-mini",
        }
    }

    pub fn key_variable(&self) -> &'static str {
        match self {
            AIProvider::Gemini => "GEMINI_API_KEY",
            AIProvider::Anthropic => "ANTHROPIC_API_KEY",
            AIProvider::OpenAI => "OPENAI_API_KEY",
        }
    }
}

impl fmt::Display for AIProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AIProvider::Gemini => "gemini",
            AIProvider::Anthropic => "anthropic",
            AIProvider::OpenAI => "openai",
        };
        f.write_str(name)
    }
}

impl FromStr for AIProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(AIProvider::Gemini),
            "anthropic" | "claude" => Ok(AIProvider::Anthropic),
            "openai" => Ok(AIProvider::OpenAI),
            other => Err(format!(
                "unknown provider '{}' (expected gemini, anthropic or openai)",
                other
            )),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    pub color_output: bool,
    pub theme: ThemeName,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color_output: true,
            theme: ThemeName::Hacker,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    Hacker,
    Classic,
    Monochrome,
}

impl Config {
    pub fn create_default(path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(&Config::default())?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Could not create {}", parent.display()))?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Defaults, then the config file if there is one, then the environment.
    /// A missing API key is left for the completion client to report.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) if path.exists() => {
                debug!(path = %path.display(), "loading config file");
                Self::load(path)?
            }
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(key) = lookup("GEMINI_API_KEY") {
            self.ai.gemini_api_key = Some(key);
        }
        if let Some(key) = lookup("ANTHROPIC_API_KEY") {
            self.ai.anthropic_api_key = Some(key);
        }
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.ai.openai_api_key = Some(key);
        }
        if let Some(provider) = lookup("GIT_GLANCE_PROVIDER") {
            self.ai.provider = provider.parse().map_err(anyhow::Error::msg)?;
        }
        if let Some(model) = lookup("GIT_GLANCE_MODEL") {
            self.ai.model = Some(model);
        }
        if let Some(url) = lookup("GIT_GLANCE_API_URL") {
            self.ai.api_url = Some(url);
        }
        Ok(())
    }
}

pub fn get_config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "git-glance", "git-glance")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    Ok(proj_dirs.config_dir().join("config.toml"))
}
