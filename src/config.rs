use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use teloxide::types::ChatId;

use crate::quotes::DEFAULT_PATTERN;

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the config file.
    ReadFile { path: PathBuf, source: std::io::Error },
    /// Failed to parse JSON.
    ParseJson { path: PathBuf, source: serde_json::Error },
    /// Invalid regex pattern.
    InvalidRegex { pattern: String, source: regex::Error },
    /// Validation error.
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFile { path, source } => {
                write!(f, "failed to read config file '{}': {}", path.display(), source)
            }
            Self::ParseJson { path, source } => {
                write!(f, "failed to parse config file '{}': {}", path.display(), source)
            }
            Self::InvalidRegex { pattern, source } => {
                write!(f, "invalid regex pattern '{}': {}", pattern, source)
            }
            Self::Validation(msg) => write!(f, "config validation error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReadFile { source, .. } => Some(source),
            Self::ParseJson { source, .. } => Some(source),
            Self::InvalidRegex { source, .. } => Some(source),
            Self::Validation(_) => None,
        }
    }
}

#[derive(Deserialize)]
struct ConfigFile {
    telegram_bot_token: String,
    /// Groups the bot answers in. Empty = every group it is added to.
    #[serde(default)]
    allowed_groups: Vec<i64>,
    /// Directory for state files (rule database, logs). Defaults to current directory.
    data_dir: Option<String>,
    /// Name commands are addressed to. Defaults to the bot's Telegram username.
    bot_name: Option<String>,
    #[serde(default = "default_true")]
    quotes_enabled: bool,
    /// Regex that triggers the quote listener.
    quote_pattern: Option<String>,
    /// Keep rules in SQLite across restarts.
    #[serde(default = "default_true")]
    persist: bool,
    #[serde(default)]
    dry_run: bool,
}

fn default_true() -> bool {
    true
}

pub struct Config {
    pub telegram_bot_token: String,
    pub allowed_groups: HashSet<ChatId>,
    /// Directory for state files (rule database, logs).
    pub data_dir: PathBuf,
    /// Name commands are addressed to (without @).
    pub bot_name: Option<String>,
    pub quotes_enabled: bool,
    pub quote_pattern: Regex,
    pub persist: bool,
    /// Log replies instead of sending them.
    pub dry_run: bool,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config_path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| ConfigError::ReadFile { path: config_path.clone(), source: e })?;
        let file: ConfigFile = serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseJson { path: config_path.clone(), source: e })?;

        if file.telegram_bot_token.is_empty() {
            return Err(ConfigError::Validation("telegram_bot_token is required".into()));
        }
        // Telegram tokens are formatted as {bot_id}:{secret} where bot_id is numeric
        let token_parts: Vec<&str> = file.telegram_bot_token.split(':').collect();
        let valid_token = token_parts.len() == 2
            && token_parts[0].parse::<u64>().is_ok()
            && !token_parts[1].is_empty();
        if !valid_token {
            return Err(ConfigError::Validation(
                "telegram_bot_token appears invalid (expected format: 123456789:ABC...)".into(),
            ));
        }

        let bot_name = file
            .bot_name
            .map(|name| name.trim().trim_start_matches('@').to_string());
        if bot_name.as_deref() == Some("") {
            return Err(ConfigError::Validation("bot_name must not be empty".into()));
        }

        let pattern = file.quote_pattern.unwrap_or_else(|| DEFAULT_PATTERN.to_string());
        let quote_pattern = Regex::new(&pattern)
            .map_err(|e| ConfigError::InvalidRegex { pattern, source: e })?;

        let data_dir = file
            .data_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            telegram_bot_token: file.telegram_bot_token,
            allowed_groups: file.allowed_groups.into_iter().map(ChatId).collect(),
            data_dir,
            bot_name,
            quotes_enabled: file.quotes_enabled,
            quote_pattern,
            persist: file.persist,
            dry_run: file.dry_run,
        })
    }

    /// Whether the bot answers in this group.
    pub fn is_allowed_group(&self, chat_id: ChatId) -> bool {
        self.allowed_groups.is_empty() || self.allowed_groups.contains(&chat_id)
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("responds.db")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}
