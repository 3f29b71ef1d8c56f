//! Configuration system (layered: defaults > config file > env).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bon::Builder;
use serde::Deserialize;
use tracing::debug;

use crate::error::{ChatlineError, Result};
use crate::types::{ChatMode, Language};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_INTERRUPTED_TEXT: &str = "The AI response was interrupted.";
pub const DEFAULT_FAILURE_TEXT: &str = "An error occurred while generating the AI response.";

/// Client configuration.
///
/// Resolution order (later wins):
/// 1. Built-in defaults
/// 2. TOML file (`~/.chatline/config.toml` or an explicit path)
/// 3. Environment variables (`.env` is loaded first if present)
///
/// ```
/// use chatline::config::ChatConfig;
/// use chatline::types::{ChatMode, Language};
///
/// let config = ChatConfig::builder()
///     .base_url("http://127.0.0.1:9000")
///     .mode(ChatMode::Translate)
///     .language(Language::French)
///     .build();
/// assert_eq!(config.endpoint_url(), "http://127.0.0.1:9000/api/translate/stream-sse");
/// ```
#[derive(Debug, Clone, Builder)]
pub struct ChatConfig {
    #[builder(into, default = DEFAULT_BASE_URL.to_string())]
    pub base_url: String,
    #[builder(default)]
    pub mode: ChatMode,
    /// Initial target-language selection.
    #[builder(default)]
    pub language: Language,
    /// Source language, translate mode only.
    #[builder(default = Language::English)]
    pub source_language: Language,
    /// Connect timeout. There is deliberately no read timeout on the stream.
    #[builder(default = Duration::from_secs(10))]
    pub connect_timeout: Duration,
    /// Optional deadline after which hosts cancel an exchange.
    pub deadline: Option<Duration>,
    /// Completion text for a cancelled exchange that produced nothing.
    #[builder(into, default = DEFAULT_INTERRUPTED_TEXT.to_string())]
    pub interrupted_text: String,
    /// Assistant text written when an exchange fails.
    #[builder(into, default = DEFAULT_FAILURE_TEXT.to_string())]
    pub failure_text: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// On-disk shape of `config.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    base_url: Option<String>,
    mode: Option<ChatMode>,
    language: Option<Language>,
    source_language: Option<Language>,
    connect_timeout_secs: Option<u64>,
    deadline_secs: Option<u64>,
    interrupted_text: Option<String>,
    failure_text: Option<String>,
}

impl ChatConfig {
    /// Load defaults, then the config file, then the process environment.
    ///
    /// With `path = None` the default file is used only if it exists; an
    /// explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let _ = dotenvy::dotenv();
        let mut config = Self::default();
        match path {
            Some(path) => config.apply_file(path)?,
            None => {
                let default = default_config_path();
                if default.is_file() {
                    config.apply_file(&default)?;
                }
            }
        }
        config.apply_env_with(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Overlay settings from a TOML file.
    pub fn apply_file(&mut self, path: &Path) -> Result<()> {
        let raw = fs::read_to_string(path)?;
        let file: ConfigFile = toml::from_str(&raw)?;
        debug!(path = %path.display(), "loaded config file");

        if let Some(url) = file.base_url {
            self.base_url = url;
        }
        if let Some(mode) = file.mode {
            self.mode = mode;
        }
        if let Some(language) = file.language {
            self.language = language;
        }
        if let Some(language) = file.source_language {
            self.source_language = language;
        }
        if let Some(secs) = file.connect_timeout_secs {
            self.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = file.deadline_secs {
            self.deadline = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(text) = file.interrupted_text {
            self.interrupted_text = text;
        }
        if let Some(text) = file.failure_text {
            self.failure_text = text;
        }
        self.validate()
    }

    /// Overlay settings from an environment lookup.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("CHATLINE_API_URL") {
            self.base_url = url;
        }
        if let Some(mode) = lookup("CHATLINE_MODE") {
            self.mode = parse_setting("CHATLINE_MODE", &mode)?;
        }
        if let Some(language) = lookup("CHATLINE_LANGUAGE") {
            self.language = parse_setting("CHATLINE_LANGUAGE", &language)?;
        }
        if let Some(language) = lookup("CHATLINE_SOURCE_LANGUAGE") {
            self.source_language = parse_setting("CHATLINE_SOURCE_LANGUAGE", &language)?;
        }
        if let Some(secs) = lookup("CHATLINE_DEADLINE_SECS") {
            let secs: u64 = parse_setting("CHATLINE_DEADLINE_SECS", &secs)?;
            self.deadline = (secs > 0).then(|| Duration::from_secs(secs));
        }
        self.validate()
    }

    /// Full URL of the streaming endpoint for the configured mode.
    pub fn endpoint_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.mode.path())
    }

    /// Full URL of the health probe.
    pub fn health_url(&self) -> String {
        format!("{}/api/health", self.base_url.trim_end_matches('/'))
    }

    fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ChatlineError::Configuration(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if self.interrupted_text.trim().is_empty() {
            return Err(ChatlineError::Configuration(
                "interrupted_text must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_setting<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
{
    value
        .trim()
        .parse()
        .map_err(|_| ChatlineError::Configuration(format!("invalid value for {key}: '{value}'")))
}

/// `~/.chatline/config.toml`, or `.chatline/config.toml` without a home directory.
pub fn default_config_path() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".chatline"))
        .unwrap_or_else(|| PathBuf::from(".chatline"))
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = ChatConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.mode, ChatMode::Chat);
        assert_eq!(config.language, Language::Korean);
        assert_eq!(config.source_language, Language::English);
        assert!(config.deadline.is_none());
        assert_eq!(config.endpoint_url(), "http://localhost:8000/api/chat/stream-sse");
    }

    #[test]
    fn env_overrides() {
        let mut config = ChatConfig::default();
        config
            .apply_env_with(env(&[
                ("CHATLINE_API_URL", "https://gen.example.com/"),
                ("CHATLINE_MODE", "translate"),
                ("CHATLINE_LANGUAGE", "german"),
                ("CHATLINE_DEADLINE_SECS", "30"),
            ]))
            .unwrap();
        assert_eq!(config.mode, ChatMode::Translate);
        assert_eq!(config.language, Language::German);
        assert_eq!(config.deadline, Some(Duration::from_secs(30)));
        assert_eq!(
            config.endpoint_url(),
            "https://gen.example.com/api/translate/stream-sse"
        );
    }

    #[test]
    fn zero_deadline_disables_it() {
        let mut config = ChatConfig::builder().deadline(Duration::from_secs(5)).build();
        config
            .apply_env_with(env(&[("CHATLINE_DEADLINE_SECS", "0")]))
            .unwrap();
        assert!(config.deadline.is_none());
    }

    #[test]
    fn unknown_language_is_rejected() {
        let mut config = ChatConfig::default();
        let err = config
            .apply_env_with(env(&[("CHATLINE_LANGUAGE", "Elvish")]))
            .unwrap_err();
        assert!(matches!(err, ChatlineError::Configuration(_)));
    }

    #[test]
    fn non_http_base_url_is_rejected() {
        let mut config = ChatConfig::default();
        assert!(config
            .apply_env_with(env(&[("CHATLINE_API_URL", "localhost:8000")]))
            .is_err());
    }
}
