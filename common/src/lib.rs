/*!
common/src/lib.rs

Shared configuration types for NewsPulse.

This file provides:
- Config data structures (deserialized from TOML)
- An async loader that merges a default file with an optional override
- Resolved defaults for every optional setting
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CHAT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4-turbo-preview";
pub const DEFAULT_CHAT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// HTTP listener configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind (e.g. "127.0.0.1")
    pub bind: Option<String>,
    pub port: Option<u16>,
}

/// Background updater (liveness simulation) configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdaterConfig {
    pub enabled: Option<bool>,
    /// Period of the article counter drift
    pub article_interval_seconds: Option<u64>,
    /// Period of the daily index nudge
    pub index_interval_seconds: Option<u64>,
}

/// Upstream chat-completion endpoint used by the chat relay
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatConfig {
    pub api_url: Option<String>,
    /// Name of the environment variable holding the API key
    pub api_key_env: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<usize>,
    pub timeout_seconds: Option<u64>,
}

/// Top-level application configuration (deserialized from config.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub server: Option<ServerConfig>,
    pub updater: Option<UpdaterConfig>,
    pub chat: Option<ChatConfig>,
}

/// Updater settings with defaults applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdaterSettings {
    pub enabled: bool,
    pub article_interval: Duration,
    pub index_interval: Duration,
}

/// Chat relay settings with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSettings {
    pub api_url: String,
    pub api_key_env: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: usize,
    pub timeout: Duration,
}

impl Config {
    /// Load configuration from a TOML file asynchronously.
    ///
    /// Example:
    ///   let cfg = Config::from_file("config.toml").await?;
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = tokio::fs::read_to_string(path.as_ref())
            .await
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let cfg: Config = toml::from_str(&data).context("Failed to parse TOML configuration")?;
        Ok(cfg)
    }

    /// Load configuration with an optional default file and an optional override file.
    /// If both are present, they are merged (override takes precedence).
    pub async fn load_with_defaults(default_path: Option<&Path>, override_path: Option<&Path>) -> Result<Self> {
        let mut config_value = toml::Value::Table(toml::map::Map::new());

        if let Some(path) = default_path {
            if path.exists() {
                let data = tokio::fs::read_to_string(path).await
                    .with_context(|| format!("Failed to read default config: {}", path.display()))?;
                let val: toml::Value = toml::from_str(&data)
                    .context("Failed to parse default configuration")?;
                merge_toml(&mut config_value, val);
            }
        }

        if let Some(path) = override_path {
            if path.exists() {
                let data = tokio::fs::read_to_string(path).await
                    .with_context(|| format!("Failed to read override config: {}", path.display()))?;
                let val: toml::Value = toml::from_str(&data)
                    .context("Failed to parse override configuration")?;
                merge_toml(&mut config_value, val);
            }
        }

        let cfg: Config = config_value.try_into().context("Failed to parse merged configuration")?;
        Ok(cfg)
    }

    pub fn updater_settings(&self) -> UpdaterSettings {
        let updater = self.updater.clone().unwrap_or_default();
        UpdaterSettings {
            enabled: updater.enabled.unwrap_or(true),
            article_interval: Duration::from_secs(updater.article_interval_seconds.unwrap_or(30).max(1)),
            index_interval: Duration::from_secs(updater.index_interval_seconds.unwrap_or(30).max(1)),
        }
    }

    pub fn chat_settings(&self) -> ChatSettings {
        let chat = self.chat.clone().unwrap_or_default();
        ChatSettings {
            api_url: chat.api_url.unwrap_or_else(|| DEFAULT_CHAT_API_URL.to_string()),
            api_key_env: chat.api_key_env.unwrap_or_else(|| DEFAULT_CHAT_API_KEY_ENV.to_string()),
            model: chat.model.unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            temperature: chat.temperature.unwrap_or(0.7),
            max_tokens: chat.max_tokens.unwrap_or(500),
            timeout: Duration::from_secs(chat.timeout_seconds.unwrap_or(30)),
        }
    }
}

fn merge_toml(a: &mut toml::Value, b: toml::Value) {
    match (a, b) {
        (toml::Value::Table(a_map), toml::Value::Table(b_map)) => {
            for (k, v) in b_map {
                if let Some(a_val) = a_map.get_mut(&k) {
                    merge_toml(a_val, v);
                } else {
                    a_map.insert(k, v);
                }
            }
        }
        (a_val, b_val) => *a_val = b_val,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn config_from_string() {
        let toml = r#"
            [server]
            bind = "0.0.0.0"
            port = 8080

            [updater]
            article_interval_seconds = 10

            [chat]
            model = "gpt-4o-mini"
            max_tokens = 256
        "#;

        let cfg: Config = toml::from_str(toml).expect("parse config");
        assert_eq!(cfg.server.as_ref().and_then(|s| s.port), Some(8080));

        let updater = cfg.updater_settings();
        assert!(updater.enabled);
        assert_eq!(updater.article_interval, Duration::from_secs(10));
        assert_eq!(updater.index_interval, Duration::from_secs(30));

        let chat = cfg.chat_settings();
        assert_eq!(chat.model, "gpt-4o-mini");
        assert_eq!(chat.max_tokens, 256);
        assert_eq!(chat.api_url, DEFAULT_CHAT_API_URL);
        assert_eq!(chat.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn empty_config_uses_defaults() {
        let cfg = Config::default();
        let chat = cfg.chat_settings();
        assert_eq!(chat.model, DEFAULT_CHAT_MODEL);
        assert!((chat.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(chat.max_tokens, 500);
        assert_eq!(chat.timeout, Duration::from_secs(30));
        assert_eq!(cfg.updater_settings().article_interval, Duration::from_secs(30));
    }

    #[test]
    fn merge_prefers_override_per_key() {
        let mut base: toml::Value = toml::from_str(
            "[chat]\nmodel = \"a\"\nmax_tokens = 100\n[server]\nport = 1\n",
        )
        .unwrap();
        let over: toml::Value = toml::from_str("[chat]\nmodel = \"b\"\n").unwrap();
        merge_toml(&mut base, over);

        let cfg: Config = base.try_into().unwrap();
        let chat = cfg.chat.unwrap();
        assert_eq!(chat.model.as_deref(), Some("b"));
        assert_eq!(chat.max_tokens, Some(100));
        assert_eq!(cfg.server.unwrap().port, Some(1));
    }

    #[tokio::test]
    async fn load_with_defaults_merges_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let default_path = dir.path().join("config.default.toml");
        let override_path = dir.path().join("config.toml");
        fs::write(&default_path, "[updater]\nenabled = true\nindex_interval_seconds = 5\n").unwrap();
        fs::write(&override_path, "[updater]\nenabled = false\n").unwrap();

        let cfg = Config::load_with_defaults(Some(&default_path), Some(&override_path))
            .await
            .expect("load config");
        let updater = cfg.updater_settings();
        assert!(!updater.enabled);
        assert_eq!(updater.index_interval, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn load_with_defaults_tolerates_missing_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("nope.toml");
        let cfg = Config::load_with_defaults(Some(&missing), None).await.expect("load");
        assert!(cfg.chat.is_none());
    }

    #[tokio::test]
    async fn from_file_reports_parse_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[server\nport = ").unwrap();
        let err = Config::from_file(&path).await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML configuration"));
    }
}
