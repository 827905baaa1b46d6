//! Bot configuration.
//!
//! Stored as JSON under `~/.sortbot/config.json`. Environment variables win
//! over the file: `BOT_TOKEN` (or `TELEGRAM_BOT_TOKEN`) for the token and
//! `ALLOWED_USER_IDS` as a comma-separated allow-list.

use crate::error::ConfigResult;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level bot configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BotConfig {
    /// Telegram settings.
    #[serde(default)]
    pub telegram: TelegramConfig,
    /// Flush/replay settings.
    #[serde(default)]
    pub replay: ReplayConfig,
}

/// Telegram connection settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token from @BotFather.
    pub token: Option<String>,
    /// Allowed user IDs; empty allows everyone.
    #[serde(default)]
    pub allow_from: Vec<i64>,
    /// Handle offered in the access-denied reply.
    pub contact_handle: Option<String>,
}

/// Settings for the replay loop.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Pause between consecutive replays, in milliseconds.
    #[serde(default = "default_pace_ms")]
    pub pace_ms: u64,
}

const fn default_pace_ms() -> u64 {
    50
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            pace_ms: default_pace_ms(),
        }
    }
}

/// Path of the configuration file (`~/.sortbot/config.json`).
#[must_use]
pub fn config_path() -> PathBuf {
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".sortbot")
        .join("config.json")
}

/// Load the configuration file and apply environment overrides.
///
/// A missing file yields the defaults (still subject to env overrides).
pub async fn load_config() -> ConfigResult<BotConfig> {
    let path = config_path();

    let mut config = if path.exists() {
        let content = tokio::fs::read_to_string(&path).await?;
        serde_json::from_str(&content)?
    } else {
        BotConfig::default()
    };

    apply_env(&mut config);
    Ok(config)
}

/// Save the configuration to its default location.
pub async fn save_config(config: &BotConfig) -> ConfigResult<()> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let content = serde_json::to_string_pretty(config)?;
    tokio::fs::write(&path, content).await?;
    Ok(())
}

/// Write a default configuration file.
pub async fn init_config() -> ConfigResult<()> {
    save_config(&BotConfig::default()).await
}

fn apply_env(config: &mut BotConfig) {
    if let Ok(token) = std::env::var("BOT_TOKEN").or_else(|_| std::env::var("TELEGRAM_BOT_TOKEN")) {
        if !token.is_empty() {
            config.telegram.token = Some(token);
        }
    }
    if let Ok(raw) = std::env::var("ALLOWED_USER_IDS") {
        let ids = parse_allowed_ids(&raw);
        if !ids.is_empty() {
            config.telegram.allow_from = ids;
        }
    }
}

/// Parse a comma-separated user ID list, skipping malformed entries.
#[must_use]
pub fn parse_allowed_ids(raw: &str) -> Vec<i64> {
    raw.split(',')
        .filter_map(|part| part.trim().parse::<i64>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_allowed_ids() {
        assert_eq!(
            parse_allowed_ids("111, 222,333"),
            vec![111, 222, 333]
        );
        assert_eq!(parse_allowed_ids("111, nope, 222"), vec![111, 222]);
        assert!(parse_allowed_ids("").is_empty());
        assert!(parse_allowed_ids(" , ,").is_empty());
    }

    #[test]
    fn test_defaults() {
        let config = BotConfig::default();
        assert!(config.telegram.token.is_none());
        assert!(config.telegram.allow_from.is_empty());
        assert_eq!(config.replay.pace_ms, 50);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: BotConfig =
            serde_json::from_str(r#"{"telegram": {"token": "abc"}}"#).unwrap();
        assert_eq!(config.telegram.token.as_deref(), Some("abc"));
        assert_eq!(config.replay.pace_ms, 50);
    }
}
