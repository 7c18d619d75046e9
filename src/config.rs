// src/config.rs
//! Service configuration: upstream credentials and tuning knobs.
//!
//! Credentials are collected here once and handed to each adapter at
//! construction; adapters never read the process environment themselves,
//! which keeps the normalizer and resolver testable without env setup.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const ENV_PATH: &str = "NEWSDECK_CONFIG_PATH";
const DEFAULT_PATH: &str = "config/newsdeck.toml";

fn default_page_size() -> u32 {
    10
}

fn default_preview_note_threshold() -> u64 {
    5_000
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// A missing credential disables its provider; the rest of the service
    /// keeps running.
    pub news_api_key: Option<String>,
    pub guardian_api_key: Option<String>,
    pub reddit_client_id: Option<String>,
    pub reddit_client_secret: Option<String>,
    pub twitter_bearer_token: Option<String>,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_preview_note_threshold")]
    pub preview_note_threshold: u64,
}

impl Config {
    /// Load from an explicit TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    /// Read everything from the process environment. `dotenvy::dotenv()`
    /// should already have run in the binary.
    pub fn from_env() -> Self {
        fn var(key: &str) -> Option<String> {
            std::env::var(key).ok().filter(|v| !v.is_empty())
        }
        Self {
            news_api_key: var("NEWS_API_KEY"),
            guardian_api_key: var("GUARDIAN_API_KEY"),
            reddit_client_id: var("REDDIT_CLIENT_ID"),
            reddit_client_secret: var("REDDIT_CLIENT_SECRET"),
            twitter_bearer_token: var("TWITTER_BEARER_TOKEN"),
            page_size: var("NEWSDECK_PAGE_SIZE")
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_page_size),
            preview_note_threshold: var("NEWSDECK_PREVIEW_NOTE_THRESHOLD")
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_preview_note_threshold),
        }
    }

    /// Load using env var + fallbacks:
    /// 1) $NEWSDECK_CONFIG_PATH (must exist when set)
    /// 2) config/newsdeck.toml
    /// 3) environment variables only
    pub fn load() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::from_file(&pb);
            }
            return Err(anyhow!("NEWSDECK_CONFIG_PATH points to non-existent path"));
        }
        let default = PathBuf::from(DEFAULT_PATH);
        if default.exists() {
            return Self::from_file(&default);
        }
        Ok(Self::from_env())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_with_partial_keys_parses() {
        let cfg: Config = toml::from_str(
            r#"
news_api_key = "k1"
page_size = 5
"#,
        )
        .unwrap();
        assert_eq!(cfg.news_api_key.as_deref(), Some("k1"));
        assert_eq!(cfg.guardian_api_key, None);
        assert_eq!(cfg.page_size, 5);
        assert_eq!(cfg.preview_note_threshold, 5_000);
    }

    #[serial_test::serial]
    #[test]
    fn env_blank_values_count_as_missing() {
        std::env::set_var("NEWS_API_KEY", "");
        std::env::set_var("GUARDIAN_API_KEY", "gk");
        let cfg = Config::from_env();
        assert_eq!(cfg.news_api_key, None);
        assert_eq!(cfg.guardian_api_key.as_deref(), Some("gk"));
        std::env::remove_var("NEWS_API_KEY");
        std::env::remove_var("GUARDIAN_API_KEY");
    }
}
