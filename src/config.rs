//! Configuration loading.
//!
//! Reads `config.json` from the sharepush configuration directory and layers
//! `SHAREPUSH_*` environment overrides on top. Every field has a default, so a
//! missing or partial file is fine.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::Path, path::PathBuf};

use crate::constants;
use crate::pipeline::RetryPolicy;

/// Configuration for the sharepush shell.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Page loaded into the embedded web view.
    pub content_url: String,
    /// Endpoint receiving `POST` token registrations.
    pub save_token_url: String,
    /// Project the notification service issues tokens for.
    pub project_id: String,
    /// Retries after a failed delivery before giving up.
    pub max_retries: u32,
    /// Fixed delay between delivery attempts, in milliseconds.
    pub retry_delay_ms: u64,
    /// Interval between periodic token re-checks, in seconds.
    pub refresh_interval_secs: u64,
    /// Send `userId`/`isGuest` alongside the token.
    ///
    /// Off by default: the registration endpoint has only ever received
    /// `token` and `deviceInfo`.
    pub include_identity: bool,
    /// Token the headless notification service hands out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push_token: Option<String>,
    /// Whether the headless host reports a physical device.
    pub physical_device: bool,
    /// Whether the headless host grants notification permission on request.
    pub grant_permission: bool,
    /// Device model reported to the server. Detected when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_model: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            content_url: constants::CONTENT_URL.to_string(),
            save_token_url: constants::SAVE_TOKEN_URL.to_string(),
            project_id: constants::DEFAULT_PROJECT_ID.to_string(),
            max_retries: constants::MAX_RETRIES,
            retry_delay_ms: duration_millis(constants::RETRY_DELAY),
            refresh_interval_secs: constants::REFRESH_INTERVAL.as_secs(),
            include_identity: false,
            push_token: None,
            physical_device: true,
            grant_permission: true,
            device_model: None,
        }
    }
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl Config {
    /// Returns the configuration directory path, creating it if necessary.
    ///
    /// Directory selection priority:
    /// 1. `SHAREPUSH_CONFIG_DIR` env var: explicit override
    /// 2. `SHAREPUSH_ENV=test`: `<tmp>/sharepush-test`
    /// 3. Default: platform config dir (e.g. `~/.config/sharepush`)
    pub fn config_dir() -> Result<PathBuf> {
        let dir = if let Ok(custom_dir) = std::env::var("SHAREPUSH_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else if crate::env::is_test_mode() {
            std::env::temp_dir().join("sharepush-test")
        } else {
            dirs::config_dir()
                .context("Could not determine config directory")?
                .join("sharepush")
        };
        fs::create_dir_all(&dir).context("Failed to create config directory")?;
        Ok(dir)
    }

    /// Loads configuration from the config directory, with environment
    /// variable overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_dir()?)?;
        config.apply_overrides(|key: &str| std::env::var(key).ok());
        Ok(config)
    }

    /// Loads `config.json` from `dir`, falling back to defaults when absent.
    pub fn load_from(dir: &Path) -> Result<Self> {
        let config_path = dir.join("config.json");
        if !config_path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))
    }

    /// Applies `SHAREPUSH_*` overrides obtained through `lookup`.
    ///
    /// Unparseable numeric or boolean values are ignored with a warning.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("SHAREPUSH_CONTENT_URL") {
            self.content_url = url;
        }
        if let Some(url) = lookup("SHAREPUSH_SAVE_TOKEN_URL") {
            self.save_token_url = url;
        }
        if let Some(project_id) = lookup("SHAREPUSH_PROJECT_ID") {
            self.project_id = project_id;
        }
        if let Some(token) = lookup("SHAREPUSH_PUSH_TOKEN") {
            self.push_token = Some(token).filter(|t| !t.is_empty());
        }
        if let Some(model) = lookup("SHAREPUSH_DEVICE_MODEL") {
            self.device_model = Some(model).filter(|m| !m.is_empty());
        }

        override_parsed(&lookup, "SHAREPUSH_MAX_RETRIES", &mut self.max_retries);
        override_parsed(&lookup, "SHAREPUSH_RETRY_DELAY_MS", &mut self.retry_delay_ms);
        override_parsed(
            &lookup,
            "SHAREPUSH_REFRESH_INTERVAL_SECS",
            &mut self.refresh_interval_secs,
        );
        override_parsed(&lookup, "SHAREPUSH_INCLUDE_IDENTITY", &mut self.include_identity);
        override_parsed(&lookup, "SHAREPUSH_PHYSICAL_DEVICE", &mut self.physical_device);
        override_parsed(&lookup, "SHAREPUSH_GRANT_PERMISSION", &mut self.grant_permission);
    }

    /// Retry policy for token delivery.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            delay: Duration::from_millis(self.retry_delay_ms),
        }
    }

    /// Interval between periodic token re-checks.
    ///
    /// Clamped to at least one second so a zero value cannot spin the loop.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }
}

fn override_parsed<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    target: &mut T,
) {
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.trim().parse::<T>() {
        Ok(value) => *target = value,
        Err(_) => log::warn!("Ignoring invalid {key}={raw:?}"),
    }
}
