//! Configuration for a relay run.
//!
//! Settings come from an optional TOML file. A missing file yields
//! `Config::default()`, which targets the bapcsalescanada subreddit and the
//! matching lemmy.ca community. Credentials are never read from the file;
//! they come from `LEMMY_USERNAME` and `LEMMY_PASSWORD`.
use chrono::TimeDelta;
use secrecy::SecretString;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::relay::FilterRules;
use crate::storage::{LAST_FETCH_FILE, PUBLISH_RECORD_FILE};

pub const USERNAME_ENV: &str = "LEMMY_USERNAME";
pub const PASSWORD_ENV: &str = "LEMMY_PASSWORD";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Required environment variable {0} is not set")]
    MissingEnv(&'static str),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level relay configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the Lemmy instance.
    pub instance_url: String,

    /// Community name on that instance.
    pub community: String,

    /// RSS/Atom feed to poll.
    pub feed_url: String,

    /// Entries whose title contains this are never relayed.
    pub sticky_marker: String,

    /// Entries and publish records older than this many hours are dropped.
    pub retention_hours: u64,

    /// Pause after each successful post, in seconds.
    pub post_delay_secs: u64,

    /// Assumed age of the previous fetch when no marker file exists.
    pub last_fetch_offset_secs: u64,

    /// Directory holding the marker and publish-record files.
    pub state_dir: PathBuf,

    /// Domain ignore list, one per line. Relative paths resolve against the
    /// working directory.
    pub ignore_list: PathBuf,

    /// User-Agent sent on every request.
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            instance_url: "https://lemmy.ca".to_string(),
            community: "bapcsalescanada".to_string(),
            feed_url: "https://www.reddit.com/r/bapcsalescanada/new/.rss".to_string(),
            sticky_marker: "General Discussion - Daily Thread".to_string(),
            retention_hours: 24,
            post_delay_secs: 5,
            last_fetch_offset_secs: 10 * 60 + 45,
            state_dir: PathBuf::from("."),
            ignore_list: PathBuf::from("ignore_domains.txt"),
            user_agent: concat!("subrelay/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 10] = [
        "instance_url",
        "community",
        "feed_url",
        "sticky_marker",
        "retention_hours",
        "post_delay_secs",
        "last_fetch_offset_secs",
        "state_dir",
        "ignore_list",
        "user_agent",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            community = %config.community,
            instance = %config.instance_url,
            "Loaded configuration"
        );
        Ok(config)
    }

    pub fn retention_window(&self) -> TimeDelta {
        i64::try_from(self.retention_hours)
            .ok()
            .and_then(TimeDelta::try_hours)
            .unwrap_or(TimeDelta::MAX)
    }

    pub fn post_delay(&self) -> Duration {
        Duration::from_secs(self.post_delay_secs)
    }

    pub fn last_fetch_offset(&self) -> TimeDelta {
        i64::try_from(self.last_fetch_offset_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX)
    }

    pub fn filter_rules(&self) -> FilterRules {
        FilterRules {
            sticky_marker: self.sticky_marker.clone(),
            retention_window: self.retention_window(),
        }
    }

    pub fn last_fetch_path(&self) -> PathBuf {
        self.state_dir.join(LAST_FETCH_FILE)
    }

    pub fn publish_record_path(&self) -> PathBuf {
        self.state_dir.join(PUBLISH_RECORD_FILE)
    }
}

// ============================================================================
// Credentials
// ============================================================================

/// Lemmy login. `Debug` masks the password.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    /// Read both credential variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Credentials::from_env`], reading variables through `lookup`.
    /// Empty values count as missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::MissingEnv(key))
        };
        Ok(Self {
            username: get(USERNAME_ENV)?,
            password: SecretString::from(get(PASSWORD_ENV)?),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
