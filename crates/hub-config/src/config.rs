//! Client configuration.
//!
//! The Supabase coordinates are fixed at build time. The optional JSON
//! file under [`Paths::config_file`] and the environment only tune
//! runtime behavior, which today means the log level; the client never
//! writes the file back.

use crate::{CoreError, CoreResult, Paths};
use serde::Deserialize;
use std::path::Path;
use url::Url;

/// Supabase project URL, set through `SUPABASE_URL` at build time.
pub const DEFAULT_SUPABASE_URL: &str = match option_env!("SUPABASE_URL") {
    Some(url) => url,
    None => "https://skills-hub.supabase.co",
};

/// Supabase publishable API key, set through `SUPABASE_PUBLISHABLE_KEY`
/// at build time. Publishable keys are not secrets.
pub const DEFAULT_SUPABASE_PUBLISHABLE_KEY: &str = match option_env!("SUPABASE_PUBLISHABLE_KEY") {
    Some(key) => key,
    None => "publishable-key",
};

/// Log level used when neither the file nor the environment names one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Runtime configuration for the portal client.
///
/// The Supabase fields are `serde(skip)`: a config file naming them is
/// ignored, so a tampered file cannot repoint the client at another
/// project.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Log level filter applied when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Supabase project URL.
    #[serde(skip, default = "default_supabase_url")]
    pub supabase_url: String,
    /// Supabase publishable API key.
    #[serde(skip, default = "default_supabase_publishable_key")]
    pub supabase_publishable_key: String,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_supabase_url() -> String {
    DEFAULT_SUPABASE_URL.to_string()
}

fn default_supabase_publishable_key() -> String {
    DEFAULT_SUPABASE_PUBLISHABLE_KEY.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            supabase_url: default_supabase_url(),
            supabase_publishable_key: default_supabase_publishable_key(),
        }
    }
}

impl Config {
    /// Load the configuration: compile-time defaults, then the config
    /// file if one exists, then the environment.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let path = paths.config_file();
        let mut config = if path.exists() {
            Self::read_file(&path)?
        } else {
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    fn read_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// `SKILLS_HUB_LOG_LEVEL` wins over the file value.
    fn apply_env(&mut self) {
        if let Ok(level) = std::env::var("SKILLS_HUB_LOG_LEVEL") {
            self.log_level = level;
        }
    }

    /// The Supabase project URL, parsed.
    pub fn supabase_url(&self) -> CoreResult<Url> {
        Url::parse(&self.supabase_url).map_err(CoreError::from)
    }
}
