//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (HOLOCRON_*)
//! 2. TOML config file (if HOLOCRON_CONFIG_FILE set)
//! 3. Built-in defaults

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (HOLOCRON_*)
/// 2. TOML config file (if HOLOCRON_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Catalog API root; collections live at `<base_url>/films` and `<base_url>/people`.
    ///
    /// Set via HOLOCRON_BASE_URL environment variable.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via HOLOCRON_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via HOLOCRON_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum bytes to accept per response.
    ///
    /// Set via HOLOCRON_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// How long a fetched resource is served from cache, in seconds.
    ///
    /// Set via HOLOCRON_FRESHNESS_SECS environment variable.
    #[serde(default = "default_freshness_secs")]
    pub freshness_secs: u64,

    /// Quiet period before a typed search term is applied, in milliseconds.
    ///
    /// Set via HOLOCRON_DEBOUNCE_MS environment variable.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Number of list items per page.
    ///
    /// Set via HOLOCRON_PAGE_SIZE environment variable.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Maximum length of the opening crawl excerpt shown on film cards.
    ///
    /// Set via HOLOCRON_EXCERPT_CHARS environment variable.
    #[serde(default = "default_excerpt_chars")]
    pub excerpt_chars: usize,
}

fn default_base_url() -> String {
    "https://swapi.info/api".into()
}

fn default_user_agent() -> String {
    "holocron/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_freshness_secs() -> u64 {
    300
}

fn default_debounce_ms() -> u64 {
    1_000
}

fn default_page_size() -> usize {
    20
}

fn default_excerpt_chars() -> usize {
    128
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_bytes: default_max_bytes(),
            freshness_secs: default_freshness_secs(),
            debounce_ms: default_debounce_ms(),
            page_size: default_page_size(),
            excerpt_chars: default_excerpt_chars(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Cache freshness window.
    pub fn freshness(&self) -> Duration {
        Duration::from_secs(self.freshness_secs)
    }

    /// Search debounce delay.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `HOLOCRON_`
    /// 2. TOML file from `HOLOCRON_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("HOLOCRON_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("HOLOCRON_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
