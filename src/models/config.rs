//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP client behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Listing source and destination settings
    #[serde(default)]
    pub ingest: IngestConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Build configuration from the Lambda environment.
    ///
    /// Missing, empty, or unparsable variables fall back to the defaults
    /// with a logged warning; they are never fatal.
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var("DDB_TABLE").ok(),
            std::env::var("CRAWLER_DAYS").ok(),
            std::env::var("CRAWL_TIMEOUT_SECS").ok(),
        )
    }

    fn from_vars(table: Option<String>, days: Option<String>, timeout: Option<String>) -> Self {
        let mut config = Self::default();

        match table {
            Some(table) if !table.trim().is_empty() => {
                log::info!("Found DDB_TABLE: {table}");
                config.ingest.table_name = table;
            }
            _ => log::warn!(
                "DDB_TABLE not set, defaulting to {}",
                config.ingest.table_name
            ),
        }

        match days {
            Some(days) if !days.trim().is_empty() => match days.trim().parse() {
                Ok(days) => {
                    log::info!("Found CRAWLER_DAYS: {days}");
                    config.ingest.crawl_days = days;
                }
                Err(e) => log::warn!(
                    "CRAWLER_DAYS {days:?} is not a day count ({e}), defaulting to {}",
                    config.ingest.crawl_days
                ),
            },
            _ => log::warn!(
                "CRAWLER_DAYS not set, defaulting to {}",
                config.ingest.crawl_days
            ),
        }

        // Optional override; only a set-but-unusable value warns.
        if let Some(timeout) = timeout {
            match timeout.trim().parse() {
                Ok(secs) => {
                    log::info!("Found CRAWL_TIMEOUT_SECS: {secs}");
                    config.crawler.timeout_secs = secs;
                }
                Err(e) => log::warn!(
                    "CRAWL_TIMEOUT_SECS {timeout:?} is not a second count ({e}), defaulting to {}",
                    config.crawler.timeout_secs
                ),
            }
        }

        config
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.ingest.base_url.trim().is_empty() {
            return Err(AppError::validation("ingest.base_url is empty"));
        }
        if self.ingest.table_name.trim().is_empty() {
            return Err(AppError::validation("ingest.table_name is empty"));
        }
        Ok(())
    }
}

/// HTTP client behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Listing source and destination settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Base URL of the public events listing
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// DynamoDB table receiving the extracted events
    #[serde(default = "defaults::table_name")]
    pub table_name: String,

    /// How many days past today the crawl window covers
    #[serde(default = "defaults::crawl_days")]
    pub crawl_days: u32,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            table_name: defaults::table_name(),
            crawl_days: defaults::crawl_days(),
        }
    }
}

mod defaults {
    // Crawler defaults
    pub fn user_agent() -> String {
        "Example crawler script that parses events from NYC Parks Events site, \
         no malicious intent"
            .into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Ingest defaults
    pub fn base_url() -> String {
        "https://www.nycgovparks.org/events".into()
    }
    pub fn table_name() -> String {
        "EventsTable-Demo".into()
    }
    pub fn crawl_days() -> u32 {
        7
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.crawler.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.crawler.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_table_name() {
        let mut config = Config::default();
        config.ingest.table_name = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn env_vars_override_defaults() {
        let config = Config::from_vars(
            Some("EventsTable-Prod".to_string()),
            Some("14".to_string()),
            Some("60".to_string()),
        );

        assert_eq!(config.ingest.table_name, "EventsTable-Prod");
        assert_eq!(config.ingest.crawl_days, 14);
        assert_eq!(config.crawler.timeout_secs, 60);
    }

    #[test]
    fn missing_env_vars_fall_back_to_defaults() {
        let config = Config::from_vars(None, None, None);

        assert_eq!(config.ingest.table_name, "EventsTable-Demo");
        assert_eq!(config.ingest.crawl_days, 7);
        assert_eq!(config.crawler.timeout_secs, 30);
    }

    #[test]
    fn unparsable_env_vars_fall_back_to_defaults() {
        let config = Config::from_vars(
            Some("  ".to_string()),
            Some("a week".to_string()),
            Some("soon".to_string()),
        );

        assert_eq!(config.ingest.table_name, "EventsTable-Demo");
        assert_eq!(config.ingest.crawl_days, 7);
        assert_eq!(config.crawler.timeout_secs, 30);
    }

    #[test]
    fn partial_toml_falls_back_per_field() {
        let config: Config = toml::from_str(
            r#"
            [ingest]
            crawl_days = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.ingest.crawl_days, 3);
        assert_eq!(config.ingest.table_name, "EventsTable-Demo");
        assert_eq!(config.ingest.base_url, "https://www.nycgovparks.org/events");
        assert_eq!(config.crawler.timeout_secs, 30);
    }
}
