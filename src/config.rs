use std::time::Duration;

use anyhow::Result;
use config::{Config, Environment};
use serde::Deserialize;

/// Runtime settings, read from `INSIGHTS_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_pages: usize,
    pub page_size: usize,
    pub page_delay_ms: u64,
    pub search_delay_ms: u64,
    pub log_level: String,
    pub serpapi_key: Option<String>,
    pub db_path: String,
    pub max_competitors: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            request_timeout_secs: 20,
            user_agent: "ShopifyInsightsFetcher/1.0".to_string(),
            max_pages: 50,
            page_size: 250,
            page_delay_ms: 300,
            search_delay_ms: 500,
            log_level: "info".to_string(),
            serpapi_key: None,
            db_path: "data/insights.sqlite".to_string(),
            max_competitors: 3,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Settings> {
        let mut settings: Settings = Config::builder()
            .add_source(Environment::with_prefix("INSIGHTS").try_parsing(true))
            .build()?
            .try_deserialize()?;

        // Search-API keys are commonly exported without the app prefix.
        if settings.serpapi_key.is_none() {
            settings.serpapi_key = std::env::var("SERPAPI_KEY").ok().filter(|k| !k.is_empty());
        }
        Ok(settings)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn search_delay(&self) -> Duration {
        Duration::from_millis(self.search_delay_ms)
    }
}
