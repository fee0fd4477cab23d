/// Extension settings stored in chrome.storage.local
use crate::cache::{DEFAULT_MAX_ENTRIES, DEFAULT_TTL};
use crate::error::ConfigError;
use crate::monitor::StalePolicy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use url::Url;

pub const SETTINGS_STORAGE_KEY: &str = "phishguard_settings";
pub const DEFAULT_API_BASE_URL: &str = "https://phishguard-api-lpki.onrender.com";
pub const ANALYZE_URL_PATH: &str = "api/analyze-url";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_base_url: String,
    pub cache_ttl_secs: u64,
    pub max_cache_entries: usize,
    pub send_page_html: bool,
    pub max_html_bytes: usize,
    pub skip_db: bool,
    pub enabled: bool,
    /// Apply only the response to a tab's most recent request
    pub latest_response_only: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            cache_ttl_secs: DEFAULT_TTL.as_secs(),
            max_cache_entries: DEFAULT_MAX_ENTRIES,
            send_page_html: true,
            max_html_bytes: 500_000,
            skip_db: false,
            enabled: true,
            latest_response_only: false,
        }
    }
}

impl Settings {
    pub fn from_json(value: Value) -> Result<Settings, ConfigError> {
        let settings = serde_json::from_value(value)?;
        Ok(settings)
    }

    /// Settings from a raw storage read; missing or broken values fall back
    /// to defaults.
    pub fn from_storage(value: Option<Value>) -> Settings {
        match value {
            None | Some(Value::Null) => Settings::default(),
            Some(value) => Settings::from_json(value).unwrap_or_else(|e| {
                log::warn!("Ignoring stored settings: {}", e);
                Settings::default()
            }),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn stale_policy(&self) -> StalePolicy {
        if self.latest_response_only {
            StalePolicy::LatestOnly
        } else {
            StalePolicy::ApplyAll
        }
    }

    /// Full URL of the URL-analysis endpoint under `api_base_url`
    pub fn analyze_endpoint(&self) -> Result<Url, ConfigError> {
        let invalid = |source: url::ParseError| ConfigError::InvalidBaseUrl {
            url: self.api_base_url.clone(),
            source,
        };

        let mut base = self.api_base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }

        Url::parse(&base)
            .and_then(|url| url.join(ANALYZE_URL_PATH))
            .map_err(invalid)
    }
}
