use serde::Deserialize;
use serde::Serialize;
use std::time::Duration;

/// DOB NOW: Build – Approved Permits
pub const DEFAULT_BASE_URL: &str = "https://data.cityofnewyork.us/resource/rbx6-tga4.json";

/// Connection settings for the dataset endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocrataConfig {
    /// Dataset resource URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Socrata application token, sent as `X-App-Token`
    #[serde(default)]
    pub app_token: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Report offline and never send a request
    #[serde(default)]
    pub offline: bool,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for SocrataConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            app_token: None,
            timeout_secs: default_timeout_secs(),
            offline: false,
        }
    }
}

impl SocrataConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            ));
        }

        if self.timeout_secs == 0 {
            return Err("timeout_secs must be > 0".to_string());
        }

        if self
            .app_token
            .as_deref()
            .is_some_and(|token| token.trim().is_empty())
        {
            return Err("app_token must not be blank".to_string());
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
