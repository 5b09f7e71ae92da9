use crate::error::ConfigError;
use serde_derive::Deserialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.toutsurmoneau.fr";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// Connection settings for the toutsurmoneau.fr portal.
#[derive(Deserialize, Debug, Clone)]
pub struct PortalConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub username: String,
    pub password: String,
    // discovered from the consumption history page when absent
    #[serde(default)]
    pub counter_id: Option<u64>,
    #[serde(default)]
    pub timeout_sec: Option<u64>,
}

impl PortalConfig {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        counter_id: Option<u64>,
    ) -> Self {
        Self {
            base_url: default_base_url(),
            username: username.into(),
            password: password.into(),
            counter_id,
            timeout_sec: None,
        }
    }

    /// Points the client at another portal host, e.g. a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout_sec: u64) -> Self {
        self.timeout_sec = Some(timeout_sec);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_sec.map(Duration::from_secs)
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::invalid(
                "base_url",
                format!("'{}' is not an http(s) URL", self.base_url),
            ));
        }
        Ok(self)
    }
}

/// Loads the portal configuration from `TOUTSURMONEAU_*` environment variables.
pub fn load_portal_config() -> Result<PortalConfig, ConfigError> {
    match envy::prefixed("TOUTSURMONEAU_").from_env::<PortalConfig>() {
        Ok(config) => {
            let base_url = config.base_url.clone();
            config.with_base_url(base_url).validate()
        }
        Err(err) => Err(ConfigError::env_parse(err)),
    }
}
