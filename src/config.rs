use figment::{
    providers::{Env, Serialized},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::errors::Result;

/// Base URL of the PagerDuty Events API
pub const DEFAULT_API_URL: &str = "https://events.pagerduty.com";

/// Prefix of the environment variables read by [`ClientConfig::from_env`]
pub const ENV_PREFIX: &str = "PAGERDUTY_";

/// Transport settings for [`EventsClient`](crate::EventsClient)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL; events are posted to `<api_url>/v2/enqueue`
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Request deadline in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ClientConfig {
    /// Load the config from `PAGERDUTY_API_URL` and `PAGERDUTY_TIMEOUT_SECS`,
    /// falling back to the defaults for unset variables
    pub fn from_env() -> Result<Self> {
        let config = Figment::from(Serialized::defaults(ClientConfig::default()))
            .merge(Env::prefixed(ENV_PREFIX).only(&["api_url", "timeout_secs"]))
            .extract()?;
        Ok(config)
    }

    /// Parse the base URL
    pub fn api_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.api_url)?)
    }

    /// Request deadline
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}
