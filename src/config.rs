use crate::provider::endpoint::DEFAULT_BASE_URL;
use crate::weather_data::fetcher::MAX_RETRY_TIME;
use bon::Builder;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_QPS: u32 = 100;
pub const DEFAULT_WINDOW_SECONDS: u32 = 1;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Tunables for a [`WeatherService`](crate::WeatherService).
///
/// Every field has a default, so a config can be built with only the fields that
/// differ, either through [`ServiceConfig::builder`] or by deserializing a partial
/// document.
///
/// # Examples
///
/// ```
/// use weather_lookup::ServiceConfig;
///
/// let config = ServiceConfig::builder().qps(20).build();
/// assert_eq!(config.qps, 20);
/// assert_eq!(config.window_seconds, 1);
/// assert_eq!(config.max_attempts, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Permits granted per second of window.
    #[builder(default = DEFAULT_QPS)]
    pub qps: u32,

    #[builder(default = DEFAULT_WINDOW_SECONDS)]
    pub window_seconds: u32,

    /// Attempts per weather fetch, including the first.
    #[builder(default = MAX_RETRY_TIME)]
    pub max_attempts: u32,

    #[builder(into, default = DEFAULT_BASE_URL.to_string())]
    pub base_url: String,

    #[builder(default = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ServiceConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
