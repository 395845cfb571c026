//! The entry point for looking up current temperatures by place name.
//!
//! A [`WeatherService`] owns a rate limiter, the location code index and a weather
//! fetcher. Every lookup first takes a permit; without one it returns `None` straight
//! away instead of waiting.

use crate::config::ServiceConfig;
use crate::error::ServiceError;
use crate::limiter::clock::{Clock, MonotonicClock};
use crate::limiter::rate_limiter::RateLimiter;
use crate::location::code_index::LocationCodeIndex;
use crate::provider::client::ProviderClient;
use crate::provider::transport::{HttpTransport, Transport};
use crate::weather_data::fetcher::WeatherFetcher;
use bon::bon;
use log::{debug, info};
use std::sync::Arc;

/// Rate-limited temperature lookups for Chinese provinces, cities and counties.
///
/// A `WeatherService` only exists once its province and city tables have been
/// loaded, so it is ready for concurrent use as soon as construction returns. It is
/// `Send + Sync`; share it across threads behind an `Arc` or a reference.
///
/// # Examples
///
/// ```no_run
/// # use weather_lookup::{ServiceConfig, ServiceError, WeatherService};
/// # fn main() -> Result<(), ServiceError> {
/// let service = WeatherService::builder()
///     .config(ServiceConfig::builder().qps(20).build())
///     .build()?;
///
/// if let Some(temperature) = service.get_temperature("江苏", "苏州", "昆山") {
///     println!("Kunshan: {temperature}°C");
/// }
/// # Ok(())
/// # }
/// ```
pub struct WeatherService {
    limiter: RateLimiter,
    index: LocationCodeIndex,
    fetcher: WeatherFetcher,
}

#[bon]
impl WeatherService {
    /// Creates a service and loads the province and city tables.
    ///
    /// # Arguments
    ///
    /// * `.config(ServiceConfig)`: Optional. Defaults to [`ServiceConfig::default`].
    /// * `.transport(Arc<dyn Transport>)`: Optional. Defaults to an [`HttpTransport`]
    ///   using the configured request timeout.
    /// * `.clock(Arc<dyn Clock>)`: Optional. Time source for the rate limiter.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Transport`] if the HTTP client cannot be built and
    /// [`ServiceError::Lookup`] if any province or city table cannot be loaded.
    #[builder]
    pub fn new(
        #[builder(default)] config: ServiceConfig,
        transport: Option<Arc<dyn Transport>>,
        clock: Option<Arc<dyn Clock>>,
    ) -> Result<Self, ServiceError> {
        let transport: Arc<dyn Transport> = match transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(config.request_timeout())?),
        };
        let clock: Arc<dyn Clock> = match clock {
            Some(clock) => clock,
            None => Arc::new(MonotonicClock::new()),
        };

        let client = ProviderClient::new(transport, config.base_url.clone());
        let index = LocationCodeIndex::initialize(client.clone())?;
        info!(
            "Weather service ready: {} provinces, {} permits per {}s window",
            index.province_count(),
            u64::from(config.qps) * u64::from(config.window_seconds),
            config.window_seconds
        );

        Ok(Self {
            limiter: RateLimiter::with_clock(config.qps, config.window_seconds, clock),
            index,
            fetcher: WeatherFetcher::with_max_attempts(client, config.max_attempts),
        })
    }

    /// Current temperature in whole degrees Celsius, or `None`.
    ///
    /// `None` covers being rate limited, an unknown place name and upstream failure
    /// alike. Use [`WeatherService::temperature`] to see which one happened.
    pub fn get_temperature(&self, province: &str, city: &str, county: &str) -> Option<i32> {
        match self.temperature(province, city, county) {
            Ok(temperature) => Some(temperature),
            Err(ServiceError::RateLimited) => {
                debug!("Rate limited, no lookup for {}/{}/{}", province, city, county);
                None
            }
            Err(e) => {
                debug!("No temperature for {}/{}/{}: {}", province, city, county, e);
                None
            }
        }
    }

    /// Takes a permit, then resolves the place and fetches its temperature.
    ///
    /// # Arguments
    ///
    /// * `province` - Province name, e.g. `"江苏"`.
    /// * `city` - City name within that province, e.g. `"苏州"`.
    /// * `county` - County name within that city, e.g. `"昆山"`.
    ///
    /// # Returns
    ///
    /// The temperature truncated toward zero to whole degrees Celsius.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::RateLimited`] without contacting the provider when
    /// the current window has no permit left, [`ServiceError::Lookup`] when a name
    /// is unknown or its county table cannot be fetched, and
    /// [`ServiceError::WeatherData`] when every weather attempt failed.
    pub fn temperature(
        &self,
        province: &str,
        city: &str,
        county: &str,
    ) -> Result<i32, ServiceError> {
        if !self.limiter.acquire() {
            return Err(ServiceError::RateLimited);
        }

        let codes = self.index.resolve(province, city, county)?;
        Ok(self.fetcher.fetch_codes(&codes)?)
    }
}
