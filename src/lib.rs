//! Current temperatures for Chinese provinces, cities and counties from weather.com.cn.
//!
//! Place names are resolved to provider codes through an index that loads province
//! and city tables up front and fetches county tables on demand. Every lookup made
//! through [`WeatherService::get_temperature`] or [`WeatherService::temperature`]
//! first takes a permit from a fixed-window [`RateLimiter`], so the provider never
//! sees more than the configured number of lookups per window.

mod config;
mod error;
mod limiter;
mod location;
mod provider;
mod weather_data;
mod weather_service;

pub use config::ServiceConfig;
pub use error::ServiceError;
pub use weather_service::WeatherService;

pub use limiter::clock::{Clock, MonotonicClock};
pub use limiter::rate_limiter::RateLimiter;

pub use location::code_index::{LocationCodeIndex, LocationCodes};
pub use location::error::{Level, LookupError};

pub use provider::client::{CodeTable, ProviderClient};
pub use provider::endpoint::{Endpoint, DEFAULT_BASE_URL};
pub use provider::error::{FetchError, TransportError};
pub use provider::transport::{HttpTransport, Transport};

pub use weather_data::error::WeatherDataError;
pub use weather_data::fetcher::{WeatherFetcher, MAX_RETRY_TIME};
