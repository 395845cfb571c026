use crate::location::error::LookupError;
use crate::provider::error::TransportError;
use crate::weather_data::error::WeatherDataError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    WeatherData(#[from] WeatherDataError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Rate limit reached, no permit left in the current window")]
    RateLimited,
}
