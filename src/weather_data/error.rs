use crate::provider::error::FetchError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeatherDataError {
    // Carries the cause of the final attempt only.
    #[error("Get weather info failed after {attempts} attempts")]
    FetchExhausted {
        attempts: u32,
        #[source]
        source: FetchError,
    },
}
