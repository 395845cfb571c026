use crate::location::code_index::LocationCodes;
use crate::provider::client::ProviderClient;
use crate::provider::endpoint::Endpoint;
use crate::provider::error::FetchError;
use crate::weather_data::error::WeatherDataError;
use crate::weather_data::extractor::extract_temperature;
use log::warn;

pub const MAX_RETRY_TIME: u32 = 3;

/// Fetches the current temperature for resolved location codes.
///
/// Failed attempts are retried immediately, with no backoff, up to `max_attempts`.
#[derive(Debug, Clone)]
pub struct WeatherFetcher {
    client: ProviderClient,
    max_attempts: u32,
}

impl WeatherFetcher {
    /// Creates a fetcher making up to [`MAX_RETRY_TIME`] attempts per lookup.
    pub fn new(client: ProviderClient) -> Self {
        Self::with_max_attempts(client, MAX_RETRY_TIME)
    }

    /// `max_attempts` below 1 is treated as 1.
    pub fn with_max_attempts(client: ProviderClient, max_attempts: u32) -> Self {
        Self {
            client,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Fetches the current temperature of one county.
    ///
    /// # Arguments
    ///
    /// * `province_code` - Province code, e.g. `"10119"`.
    /// * `city_code` - City code within the province, e.g. `"04"`.
    /// * `county_code` - County code within the city, e.g. `"04"`.
    ///
    /// # Returns
    ///
    /// The reported temperature truncated toward zero to whole degrees Celsius.
    ///
    /// # Errors
    ///
    /// Returns [`WeatherDataError::FetchExhausted`] once every attempt has failed,
    /// carrying the cause of the last one. A request error, a non-success status,
    /// an unparseable body and an unusable `temp` value all count as a failed attempt.
    pub fn fetch(
        &self,
        province_code: &str,
        city_code: &str,
        county_code: &str,
    ) -> Result<i32, WeatherDataError> {
        let endpoint = Endpoint::CurrentWeather {
            province: province_code,
            city: city_code,
            county: county_code,
        };

        let mut attempt = 1;
        loop {
            match self.fetch_once(endpoint) {
                Ok(temperature) => return Ok(temperature),
                Err(e) => {
                    warn!(
                        "Get weather for {}{}{} failed on attempt {}/{}: {}",
                        province_code, city_code, county_code, attempt, self.max_attempts, e
                    );
                    if attempt >= self.max_attempts {
                        return Err(WeatherDataError::FetchExhausted {
                            attempts: attempt,
                            source: e,
                        });
                    }
                    attempt += 1;
                }
            }
        }
    }

    /// [`fetch`](Self::fetch) for codes produced by the location index.
    pub fn fetch_codes(&self, codes: &LocationCodes) -> Result<i32, WeatherDataError> {
        self.fetch(&codes.province, &codes.city, &codes.county)
    }

    fn fetch_once(&self, endpoint: Endpoint<'_>) -> Result<i32, FetchError> {
        let (url, body) = self.client.fetch(endpoint)?;
        extract_temperature(&url, &body)
    }
}
