use crate::provider::error::FetchError;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct CurrentWeatherResponse {
    weatherinfo: Option<CurrentWeather>,
}

// The provider sends more fields (city, WD, WS, SD, ...); only `temp` is read.
#[derive(Debug, Deserialize)]
struct CurrentWeather {
    temp: Option<Value>,
}

/// Extracts the current temperature from a `sk` response, truncated toward zero.
///
/// The provider encodes `temp` as a decimal string; plain JSON numbers are accepted too.
pub fn extract_temperature(url: &str, body: &str) -> Result<i32, FetchError> {
    let response: CurrentWeatherResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Parse {
            url: url.to_string(),
            source: e,
        })?;

    let temp = response
        .weatherinfo
        .ok_or_else(|| FetchError::MissingField {
            url: url.to_string(),
            field: "weatherinfo",
        })?
        .temp
        .ok_or_else(|| FetchError::MissingField {
            url: url.to_string(),
            field: "temp",
        })?;

    let invalid = || FetchError::InvalidValue {
        url: url.to_string(),
        field: "temp",
        value: temp.to_string(),
    };

    let degrees = match &temp {
        Value::String(text) => text.trim().parse::<f64>().map_err(|_| invalid())?,
        Value::Number(number) => number.as_f64().ok_or_else(invalid)?,
        _ => return Err(invalid()),
    };

    let truncated = degrees.trunc();
    if !truncated.is_finite() || truncated < f64::from(i32::MIN) || truncated > f64::from(i32::MAX)
    {
        return Err(invalid());
    }
    Ok(truncated as i32)
}
