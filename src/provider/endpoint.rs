//! URL templates for the four remote operations exposed by weather.com.cn.

pub const DEFAULT_BASE_URL: &str = "http://www.weather.com.cn/data";

/// One of the remote resources the provider serves, parameterized by codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    Provinces,
    Cities {
        province: &'a str,
    },
    Counties {
        province: &'a str,
        city: &'a str,
    },
    CurrentWeather {
        province: &'a str,
        city: &'a str,
        county: &'a str,
    },
}

impl Endpoint<'_> {
    /// Builds the absolute URL of this resource.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Provider root such as [`DEFAULT_BASE_URL`]. A trailing `/` is ignored.
    ///
    /// # Returns
    ///
    /// The URL with the codes concatenated into the path, e.g.
    /// `{base_url}/sk/101190404.html` for Kunshan's current weather.
    pub fn url(&self, base_url: &str) -> String {
        let base_url = base_url.trim_end_matches('/');
        match self {
            Endpoint::Provinces => format!("{base_url}/city3jdata/china.html"),
            Endpoint::Cities { province } => {
                format!("{base_url}/city3jdata/provshi/{province}.html")
            }
            Endpoint::Counties { province, city } => {
                format!("{base_url}/city3jdata/station/{province}{city}.html")
            }
            Endpoint::CurrentWeather {
                province,
                city,
                county,
            } => format!("{base_url}/sk/{province}{city}{county}.html"),
        }
    }
}
