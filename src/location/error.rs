use crate::provider::error::FetchError;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Level of the province / city / county hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Province,
    City,
    County,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Province => "province",
            Level::City => "city",
            Level::County => "county",
        })
    }
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("{level} not exist: {name}")]
    NotFound { level: Level, name: String },

    // The cause is shared by every caller that waited on the same population.
    #[error("Cannot get county mapping data for province '{province_code}', city '{city_code}'")]
    PopulationFailed {
        province_code: String,
        city_code: String,
        #[source]
        cause: Arc<FetchError>,
    },

    #[error("Cannot get {what} mapping data")]
    Initialization {
        what: String,
        #[source]
        source: FetchError,
    },
}

impl LookupError {
    pub(crate) fn not_found(level: Level, name: &str) -> Self {
        Self::NotFound {
            level,
            name: name.to_string(),
        }
    }
}
