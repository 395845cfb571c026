use crate::location::error::{Level, LookupError};
use crate::location::flight_map::FlightMap;
use crate::provider::client::{CodeTable, ProviderClient};
use crate::provider::endpoint::Endpoint;
use crate::provider::error::FetchError;
use log::{debug, info};
use std::collections::HashMap;

/// Provider codes for one fully resolved county.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocationCodes {
    pub province: String,
    pub city: String,
    pub county: String,
}

/// Name -> code lookup for the province / city / county hierarchy.
///
/// Province and city tables are loaded by [`LocationCodeIndex::initialize`] and never
/// change afterwards. County tables are fetched on first use per (province, city)
/// code pair and kept for the lifetime of the index.
pub struct LocationCodeIndex {
    client: ProviderClient,
    provinces: CodeTable,
    cities_by_province: HashMap<String, CodeTable>,
    counties: FlightMap<(String, String), CodeTable, FetchError>,
}

impl LocationCodeIndex {
    /// Loads every province and the city table of every province.
    ///
    /// Any failing request fails the whole initialization; no index is returned.
    pub fn initialize(client: ProviderClient) -> Result<Self, LookupError> {
        let provinces =
            client
                .code_table(Endpoint::Provinces)
                .map_err(|e| LookupError::Initialization {
                    what: "province".to_string(),
                    source: e,
                })?;
        info!("Loaded {} provinces", provinces.len());

        let mut cities_by_province = HashMap::with_capacity(provinces.len());
        for (province_name, province_code) in &provinces {
            let cities = client
                .code_table(Endpoint::Cities {
                    province: province_code,
                })
                .map_err(|e| LookupError::Initialization {
                    what: format!("city ({province_name})"),
                    source: e,
                })?;
            debug!(
                "Loaded {} cities for {} ({})",
                cities.len(),
                province_name,
                province_code
            );
            cities_by_province.insert(province_code.clone(), cities);
        }

        Ok(Self {
            client,
            provinces,
            cities_by_province,
            counties: FlightMap::new(),
        })
    }

    /// Looks up province and city codes in the tables loaded at startup.
    pub fn resolve_province_city(
        &self,
        province: &str,
        city: &str,
    ) -> Result<(&str, &str), LookupError> {
        let (province_code, cities) = self
            .provinces
            .get(province)
            .and_then(|code| Some((code, self.cities_by_province.get(code)?)))
            .ok_or_else(|| LookupError::not_found(Level::Province, province))?;

        let city_code = cities
            .get(city)
            .ok_or_else(|| LookupError::not_found(Level::City, city))?;

        Ok((province_code.as_str(), city_code.as_str()))
    }

    /// Looks up a county code, fetching the county table for the pair on first use.
    ///
    /// Callers racing on an unfetched pair share a single request. If that request
    /// fails every one of them gets [`LookupError::PopulationFailed`] and the pair is
    /// fetched again on the next call.
    pub fn resolve_county(
        &self,
        province_code: &str,
        city_code: &str,
        county: &str,
    ) -> Result<String, LookupError> {
        let key = (province_code.to_string(), city_code.to_string());
        let counties = self
            .counties
            .get_or_populate(&key, || {
                info!(
                    "County table for province {} city {} not cached, fetching",
                    province_code, city_code
                );
                self.client.code_table(Endpoint::Counties {
                    province: province_code,
                    city: city_code,
                })
            })
            .map_err(|cause| LookupError::PopulationFailed {
                province_code: province_code.to_string(),
                city_code: city_code.to_string(),
                cause,
            })?;

        counties
            .get(county)
            .cloned()
            .ok_or_else(|| LookupError::not_found(Level::County, county))
    }

    /// Resolves a full place name to its provider codes.
    ///
    /// # Arguments
    ///
    /// * `province` - Province name, e.g. `"江苏"`.
    /// * `city` - City name within that province, e.g. `"苏州"`.
    /// * `county` - County name within that city, e.g. `"昆山"`.
    ///
    /// # Returns
    ///
    /// The province, city and county codes. The county table for the city is
    /// fetched on the first call for it and cached afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::NotFound`] naming the first level whose name is
    /// unknown, or [`LookupError::PopulationFailed`] if the county table could not
    /// be fetched.
    pub fn resolve(
        &self,
        province: &str,
        city: &str,
        county: &str,
    ) -> Result<LocationCodes, LookupError> {
        let (province_code, city_code) = self.resolve_province_city(province, city)?;
        let county_code = self.resolve_county(province_code, city_code, county)?;
        Ok(LocationCodes {
            province: province_code.to_string(),
            city: city_code.to_string(),
            county: county_code,
        })
    }

    pub fn province_count(&self) -> usize {
        self.provinces.len()
    }

    /// Number of (province, city) pairs whose county table has been fetched.
    pub fn cached_county_tables(&self) -> usize {
        self.counties.ready_len()
    }
}
