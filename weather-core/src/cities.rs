//! Coordinate resolution: city names to [`City`] records.
//!
//! Two sources are supported:
//! - the built-in table compiled from `data/cities.json`
//! - live geocoding through a [`LookupSource`], one lookup per name

use serde_json::Value;
use std::sync::Arc;

use crate::{
    error::{Result, WeatherError},
    model::City,
    provider::LookupSource,
};

const BUILTIN_CITIES: &str = include_str!("../data/cities.json");
const BUILTIN_CONTEXT: &str = "CITIES constant";

/// Raw `{City, Latitude, Longitude}` entries of the built-in table.
pub fn builtin_entries() -> Result<Vec<Value>> {
    serde_json::from_str(BUILTIN_CITIES)
        .map_err(|e| WeatherError::invalid_format(format!("{BUILTIN_CONTEXT} ({e})")))
}

/// Names of the built-in cities, in table order.
pub fn builtin_city_names() -> Result<Vec<String>> {
    builtin_entries()?
        .iter()
        .map(|entry| {
            entry
                .get("City")
                .map(value_to_string)
                .ok_or_else(|| WeatherError::missing_field(BUILTIN_CONTEXT, "City"))
        })
        .collect()
}

/// Convert `{City, Latitude, Longitude}` entries, coercing numeric coordinates to strings.
pub fn cities_from_entries(entries: &[Value]) -> Result<Vec<City>> {
    entries
        .iter()
        .map(|entry| {
            let field = |key: &str| {
                entry
                    .get(key)
                    .map(value_to_string)
                    .ok_or_else(|| WeatherError::missing_field(BUILTIN_CONTEXT, key))
            };
            Ok(City {
                name: field("City")?,
                latitude: field("Latitude")?,
                longitude: field("Longitude")?,
            })
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct CoordinateResolver {
    source: Arc<dyn LookupSource>,
}

impl CoordinateResolver {
    pub fn new(source: Arc<dyn LookupSource>) -> Self {
        Self { source }
    }

    /// Cities from the built-in table, no network access.
    pub fn resolve_from_builtins(&self) -> Result<Vec<City>> {
        cities_from_entries(&builtin_entries()?)
    }

    /// Geocode each name in turn, keeping the first candidate.
    ///
    /// Names without a match are skipped, so the result may be shorter than
    /// `names`. The first failing lookup aborts the whole batch. An empty
    /// `names` geocodes the built-in city names live.
    pub async fn resolve_from_source(&self, names: &[String]) -> Result<Vec<City>> {
        let names = if names.is_empty() {
            builtin_city_names()?
        } else {
            names.to_vec()
        };

        let mut cities = Vec::with_capacity(names.len());
        for name in &names {
            match self.lookup(name).await? {
                Some(city) => cities.push(city),
                None => tracing::warn!(city = %name, "no geocoding match, skipping"),
            }
        }

        tracing::info!(requested = names.len(), resolved = cities.len(), "resolved cities");
        Ok(cities)
    }

    async fn lookup(&self, name: &str) -> Result<Option<City>> {
        let body = self.source.search_city(name).await.map_err(|e| match e {
            WeatherError::ConnectionFailure { .. } => {
                WeatherError::connection(format!("API for city {name}"), e)
            }
            WeatherError::InvalidResponseFormat { context } => {
                WeatherError::invalid_format(format!("city: {name} ({context})"))
            }
            other => other,
        })?;

        let Some(record) = body.as_object() else {
            return Err(WeatherError::invalid_format(format!("city: {name}")));
        };

        let candidate = match record.get("results") {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Array(results)) => match results.first() {
                Some(first) => first,
                None => return Ok(None),
            },
            Some(_) => return Err(WeatherError::invalid_format(format!("city: {name}"))),
        };

        let field = |key: &str| candidate.get(key).map(value_to_string);
        match (field("name"), field("latitude"), field("longitude")) {
            (Some(name), Some(latitude), Some(longitude)) => Ok(Some(City {
                name,
                latitude,
                longitude,
            })),
            _ => Err(WeatherError::MissingFields {
                city: name.to_string(),
            }),
        }
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
