use async_trait::async_trait;
use serde_json::Value;
use std::{fmt::Debug, sync::Arc};

use crate::{Config, error::Result};

pub mod openmeteo;

pub use openmeteo::OpenMeteoSource;

/// Metrics requested for every forecast call.
pub const WEATHER_VARS: &[&str] = &["temperature_2m", "relative_humidity_2m", "wind_speed_10m"];

/// Remote collaborator answering geocoding and current-weather lookups.
///
/// Implementations return the decoded JSON body untouched; shape validation
/// is left to the resolver and the table builder.
#[async_trait]
pub trait LookupSource: Send + Sync + Debug {
    /// Look up candidates for a city name.
    async fn search_city(&self, name: &str) -> Result<Value>;

    /// Fetch current conditions for parallel coordinate lists in one request.
    async fn current_weather(
        &self,
        latitudes: &[f64],
        longitudes: &[f64],
        variables: &[&str],
    ) -> Result<Value>;
}

/// Construct the Open-Meteo source configured in `config`.
pub fn source_from_config(config: &Config) -> Arc<dyn LookupSource> {
    Arc::new(OpenMeteoSource::new(
        config.endpoints.geocoding_url.clone(),
        config.endpoints.forecast_url.clone(),
    ))
}
