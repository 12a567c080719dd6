use serde_json::Value;
use std::sync::Arc;

use crate::{
    error::{Result, WeatherError},
    model::RawReading,
    provider::{LookupSource, WEATHER_VARS},
};

/// Issues the batched current-weather request.
#[derive(Debug, Clone)]
pub struct WeatherFetcher {
    source: Arc<dyn LookupSource>,
}

impl WeatherFetcher {
    pub fn new(source: Arc<dyn LookupSource>) -> Self {
        Self { source }
    }

    /// One request for all coordinates; one reading per coordinate, in input order.
    pub async fn fetch_weather(
        &self,
        latitudes: &[f64],
        longitudes: &[f64],
    ) -> Result<Vec<RawReading>> {
        if latitudes.is_empty() || longitudes.is_empty() || latitudes.len() != longitudes.len() {
            return Err(WeatherError::InvalidInput(
                "Must provide matching lists of latitude and longitude coordinates".to_string(),
            ));
        }
        if latitudes.iter().chain(longitudes).any(|v| !v.is_finite()) {
            return Err(WeatherError::InvalidInput(
                "Coordinates must be numeric values".to_string(),
            ));
        }

        let body = self.source.current_weather(latitudes, longitudes, WEATHER_VARS).await?;

        let readings: Vec<RawReading> = match body {
            Value::Array(items) => items.into_iter().map(RawReading).collect(),
            single @ Value::Object(_) => vec![RawReading(single)],
            _ => return Err(WeatherError::invalid_format("weather API response")),
        };

        tracing::debug!(
            coordinates = latitudes.len(),
            readings = readings.len(),
            "fetched weather"
        );
        Ok(readings)
    }
}
