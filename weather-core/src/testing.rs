//! In-memory [`LookupSource`] for unit tests.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use crate::{
    error::{Result, WeatherError},
    provider::LookupSource,
};

#[derive(Debug, Default)]
pub(crate) struct FakeSource {
    geocode: HashMap<String, Value>,
    failing: HashSet<String>,
    forecast: Option<Value>,
    calls: Mutex<Vec<String>>,
}

impl FakeSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Answer `name` with a single well-formed candidate.
    pub(crate) fn with_city(self, name: &str, latitude: f64, longitude: f64) -> Self {
        let body = json!({
            "results": [{ "name": name, "latitude": latitude, "longitude": longitude }]
        });
        self.with_geocode(name, body)
    }

    pub(crate) fn with_geocode(mut self, name: &str, body: Value) -> Self {
        self.geocode.insert(name.to_string(), body);
        self
    }

    /// Make lookups for `name` fail at the transport level.
    pub(crate) fn with_failure(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    pub(crate) fn with_forecast(mut self, body: Value) -> Self {
        self.forecast = Some(body);
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

#[async_trait]
impl LookupSource for FakeSource {
    async fn search_city(&self, name: &str) -> Result<Value> {
        self.record(format!("search:{name}"));

        if self.failing.contains(name) {
            return Err(WeatherError::connection("geocoding API", "API unavailable"));
        }

        Ok(self.geocode.get(name).cloned().unwrap_or_else(|| json!({ "generationtime_ms": 0.5 })))
    }

    async fn current_weather(
        &self,
        latitudes: &[f64],
        longitudes: &[f64],
        variables: &[&str],
    ) -> Result<Value> {
        self.record(format!("forecast:{latitudes:?}|{longitudes:?}|{}", variables.join(",")));

        self.forecast
            .clone()
            .ok_or_else(|| WeatherError::connection("weather API", "no forecast configured"))
    }
}

/// One forecast record shaped like the Open-Meteo `current` response.
pub(crate) fn forecast_record(
    timezone: &str,
    time: &str,
    temperature: f64,
    humidity: f64,
    wind_speed: f64,
) -> Value {
    json!({
        "latitude": 0.0,
        "longitude": 0.0,
        "timezone": timezone,
        "current": {
            "time": time,
            "interval": 900,
            "temperature_2m": temperature,
            "relative_humidity_2m": humidity,
            "wind_speed_10m": wind_speed,
        }
    })
}

pub(crate) fn assert_close(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < 1e-9, "expected {expected}, got {actual}");
}
