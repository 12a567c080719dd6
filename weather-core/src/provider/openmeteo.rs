use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::error::{Result, WeatherError};

use super::LookupSource;

pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

#[derive(Debug, Clone)]
pub struct OpenMeteoSource {
    geocoding_url: String,
    forecast_url: String,
    http: Client,
}

impl Default for OpenMeteoSource {
    fn default() -> Self {
        Self::new(DEFAULT_GEOCODING_URL.to_string(), DEFAULT_FORECAST_URL.to_string())
    }
}

impl OpenMeteoSource {
    pub fn new(geocoding_url: String, forecast_url: String) -> Self {
        Self {
            geocoding_url,
            forecast_url,
            http: Client::new(),
        }
    }

    async fn get_json(&self, api: &str, url: &str, query: &[(&str, String)]) -> Result<Value> {
        tracing::debug!(api, url, ?query, "sending request");

        let res = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| WeatherError::connection(api, e))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| WeatherError::connection(api, e))?;

        if !status.is_success() {
            return Err(WeatherError::connection(
                api,
                format!("request failed with status {}: {}", status, truncate_body(&body)),
            ));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::debug!(api, error = %e, body = %truncate_body(&body), "unparseable body");
            WeatherError::invalid_format(format!("{api}: invalid JSON ({e})"))
        })
    }
}

#[async_trait]
impl LookupSource for OpenMeteoSource {
    async fn search_city(&self, name: &str) -> Result<Value> {
        self.get_json(
            "geocoding API",
            &self.geocoding_url,
            &[("name", name.to_string()), ("count", "1".to_string())],
        )
        .await
    }

    async fn current_weather(
        &self,
        latitudes: &[f64],
        longitudes: &[f64],
        variables: &[&str],
    ) -> Result<Value> {
        self.get_json(
            "weather API",
            &self.forecast_url,
            &[
                ("latitude", join_numbers(latitudes)),
                ("longitude", join_numbers(longitudes)),
                ("current", variables.join(",")),
            ],
        )
        .await
    }
}

fn join_numbers(values: &[f64]) -> String {
    values.iter().map(f64::to_string).collect::<Vec<_>>().join(",")
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
