use std::sync::Arc;

use crate::{
    error::{Result, WeatherError},
    model::{City, WeatherTable},
    provider::LookupSource,
    table::{build_table, derive_imperial_units},
    weather::WeatherFetcher,
};

/// End-to-end pipeline: cities in, table with imperial units out.
#[derive(Debug, Clone)]
pub struct WeatherService {
    fetcher: WeatherFetcher,
}

impl WeatherService {
    pub fn new(source: Arc<dyn LookupSource>) -> Self {
        Self {
            fetcher: WeatherFetcher::new(source),
        }
    }

    /// Fails with `EmptyInput` or `InvalidCoordinate` before any network access.
    pub async fn get_weather_for_cities(&self, cities: &[City]) -> Result<WeatherTable> {
        if cities.is_empty() {
            return Err(WeatherError::EmptyInput);
        }

        let (latitudes, longitudes): (Vec<f64>, Vec<f64>) =
            cities.iter().map(City::coordinates).collect::<Result<Vec<_>>>()?.into_iter().unzip();

        let readings = self.fetcher.fetch_weather(&latitudes, &longitudes).await?;
        let table = build_table(cities, &readings)?;

        Ok(derive_imperial_units(table))
    }
}
