use std::sync::Arc;

use crate::{
    cities::CoordinateResolver,
    error::{Result, WeatherError},
    model::{SortDirective, WeatherTable},
    provider::LookupSource,
    service::WeatherService,
};

/// Read access used by the HTTP routes and the CLI `show` command.
#[derive(Debug, Clone)]
pub struct WeatherQuery {
    resolver: CoordinateResolver,
    service: WeatherService,
}

impl WeatherQuery {
    pub fn new(source: Arc<dyn LookupSource>) -> Self {
        Self {
            resolver: CoordinateResolver::new(source.clone()),
            service: WeatherService::new(source),
        }
    }

    pub fn resolver(&self) -> &CoordinateResolver {
        &self.resolver
    }

    pub fn service(&self) -> &WeatherService {
        &self.service
    }

    /// Weather for one city, geocoded live. No match is `NotFound`.
    pub async fn city_weather(&self, name: &str) -> Result<WeatherTable> {
        let cities = self.resolver.resolve_from_source(&[name.to_string()]).await?;
        if cities.is_empty() {
            return Err(WeatherError::NotFound(name.to_string()));
        }

        self.service.get_weather_for_cities(&cities).await
    }

    /// Weather for every built-in city, optionally sorted.
    ///
    /// The sort directive is validated before anything is fetched. A blank
    /// directive (`?sort_by=`) means no sort.
    pub async fn all_weather(&self, sort_by: Option<&str>) -> Result<WeatherTable> {
        let directive = sort_by
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse::<SortDirective>)
            .transpose()?;

        let cities = self.resolver.resolve_from_builtins()?;
        let table = self.service.get_weather_for_cities(&cities).await?;

        Ok(match directive {
            Some(directive) => table.sorted(directive),
            None => table,
        })
    }

    /// Dispatch on the route segment: `all` or a single city name.
    pub async fn weather(&self, city: &str, sort_by: Option<&str>) -> Result<WeatherTable> {
        if city == "all" {
            self.all_weather(sort_by).await
        } else {
            self.city_weather(city).await
        }
    }
}
