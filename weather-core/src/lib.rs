//! Core library for the weather report tools.
//!
//! This crate defines:
//! - Configuration handling
//! - The lookup-source abstraction over Open-Meteo geocoding and forecasts
//! - The pipeline: coordinate resolution, batched fetch, table building
//! - Read access, CSV snapshots and chart rendering
//!
//! It is used by `weather-cli` and `weather-api`.

pub mod chart;
pub mod cities;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod provider;
pub mod query;
pub mod service;
pub mod snapshot;
pub mod table;
pub mod weather;

#[cfg(test)]
pub(crate) mod testing;

pub use cities::CoordinateResolver;
pub use config::Config;
pub use error::{Result, WeatherError};
pub use model::{City, ImperialUnits, RawReading, SortDirective, WeatherReading, WeatherTable};
pub use provider::{LookupSource, OpenMeteoSource};
pub use query::WeatherQuery;
pub use service::WeatherService;
pub use weather::WeatherFetcher;
