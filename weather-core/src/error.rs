use std::path::PathBuf;

use thiserror::Error;

/// Boxed cause carried by [`WeatherError::ConnectionFailure`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Every failure the weather pipeline can surface.
///
/// Nothing in the pipeline retries or swallows these: the first error aborts
/// the enclosing operation and is returned to the caller as-is.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// The lookup could not be completed (transport error or non-success status).
    #[error("Failed to connect to {target}: {source}")]
    ConnectionFailure {
        target: String,
        #[source]
        source: BoxError,
    },

    /// A payload had an unexpected shape.
    #[error("Invalid API response format for {context}")]
    InvalidResponseFormat { context: String },

    /// A single required key is absent from a record.
    #[error("Missing required field in {context}: '{field}'")]
    MissingField { context: String, field: String },

    /// A geocoding candidate lacks one or more of `name`/`latitude`/`longitude`.
    #[error("Missing required fields in API response for city: {city}")]
    MissingFields { city: String },

    /// A required column is absent from a table header.
    #[error("Missing required metric column: '{column}'")]
    MissingColumn { column: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Cities list cannot be empty")]
    EmptyInput,

    #[error("Invalid coordinate value for city {city}: '{value}'")]
    InvalidCoordinate { city: String, value: String },

    #[error("City '{0}' not found")]
    NotFound(String),

    #[error("Weather data file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Error reading CSV: {} is empty", .0.display())]
    EmptyFile(PathBuf),

    #[error("No weather data available")]
    NoData,

    #[error("Error rendering chart: {0}")]
    Render(String),

    #[error("Error processing CSV file: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WeatherError {
    pub(crate) fn connection(target: impl Into<String>, source: impl Into<BoxError>) -> Self {
        WeatherError::ConnectionFailure {
            target: target.into(),
            source: source.into(),
        }
    }

    pub(crate) fn invalid_format(context: impl Into<String>) -> Self {
        WeatherError::InvalidResponseFormat {
            context: context.into(),
        }
    }

    pub(crate) fn missing_field(context: impl Into<String>, field: impl Into<String>) -> Self {
        WeatherError::MissingField {
            context: context.into(),
            field: field.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WeatherError>;
