use std::{fmt, str::FromStr};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, WeatherError};

/// A named place with coordinates kept exactly as the geocoding source returned them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub latitude: String,
    pub longitude: String,
}

impl City {
    pub fn new(
        name: impl Into<String>,
        latitude: impl Into<String>,
        longitude: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            latitude: latitude.into(),
            longitude: longitude.into(),
        }
    }

    /// Parse `(latitude, longitude)`; both must be finite decimals.
    pub fn coordinates(&self) -> Result<(f64, f64)> {
        Ok((self.parse_coordinate(&self.latitude)?, self.parse_coordinate(&self.longitude)?))
    }

    fn parse_coordinate(&self, value: &str) -> Result<f64> {
        value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| WeatherError::InvalidCoordinate {
                city: self.name.clone(),
                value: value.to_string(),
            })
    }
}

/// One per-coordinate record as received from the forecast endpoint, unvalidated.
#[derive(Debug, Clone, PartialEq)]
pub struct RawReading(pub Value);

impl RawReading {
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for RawReading {
    fn from(value: Value) -> Self {
        RawReading(value)
    }
}

/// Derived imperial columns; always set together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImperialUnits {
    pub temperature_f: f64,
    pub wind_speed_mph: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub city: City,
    pub timezone: String,
    pub time: NaiveDateTime,
    pub temperature_c: f64,
    pub humidity: f64,
    pub wind_speed_kph: f64,
    #[serde(flatten)]
    pub imperial: Option<ImperialUnits>,
}

impl WeatherReading {
    pub fn temperature_f(&self) -> Option<f64> {
        self.imperial.map(|u| u.temperature_f)
    }

    pub fn wind_speed_mph(&self) -> Option<f64> {
        self.imperial.map(|u| u.wind_speed_mph)
    }
}

/// Ordered rows, one per city a reading was obtained for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeatherTable {
    rows: Vec<WeatherReading>,
}

impl WeatherTable {
    pub fn new(rows: Vec<WeatherReading>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[WeatherReading] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WeatherReading> {
        self.rows.iter()
    }

    pub fn into_rows(self) -> Vec<WeatherReading> {
        self.rows
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [WeatherReading] {
        &mut self.rows
    }
}

impl<'a> IntoIterator for &'a WeatherTable {
    type Item = &'a WeatherReading;
    type IntoIter = std::slice::Iter<'a, WeatherReading>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl FromIterator<WeatherReading> for WeatherTable {
    fn from_iter<I: IntoIterator<Item = WeatherReading>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Temperature,
    WindSpeed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortDirective {
    pub field: SortField,
    pub ascending: bool,
}

impl SortDirective {
    pub fn as_str(&self) -> &'static str {
        match (self.field, self.ascending) {
            (SortField::Temperature, true) => "temperature",
            (SortField::Temperature, false) => "-temperature",
            (SortField::WindSpeed, true) => "wind_speed",
            (SortField::WindSpeed, false) => "-wind_speed",
        }
    }

    pub const fn all() -> &'static [SortDirective] {
        &[
            SortDirective {
                field: SortField::Temperature,
                ascending: true,
            },
            SortDirective {
                field: SortField::Temperature,
                ascending: false,
            },
            SortDirective {
                field: SortField::WindSpeed,
                ascending: true,
            },
            SortDirective {
                field: SortField::WindSpeed,
                ascending: false,
            },
        ]
    }
}

impl fmt::Display for SortDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirective {
    type Err = WeatherError;

    fn from_str(value: &str) -> Result<Self> {
        SortDirective::all().iter().copied().find(|d| d.as_str() == value).ok_or_else(|| {
            let valid: Vec<&str> = SortDirective::all().iter().map(|d| d.as_str()).collect();
            WeatherError::InvalidInput(format!(
                "Invalid sort parameter '{value}'. Must be one of: {}",
                valid.join(", ")
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_parse_decimal_strings() {
        let city = City::new("London", "51.5074", "-0.1278");
        assert_eq!(city.coordinates().expect("valid coordinates"), (51.5074, -0.1278));
    }

    #[test]
    fn coordinates_reject_non_numeric_and_non_finite() {
        let err = City::new("Atlantis", "north", "0").coordinates().unwrap_err();
        assert!(
            matches!(err, WeatherError::InvalidCoordinate { ref value, .. } if value == "north")
        );

        let err = City::new("Nowhere", "0", "inf").coordinates().unwrap_err();
        assert!(matches!(err, WeatherError::InvalidCoordinate { .. }));
    }

    #[test]
    fn sort_directive_as_str_roundtrip() {
        for directive in SortDirective::all() {
            let parsed: SortDirective =
                directive.as_str().parse().expect("roundtrip should succeed");
            assert_eq!(*directive, parsed);
        }
    }

    #[test]
    fn unknown_sort_directive_lists_valid_values() {
        let err = "humidity".parse::<SortDirective>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Invalid sort parameter"));
        assert!(msg.contains("temperature, -temperature, wind_speed, -wind_speed"));
    }

    #[test]
    fn reading_serializes_imperial_units_flat() {
        let reading = WeatherReading {
            city: City::new("London", "51.5074", "-0.1278"),
            timezone: "Europe/London".into(),
            time: NaiveDateTime::parse_from_str("2024-01-01T12:00", "%Y-%m-%dT%H:%M")
                .expect("valid time"),
            temperature_c: 20.5,
            humidity: 65.0,
            wind_speed_kph: 10.0,
            imperial: Some(ImperialUnits {
                temperature_f: 68.9,
                wind_speed_mph: 6.21371,
            }),
        };

        let json = serde_json::to_value(&reading).expect("serializable");
        assert_eq!(json["temperature_f"], 68.9);
        assert_eq!(json["wind_speed_mph"], 6.21371);
        assert_eq!(json["city"]["name"], "London");
    }
}
