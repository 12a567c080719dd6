//! Table building: pairing cities with raw readings, unit derivation and ordering.

use chrono::NaiveDateTime;
use serde_json::Value;
use std::cmp::Ordering;

use crate::{
    error::{Result, WeatherError},
    model::{
        City, ImperialUnits, RawReading, SortDirective, SortField, WeatherReading, WeatherTable,
    },
};

const KPH_TO_MPH: f64 = 0.621371;
const READING_CONTEXT: &str = "weather data";

/// Timestamp layouts Open-Meteo (and our own snapshots) produce.
const TIME_FORMATS: &[&str] =
    &["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S%.f"];

/// Pair `cities[i]` with `readings[i]`. Any malformed reading fails the whole build.
pub fn build_table(cities: &[City], readings: &[RawReading]) -> Result<WeatherTable> {
    if cities.len() != readings.len() {
        return Err(WeatherError::invalid_format(format!(
            "weather API response: expected {} readings, got {}",
            cities.len(),
            readings.len()
        )));
    }

    let table: WeatherTable = cities
        .iter()
        .zip(readings)
        .map(|(city, raw)| build_row(city, raw.as_value()))
        .collect::<Result<_>>()?;

    tracing::info!(rows = table.len(), "built weather table");
    Ok(table)
}

fn build_row(city: &City, raw: &Value) -> Result<WeatherReading> {
    let timezone = required(raw, "timezone")?
        .as_str()
        .ok_or_else(|| wrong_type(city, "timezone"))?
        .to_string();
    let current = required(raw, "current")?;

    let time = required(current, "time")?.as_str().ok_or_else(|| wrong_type(city, "time"))?;
    let time = parse_time(time).ok_or_else(|| {
        WeatherError::invalid_format(format!(
            "{READING_CONTEXT} for {}: bad time '{time}'",
            city.name
        ))
    })?;

    let number = |key: &str| -> Result<f64> {
        required(current, key)?.as_f64().ok_or_else(|| wrong_type(city, key))
    };

    Ok(WeatherReading {
        city: city.clone(),
        timezone,
        time,
        temperature_c: number("temperature_2m")?,
        humidity: number("relative_humidity_2m")?,
        wind_speed_kph: number("wind_speed_10m")?,
        imperial: None,
    })
}

fn required<'a>(value: &'a Value, key: &str) -> Result<&'a Value> {
    value.get(key).ok_or_else(|| WeatherError::missing_field(READING_CONTEXT, key))
}

fn wrong_type(city: &City, key: &str) -> WeatherError {
    WeatherError::invalid_format(format!(
        "{READING_CONTEXT} for {}: unexpected type for '{key}'",
        city.name
    ))
}

/// Parse an ISO-8601 local timestamp, with or without seconds.
pub fn parse_time(value: &str) -> Option<NaiveDateTime> {
    TIME_FORMATS.iter().find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn kph_to_mph(kph: f64) -> f64 {
    kph * KPH_TO_MPH
}

/// Fill the Fahrenheit and mph columns on every row.
pub fn derive_imperial_units(mut table: WeatherTable) -> WeatherTable {
    for row in table.rows_mut() {
        row.imperial = Some(ImperialUnits {
            temperature_f: celsius_to_fahrenheit(row.temperature_c),
            wind_speed_mph: kph_to_mph(row.wind_speed_kph),
        });
    }
    table
}

impl WeatherTable {
    /// Stable sort by the directive's column.
    pub fn sorted(self, directive: SortDirective) -> WeatherTable {
        let mut rows = self.into_rows();
        rows.sort_by(|a, b| {
            let ord = compare(a, b, directive.field);
            if directive.ascending {
                ord
            } else {
                ord.reverse()
            }
        });
        WeatherTable::new(rows)
    }

    /// The `n` hottest rows, hottest first.
    pub fn top_by_temperature(&self, n: usize) -> WeatherTable {
        let directive = SortDirective {
            field: SortField::Temperature,
            ascending: false,
        };
        self.clone().sorted(directive).into_rows().into_iter().take(n).collect()
    }

    /// All rows from calmest to windiest.
    pub fn ranked_by_wind_speed(&self) -> WeatherTable {
        self.clone().sorted(SortDirective {
            field: SortField::WindSpeed,
            ascending: true,
        })
    }
}

fn compare(a: &WeatherReading, b: &WeatherReading, field: SortField) -> Ordering {
    match field {
        SortField::Temperature => a.temperature_c.total_cmp(&b.temperature_c),
        SortField::WindSpeed => a.wind_speed_kph.total_cmp(&b.wind_speed_kph),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{assert_close, forecast_record};
    use serde_json::json;

    fn cities() -> Vec<City> {
        vec![City::new("London", "51.5074", "-0.1278"), City::new("Paris", "48.8566", "2.3522")]
    }

    fn readings() -> Vec<RawReading> {
        vec![
            forecast_record("Europe/London", "2024-01-01T12:00", 20.5, 65.0, 10.0).into(),
            forecast_record("Europe/Paris", "2024-01-01T13:00", 22.0, 70.0, 12.0).into(),
        ]
    }

    fn table_with(temps_and_winds: &[(&str, f64, f64)]) -> WeatherTable {
        let cities: Vec<City> =
            temps_and_winds.iter().map(|(n, _, _)| City::new(*n, "0", "0")).collect();
        let raw: Vec<RawReading> = temps_and_winds
            .iter()
            .map(|(_, t, w)| forecast_record("UTC", "2024-01-01T00:00", *t, 50.0, *w).into())
            .collect();
        build_table(&cities, &raw).expect("valid table")
    }

    fn names(table: &WeatherTable) -> Vec<&str> {
        table.iter().map(|r| r.city.name.as_str()).collect()
    }

    #[test]
    fn pairs_cities_with_readings_in_order() {
        let table = build_table(&cities(), &readings()).expect("valid table");

        assert_eq!(names(&table), vec!["London", "Paris"]);
        let london = &table.rows()[0];
        assert_eq!(london.timezone, "Europe/London");
        assert_eq!(london.time, parse_time("2024-01-01T12:00").expect("time"));
        assert_eq!(london.temperature_c, 20.5);
        assert_eq!(london.humidity, 65.0);
        assert_eq!(london.wind_speed_kph, 10.0);
        assert!(london.imperial.is_none());
    }

    #[test]
    fn missing_key_names_the_key() {
        let mut raw = readings();
        raw[1] = json!({
            "timezone": "Europe/Paris",
            "current": { "time": "2024-01-01T13:00" }
        })
        .into();

        let err = build_table(&cities(), &raw).unwrap_err();

        assert!(
            matches!(err, WeatherError::MissingField { ref field, .. } if field == "temperature_2m")
        );

        let raw = vec![json!({ "current": {} }).into(), readings()[1].clone()];
        let err = build_table(&cities(), &raw).unwrap_err();
        assert!(err.to_string().contains("'timezone'"));
    }

    #[test]
    fn bad_timestamp_fails_the_whole_build() {
        let mut raw = readings();
        raw[0] = forecast_record("Europe/London", "yesterday", 20.5, 65.0, 10.0).into();

        let err = build_table(&cities(), &raw).unwrap_err();

        assert!(matches!(err, WeatherError::InvalidResponseFormat { .. }));
        assert!(err.to_string().contains("yesterday"));
    }

    #[test]
    fn reading_count_must_match_city_count() {
        let err = build_table(&cities(), &readings()[..1]).unwrap_err();
        assert!(matches!(err, WeatherError::InvalidResponseFormat { .. }));
    }

    #[test]
    fn parse_time_accepts_open_meteo_and_snapshot_layouts() {
        assert!(parse_time("2024-01-01T12:00").is_some());
        assert!(parse_time("2024-01-01T12:00:30").is_some());
        assert!(parse_time("2024-01-01 12:00:00").is_some());
        assert!(parse_time("12:00").is_none());
    }

    #[test]
    fn conversions_are_exact() {
        assert_eq!(celsius_to_fahrenheit(0.0), 32.0);
        assert_eq!(celsius_to_fahrenheit(100.0), 212.0);
        assert_close(kph_to_mph(10.0), 6.21371);
    }

    #[test]
    fn derives_imperial_units_for_every_row() {
        let table = derive_imperial_units(build_table(&cities(), &readings()).expect("valid"));

        let fahrenheit: Vec<f64> = table.iter().filter_map(|r| r.temperature_f()).collect();
        let mph: Vec<f64> = table.iter().filter_map(|r| r.wind_speed_mph()).collect();

        assert_eq!(fahrenheit.len(), 2);
        assert_close(fahrenheit[0], 68.9);
        assert_close(fahrenheit[1], 71.6);
        assert_close(mph[0], 6.21371);
        assert_close(mph[1], 7.456452);
    }

    #[test]
    fn sorted_orders_by_directive() {
        let table = table_with(&[("A", 15.0, 30.0), ("B", 25.0, 5.0), ("C", 5.0, 12.0)]);

        let hot_first = table.clone().sorted("-temperature".parse().expect("directive"));
        assert_eq!(names(&hot_first), vec!["B", "A", "C"]);

        let calm_first = table.sorted("wind_speed".parse().expect("directive"));
        assert_eq!(names(&calm_first), vec!["B", "C", "A"]);
    }

    #[test]
    fn sort_is_stable_for_ties() {
        let table = table_with(&[("A", 10.0, 1.0), ("B", 10.0, 1.0), ("C", 5.0, 1.0)]);

        let sorted = table.sorted("temperature".parse().expect("directive"));

        assert_eq!(names(&sorted), vec!["C", "A", "B"]);
    }

    #[test]
    fn top_by_temperature_caps_the_row_count() {
        let table = table_with(&[
            ("A", 1.0, 0.0),
            ("B", 6.0, 0.0),
            ("C", 3.0, 0.0),
            ("D", 5.0, 0.0),
            ("E", 2.0, 0.0),
            ("F", 4.0, 0.0),
        ]);

        let top = table.top_by_temperature(5);

        assert_eq!(names(&top), vec!["B", "D", "F", "C", "E"]);
        assert_eq!(table.top_by_temperature(10).len(), 6);
    }

    #[test]
    fn ranked_by_wind_speed_keeps_every_row() {
        let table = table_with(&[("A", 0.0, 9.0), ("B", 0.0, 3.0), ("C", 0.0, 6.0)]);

        assert_eq!(names(&table.ranked_by_wind_speed()), vec!["B", "C", "A"]);
    }
}
