//! CSV snapshots of a [`WeatherTable`].
//!
//! The primary snapshot has a fixed name (`weather_data.csv`); the ranked
//! extracts written by [`write_report`] carry a timestamp in their names.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, de};
use std::{
    fs::{self, File},
    io,
    path::{Path, PathBuf},
};

use crate::{
    config::SNAPSHOT_FILE,
    error::{Result, WeatherError},
    model::{City, ImperialUnits, WeatherReading, WeatherTable},
    table::parse_time,
};

/// Columns every snapshot must carry; the derived imperial columns are optional.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "city",
    "latitude",
    "longitude",
    "timezone",
    "time",
    "temperature_c",
    "humidity",
    "wind_speed_kph",
];

const TOP_N: usize = 5;

/// One flat CSV line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SnapshotRow {
    city: String,
    latitude: String,
    longitude: String,
    timezone: String,
    #[serde(deserialize_with = "deserialize_time")]
    time: NaiveDateTime,
    temperature_c: f64,
    humidity: f64,
    wind_speed_kph: f64,
    #[serde(default)]
    temperature_f: Option<f64>,
    #[serde(default)]
    wind_speed_mph: Option<f64>,
}

/// Accepts both `T` and space separated timestamps.
fn deserialize_time<'de, D>(deserializer: D) -> std::result::Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_time(raw.trim()).ok_or_else(|| de::Error::custom(format!("invalid timestamp '{raw}'")))
}

impl From<&WeatherReading> for SnapshotRow {
    fn from(r: &WeatherReading) -> Self {
        Self {
            city: r.city.name.clone(),
            latitude: r.city.latitude.clone(),
            longitude: r.city.longitude.clone(),
            timezone: r.timezone.clone(),
            time: r.time,
            temperature_c: r.temperature_c,
            humidity: r.humidity,
            wind_speed_kph: r.wind_speed_kph,
            temperature_f: r.temperature_f(),
            wind_speed_mph: r.wind_speed_mph(),
        }
    }
}

impl From<SnapshotRow> for WeatherReading {
    fn from(row: SnapshotRow) -> Self {
        let imperial = match (row.temperature_f, row.wind_speed_mph) {
            (Some(temperature_f), Some(wind_speed_mph)) => {
                Some(ImperialUnits {
                    temperature_f,
                    wind_speed_mph,
                })
            }
            _ => None,
        };
        Self {
            city: City {
                name: row.city,
                latitude: row.latitude,
                longitude: row.longitude,
            },
            timezone: row.timezone,
            time: row.time,
            temperature_c: row.temperature_c,
            humidity: row.humidity,
            wind_speed_kph: row.wind_speed_kph,
            imperial,
        }
    }
}

/// Write `table` to `path` with a header row.
pub fn write_snapshot(path: &Path, table: &WeatherTable) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for reading in table {
        writer.serialize(SnapshotRow::from(reading))?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a snapshot written by [`write_snapshot`].
///
/// A missing file is `FileNotFound`; a file with no data rows is `EmptyFile`.
pub fn load_snapshot(path: &Path) -> Result<WeatherTable> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => WeatherError::FileNotFound(path.to_path_buf()),
        _ => WeatherError::Io(e),
    })?;

    let mut reader = csv::Reader::from_reader(file);
    let headers = reader.headers()?.clone();
    if headers.iter().all(str::is_empty) {
        return Err(WeatherError::EmptyFile(path.to_path_buf()));
    }
    if let Some(column) = REQUIRED_COLUMNS.iter().find(|c| !headers.iter().any(|h| h == **c)) {
        return Err(WeatherError::MissingColumn {
            column: column.to_string(),
        });
    }

    let table: WeatherTable = reader
        .deserialize::<SnapshotRow>()
        .map(|row| row.map(WeatherReading::from))
        .collect::<std::result::Result<_, _>>()?;

    if table.is_empty() {
        return Err(WeatherError::EmptyFile(path.to_path_buf()));
    }

    tracing::debug!(path = %path.display(), rows = table.len(), "loaded snapshot");
    Ok(table)
}

/// Files produced by one [`write_report`] run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub snapshot: PathBuf,
    pub top_temperature: PathBuf,
    pub wind_ranked: PathBuf,
}

/// Write the primary snapshot plus the top-5-by-temperature and wind-ranked extracts.
pub fn write_report(
    dir: &Path,
    table: &WeatherTable,
    timestamp: NaiveDateTime,
) -> Result<ReportPaths> {
    fs::create_dir_all(dir)?;

    let stamp = timestamp.format("%Y%m%d_%H%M%S");
    let paths = ReportPaths {
        snapshot: dir.join(SNAPSHOT_FILE),
        top_temperature: dir.join(format!("weather_data_{stamp}_top5_temp.csv")),
        wind_ranked: dir.join(format!("weather_data_{stamp}_wind_ranked.csv")),
    };

    write_snapshot(&paths.snapshot, table)?;
    write_snapshot(&paths.top_temperature, &table.top_by_temperature(TOP_N))?;
    write_snapshot(&paths.wind_ranked, &table.ranked_by_wind_speed())?;

    tracing::info!(dir = %dir.display(), rows = table.len(), "wrote weather report");
    Ok(paths)
}
