use anyhow::{Context, bail};
use chrono::Local;
use clap::{Parser, Subcommand};
use inquire::Text;
use std::path::PathBuf;
use weather_core::{
    Config, WeatherError, WeatherQuery, WeatherTable, provider::source_from_config, snapshot,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Current weather report for a set of cities")]
pub struct Cli {
    /// Read configuration from this file instead of the platform config directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch weather, print a summary and write CSV snapshots.
    Report {
        /// Geocode cities through the API instead of using the built-in table.
        #[arg(long)]
        use_api: bool,

        /// City to report on; repeat for several. Implies --use-api.
        #[arg(short, long = "city")]
        cities: Vec<String>,
    },

    /// Show current weather for one city.
    Show {
        /// City name, geocoded live.
        city: String,
    },

    /// Interactively edit endpoints, data directory and server address.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::resolve(self.config.as_deref())?;

        match self.command {
            Command::Report { use_api, cities } => report(&config, use_api, &cities).await,
            Command::Show { city } => show(&config, &city).await,
            Command::Configure => {
                configure(&mut config)?;
                let path = match &self.config {
                    Some(path) => {
                        config.save_to(path)?;
                        path.clone()
                    }
                    None => config.save()?,
                };
                println!("Configuration saved to {}", path.display());
                Ok(())
            }
        }
    }
}

async fn report(config: &Config, use_api: bool, names: &[String]) -> anyhow::Result<()> {
    let query = WeatherQuery::new(source_from_config(config));

    let resolved = if use_api || !names.is_empty() {
        query.resolver().resolve_from_source(names).await
    } else {
        query.resolver().resolve_from_builtins()
    };
    let cities = resolved.context("Error getting city data")?;

    if cities.is_empty() {
        bail!("Error getting city data: No valid cities found to process");
    }

    let table = query
        .service()
        .get_weather_for_cities(&cities)
        .await
        .context("Error fetching weather data")?;

    print!("{}", render_summary(&table));

    let paths = snapshot::write_report(&config.data_dir, &table, Local::now().naive_local())
        .context("Error saving output files")?;
    tracing::info!(
        snapshot = %paths.snapshot.display(),
        top = %paths.top_temperature.display(),
        wind = %paths.wind_ranked.display(),
        "report written"
    );

    Ok(())
}

async fn show(config: &Config, city: &str) -> anyhow::Result<()> {
    let query = WeatherQuery::new(source_from_config(config));

    let table = match query.city_weather(city).await {
        Ok(table) => table,
        Err(e @ WeatherError::NotFound(_)) => bail!(e),
        Err(e) => return Err(e).context("Error fetching weather data"),
    };

    print!("{}", render_summary(&table));
    Ok(())
}

fn configure(config: &mut Config) -> anyhow::Result<()> {
    config.endpoints.geocoding_url = Text::new("Geocoding URL:")
        .with_default(&config.endpoints.geocoding_url)
        .prompt()?;
    config.endpoints.forecast_url = Text::new("Forecast URL:")
        .with_default(&config.endpoints.forecast_url)
        .prompt()?;

    let data_dir = config.data_dir.display().to_string();
    config.data_dir = Text::new("Data directory for CSV snapshots:")
        .with_default(&data_dir)
        .prompt()?
        .into();

    config.server.bind = Text::new("API bind address:")
        .with_default(&config.server.bind)
        .prompt()?;

    Ok(())
}

/// Human-readable block per city, framed by rules.
pub fn render_summary(table: &WeatherTable) -> String {
    let rule = "-".repeat(80);
    let mut out = format!("\nCurrent Weather Information:\n{rule}\n");

    for row in table {
        out.push_str(&format!("\nCity: {}\n", row.city.name));
        match row.imperial {
            Some(imperial) => {
                out.push_str(&format!(
                    "Temperature: {:.1}°C ({:.1}°F)\n",
                    row.temperature_c, imperial.temperature_f
                ));
                out.push_str(&format!("Humidity: {}%\n", row.humidity));
                out.push_str(&format!(
                    "Wind Speed: {:.1} km/h ({:.1} mph)\n",
                    row.wind_speed_kph, imperial.wind_speed_mph
                ));
            }
            None => {
                out.push_str(&format!("Temperature: {:.1}°C\n", row.temperature_c));
                out.push_str(&format!("Humidity: {}%\n", row.humidity));
                out.push_str(&format!("Wind Speed: {:.1} km/h\n", row.wind_speed_kph));
            }
        }
        out.push_str(&format!("Time: {} {}\n", row.time, row.timezone));
    }

    out.push_str(&format!("\n{rule}\n"));
    out
}
