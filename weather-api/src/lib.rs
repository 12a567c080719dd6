//! HTTP read surface over the weather pipeline.
//!
//! Routes:
//! - `GET /weather/visualization`: SVG chart of the stored snapshot
//! - `GET /weather/download/csv`: the stored snapshot as a download
//! - `GET /weather/{city|all}?sort_by=...`: live weather as JSON

use serde::Deserialize;
use serde_json::json;
use std::{convert::Infallible, io, path::PathBuf, sync::Arc};
use warp::{
    Filter, Rejection, Reply,
    http::{
        StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    reply::Response,
};
use weather_core::{
    Config, LookupSource, WeatherError, WeatherQuery, chart, provider::source_from_config, snapshot,
};

/// Shared, read-only handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    query: WeatherQuery,
    snapshot_path: PathBuf,
}

impl AppState {
    pub fn new(source: Arc<dyn LookupSource>, snapshot_path: PathBuf) -> Self {
        Self {
            query: WeatherQuery::new(source),
            snapshot_path,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(source_from_config(config), config.snapshot_path())
    }
}

#[derive(Debug, Deserialize)]
struct WeatherParams {
    sort_by: Option<String>,
}

pub fn routes(state: AppState) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    let with_state = warp::any().map(move || state.clone());

    let visualization = warp::path!("weather" / "visualization")
        .and(warp::get())
        .and(with_state.clone())
        .and_then(visualization);

    let download = warp::path!("weather" / "download" / "csv")
        .and(warp::get())
        .and(with_state.clone())
        .and_then(download_csv);

    let weather = warp::path!("weather" / String)
        .and(warp::get())
        .and(warp::query::<WeatherParams>())
        .and(with_state)
        .and_then(weather);

    visualization.or(download).unify().or(weather).unify()
}

async fn weather(
    city: String,
    params: WeatherParams,
    state: AppState,
) -> Result<Response, Infallible> {
    let city = urlencoding::decode(&city).map(|c| c.into_owned()).unwrap_or(city);

    match state.query.weather(&city, params.sort_by.as_deref()).await {
        Ok(table) => Ok(warp::reply::json(&table).into_response()),
        Err(err) => {
            let status = status_for(&err);
            let detail = if status.is_server_error() {
                format!("Error fetching weather data: {err}")
            } else {
                err.to_string()
            };
            tracing::warn!(%city, %status, error = %err, "weather request failed");
            Ok(error_reply(status, detail))
        }
    }
}

async fn visualization(state: AppState) -> Result<Response, Infallible> {
    let rendered =
        snapshot::load_snapshot(&state.snapshot_path).and_then(|t| chart::render_svg(&t));

    match rendered {
        Ok(svg) => {
            let reply = warp::reply::with_header(svg, CONTENT_TYPE, "image/svg+xml");
            let reply = warp::reply::with_header(
                reply,
                CONTENT_DISPOSITION,
                r#"inline; filename="weather_visualization.svg""#,
            );
            Ok(reply.into_response())
        }
        Err(err @ WeatherError::FileNotFound(_)) => {
            tracing::warn!(error = %err, "visualization without snapshot");
            Ok(error_reply(StatusCode::NOT_FOUND, "Weather data file not found".to_string()))
        }
        Err(err) => {
            tracing::warn!(error = %err, "visualization failed");
            Ok(error_reply(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))
        }
    }
}

async fn download_csv(state: AppState) -> Result<Response, Infallible> {
    match tokio::fs::read(&state.snapshot_path).await {
        Ok(bytes) => {
            let reply = warp::reply::with_header(bytes, CONTENT_TYPE, "text/csv");
            let reply = warp::reply::with_header(
                reply,
                CONTENT_DISPOSITION,
                r#"attachment; filename="weather_data.csv""#,
            );
            Ok(reply.into_response())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(error_reply(
            StatusCode::NOT_FOUND,
            "Weather data CSV file not found".to_string(),
        )),
        Err(e) => Ok(error_reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error reading weather data file: {e}"),
        )),
    }
}

/// HTTP status for a pipeline error.
pub fn status_for(err: &WeatherError) -> StatusCode {
    match err {
        WeatherError::NotFound(_) | WeatherError::FileNotFound(_) => StatusCode::NOT_FOUND,
        WeatherError::InvalidInput(_)
        | WeatherError::InvalidCoordinate { .. }
        | WeatherError::EmptyInput => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_reply(status: StatusCode, detail: String) -> Response {
    warp::reply::with_status(warp::reply::json(&json!({ "detail": detail })), status)
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_distinguishes_client_errors() {
        assert_eq!(status_for(&WeatherError::NotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(&WeatherError::InvalidInput("bad sort".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_for(&WeatherError::EmptyInput), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(&WeatherError::MissingFields {
                city: "London".into(),
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(status_for(&WeatherError::NoData), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
