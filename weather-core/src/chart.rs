//! SVG bar charts of a [`WeatherTable`]: temperature, humidity and wind speed by city.

use plotters::{coord::Shift, drawing::DrawingAreaErrorKind, prelude::*};

use crate::{
    error::{Result, WeatherError},
    model::{WeatherReading, WeatherTable},
};

const WIDTH: u32 = 1200;
const PANEL_HEIGHT: u32 = 500;
const BAR_COLOR: RGBColor = RGBColor(31, 119, 180);

struct Panel {
    title: &'static str,
    y_label: &'static str,
    value: fn(&WeatherReading) -> f64,
}

const PANELS: [Panel; 3] = [
    Panel {
        title: "Temperature by City",
        y_label: "Temperature (°C)",
        value: temperature,
    },
    Panel {
        title: "Humidity by City",
        y_label: "Humidity (%)",
        value: humidity,
    },
    Panel {
        title: "Wind Speed by City",
        y_label: "Wind Speed (km/h)",
        value: wind_speed,
    },
];

fn temperature(r: &WeatherReading) -> f64 {
    r.temperature_c
}

fn humidity(r: &WeatherReading) -> f64 {
    r.humidity
}

fn wind_speed(r: &WeatherReading) -> f64 {
    r.wind_speed_kph
}

/// Render the three panels stacked vertically as one SVG document.
///
/// An empty table is an error rather than a blank image.
pub fn render_svg(table: &WeatherTable) -> Result<String> {
    if table.is_empty() {
        return Err(WeatherError::NoData);
    }

    let names: Vec<&str> = table.iter().map(|r| r.city.name.as_str()).collect();
    let mut svg = String::new();
    {
        let size = (WIDTH, PANEL_HEIGHT * PANELS.len() as u32);
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        root.fill(&WHITE).map_err(render_error)?;

        for (area, panel) in root.split_evenly((PANELS.len(), 1)).iter().zip(&PANELS) {
            let values: Vec<f64> = table.iter().map(panel.value).collect();
            draw_panel(area, &names, &values, panel)?;
        }

        root.present().map_err(render_error)?;
    }

    tracing::debug!(cities = names.len(), bytes = svg.len(), "rendered chart");
    Ok(svg)
}

fn draw_panel(
    area: &DrawingArea<SVGBackend<'_>, Shift>,
    names: &[&str],
    values: &[f64],
    panel: &Panel,
) -> Result<()> {
    let (low, high) = value_range(values);

    let mut chart = ChartBuilder::on(area)
        .caption(panel.title, ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d((0..names.len()).into_segmented(), low..high)
        .map_err(render_error)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("City")
        .y_desc(panel.y_label)
        .x_labels(names.len() + 1)
        .x_label_formatter(&|x| match x {
            SegmentValue::CenterOf(i) => names.get(*i).map(|n| n.to_string()).unwrap_or_default(),
            _ => String::new(),
        })
        .label_style(("sans-serif", 14))
        .draw()
        .map_err(render_error)?;

    chart
        .draw_series(
            Histogram::vertical(&chart)
                .style(BAR_COLOR.filled())
                .margin(12)
                .data(values.iter().copied().enumerate()),
        )
        .map_err(render_error)?;

    Ok(())
}

/// Y range for one panel. Bars grow from zero, so the range always includes it.
fn value_range(values: &[f64]) -> (f64, f64) {
    let max = values.iter().copied().fold(0.0_f64, f64::max);
    let min = values.iter().copied().fold(0.0_f64, f64::min);
    let pad = if max > min { (max - min) * 0.1 } else { 1.0 };
    let low = if min < 0.0 { min - pad } else { 0.0 };
    (low, max + pad)
}

fn render_error<E>(err: DrawingAreaErrorKind<E>) -> WeatherError
where
    E: std::error::Error + Send + Sync,
{
    WeatherError::Render(err.to_string())
}
