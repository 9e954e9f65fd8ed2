//! Slot assignments of the fact and weather panels.

use super::{RenderInstruction, SlideEditor, SlideKind, render, render_image};
use crate::almanac::HistoricalFact;
use crate::ooxml::Result;
use crate::ooxml::pptx::Geometry;
use crate::weather::{WeatherSnapshot, classify};
use chrono::NaiveDate;
use std::path::Path;
use tracing::debug;

pub const WEATHER_FOR_BOX: &str = "WeatherForBox";
pub const TIME_BOX: &str = "TimeBox";
pub const WEATHER_BOX: &str = "WeatherBox";
pub const HUMIDITY_BOX: &str = "HumidityBox";
pub const WIND_BOX: &str = "WindBox";
pub const TEMPERATURE_BOX: &str = "TemperatureBox";
pub const WEATHER_IMAGE: &str = "CurrentWeatherImage";

pub const DATE_BOX: &str = "DateBox";
pub const FACT_BOX: &str = "FactBox";
pub const FACT_IMAGE: &str = "FactImage";

pub const BIRTHDAY_PREFIX: &str = "BirthdayBox";
pub const ANNIVERSARY_PREFIX: &str = "AnniversaryBox";

/// Multi-day forecast groups left over in the weather slide design
pub const FORECAST_GROUPS: [&str; 7] = [
    "Day1Group",
    "Day2Group",
    "Day3Group",
    "Day4Group",
    "Day5Group",
    "Day6Group",
    "Day7Group",
];

/// Instructions for the weather slide.
///
/// Fields missing from the snapshot produce no instruction. The icon is only
/// touched when a condition was reported: it is replaced by the classified
/// icon, or removed when the condition maps to no icon.
pub fn weather_panel(
    snapshot: &WeatherSnapshot,
    hour: u32,
    icon_dir: &Path,
    geometry: Geometry,
) -> Vec<RenderInstruction> {
    let humidity = snapshot.humidity_text();
    let texts = [
        (WEATHER_FOR_BOX, snapshot.location.as_deref()),
        (TIME_BOX, snapshot.observation_time.as_deref()),
        (WEATHER_BOX, snapshot.condition.as_deref()),
        (HUMIDITY_BOX, humidity.as_deref()),
        (WIND_BOX, snapshot.wind.as_deref()),
        (TEMPERATURE_BOX, snapshot.temperature.as_deref()),
    ];

    let mut instructions: Vec<_> = texts
        .into_iter()
        .filter_map(|(slot, value)| render(slot, value, SlideKind::Weather))
        .collect();

    if let Some(condition) = snapshot.condition.as_deref() {
        let icon = classify(condition, hour);
        debug!(condition, hour, ?icon, "classified weather");
        let path = icon.map(|icon| icon_dir.join(icon.asset_name()));
        instructions.push(render_image(WEATHER_IMAGE, path.as_deref(), geometry));
    }

    instructions
}

/// Instructions for the fact slide. `image` is the downloaded picture, if any.
pub fn fact_panel(
    fact: &HistoricalFact,
    today: NaiveDate,
    image: Option<&Path>,
    geometry: Geometry,
) -> Vec<RenderInstruction> {
    let date_line = fact.date_line(today);
    [
        render(DATE_BOX, Some(&date_line), SlideKind::Fact),
        render(FACT_BOX, Some(&fact.description), SlideKind::Fact),
        Some(render_image(FACT_IMAGE, image, geometry)),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Hide the forecast groups present on the slide; returns how many were found.
pub fn hide_forecast_groups<E: SlideEditor + ?Sized>(editor: &mut E) -> Result<usize> {
    let mut hidden = 0;
    for group in FORECAST_GROUPS {
        if editor.set_hidden(group, true)? {
            hidden += 1;
        }
    }
    Ok(hidden)
}
