//! Current conditions: feed parsing and icon selection.

pub mod observation;

pub use observation::WeatherSnapshot;

/// Icon shown next to the current conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherIcon {
    Hail,
    Snow,
    Thunderstorm,
    Cloudy,
    Sun,
    Moon,
    Rain,
    DayCloudy,
    NightCloudy,
    DayFog,
    NightFog,
}

impl WeatherIcon {
    /// File name of the icon inside the icon directory.
    pub fn asset_name(&self) -> &'static str {
        match self {
            Self::Hail => "hail.png",
            Self::Snow => "snow.png",
            Self::Thunderstorm => "thunderstorm.png",
            Self::Cloudy => "cloudy.png",
            Self::Sun => "sun.png",
            Self::Moon => "moon.png",
            Self::Rain => "rain.png",
            Self::DayCloudy => "dayCloudy.png",
            Self::NightCloudy => "nightCloudy.png",
            Self::DayFog => "dayFog.png",
            Self::NightFog => "nightFog.png",
        }
    }
}

/// Daytime is `[6, 18)` on the local wall clock.
#[inline]
pub fn is_daytime(hour: u32) -> bool {
    (6..18).contains(&hour)
}

/// Pick an icon for a condition text such as "Light Rain Fog/Mist".
///
/// Keywords are tested case-insensitively in a fixed order and the first
/// hit wins, so "Thunderstorm Rain" is a thunderstorm and "Partly Cloudy
/// and Breezy" is cloudy.
pub fn classify(condition: &str, hour: u32) -> Option<WeatherIcon> {
    let text = condition.to_lowercase();
    let has = |keywords: &[&str]| keywords.iter().any(|k| text.contains(k));
    let day = is_daytime(hour);

    if has(&["hail", "sleet"]) {
        Some(WeatherIcon::Hail)
    } else if has(&["snow", "flurr", "blizzard"]) {
        Some(WeatherIcon::Snow)
    } else if has(&["storm", "thunder", "lightning", "tornado"]) {
        Some(WeatherIcon::Thunderstorm)
    } else if has(&["overcast", "cast"]) {
        Some(WeatherIcon::Cloudy)
    } else if has(&["clear"]) {
        Some(if day { WeatherIcon::Sun } else { WeatherIcon::Moon })
    } else if has(&["rain", "showers"]) {
        Some(WeatherIcon::Rain)
    } else if has(&["cloud"]) {
        Some(if day {
            WeatherIcon::DayCloudy
        } else {
            WeatherIcon::NightCloudy
        })
    } else if has(&["fog", "haze", "mist"]) {
        Some(if day { WeatherIcon::DayFog } else { WeatherIcon::NightFog })
    } else if has(&["sun"]) {
        Some(WeatherIcon::Sun)
    } else {
        None
    }
}
