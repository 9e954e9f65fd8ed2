//! Run configuration, read from a TOML file.
//!
//! Every table and key is optional; defaults reproduce the production
//! signage setup. HR secrets may come from the environment instead of the
//! file:
//!
//! ```toml
//! [deck]
//! path = "C:/Signage/DisplayFinal.pptx"
//!
//! [hr]
//! username = "signage"
//! company = "ACME"
//!
//! [weather]
//! station = "KDAY"
//! icon_dir = "C:/Signage/media"
//!
//! [editor]
//! close_command = ["taskkill", "/f", "/im", "POWERPNT.EXE"]
//! ```

use crate::error::{Error, Result};
use crate::lock::LockPolicy;
use crate::ooxml::pptx::Geometry;
use crate::placeholder::ColumnLayout;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_HR_API_KEY: &str = "SIGNDECK_HR_API_KEY";
pub const ENV_HR_USERNAME: &str = "SIGNDECK_HR_USERNAME";
pub const ENV_HR_COMPANY: &str = "SIGNDECK_HR_COMPANY";
pub const ENV_HR_PASSWORD: &str = "SIGNDECK_HR_PASSWORD";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub deck: DeckConfig,
    pub hr: HrConfig,
    pub almanac: AlmanacConfig,
    pub weather: WeatherConfig,
    pub http: HttpConfig,
    pub lock: LockConfig,
    pub editor: EditorConfig,
    pub layout: LayoutConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeckConfig {
    pub path: PathBuf,
    /// 1-based slide numbers
    pub recognition_slide: usize,
    pub fact_slide: usize,
    pub weather_slide: usize,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("DisplayFinal.pptx"),
            recognition_slide: 8,
            fact_slide: 2,
            weather_slide: 9,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HrConfig {
    pub login_url: String,
    pub report_url: String,
    pub api_key: String,
    pub username: String,
    pub company: String,
    pub password: String,
    /// Read the report from this file instead of the HR service
    pub report_file: Option<PathBuf>,
}

impl Default for HrConfig {
    fn default() -> Self {
        Self {
            login_url: "http://secure3.saashr.com/ta/rest/v1/login".to_string(),
            report_url: "http://secure3.saashr.com/ta/rest/v1/report/saved/107538439".to_string(),
            api_key: String::new(),
            username: String::new(),
            company: String::new(),
            password: String::new(),
            report_file: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AlmanacConfig {
    /// Month and day are appended as `/{MM}/{DD}`
    pub base_url: String,
    pub enabled: bool,
}

impl Default for AlmanacConfig {
    fn default() -> Self {
        Self {
            base_url: "https://en.wikipedia.org/api/rest_v1/feed/onthisday/events".to_string(),
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// The station document is `{base_url}/{station}.xml`
    pub base_url: String,
    pub station: String,
    pub icon_dir: PathBuf,
    pub enabled: bool,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://forecast.weather.gov/xml/current_obs".to_string(),
            station: "KDAY".to_string(),
            icon_dir: PathBuf::from("media"),
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("signdeck/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LockConfig {
    pub timeout_secs: u64,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            initial_backoff_ms: 250,
            max_backoff_ms: 2000,
        }
    }
}

impl LockConfig {
    pub fn policy(&self) -> LockPolicy {
        LockPolicy {
            timeout: Duration::from_secs(self.timeout_secs),
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
        }
    }
}

/// Commands run around the deck edit, as argv arrays. Empty means skip.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub close_command: Vec<String>,
    pub open_command: Vec<String>,
}

/// A rectangle in inches.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn geometry(&self) -> Geometry {
        Geometry::from_inches(self.left, self.top, self.width, self.height)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub birthdays: ColumnLayout,
    pub anniversaries: ColumnLayout,
    pub weather_icon: Rect,
    pub fact_image: Rect,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            birthdays: ColumnLayout::BIRTHDAYS,
            anniversaries: ColumnLayout::ANNIVERSARIES,
            weather_icon: Rect {
                left: 5.70,
                top: 3.29,
                width: 1.93,
                height: 2.00,
            },
            fact_image: Rect {
                left: 9.42,
                top: 4.53,
                width: 3.0,
                height: 2.0,
            },
        }
    }
}

impl Config {
    /// Load and validate a configuration file, applying environment overrides.
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let mut config = Self::from_toml_str(&text)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Override HR secrets with values found through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let overrides = [
            (ENV_HR_API_KEY, &mut self.hr.api_key),
            (ENV_HR_USERNAME, &mut self.hr.username),
            (ENV_HR_COMPANY, &mut self.hr.company),
            (ENV_HR_PASSWORD, &mut self.hr.password),
        ];
        for (key, field) in overrides {
            if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
                *field = value;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        let slides = [
            ("deck.recognition_slide", self.deck.recognition_slide),
            ("deck.fact_slide", self.deck.fact_slide),
            ("deck.weather_slide", self.deck.weather_slide),
        ];
        for (key, number) in slides {
            if number == 0 {
                return Err(Error::Config(format!("{} is 1-based, got 0", key)));
            }
        }

        if self.hr.report_file.is_none() {
            let credentials = [
                ("hr.api_key", &self.hr.api_key),
                ("hr.username", &self.hr.username),
                ("hr.company", &self.hr.company),
                ("hr.password", &self.hr.password),
            ];
            for (key, value) in credentials {
                if value.is_empty() {
                    return Err(Error::Config(format!(
                        "{} is required unless hr.report_file is set",
                        key
                    )));
                }
            }
        }

        if self.lock.initial_backoff_ms == 0 || self.lock.max_backoff_ms < self.lock.initial_backoff_ms {
            return Err(Error::Config(
                "lock backoff must be positive and max_backoff_ms >= initial_backoff_ms".to_string(),
            ));
        }

        if self.weather.enabled && self.weather.station.trim().is_empty() {
            return Err(Error::Config("weather.station is empty".to_string()));
        }

        Ok(())
    }
}
