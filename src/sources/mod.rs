//! Data providers: HR report, "on this day" feed and current weather.
//!
//! The HR report is required and its failures are errors. The almanac and
//! weather providers are optional: every failure is logged and turned into
//! `None`, which leaves the corresponding panel as it was.

pub mod almanac;
pub mod hr;
pub mod weather;

use crate::config::HttpConfig;
use crate::error::Result;
use reqwest::Client;
use std::time::Duration;

pub use almanac::{AlmanacSource, FactImage};
pub use hr::HrSource;
pub use weather::WeatherSource;

/// Shared HTTP client for every provider.
pub fn http_client(config: &HttpConfig) -> Result<Client> {
    let client = Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}
