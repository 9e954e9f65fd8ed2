//! Current-conditions provider.

use crate::config::WeatherConfig;
use crate::error::Result;
use crate::weather::WeatherSnapshot;
use reqwest::Client;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct WeatherSource {
    client: Client,
    url: String,
}

impl WeatherSource {
    pub fn new(client: &Client, config: &WeatherConfig) -> Self {
        let url = format!(
            "{}/{}.xml",
            config.base_url.trim_end_matches('/'),
            config.station
        );
        Self {
            client: client.clone(),
            url,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Latest observation, or `None` on any failure.
    pub async fn fetch(&self) -> Option<WeatherSnapshot> {
        match self.try_fetch().await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(url = %self.url, error = %e, "weather unavailable, weather panel left unchanged");
                None
            },
        }
    }

    async fn try_fetch(&self) -> Result<WeatherSnapshot> {
        debug!(url = %self.url, "fetching current observation");
        // The feed declares its own charset; ignore the HTTP header's
        let body = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        WeatherSnapshot::from_bytes(&body)
    }
}
