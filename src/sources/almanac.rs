//! "On this day" provider and fact image download.

use crate::almanac::{HistoricalFact, OnThisDayFeed};
use crate::config::AlmanacConfig;
use crate::error::{Error, Result};
use chrono::{Datelike, NaiveDate};
use reqwest::Client;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// A downloaded picture; the file is deleted when this is dropped.
#[derive(Debug)]
pub struct FactImage {
    file: NamedTempFile,
}

impl FactImage {
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

#[derive(Debug, Clone)]
pub struct AlmanacSource {
    client: Client,
    base_url: String,
}

impl AlmanacSource {
    pub fn new(client: &Client, config: &AlmanacConfig) -> Self {
        Self {
            client: client.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url_for(&self, day: NaiveDate) -> String {
        format!("{}/{:02}/{:02}", self.base_url, day.month(), day.day())
    }

    /// The first event of `day`, or `None` on any failure.
    pub async fn fetch(&self, day: NaiveDate) -> Option<HistoricalFact> {
        match self.try_fetch(day).await {
            Ok(Some(fact)) => Some(fact),
            Ok(None) => {
                warn!(%day, "almanac feed has no events");
                None
            },
            Err(e) => {
                warn!(%day, error = %e, "almanac unavailable, fact panel left unchanged");
                None
            },
        }
    }

    async fn try_fetch(&self, day: NaiveDate) -> Result<Option<HistoricalFact>> {
        let url = self.url_for(day);
        debug!(%url, "fetching almanac");
        let body = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        let feed: OnThisDayFeed = serde_json::from_slice(&body)?;
        Ok(feed.first_fact())
    }

    /// Download `url` into a temporary file, or `None` on any failure.
    pub async fn download_image(&self, url: &str) -> Option<FactImage> {
        match self.try_download(url).await {
            Ok(image) => Some(image),
            Err(e) => {
                warn!(%url, error = %e, "fact image download failed");
                None
            },
        }
    }

    async fn try_download(&self, url: &str) -> Result<FactImage> {
        let data = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        if data.is_empty() {
            return Err(Error::Feed("empty image body".to_string()));
        }

        let mut file = tempfile::Builder::new().prefix("signdeck-fact-").tempfile()?;
        file.write_all(&data)?;
        file.flush()?;
        debug!(%url, bytes = data.len(), path = %file.path().display(), "fact image saved");
        Ok(FactImage { file })
    }
}
