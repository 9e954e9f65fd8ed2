//! One refresh run, from provider fetches to the atomic save.

use crate::almanac::HistoricalFact;
use crate::config::{Config, LayoutConfig};
use crate::editor::EditorHooks;
use crate::error::Result;
use crate::lock::DeckLock;
use crate::ooxml::pptx::{Deck, Geometry};
use crate::placeholder::panels::{
    ANNIVERSARY_PREFIX, BIRTHDAY_PREFIX, fact_panel, hide_forecast_groups, weather_panel,
};
use crate::placeholder::{SlideEditor, apply, write_column};
use crate::recognition::{WeeklyRecognitions, select};
use crate::sources::{AlmanacSource, FactImage, HrSource, WeatherSource, http_client};
use crate::weather::WeatherSnapshot;
use chrono::{Local, NaiveDate, Timelike};
use reqwest::Client;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// Wall-clock inputs of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunClock {
    pub today: NaiveDate,
    /// Local hour, `0..24`
    pub hour: u32,
}

impl RunClock {
    pub fn now() -> Self {
        let now = Local::now();
        Self {
            today: now.date_naive(),
            hour: now.hour(),
        }
    }
}

/// What a run changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    pub birthdays: usize,
    pub anniversaries: usize,
    pub fact_updated: bool,
    pub weather_updated: bool,
    pub lock_attempts: u32,
}

/// Data gathered before the deck is touched.
struct Fetched {
    weekly: WeeklyRecognitions,
    fact: Option<HistoricalFact>,
    fact_image: Option<FactImage>,
    weather: Option<WeatherSnapshot>,
}

pub struct Refresher {
    config: Config,
    client: Client,
}

impl Refresher {
    pub fn new(config: Config) -> Result<Self> {
        let client = http_client(&config.http)?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// This week's recognitions, without touching the deck.
    pub async fn preview(&self, today: NaiveDate) -> Result<WeeklyRecognitions> {
        let records = HrSource::from_config(&self.config.hr, &self.client)
            .fetch_records()
            .await?;
        Ok(select(today, &records))
    }

    /// Fetch everything, then rewrite and save the deck under its lock.
    ///
    /// The HR report is required; the fact and weather panels are skipped
    /// when their provider fails. The editor is reopened whatever the
    /// outcome once it has been closed.
    pub async fn run(&self, clock: RunClock) -> Result<RefreshReport> {
        info!(today = %clock.today, hour = clock.hour, deck = %self.config.deck.path.display(), "refresh started");
        let fetched = self.fetch(clock.today).await?;

        let editor = EditorHooks::from_config(&self.config.editor);
        editor.close().await;
        let result = self.edit_deck(clock, &fetched).await;
        editor.open();

        // Removes the downloaded fact image
        drop(fetched);

        match &result {
            Ok(report) => info!(?report, "refresh finished"),
            Err(e) => warn!(error = %e, "refresh aborted, deck not saved"),
        }
        result
    }

    async fn fetch(&self, today: NaiveDate) -> Result<Fetched> {
        let weekly = self.preview(today).await?;
        info!(
            birthdays = weekly.birthdays.len(),
            anniversaries = weekly.anniversaries.len(),
            "recognitions selected"
        );

        let (fact, fact_image) = if self.config.almanac.enabled {
            let almanac = AlmanacSource::new(&self.client, &self.config.almanac);
            let fact = almanac.fetch(today).await;
            let image = match fact.as_ref().and_then(|f| f.image_url.as_deref()) {
                Some(url) => almanac.download_image(url).await,
                None => None,
            };
            (fact, image)
        } else {
            debug!("almanac disabled");
            (None, None)
        };

        let weather = if self.config.weather.enabled {
            WeatherSource::new(&self.client, &self.config.weather).fetch().await
        } else {
            debug!("weather disabled");
            None
        };

        Ok(Fetched {
            weekly,
            fact,
            fact_image,
            weather,
        })
    }

    async fn edit_deck(&self, clock: RunClock, fetched: &Fetched) -> Result<RefreshReport> {
        let deck_config = &self.config.deck;
        let layout = &self.config.layout;
        let path = deck_config.path.as_path();

        let lock = DeckLock::acquire(path, &self.config.lock.policy()).await?;
        let mut deck = Deck::open(path)?;
        let mut report = RefreshReport {
            lock_attempts: lock.attempts(),
            ..RefreshReport::default()
        };

        let mut slide = deck.slide_mut(deck_config.recognition_slide)?;
        (report.birthdays, report.anniversaries) =
            update_recognition_slide(&mut slide, &fetched.weekly, layout)?;

        if let Some(fact) = &fetched.fact {
            let mut slide = deck.slide_mut(deck_config.fact_slide)?;
            let image = fetched.fact_image.as_ref().map(FactImage::path);
            update_fact_slide(&mut slide, fact, clock.today, image, layout.fact_image.geometry())?;
            report.fact_updated = true;
        }

        if let Some(snapshot) = &fetched.weather {
            let mut slide = deck.slide_mut(deck_config.weather_slide)?;
            update_weather_slide(
                &mut slide,
                snapshot,
                clock.hour,
                &self.config.weather.icon_dir,
                layout.weather_icon.geometry(),
            )?;
            report.weather_updated = true;
        }

        deck.save(path)?;
        info!(path = %path.display(), "deck saved");
        drop(lock);
        Ok(report)
    }
}

/// Rewrite both recognition columns; returns the box counts.
pub fn update_recognition_slide<E: SlideEditor + ?Sized>(
    slide: &mut E,
    weekly: &WeeklyRecognitions,
    layout: &LayoutConfig,
) -> crate::ooxml::Result<(usize, usize)> {
    let birthdays: Vec<&str> = weekly.birthdays.iter().map(|r| r.message.as_str()).collect();
    let anniversaries: Vec<&str> = weekly
        .anniversaries
        .iter()
        .map(|r| r.message.as_str())
        .collect();

    let written = (
        write_column(slide, BIRTHDAY_PREFIX, &birthdays, &layout.birthdays)?,
        write_column(slide, ANNIVERSARY_PREFIX, &anniversaries, &layout.anniversaries)?,
    );
    info!(birthdays = written.0, anniversaries = written.1, "recognition slide updated");
    Ok(written)
}

pub fn update_fact_slide<E: SlideEditor + ?Sized>(
    slide: &mut E,
    fact: &HistoricalFact,
    today: NaiveDate,
    image: Option<&Path>,
    geometry: Geometry,
) -> crate::ooxml::Result<()> {
    for instruction in fact_panel(fact, today, image, geometry) {
        apply(slide, &instruction)?;
    }
    info!(year = fact.year, with_image = image.is_some(), "fact slide updated");
    Ok(())
}

/// Hide the forecast groups, then write the current conditions.
pub fn update_weather_slide<E: SlideEditor + ?Sized>(
    slide: &mut E,
    snapshot: &WeatherSnapshot,
    hour: u32,
    icon_dir: &Path,
    geometry: Geometry,
) -> crate::ooxml::Result<()> {
    let hidden = hide_forecast_groups(slide)?;
    debug!(hidden, "forecast groups hidden");
    for instruction in weather_panel(snapshot, hour, icon_dir, geometry) {
        apply(slide, &instruction)?;
    }
    info!(condition = ?snapshot.condition, "weather slide updated");
    Ok(())
}
