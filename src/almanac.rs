//! "On this day" feed: the event shown on the fact slide.

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

/// The event picked for today.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoricalFact {
    pub year: i32,
    pub description: String,
    pub image_url: Option<String>,
}

impl HistoricalFact {
    /// Headline for the date box, e.g. `June 3, 1965`.
    pub fn date_line(&self, today: NaiveDate) -> String {
        format!("{} {}, {}", today.format("%B"), today.day(), self.year)
    }
}

/// Response of `feed/onthisday/events/{MM}/{DD}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OnThisDayFeed {
    #[serde(default)]
    pub events: Vec<FeedEvent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedEvent {
    pub year: i32,
    pub text: String,
    #[serde(default)]
    pub pages: Vec<FeedPage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedPage {
    #[serde(default)]
    pub originalimage: Option<FeedImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedImage {
    pub source: String,
}

impl OnThisDayFeed {
    /// The first event, with the first page image it links to.
    pub fn first_fact(self) -> Option<HistoricalFact> {
        let event = self.events.into_iter().next()?;
        let image_url = event
            .pages
            .into_iter()
            .find_map(|page| page.originalimage)
            .map(|image| image.source);

        Some(HistoricalFact {
            year: event.year,
            description: event.text,
            image_url,
        })
    }
}
