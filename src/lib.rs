//! Signdeck - refresh a digital-signage PowerPoint deck in place
//!
//! A run pulls three feeds and rewrites named shapes on three slides of an
//! existing `.pptx`:
//!
//! - **Recognitions**: birthdays and work anniversaries of the current
//!   Monday-to-Sunday week, selected from an HR report
//! - **Today in history**: the first "on this day" event with its picture
//! - **Current weather**: conditions of one observation station and an icon
//!
//! Everything is fetched before the deck is touched. The deck is edited
//! only while it can be opened for writing and is saved atomically.
//!
//! # Example - One refresh
//!
//! ```no_run
//! use signdeck::config::Config;
//! use signdeck::refresh::{Refresher, RunClock};
//!
//! # async fn run() -> signdeck::Result<()> {
//! let config = Config::load("signdeck.toml").await?;
//! let report = Refresher::new(config)?.run(RunClock::now()).await?;
//! println!("{} birthdays this week", report.birthdays);
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Editing a slide directly
//!
//! ```no_run
//! use signdeck::ooxml::pptx::Deck;
//! use signdeck::placeholder::{SlideKind, apply, render};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut deck = Deck::open("DisplayFinal.pptx")?;
//! let mut slide = deck.slide_mut(9)?;
//! if let Some(instruction) = render("WindBox", Some("Calm"), SlideKind::Weather) {
//!     apply(&mut slide, &instruction)?;
//! }
//! deck.save("DisplayFinal.pptx")?;
//! # Ok(())
//! # }
//! ```

/// "On this day" events
pub mod almanac;

/// Shared units, colors and XML helpers
pub mod common;

pub mod config;

/// Presentation editor close/reopen hooks
pub mod editor;

pub mod error;

/// Deck file locking
pub mod lock;

/// OOXML (Office Open XML) package access and PresentationML editing
pub mod ooxml;

/// Mapping of values onto named slide shapes
pub mod placeholder;

/// HR report parsing and weekly selection
pub mod recognition;

pub mod refresh;

/// HTTP and file data providers
pub mod sources;

/// Current conditions and icon classification
pub mod weather;

pub use error::{Error, Result};
