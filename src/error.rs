//! Error types for a refresh run.
use crate::ooxml::OoxmlError;
use crate::recognition::ReportError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type for signdeck operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be parsed
    #[error("Invalid configuration file: {0}")]
    ConfigFormat(#[from] toml::de::Error),

    /// The HR provider rejected the login
    #[error("HR authentication failed: {0}")]
    Auth(String),

    /// HR report could not be read
    #[error("HR report error: {0}")]
    Report(#[from] ReportError),

    /// A provider answered with something we cannot read
    #[error("Malformed provider response: {0}")]
    Feed(String),

    /// HTTP transport or status error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The deck stayed locked by another process
    #[error("Deck {} still locked after {:?}", .path.display(), .waited)]
    LockTimeout { path: PathBuf, waited: Duration },

    #[error("Deck not found: {}", .0.display())]
    DeckNotFound(PathBuf),

    /// Deck structure or save error
    #[error("Deck error: {0}")]
    Ooxml(#[from] OoxmlError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
