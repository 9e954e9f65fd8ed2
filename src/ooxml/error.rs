//! Errors raised while editing a deck.
use crate::ooxml::opc::error::OpcError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, OoxmlError>;

#[derive(Error, Debug)]
pub enum OoxmlError {
    #[error(transparent)]
    Opc(#[from] OpcError),

    /// Slide XML that cannot be parsed or edited safely
    #[error("Malformed slide XML: {0}")]
    Xml(String),

    #[error("Part not found: {0}")]
    PartNotFound(String),

    /// The package is not a presentation
    #[error("Not a presentation: expected {expected}, got {got}")]
    InvalidContentType { expected: String, got: String },

    /// 1-based slide number outside the deck
    #[error("Slide {index} out of range: the deck has {count} slides")]
    SlideOutOfRange { index: usize, count: usize },

    /// Picture bytes that are neither PNG, JPEG, GIF nor BMP
    #[error("Unsupported picture for {0}")]
    UnsupportedImage(String),

    #[error("Invalid deck structure: {0}")]
    InvalidFormat(String),
}

macro_rules! xml_error_from {
    ($($source:ty),*) => {
        $(
            impl From<$source> for OoxmlError {
                fn from(err: $source) -> Self {
                    OoxmlError::Xml(err.to_string())
                }
            }
        )*
    };
}

xml_error_from!(
    quick_xml::Error,
    quick_xml::events::attributes::AttrError,
    std::str::Utf8Error
);
