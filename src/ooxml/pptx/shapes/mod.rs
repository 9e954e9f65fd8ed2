//! Shape lookup on slide XML.

pub mod tree;

pub use tree::{ElementSpan, ElementTree};
