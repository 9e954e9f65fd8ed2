//! Common types and utilities shared by the package layer and the panels.

pub mod style;
pub mod unit;
pub mod xml;

pub use style::RGBColor;
pub use unit::{EMUS_PER_INCH, inches_to_emu};
