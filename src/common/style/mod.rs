//! Styling primitives.

mod color;

pub use color::RGBColor;
