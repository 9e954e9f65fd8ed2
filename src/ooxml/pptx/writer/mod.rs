//! XML generation for shapes added to slides.

pub mod shape;

pub use shape::{paragraph_xml, picture_xml, text_box_xml};
