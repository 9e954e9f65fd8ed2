//! PowerPoint (.pptx) deck editing.
//!
//! Not a presentation model: a deck is opened, a handful of named shapes on
//! known slides are rewritten, and the package is saved back with every
//! other part untouched.
//!
//! - `Deck`: the package plus slide order
//! - `SlideMut`: shape lookup by name, text replacement, shape removal,
//!   hiding, and insertion of text boxes and pictures
//! - `shapes`: byte-span index over slide XML
//! - `writer`: DrawingML fragments for inserted shapes

pub mod format;
pub mod package;
pub mod shapes;
pub mod slide;
pub mod writer;

pub use format::{Geometry, ImageFormat, TextStyle};
pub use package::Deck;
pub use slide::SlideMut;
