//! Office Open XML (OOXML) support, limited to editing PowerPoint decks.
//!
//! # Architecture
//!
//! 1. **OPC Layer** (`opc`): package handling (ZIP, parts, relationships,
//!    content types)
//! 2. **Errors** (`error`): presentation-level error type wrapping OPC errors
//! 3. **PresentationML** (`pptx`): slide order and named-shape editing
//!
//! # Example
//!
//! ```rust,no_run
//! use signdeck::ooxml::pptx::Deck;
//!
//! let mut deck = Deck::open("DisplayFinal.pptx")?;
//! let mut slide = deck.slide_mut(2)?;
//! println!("{:?}", slide.shape_text("FactBox")?);
//! slide.remove_shapes("FactImage")?;
//! deck.save("DisplayFinal.pptx")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub mod error;
pub mod opc;
pub mod pptx;

// Re-export commonly used types from OPC layer
pub use opc::{OpcPackage, PackURI};

// Re-export error types
pub use error::{OoxmlError, Result};
