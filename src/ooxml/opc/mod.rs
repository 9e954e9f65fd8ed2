//! Open Packaging Conventions (OPC) layer.
//!
//! Just enough of OPC to edit an existing package in
//! place:
//!
//! - ZIP-based physical packaging, members kept raw in archive order
//! - Relationship parts (`.rels`), resolved and rewritten on demand
//! - Content type management (`[Content_Types].xml`)
//! - Atomic save through a sibling temporary file

pub mod constants;
pub mod content_types;
pub mod error;
pub mod package;
pub mod packuri;
pub mod phys_pkg;
pub mod rel;

// Re-export commonly used types
pub use content_types::ContentTypes;
pub use package::OpcPackage;
pub use packuri::PackURI;
pub use rel::{Relationship, Relationships};
