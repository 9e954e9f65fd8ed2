//! Errors of the package container: ZIP members, part names and relationships.
use quick_xml::events::attributes::AttrError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpcError {
    #[error("Deck file not found: {0}")]
    PackageNotFound(String),

    #[error("Bad part name: {0}")]
    InvalidPackUri(String),

    #[error("Package has no part {0}")]
    PartNotFound(String),

    #[error("No relationship {0}")]
    RelationshipNotFound(String),

    /// A relationship whose target cannot be resolved inside the package
    #[error("Dangling relationship: {0}")]
    InvalidRelationship(String),

    #[error("Broken ZIP container: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Malformed package XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Malformed package XML attribute: {0}")]
    Attr(#[from] AttrError),

    #[error("Package part is not UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

pub type Result<T> = std::result::Result<T, OpcError>;
