//! Error types for tree parsing and serialization

use thiserror::Error;

/// Errors that can occur while building or writing a tree
#[derive(Error, Debug)]
pub enum DomError {
    /// Error reported by the XML reader
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Malformed attribute on an element
    #[error("XML attribute error: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    /// Error writing serialized output
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialized output was not valid UTF-8
    #[error("Encoding error: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    /// The input parsed but does not form a single-rooted tree
    #[error("Malformed document: {0}")]
    Malformed(String),

    /// Node id issued by another tree, or by this tree before a reparse
    #[error("Node does not belong to this tree")]
    StaleNode,
}

/// Result type for tree operations
pub type Result<T> = std::result::Result<T, DomError>;
