//! Error types for document operations

use thiserror::Error;

/// Errors that can occur while loading, querying, mutating or saving a document
#[derive(Error, Debug)]
pub enum OdtError {
    /// Error reading or writing the ZIP container
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Error reading or writing files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Required entry not found in the container
    #[error("Required entry not found: {0}")]
    MissingEntry(String),

    /// Content stream is not well-formed markup
    #[error("Markup error: {0}")]
    Markup(#[from] odtkit_dom::DomError),

    /// Expected anchor or container node is absent
    #[error("Invalid document structure: {0}")]
    Structure(String),

    /// A name expected to be unique matched several nodes
    #[error("Ambiguous name '{name}': {count} matches")]
    Ambiguous {
        /// The looked-up name
        name: String,
        /// How many nodes carry it
        count: usize,
    },

    /// Write operation attempted outside write mode
    #[error("Operation requires write mode: {0}")]
    Mode(String),

    /// Destination copy requested but the backing file is gone
    #[error("Save source not found: {0}")]
    MissingSaveSource(String),

    /// Value type tag not in the supported set
    #[error("Unknown value type: {0}")]
    UnknownValueKind(String),

    /// Settings could not be parsed
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl OdtError {
    /// Whether this error comes from the container codec
    pub fn is_container_error(&self) -> bool {
        matches!(
            self,
            OdtError::Archive(_) | OdtError::Io(_) | OdtError::MissingEntry(_)
        )
    }
}

/// Result type for document operations
pub type Result<T> = std::result::Result<T, OdtError>;
