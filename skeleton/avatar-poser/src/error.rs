use std::io;
use thiserror::Error;

/// Error types for pose editing, catalog construction and export
#[derive(Error, Debug)]
pub enum PoserError {
    /// I/O Error during reading or writing
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The joint catalog is inconsistent
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Configuration value out of range or unreadable
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pose document could not be parsed or serialized
    #[error("Pose document error: {0}")]
    Document(#[from] serde_json::Error),

    /// A joint name that the catalog does not know
    #[error("Unknown joint: {0}")]
    UnknownJoint(String),
}

/// Result type using PoserError
pub type Result<T> = std::result::Result<T, PoserError>;
