//! Error types for annotation model synthesis

use thiserror::Error;

/// Result type for annotation model operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for annotation model operations
#[derive(Error, Debug)]
pub enum Error {
    /// A schema field has no column translation (repeating nested group or
    /// unsupported field type).
    #[error("Invalid schema field: {0}")]
    InvalidSchemaField(String),

    #[error("Schema not found: {0}")]
    SchemaNotFound(String),

    #[error("Reference annotation error: {0}")]
    ReferenceError(String),

    #[error("Invalid identifier: {0}")]
    IdentifierError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::SerializationError(error.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(error: serde_yaml::Error) -> Self {
        Error::SerializationError(error.to_string())
    }
}

impl From<glob::PatternError> for Error {
    fn from(error: glob::PatternError) -> Self {
        Error::ConfigError(format!("Invalid schema path pattern: {}", error))
    }
}
