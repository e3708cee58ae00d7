//! Error types for service username resolution.
//!
//! All errors are strongly typed and propagated without panicking.
//! Salt material is never included in error messages.

/// Resolution error types covering all operations.
#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Principal is missing required attribute: {attribute}")]
    MissingAttribute { attribute: String },

    #[error("No registered service matches: {0}")]
    ServiceNotFound(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, ResolutionError>;
