//! Error types for thinkorm

use thiserror::Error;

/// Result type alias for thinkorm operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for statement building
#[derive(Debug, Error)]
pub enum OrmError {
    /// A composite primary key component is absent from the identity data
    #[error("Missing composite primary key data for column '{column}'")]
    MissingCompositeKeyData { column: String },

    /// Invalid declarative input recorded while accumulating a statement
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl OrmError {
    /// Create a missing composite key error for a specific column
    pub fn missing_composite_key(column: impl Into<String>) -> Self {
        Self::MissingCompositeKeyData {
            column: column.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// The bare message, without the variant's display prefix.
    pub fn into_message(self) -> String {
        match self {
            Self::Validation(m) | Self::Serialization(m) | Self::Other(m) => m,
            other => other.to_string(),
        }
    }

    /// Check if this is a missing composite key error
    pub fn is_missing_composite_key(&self) -> bool {
        matches!(self, Self::MissingCompositeKeyData { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<serde_json::Error> for OrmError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
