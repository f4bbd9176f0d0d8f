//! Model errors

use thiserror::Error;

use crate::model::Capability;

/// Result type for model operations.
pub type ModelResult<T> = std::result::Result<T, ModelError>;

/// Errors a wave model can report.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// The parameter document is not well-formed YAML (or not a mapping).
    #[error("unable to parse parameters: {0}")]
    Parse(String),

    /// The document is well-formed but a key is missing or holds a bad value.
    #[error(transparent)]
    InvalidParameter(#[from] ParameterError),

    /// The capability is not provided by this model.
    #[error("{0} is not implemented in this model.")]
    Unimplemented(Capability),

    /// The model failed while evaluating a point.
    #[error("computation failed: {0}")]
    Computation(String),
}

impl ModelError {
    pub fn computation(message: impl Into<String>) -> Self {
        Self::Computation(message.into())
    }

    /// The key a `MissingKey` error refers to, if this is one.
    pub fn missing_key(&self) -> Option<&str> {
        match self {
            ModelError::InvalidParameter(ParameterError::MissingKey { key }) => Some(key),
            _ => None,
        }
    }
}

/// Semantic problems with an otherwise well-formed parameter document.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    #[error("unable to find key '{key}' in the parameters")]
    MissingKey { key: String },

    #[error("key '{key}' has the wrong type: {message}")]
    WrongType { key: String, message: String },

    #[error("key '{key}' is out of range: {message}")]
    OutOfRange { key: String, message: String },
}

impl ParameterError {
    pub fn missing(key: impl Into<String>) -> Self {
        Self::MissingKey { key: key.into() }
    }

    pub fn out_of_range(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::OutOfRange {
            key: key.into(),
            message: message.into(),
        }
    }
}
