//! Server-side errors and their mapping onto status codes.

use thiserror::Error;
use waves_model::{ModelError, parameters::top_level_keys, suggestion};

use crate::protocol::StatusCode;

/// Problems with the shape of a batched request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("coordinate sequences must have equal lengths, got {}", format_lengths(.lengths))]
    ArgumentMismatch { lengths: Vec<(&'static str, usize)> },
}

fn format_lengths(lengths: &[(&'static str, usize)]) -> String {
    lengths
        .iter()
        .map(|(name, len)| format!("len({})={}", name, len))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Check that all named coordinate sequences have the same length.
///
/// Returns that common length.
pub fn common_length(lengths: &[(&'static str, usize)]) -> Result<usize, GridError> {
    let n = lengths.first().map_or(0, |(_, len)| *len);
    if lengths.iter().all(|(_, len)| *len == n) {
        Ok(n)
    } else {
        Err(GridError::ArgumentMismatch {
            lengths: lengths.to_vec(),
        })
    }
}

/// A failed call, ready to be put on the wire.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{status}: {message}")]
pub struct RpcError {
    pub status: StatusCode,
    pub message: String,
}

impl RpcError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(StatusCode::InvalidArgument, message)
    }

    pub fn unimplemented(message: impl Into<String>) -> Self {
        Self::new(StatusCode::Unimplemented, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::Internal, message)
    }

    /// Map an error raised while querying the model.
    pub fn from_query(error: ModelError) -> Self {
        match error {
            ModelError::Unimplemented(_) => Self::unimplemented(error.to_string()),
            other => Self::new(StatusCode::Unknown, other.to_string()),
        }
    }

    /// Map an error raised while configuring the model with `raw`.
    ///
    /// A missing key gets a suggestion drawn from the keys `raw` does have.
    pub fn from_configuration(error: ModelError, raw: &str) -> Self {
        if let Some(key) = error.missing_key() {
            return Self::invalid_argument(format!(
                "Unable to find key '{}' in the YAML. {}",
                key,
                suggestion(top_level_keys(raw), key)
            ));
        }
        match error {
            ModelError::Unimplemented(_) => Self::unimplemented(error.to_string()),
            other => Self::invalid_argument(other.to_string()),
        }
    }
}

impl From<GridError> for RpcError {
    fn from(error: GridError) -> Self {
        Self::invalid_argument(error.to_string())
    }
}
