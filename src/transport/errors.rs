//! # Transport Errors

use thiserror::Error;

use super::request::ResponseShape;
use crate::decode::DecodeError;

/// Result type for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

/// Request, response, and body-decoding failures
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request cannot be sent as built
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The transport could not complete the exchange
    #[error("request failed: {0}")]
    Connection(String),

    /// Non-success status after all retries
    #[error("request failed, status code: {status}, body: {body}")]
    Status { status: u16, body: String },

    /// Text body that is not UTF-8
    #[error("response body is not valid UTF-8: {0}")]
    NotUtf8(#[from] std::string::FromUtf8Error),

    /// The body was read with a different shape than the request declares
    #[error("request declares a {declared} response but it was read as {requested}")]
    ShapeMismatch {
        declared: ResponseShape,
        requested: ResponseShape,
    },

    /// The body did not strictly match the target record
    #[error("response body rejected: {0}")]
    Decode(#[from] DecodeError),
}

impl TransportError {
    /// Returns the HTTP status for status errors
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
