//! Error types for the completion transport and the history store.

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Failure reported by a completion backend.
///
/// Rotation decisions are made on [`TransportError::is_quota_exceeded`], never on the
/// rendered message.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The endpoint answered with a non-success HTTP status.
    #[error("completion endpoint returned {code}: {body}")]
    Status { code: u16, body: String },

    /// The request did not complete within the configured timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection or protocol failure before a status was received.
    #[error("network error: {0}")]
    Network(String),

    /// A success response that did not carry any generated text.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl TransportError {
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// True when the credential in use has run out of quota (HTTP 429).
    pub fn is_quota_exceeded(&self) -> bool {
        self.status() == Some(StatusCode::TOO_MANY_REQUESTS.as_u16())
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            TransportError::Status {
                code: status.as_u16(),
                body: err.to_string(),
            }
        } else if err.is_decode() {
            TransportError::Decode(err.to_string())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a [`crate::store::HistoryStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted slot holds something that is not a turn list.
    #[error("corrupt history: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("no data directory available")]
    NoDataDir,
}
