/// Client error types
///
/// A non-2xx response is decoded into [`ErrorResponse`] when the server sent
/// its usual JSON error shape, so callers can show per-field validation
/// messages.

use reqwest::StatusCode;
use taskboard_shared::resources::ErrorResponse;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Server answered with an error status
    #[error("API error ({status}): {}", api_message(.body))]
    Api {
        status: StatusCode,
        body: Option<ErrorResponse>,
    },

    /// Request never produced a response, or the response could not be decoded
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Call needs a session token but none is held
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    #[error("Token storage error: {0}")]
    Storage(#[from] StorageError),
}

fn api_message(body: &Option<ErrorResponse>) -> &str {
    body.as_ref().map_or("no error body", |b| b.message.as_str())
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status(),
            _ => None,
        }
    }

    /// Validation messages for one field, empty unless this is a 422
    pub fn field_errors(&self, field: &str) -> Vec<&str> {
        match self {
            ClientError::Api { body: Some(body), .. } => body
                .details
                .iter()
                .filter(|d| d.field == field)
                .map(|d| d.message.as_str())
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

/// Token persistence failures
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt token file: {0}")]
    Format(#[from] serde_json::Error),

    #[error("Session lock poisoned")]
    Poisoned,
}

pub type ClientResult<T> = Result<T, ClientError>;
