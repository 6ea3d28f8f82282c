//! Backend client errors

use cc_common::validation::ValidationError;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Result type for backend calls
pub type StoreResult<T> = Result<T, StoreError>;

/// Backend client errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Request never produced a response
    #[error("Network error: {0}")]
    Network(String),

    /// Backend answered with a non-2xx status
    #[error("Backend error {status}: {message}")]
    Api {
        status: u16,
        message: String,
        /// Field-level errors, e.g. `{"name": {"code": "validation_required", ...}}`
        data: Value,
    },

    /// Response body did not match the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Operation needs a signed-in user
    #[error("User not authenticated")]
    NotAuthenticated,

    /// Rejected locally; nothing was sent
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Realtime connection failed or closed
    #[error("Realtime error: {0}")]
    Realtime(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StoreError::Parse(err.to_string())
        } else {
            StoreError::Network(err.to_string())
        }
    }
}

/// Error body the backend sends with non-2xx responses
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Value,
}

impl StoreError {
    /// HTTP status of a backend error
    pub fn status(&self) -> Option<u16> {
        match self {
            StoreError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Validation code the backend attached to a field, if any
    pub fn field_error_code(&self, field: &str) -> Option<&str> {
        match self {
            StoreError::Api { data, .. } => data.get(field)?.get("code")?.as_str(),
            _ => None,
        }
    }

    /// Message shown to the user when creating an item fails
    pub fn item_create_message(&self) -> String {
        match self {
            StoreError::Validation(e) => e.to_string(),
            _ if self.field_error_code("name") == Some("validation_required") => {
                "Item name is required".to_string()
            }
            _ if self.status() == Some(400) => {
                "Failed to create item. Please check your information.".to_string()
            }
            _ => "Failed to create item. Please try again.".to_string(),
        }
    }
}
