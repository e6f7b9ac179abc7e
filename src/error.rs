use std::collections::BTreeMap;

use thiserror::Error;

/// Field name -> messages, as reported by the server or by local validation.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

pub const FALLBACK_MESSAGE: &str = "Something went wrong";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Validation error: {message}")]
    Validation { message: String, fields: FieldErrors },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Request failed ({status}): {message}")]
    Http { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Request rejected: {0}")]
    Api(String),

    #[error("Invalid input: {message}")]
    InvalidInput { message: String, fields: FieldErrors },
}

impl ClientError {
    /// Maps a non-success HTTP status and the server-provided message onto the taxonomy.
    pub fn from_status(status: u16, message: Option<String>, fields: FieldErrors) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_MESSAGE.to_string());

        match status {
            401 => ClientError::Unauthorized(message),
            404 => ClientError::NotFound(message),
            400 | 422 => ClientError::Validation { message, fields },
            500..=599 => ClientError::Server { status, message },
            _ => ClientError::Http { status, message },
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Unauthorized(_) => Some(401),
            ClientError::NotFound(_) => Some(404),
            ClientError::Server { status, .. } | ClientError::Http { status, .. } => Some(*status),
            ClientError::Validation { .. } => Some(400),
            _ => None,
        }
    }

    /// Human-readable text suitable for a transient notification.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Timeout => "The server took too long to respond".to_string(),
            ClientError::Network(_) => "Unable to reach the server".to_string(),
            ClientError::Decode(_) => FALLBACK_MESSAGE.to_string(),
            ClientError::Unauthorized(msg)
            | ClientError::NotFound(msg)
            | ClientError::Api(msg) => msg.clone(),
            ClientError::Validation { message, .. }
            | ClientError::InvalidInput { message, .. }
            | ClientError::Server { message, .. }
            | ClientError::Http { message, .. } => message.clone(),
        }
    }

    /// Field-level messages for inline form errors, if any.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ClientError::Validation { fields, .. } | ClientError::InvalidInput { fields, .. }
                if !fields.is_empty() =>
            {
                Some(fields)
            }
            _ => None,
        }
    }

    /// Whether the HTTP adapter already surfaced this error to the user.
    /// Only errors raised before a request leaves the client are not.
    pub fn was_surfaced(&self) -> bool {
        !matches!(self, ClientError::InvalidInput { .. })
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(err: validator::ValidationErrors) -> Self {
        let fields: FieldErrors = err
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let messages = errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("{} is invalid", field))
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();

        ClientError::InvalidInput {
            message: "Please fix the highlighted fields".to_string(),
            fields,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
