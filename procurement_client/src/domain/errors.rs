use crate::domain::access::View;
use crate::domain::entities::Role;
use std::time::Duration;

// Failures surfaced by the API facade. Each failed call is isolated to its caller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("request timed out after {} ms", .0.as_millis())]
    TimedOut(Duration),
    // Display is the normalized problem message, unchanged.
    #[error("{message}")]
    Http { status: u16, message: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("failed to parse response body: {0}")]
    Parse(String),
    #[error("invalid request url: {0}")]
    InvalidUrl(String),
    #[error("failed to encode request body: {0}")]
    Encode(String),
}

impl ApiError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::TimedOut(_))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    // Text shown to the user in a notice.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::TimedOut(_) => "Request timed out. Please refresh and try again.".to_string(),
            ApiError::Http { message, .. } => message.clone(),
            ApiError::Network(_) => {
                "Network error. Check your connection and try again.".to_string()
            }
            ApiError::Parse(_) => "Unexpected response from the server.".to_string(),
            ApiError::InvalidUrl(err) | ApiError::Encode(err) => format!("Invalid request: {err}"),
        }
    }
}

// Form input rejected before submission.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("role {role} may not open {view}")]
pub struct AccessDenied {
    pub role: Role,
    pub view: View,
}
