//! Error taxonomy for the validation widget
//!
//! "No record yet" is not an error and never appears here: the state store
//! returns `Ok(None)` for it. Everything below is a genuine failure that gets
//! logged where it happens and is then collapsed into one of the fixed
//! user-facing messages by the controller.

use thiserror::Error;

/// Failure of a single lookup against the host content API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteLookupError {
    #[error("{resource} request returned HTTP {status}: {reason}")]
    Status {
        resource: String,
        status: u16,
        reason: String,
    },

    #[error("{resource} request failed in transport: {message}")]
    Transport { resource: String, message: String },

    #[error("{resource} response is missing required field '{field}'")]
    MissingField { resource: String, field: String },

    #[error("{resource} response could not be decoded: {message}")]
    Decode { resource: String, message: String },
}

impl RemoteLookupError {
    pub fn status(resource: &str, status: u16, reason: impl Into<String>) -> Self {
        Self::Status {
            resource: resource.to_string(),
            status,
            reason: reason.into(),
        }
    }

    pub fn transport(resource: &str, message: impl Into<String>) -> Self {
        Self::Transport {
            resource: resource.to_string(),
            message: message.into(),
        }
    }

    pub fn missing_field(resource: &str, field: &str) -> Self {
        Self::MissingField {
            resource: resource.to_string(),
            field: field.to_string(),
        }
    }

    pub fn decode(resource: &str, message: impl Into<String>) -> Self {
        Self::Decode {
            resource: resource.to_string(),
            message: message.into(),
        }
    }

    /// True when the server answered, as opposed to the request never completing.
    pub const fn is_http_status(&self) -> bool {
        matches!(self, Self::Status { .. })
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WidgetError {
    #[error("remote lookup failed: {0}")]
    RemoteLookup(#[from] RemoteLookupError),

    #[error("storage operation failed: {message}")]
    Storage { message: String, key: String },

    #[error("notification delivery failed: {message}")]
    Notification { message: String },
}

impl WidgetError {
    pub fn storage(key: &str, message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            key: key.to_string(),
        }
    }

    pub fn notification(message: impl Into<String>) -> Self {
        Self::Notification {
            message: message.into(),
        }
    }

    /// Short category label used in log lines.
    pub const fn category(&self) -> &'static str {
        match self {
            Self::RemoteLookup(_) => "remote_lookup",
            Self::Storage { .. } => "storage",
            Self::Notification { .. } => "notification",
        }
    }
}

pub type WidgetResult<T> = Result<T, WidgetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_lookup_converts_into_widget_error() {
        let err: WidgetError = RemoteLookupError::status("user", 404, "Not Found").into();
        assert_eq!(err.category(), "remote_lookup");
        assert_eq!(
            err.to_string(),
            "remote lookup failed: user request returned HTTP 404: Not Found"
        );
    }

    #[test]
    fn test_status_and_transport_are_distinguished() {
        assert!(RemoteLookupError::status("page", 500, "boom").is_http_status());
        assert!(!RemoteLookupError::transport("page", "connection refused").is_http_status());
    }
}
