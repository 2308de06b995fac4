use std::error::Error as StdError;
use thiserror::Error;

use crate::validation::ValidationError;

/// Result type alias for Events API operations
pub type Result<T> = std::result::Result<T, EventsError>;

/// Errors that can occur when sending events
///
/// Rejections by the service itself (non-2xx status, `errors` in the body) are
/// not errors: they are returned in [`EventResponse`](crate::EventResponse).
#[derive(Debug, Error)]
pub enum EventsError {
    /// Failed to build HTTP client
    #[error("Failed to build HTTP client: {0}")]
    BuildHttpClient(#[source] reqwest::Error),

    /// Failed to start the runtime backing the blocking client
    #[error("Failed to build runtime: {0}")]
    Runtime(#[source] std::io::Error),

    /// The API base URL cannot be turned into an endpoint URL
    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Configuration could not be loaded
    #[error("Failed to load configuration: {0}")]
    Config(#[source] Box<figment::Error>),

    /// The event was rejected before anything was sent
    #[error("Invalid event: {0}")]
    Validation(#[from] ValidationError),

    /// HTTP request failed (DNS, TLS, connection, timeout)
    #[error("HTTP request failed: {0}")]
    Request(#[source] reqwest_middleware::Error),

    /// Failed to serialize the event
    #[error("Failed to serialize event: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The response body is not a valid Events API reply
    #[error("Failed to parse response (HTTP {status}): {source}")]
    Deserialize {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<figment::Error> for EventsError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl EventsError {
    /// Check if the error is a transient transport fault
    ///
    /// Returns `true` for connection and timeout errors. The library never
    /// retries on its own; this is a hint for callers.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Request(source) => {
                if let reqwest_middleware::Error::Reqwest(err) = source {
                    return err.is_connect() || err.is_timeout();
                }
                if let Some(reqwest_err) = StdError::source(source) {
                    if let Some(err) = reqwest_err.downcast_ref::<reqwest::Error>() {
                        return err.is_connect() || err.is_timeout();
                    }
                }
                false
            }
            _ => false,
        }
    }

    /// The validation failure, if the event never left the process
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_not_transient() {
        let error = EventsError::from(ValidationError::MissingSummary);
        assert!(!error.is_transient());
        assert_eq!(error.validation(), Some(&ValidationError::MissingSummary));
    }

    #[test]
    fn test_error_display() {
        let error = EventsError::from(ValidationError::MissingRoutingKey);
        assert_eq!(
            error.to_string(),
            "Invalid event: 'routing_key' must be defined"
        );
    }

    #[test]
    fn test_deserialize_error_not_transient() {
        let json_err = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        let error = EventsError::Deserialize {
            status: 502,
            body: "<html>".to_string(),
            source: json_err,
        };
        assert!(!error.is_transient());
        assert!(error.validation().is_none());
        assert!(error.to_string().starts_with("Failed to parse response (HTTP 502)"));
    }

    #[test]
    fn test_serialize_error_not_transient() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let error = EventsError::Serialize(json_err);
        assert!(!error.is_transient());
    }
}
