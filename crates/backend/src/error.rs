use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// The backend operation that failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Sending a user message.
    SendMessage,
    /// Fetching the list of supported intents.
    FetchIntents,
}

/// The error returned by a backend when a request could not be completed.
///
/// Transport failures, non-2xx statuses and malformed payloads all collapse
/// into this one type. Adapters log the underlying detail and drop it, so
/// callers never have to tell a network failure from a server error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AdapterError {
    operation: Operation,
}

impl AdapterError {
    /// Creates an error for the failed operation.
    #[inline]
    pub fn new(operation: Operation) -> Self {
        Self { operation }
    }

    /// Returns the operation that failed.
    #[inline]
    pub fn operation(&self) -> Operation {
        self.operation
    }
}

impl Display for AdapterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.operation {
            Operation::SendMessage => {
                "failed to send message to chatbot".fmt(f)
            }
            Operation::FetchIntents => {
                "failed to fetch available intents".fmt(f)
            }
        }
    }
}

impl Error for AdapterError {}

/// The error returned when a backend cannot be constructed from its
/// configuration.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConfigError {
    /// No endpoint was given.
    MissingEndpoint,
    /// The endpoint is not a usable http(s) URL.
    InvalidEndpoint(String),
    /// No authorization token was given.
    MissingToken,
    /// The underlying client could not be created.
    Client(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingEndpoint => "endpoint is required".fmt(f),
            ConfigError::InvalidEndpoint(reason) => {
                write!(f, "invalid endpoint: {reason}")
            }
            ConfigError::MissingToken => {
                "authorization token is required".fmt(f)
            }
            ConfigError::Client(reason) => {
                write!(f, "failed to create client: {reason}")
            }
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_error_hides_detail() {
        let err = AdapterError::new(Operation::SendMessage);
        assert_eq!(err.to_string(), "failed to send message to chatbot");
        assert_eq!(err.operation(), Operation::SendMessage);

        let err = AdapterError::new(Operation::FetchIntents);
        assert_eq!(err.to_string(), "failed to fetch available intents");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidEndpoint("unsupported scheme".into());
        assert_eq!(err.to_string(), "invalid endpoint: unsupported scheme");
        assert_eq!(
            ConfigError::MissingToken.to_string(),
            "authorization token is required"
        );
    }
}
