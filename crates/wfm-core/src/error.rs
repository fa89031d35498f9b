//! Error types for the WFM dashboards

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading dashboard data or dispatching navigation
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration could not be loaded or failed validation
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message
        message: String,
    },

    /// Network or HTTP-level failure while calling a backend operation
    #[error("Remote call {operation} failed: {message}")]
    RemoteCall {
        /// Backend operation name
        operation: String,
        /// Error message
        message: String,
    },

    /// The backend answered with a JSON-RPC error object
    #[error("Backend rejected {operation}: {message}")]
    RemoteFault {
        /// Backend operation name
        operation: String,
        /// Server-side error message
        message: String,
    },

    /// The backend answered with a payload we could not decode
    #[error("Invalid response from {operation}: {message}")]
    InvalidResponse {
        /// Backend operation name
        operation: String,
        /// Decoding problem
        message: String,
    },

    /// Login against the backend was refused
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The injected action executor refused a descriptor
    #[error("Action execution failed: {message}")]
    ActionExecution {
        /// Error message
        message: String,
    },

    /// A navigation shortcut was requested on a dashboard that does not offer it
    #[error("Shortcut {shortcut} is not available on the {kind} dashboard")]
    UnsupportedShortcut {
        /// Requested shortcut
        shortcut: String,
        /// Dashboard variant
        kind: String,
    },

    /// A lifecycle method was called in the wrong state
    #[error("Invalid lifecycle transition: {message}")]
    InvalidLifecycle {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a transport-level remote call error
    pub fn remote_call(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RemoteCall {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a server-side fault error
    pub fn remote_fault(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RemoteFault {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create an invalid response error
    pub fn invalid_response(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create an action execution error
    pub fn action_execution(message: impl Into<String>) -> Self {
        Self::ActionExecution {
            message: message.into(),
        }
    }

    /// Create an invalid lifecycle error
    pub fn invalid_lifecycle(message: impl Into<String>) -> Self {
        Self::InvalidLifecycle {
            message: message.into(),
        }
    }

    /// Whether this error came from talking to the backend
    pub const fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::RemoteCall { .. } | Self::RemoteFault { .. } | Self::InvalidResponse { .. }
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::error::Error as StdError;

    #[test]
    fn test_remote_call_display() {
        let error = Error::remote_call("get_dashboard_data", "connection refused");
        assert_eq!(
            error.to_string(),
            "Remote call get_dashboard_data failed: connection refused"
        );
    }

    #[test]
    fn test_remote_fault_display() {
        let error = Error::remote_fault("get_visits_action", "Access Denied");
        assert_eq!(
            error.to_string(),
            "Backend rejected get_visits_action: Access Denied"
        );
    }

    #[test]
    fn test_unsupported_shortcut_display() {
        let error = Error::UnsupportedShortcut {
            shortcut: "clients".to_string(),
            kind: "basic".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Shortcut clients is not available on the basic dashboard"
        );
    }

    #[test]
    fn test_is_remote() {
        assert!(Error::remote_call("op", "x").is_remote());
        assert!(Error::remote_fault("op", "x").is_remote());
        assert!(Error::invalid_response("op", "x").is_remote());
        assert!(!Error::configuration("x").is_remote());
        assert!(!Error::Authentication("x".to_string()).is_remote());
        assert!(!Error::action_execution("x").is_remote());
    }

    #[test]
    fn test_serialization_error_source() {
        let json_error = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let error = Error::from(json_error);

        assert!(matches!(error, Error::Serialization(_)));
        assert!(error.source().is_some());
    }

    #[test]
    fn test_io_error_conversion() {
        let error = Error::from(io::Error::new(io::ErrorKind::NotFound, "wfm.toml"));
        assert!(error.to_string().starts_with("I/O error"));
        assert!(error.source().is_some());
    }
}
