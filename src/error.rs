//! Error types for influxdb-classic.

use thiserror::Error;

/// Error type for influxdb-classic operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Client configuration is invalid (malformed URL, unusable option
    /// combination). Fatal at construction time, never retryable.
    #[error("Invalid client configuration: {0}")]
    Configuration(String),

    /// Network-level failure while talking to the server. Potentially
    /// retryable by the caller.
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-2xx status. The body is preserved
    /// verbatim so callers can inspect the server's explanation.
    #[error("Server returned HTTP {status}: {body}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// A point (or point set) cannot be rendered in the target wire format.
    /// Caller bug, not retryable.
    #[error("Cannot format point: {0}")]
    Format(String),

    /// The response body had an unexpected shape. Usually a protocol version
    /// mismatch or a server-side change.
    #[error("Failed to parse response: {message}")]
    Parse {
        /// Description naming the offending field or column.
        message: String,
    },

    /// A row's arity did not match the declared columns.
    #[error("Column count mismatch: expected {expected}, got {actual}")]
    ColumnMismatch {
        /// Number of declared columns.
        expected: usize,
        /// Number of values found in the row.
        actual: usize,
    },

    /// The server accepted the request but rejected the statement, reporting
    /// the error inside a well-formed envelope.
    #[error("Query error from server: {message}")]
    Query {
        /// Error message returned by the server.
        message: String,
    },

    /// Failed to serialize a request payload to JSON.
    #[error("Failed to serialize payload: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for an [`Error::Format`].
    pub(crate) fn format<S: Into<String>>(message: S) -> Self {
        Self::Format(message.into())
    }

    /// Shorthand for an [`Error::Parse`].
    pub(crate) fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Returns true if retrying the same call may succeed.
    ///
    /// Only transport-level failures qualify; server rejections, malformed
    /// points and parse failures will fail again unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

/// Result type alias for influxdb-classic operations.
pub type Result<T> = std::result::Result<T, Error>;
