//! Departure board error types.

/// Errors from fetching a departure board.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// HTTP request failed (connection, TLS, body read, ...)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("upstream returned status {status}")]
    Status { status: u16 },

    /// The request did not finish before its deadline
    #[error("upstream request exceeded its deadline")]
    DeadlineExceeded,

    /// The caller cancelled the request
    #[error("request cancelled")]
    Cancelled,

    /// The client could not be built from its configuration
    #[error("invalid client configuration: {0}")]
    Config(String),

    /// Mock board data could not be loaded
    #[error("mock board data: {0}")]
    Mock(String),
}

impl FetchError {
    /// True when the caller cancelled, as opposed to the upstream failing.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }
}

/// Errors from parsing a departure board document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The document has no departure table
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// The configured table selector is not valid CSS
    #[error("invalid table selector {selector:?}: {message}")]
    InvalidSelector { selector: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FetchError::Status { status: 503 };
        assert_eq!(err.to_string(), "upstream returned status 503");

        let err = FetchError::DeadlineExceeded;
        assert_eq!(err.to_string(), "upstream request exceeded its deadline");

        let err = ParseError::MalformedDocument("no departure table".into());
        assert_eq!(err.to_string(), "malformed document: no departure table");
    }

    #[test]
    fn only_cancelled_is_cancelled() {
        assert!(FetchError::Cancelled.is_cancelled());
        assert!(!FetchError::DeadlineExceeded.is_cancelled());
        assert!(!FetchError::Status { status: 500 }.is_cancelled());
    }
}
