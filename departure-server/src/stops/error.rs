//! Stop lookup error types.

use std::path::PathBuf;

/// Errors from resolving a free-text query to a stop identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// No gazetteer entry contains the query as a subsequence
    #[error("no stop matches {query:?}")]
    NotFound { query: String },

    /// The query matched a canonical name that has no identifier
    #[error("stop {name:?} has no configured identifier")]
    IdentifierNotConfigured { name: String },
}

/// Errors from loading the static stop data.
#[derive(Debug, thiserror::Error)]
pub enum StopDataError {
    /// Failed to read a data file
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The identifier map is not a valid `{ name: id }` object
    #[error("invalid identifier map: {0}")]
    Json(#[from] serde_json::Error),

    /// A table has no entries
    #[error("{0} is empty")]
    Empty(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ResolveError::NotFound {
            query: "xyz".into(),
        };
        assert_eq!(err.to_string(), "no stop matches \"xyz\"");

        let err = ResolveError::IdentifierNotConfigured {
            name: "Heumarkt".into(),
        };
        assert_eq!(
            err.to_string(),
            "stop \"Heumarkt\" has no configured identifier"
        );

        let err = StopDataError::Empty("gazetteer");
        assert_eq!(err.to_string(), "gazetteer is empty");
    }
}
