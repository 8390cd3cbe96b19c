//! Error types for the clustering engine.

use thiserror::Error;

/// Errors raised by the clustering engine and the re-clustering pipeline.
#[derive(Debug, Error)]
pub enum ClusteringError {
    /// Input rejected before any fitting started.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// What was wrong with the input or configuration
        reason: String,
    },

    /// The numeric routine of the selected method failed.
    #[error("{method} fit failed: {cause}")]
    FitFailure {
        /// Method that was being fitted
        method: &'static str,
        /// Error raised by the tensor routine
        #[source]
        cause: numr::error::Error,
    },

    /// Filesystem failure while reading or writing pipeline files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed sentence table.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Malformed embeddings or stats JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClusteringError {
    /// Create an InvalidInput error.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Create a FitFailure error wrapping the tensor routine's error.
    pub fn fit_failure(method: &'static str, cause: numr::error::Error) -> Self {
        Self::FitFailure { method, cause }
    }
}

/// Result alias for engine operations.
pub type ClusteringResult<T> = std::result::Result<T, ClusteringError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display_carries_details() {
        let err = ClusteringError::invalid_input("row 3 has width 2, expected 4");
        assert!(err.to_string().contains("row 3"));

        let err = ClusteringError::fit_failure(
            "gmm",
            numr::error::Error::InvalidArgument {
                arg: "n_components",
                reason: "n_components=20 exceeds number of points 12".to_string(),
            },
        );
        let msg = err.to_string();
        assert!(msg.starts_with("gmm fit failed"));
        assert!(msg.contains("exceeds number of points 12"));
    }

    #[test]
    fn test_fit_failure_keeps_source() {
        let err = ClusteringError::fit_failure(
            "gmm",
            numr::error::Error::Internal("non-finite log-likelihood".to_string()),
        );
        let source = err.source().expect("fit failure has a source");
        assert!(source.to_string().contains("non-finite"));
        assert!(matches!(
            err,
            ClusteringError::FitFailure {
                cause: numr::error::Error::Internal(_),
                ..
            }
        ));
    }

    #[test]
    fn test_io_error_converts() {
        fn open_missing() -> ClusteringResult<std::fs::File> {
            Ok(std::fs::File::open("/nonexistent/weaklabel/input.csv")?)
        }
        assert!(matches!(open_missing(), Err(ClusteringError::Io(_))));
    }
}
