use thiserror::Error;

use crate::usecase::ports::store::StoreError;

/// Failures that abort a whole refresh, or that a single view reports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DashboardError {
    #[error("event store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("invalid dimension: {0}")]
    InvalidDimension(String),
    #[error("{scope} query failed: {message}")]
    QueryExecutionFailed { scope: String, message: String },
}

impl DashboardError {
    /// Maps a store failure onto the taxonomy, attributing query-level
    /// problems to `scope`.
    pub fn from_store(scope: impl Into<String>, err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(message) => DashboardError::StoreUnavailable(message),
            StoreError::QueryFailed(message) => DashboardError::QueryExecutionFailed {
                scope: scope.into(),
                message,
            },
            StoreError::Timeout(limit) => DashboardError::QueryExecutionFailed {
                scope: scope.into(),
                message: format!("timed out after {} ms", limit.as_millis()),
            },
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DashboardError::StoreUnavailable(_) | DashboardError::InvalidDimension(_)
        )
    }
}

/// A result set that cannot be shaped into its view's dataset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("result set has no column named {0}")]
    MissingColumn(String),
    #[error("row {row} has a non-numeric {column}: {raw}")]
    NonNumeric {
        row: usize,
        column: String,
        raw: String,
    },
    #[error("duplicate entry for {0}")]
    DuplicateEntry(String),
}
