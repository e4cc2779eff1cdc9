use std::time::Duration;

use thiserror::Error;

use crate::domain::entities::dataset::ResultSet;
use crate::domain::entities::query::SqlStatement;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store cannot be reached at all.
    #[error("{0}")]
    Unavailable(String),
    /// The store rejected or failed this particular query.
    #[error("{0}")]
    QueryFailed(String),
    #[error("query exceeded {} ms", .0.as_millis())]
    Timeout(Duration),
}

/// Read-only aggregation service over the pageview event table.
pub trait EventStore: Send + Sync {
    /// Runs one statement and returns its rows with column names in
    /// result order.
    fn execute(&self, statement: &SqlStatement) -> Result<ResultSet, StoreError>;
}
