use std::sync::Mutex;

use crate::domain::entities::dataset::ResultSet;
use crate::domain::entities::query::SqlStatement;
use crate::usecase::ports::store::{EventStore, StoreError};

/// Canned store: answers the first registered fragment contained in the SQL.
pub struct FakeStore {
    responses: Vec<(String, Result<ResultSet, StoreError>)>,
    unavailable: Option<String>,
    executed: Mutex<Vec<SqlStatement>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self {
            responses: Vec::new(),
            unavailable: None,
            executed: Mutex::new(Vec::new()),
        }
    }

    pub fn unavailable(message: &str) -> Self {
        Self {
            unavailable: Some(message.to_string()),
            ..Self::new()
        }
    }

    pub fn with_result(mut self, fragment: &str, result: ResultSet) -> Self {
        self.responses.push((fragment.to_string(), Ok(result)));
        self
    }

    pub fn with_failure(mut self, fragment: &str, err: StoreError) -> Self {
        self.responses.push((fragment.to_string(), Err(err)));
        self
    }

    pub fn executed(&self) -> Vec<SqlStatement> {
        self.executed.lock().expect("executed lock").clone()
    }
}

impl EventStore for FakeStore {
    fn execute(&self, statement: &SqlStatement) -> Result<ResultSet, StoreError> {
        self.executed
            .lock()
            .expect("executed lock")
            .push(statement.clone());

        if let Some(message) = &self.unavailable {
            return Err(StoreError::Unavailable(message.clone()));
        }

        self.responses
            .iter()
            .find(|(fragment, _)| statement.sql.contains(fragment.as_str()))
            .map(|(_, result)| result.clone())
            .unwrap_or_else(|| {
                Err(StoreError::QueryFailed(format!(
                    "no canned result for: {}",
                    statement.sql
                )))
            })
    }
}
