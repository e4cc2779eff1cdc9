use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use directories::ProjectDirs;

use crate::infra::sqlite::schema::DEFAULT_TABLE;

pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub db_path: PathBuf,
    pub table: String,
    pub query_timeout: Duration,
}

impl DashboardConfig {
    /// Fills unset values with defaults and checks the table name.
    pub fn resolve(
        db_path: Option<PathBuf>,
        table: Option<String>,
        query_timeout_ms: Option<u64>,
    ) -> Result<Self> {
        let db_path = match db_path {
            Some(path) => path,
            None => default_db_path()?,
        };
        let table = table.unwrap_or_else(|| DEFAULT_TABLE.to_string());
        validate_table(&table)?;
        let query_timeout = match query_timeout_ms {
            Some(0) => anyhow::bail!("query timeout must be greater than zero"),
            Some(ms) => Duration::from_millis(ms),
            None => DEFAULT_QUERY_TIMEOUT,
        };

        Ok(Self {
            db_path,
            table,
            query_timeout,
        })
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    let project_dirs = ProjectDirs::from("com", "pageview", "dashboard")
        .ok_or_else(|| anyhow!("unable to resolve data directory"))?;
    Ok(project_dirs.data_local_dir().join("pageviews.sqlite"))
}

fn validate_table(table: &str) -> Result<()> {
    if table.trim().is_empty() {
        anyhow::bail!("table name must not be empty")
    }
    if table.contains('\0') {
        anyhow::bail!("table name must not contain NUL")
    }
    Ok(())
}
