use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::domain::entities::dimension::{Catalog, Dimension};
use crate::domain::error::DashboardError;
use crate::usecase::ports::store::EventStore;
use crate::usecase::services::query_composer::QueryComposer;

pub struct CatalogService {
    store: Arc<dyn EventStore>,
    composer: Arc<QueryComposer>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn EventStore>, composer: Arc<QueryComposer>) -> Self {
        Self { store, composer }
    }

    /// Distinct values currently present for a filterable dimension.
    pub fn catalog(&self, dimension: Dimension) -> Result<Catalog, DashboardError> {
        let dimension = dimension.ensure_filterable()?;
        let statement = self.composer.distinct(dimension);
        let result = self
            .store
            .execute(&statement)
            .map_err(|err| DashboardError::from_store(format!("{dimension} catalog"), err))?;

        let mut seen = HashSet::new();
        let mut values = Vec::with_capacity(result.rows.len());
        let mut skipped_nulls = 0_usize;
        for row in &result.rows {
            match row.first().and_then(|cell| cell.to_dimension_value()) {
                Some(value) => {
                    if seen.insert(value.clone()) {
                        values.push(value);
                    }
                }
                None => skipped_nulls += 1,
            }
        }

        debug!(%dimension, values = values.len(), skipped_nulls, "loaded catalog");
        Ok(Catalog { dimension, values })
    }
}
