use std::sync::Arc;

use chrono::Local;
use tracing::{info, warn};

use crate::domain::entities::dashboard::{last_update_label, Dashboard, View, ViewOutcome};
use crate::domain::entities::dataset::{PivotTable, ResultSet};
use crate::domain::entities::dimension::Dimension;
use crate::domain::entities::filter::{FilterSelection, FilterState};
use crate::domain::entities::query::QuerySpec;
use crate::domain::error::{DashboardError, TransformError};
use crate::usecase::ports::store::EventStore;
use crate::usecase::services::catalog_service::CatalogService;
use crate::usecase::services::filter_service::build_filter_state;
use crate::usecase::services::query_composer::{render, QueryComposer};
use crate::usecase::services::transform;

pub trait ViewData {
    fn is_empty(&self) -> bool;
}

impl<T> ViewData for Vec<T> {
    fn is_empty(&self) -> bool {
        Vec::is_empty(self)
    }
}

impl ViewData for PivotTable {
    fn is_empty(&self) -> bool {
        PivotTable::is_empty(self)
    }
}

/// One full, stateless recomputation of the dashboard per call.
pub struct RefreshService {
    store: Arc<dyn EventStore>,
    composer: Arc<QueryComposer>,
    catalogs: CatalogService,
}

impl RefreshService {
    pub fn new(store: Arc<dyn EventStore>, table: impl Into<String>) -> Self {
        let composer = Arc::new(QueryComposer::new(table));
        Self {
            catalogs: CatalogService::new(store.clone(), composer.clone()),
            store,
            composer,
        }
    }

    pub fn catalogs(&self) -> &CatalogService {
        &self.catalogs
    }

    /// Catalog lookups plus normalization of the requested selection.
    pub fn filter_state(&self, selection: &FilterSelection) -> Result<FilterState, DashboardError> {
        let genders = self.catalogs.catalog(Dimension::Gender)?;
        let regions = self.catalogs.catalog(Dimension::Region)?;
        build_filter_state(selection, &genders, &regions)
    }

    pub fn refresh(&self, selection: &FilterSelection) -> Result<Dashboard, DashboardError> {
        let filters = self.filter_state(selection)?;
        self.refresh_with(filters)
    }

    /// Runs the four views against an already-normalized filter snapshot.
    /// Store outages abort; any other view failure is kept on that view.
    pub fn refresh_with(&self, filters: FilterState) -> Result<Dashboard, DashboardError> {
        let queries = self.composer.compose(&filters);

        let activity_ranking = self.run_view(&queries.activity_ranking, transform::ranking)?;
        let viewtime_by_gender = self.run_view(&queries.viewtime_by_gender, |result| {
            transform::proportion(result, &filters.genders)
        })?;
        let activity_by_gender = self.run_view(&queries.activity_by_gender, transform::pivot)?;
        let viewtime_by_region = self.run_view(&queries.viewtime_by_region, |result| {
            transform::hierarchy(result, &filters.regions)
        })?;

        let generated_at = Local::now();
        let dashboard = Dashboard {
            last_update: last_update_label(&generated_at),
            generated_at,
            filters,
            activity_ranking,
            viewtime_by_gender,
            activity_by_gender,
            viewtime_by_region,
        };

        info!(
            genders = dashboard.filters.genders.len(),
            regions = dashboard.filters.regions.len(),
            failed = dashboard.failed_views().len(),
            "dashboard refreshed"
        );
        Ok(dashboard)
    }

    fn run_view<T, F>(&self, spec: &QuerySpec, shape: F) -> Result<View<T>, DashboardError>
    where
        T: ViewData,
        F: FnOnce(&ResultSet) -> Result<T, TransformError>,
    {
        let statement = render(spec);
        let outcome = match self.store.execute(&statement) {
            Ok(result) => match shape(&result) {
                Ok(data) if data.is_empty() => ViewOutcome::Empty,
                Ok(data) => ViewOutcome::Ready { data },
                Err(err) => {
                    warn!(view = %spec.view, error = %err, "view result could not be shaped");
                    ViewOutcome::Failed {
                        error: err.to_string(),
                    }
                }
            },
            Err(err) => {
                let err = DashboardError::from_store(spec.view.key(), err);
                if err.is_fatal() {
                    return Err(err);
                }
                warn!(view = %spec.view, error = %err, "view query failed");
                ViewOutcome::Failed {
                    error: err.to_string(),
                }
            }
        };
        Ok(View::new(spec.view, outcome))
    }
}
