//! Filter-driven aggregation pipeline behind the pageview activity dashboard.
//!
//! A refresh discovers the gender and region catalogs, normalizes the
//! requested selection against them, composes four parameterized
//! aggregation queries, runs them against an [`EventStore`] and shapes each
//! result for its chart.

pub mod config;

pub mod domain {
    pub mod entities {
        pub mod dashboard;
        pub mod dataset;
        pub mod dimension;
        pub mod filter;
        pub mod magnitude;
        pub mod query;
    }
    pub mod error;
}

pub mod usecase {
    pub mod ports {
        pub mod store;
    }
    pub mod services {
        pub mod catalog_service;
        pub mod filter_service;
        pub mod query_composer;
        pub mod refresh_service;
        #[cfg(test)]
        pub mod testing;
        pub mod transform;
    }
}

pub mod infra {
    pub mod import {
        pub mod csv;
    }
    pub mod sqlite {
        pub mod schema;
        pub mod store;
    }
}

#[cfg(test)]
mod tests;

pub use config::DashboardConfig;
pub use domain::entities::dashboard::{Dashboard, View, ViewOutcome};
pub use domain::entities::dimension::{Catalog, Dimension, DimensionValue};
pub use domain::entities::filter::{FilterSelection, FilterState};
pub use domain::error::DashboardError;
pub use infra::sqlite::store::SqliteEventStore;
pub use usecase::ports::store::{EventStore, StoreError};
pub use usecase::services::refresh_service::RefreshService;
