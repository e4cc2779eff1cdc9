use std::collections::BTreeSet;

use tracing::debug;

use crate::domain::entities::dimension::{Catalog, Dimension, DimensionValue};
use crate::domain::entities::filter::{FilterSelection, FilterState};
use crate::domain::error::DashboardError;

/// Intersects a requested selection with the catalog. Values the store no
/// longer holds are dropped; `None` selects the whole catalog.
pub fn normalize(
    dimension: Dimension,
    requested: Option<&[DimensionValue]>,
    catalog: &Catalog,
) -> Result<BTreeSet<DimensionValue>, DashboardError> {
    let dimension = dimension.ensure_filterable()?;
    if catalog.dimension != dimension {
        return Err(DashboardError::InvalidDimension(format!(
            "{dimension} selection checked against {} catalog",
            catalog.dimension
        )));
    }

    let Some(requested) = requested else {
        return Ok(catalog.to_set());
    };

    let mut selected = BTreeSet::new();
    for value in requested {
        if let Some(entry) = catalog.resolve(value) {
            selected.insert(entry.clone());
        } else {
            debug!(%dimension, %value, "dropping selection missing from catalog");
        }
    }
    Ok(selected)
}

pub fn build_filter_state(
    selection: &FilterSelection,
    genders: &Catalog,
    regions: &Catalog,
) -> Result<FilterState, DashboardError> {
    Ok(FilterState {
        genders: normalize(
            Dimension::Gender,
            selection.requested(Dimension::Gender),
            genders,
        )?,
        regions: normalize(
            Dimension::Region,
            selection.requested(Dimension::Region),
            regions,
        )?,
    })
}
