use std::collections::BTreeSet;

use serde::Serialize;

use crate::domain::entities::dimension::{Dimension, DimensionValue};

/// What the UI asked for. `None` means "everything in the catalog".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub genders: Option<Vec<DimensionValue>>,
    pub regions: Option<Vec<DimensionValue>>,
}

impl FilterSelection {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn requested(&self, dimension: Dimension) -> Option<&[DimensionValue]> {
        match dimension {
            Dimension::Gender => self.genders.as_deref(),
            Dimension::Region => self.regions.as_deref(),
            Dimension::Activity => None,
        }
    }
}

/// Normalized selections, each a subset of its catalog. Empty means
/// "match nothing", never "match everything".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterState {
    pub genders: BTreeSet<DimensionValue>,
    pub regions: BTreeSet<DimensionValue>,
}
