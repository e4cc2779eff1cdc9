use tracing::debug;

use crate::domain::entities::dimension::{Dimension, DimensionValue};
use crate::domain::entities::filter::FilterState;
use crate::domain::entities::query::{
    Aggregation, Predicate, QuerySpec, SortDirection, SortKey, SortSpec, SqlStatement, ViewKind,
};

pub const VIEWTIME_COLUMN: &str = "VIEWTIME";

/// The four queries of one refresh, all built from the same filter snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedQueries {
    pub activity_ranking: QuerySpec,
    pub viewtime_by_gender: QuerySpec,
    pub activity_by_gender: QuerySpec,
    pub viewtime_by_region: QuerySpec,
}

pub struct QueryComposer {
    table: String,
}

impl QueryComposer {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }

    pub fn compose(&self, filters: &FilterState) -> ComposedQueries {
        let gender_predicate = Predicate {
            dimension: Dimension::Gender,
            values: filters.genders.iter().cloned().collect(),
        };
        let region_predicate = Predicate {
            dimension: Dimension::Region,
            values: filters.regions.iter().cloned().collect(),
        };
        let viewtime = Aggregation::SumAsInteger(VIEWTIME_COLUMN);

        ComposedQueries {
            activity_ranking: QuerySpec {
                view: ViewKind::ActivityRanking,
                table: self.table.clone(),
                group_by: vec![Dimension::Activity],
                aggregation: Aggregation::Count,
                predicates: Vec::new(),
                order_by: vec![by_aggregate(SortDirection::Desc)],
            },
            viewtime_by_gender: QuerySpec {
                view: ViewKind::ViewtimeByGender,
                table: self.table.clone(),
                group_by: vec![Dimension::Gender],
                aggregation: viewtime,
                predicates: vec![gender_predicate.clone()],
                order_by: Vec::new(),
            },
            activity_by_gender: QuerySpec {
                view: ViewKind::ActivityByGender,
                table: self.table.clone(),
                group_by: vec![Dimension::Gender, Dimension::Activity],
                aggregation: Aggregation::Count,
                predicates: vec![gender_predicate],
                order_by: vec![
                    SortSpec {
                        key: SortKey::Dimension(Dimension::Gender),
                        direction: SortDirection::Asc,
                    },
                    by_aggregate(SortDirection::Desc),
                ],
            },
            viewtime_by_region: QuerySpec {
                view: ViewKind::ViewtimeByRegion,
                table: self.table.clone(),
                group_by: vec![Dimension::Region],
                aggregation: viewtime,
                predicates: vec![region_predicate],
                order_by: vec![by_aggregate(SortDirection::Desc)],
            },
        }
    }

    pub fn distinct(&self, dimension: Dimension) -> SqlStatement {
        SqlStatement {
            sql: format!(
                "SELECT DISTINCT {column}\nFROM {table}",
                column = quote_identifier(dimension.column()),
                table = quote_identifier(&self.table),
            ),
            params: Vec::new(),
        }
    }
}

fn by_aggregate(direction: SortDirection) -> SortSpec {
    SortSpec {
        key: SortKey::Aggregate,
        direction,
    }
}

/// Double-quotes an identifier, doubling any embedded quote.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Renders an equality-set predicate with numbered placeholders starting
/// after the `params` already bound. An empty set renders as `1 = 0`.
pub fn render_predicate(predicate: &Predicate, params: &mut Vec<DimensionValue>) -> String {
    if predicate.values.is_empty() {
        return "1 = 0".to_string();
    }

    let placeholders: Vec<String> = predicate
        .values
        .iter()
        .map(|value| {
            params.push(value.clone());
            format!("?{}", params.len())
        })
        .collect();

    format!(
        "{} IN ({})",
        quote_identifier(predicate.dimension.column()),
        placeholders.join(", ")
    )
}

fn render_aggregation(aggregation: Aggregation) -> String {
    let expr = match aggregation {
        Aggregation::Count => "COUNT(*)".to_string(),
        Aggregation::SumAsInteger(column) => {
            format!("SUM(CAST({} AS INTEGER))", quote_identifier(column))
        }
    };
    format!("{expr} AS {}", quote_identifier(aggregation.alias()))
}

pub fn render(spec: &QuerySpec) -> SqlStatement {
    let mut params = Vec::new();
    let groups: Vec<String> = spec
        .group_by
        .iter()
        .map(|dimension| quote_identifier(dimension.column()))
        .collect();

    let mut select_items = groups.clone();
    select_items.push(render_aggregation(spec.aggregation));

    let mut sql = format!(
        "SELECT {}\nFROM {}",
        select_items.join(", "),
        quote_identifier(&spec.table)
    );

    if !spec.predicates.is_empty() {
        let clauses: Vec<String> = spec
            .predicates
            .iter()
            .map(|predicate| render_predicate(predicate, &mut params))
            .collect();
        sql.push_str(&format!("\nWHERE {}", clauses.join(" AND ")));
    }

    if !groups.is_empty() {
        sql.push_str(&format!("\nGROUP BY {}", groups.join(", ")));
    }

    if !spec.order_by.is_empty() {
        let keys: Vec<String> = spec
            .order_by
            .iter()
            .map(|sort| {
                let column = match sort.key {
                    SortKey::Dimension(dimension) => quote_identifier(dimension.column()),
                    SortKey::Aggregate => quote_identifier(spec.aggregation.alias()),
                };
                let direction = match sort.direction {
                    SortDirection::Asc => "ASC",
                    SortDirection::Desc => "DESC",
                };
                format!("{column} {direction}")
            })
            .collect();
        sql.push_str(&format!("\nORDER BY {}", keys.join(", ")));
    }

    debug!(view = %spec.view, params = params.len(), sql = %sql, "composed query");
    SqlStatement { sql, params }
}
