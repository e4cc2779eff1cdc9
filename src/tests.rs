use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rusqlite::{params, Connection};

use crate::domain::entities::query::{QuerySpec, ViewKind};
use crate::infra::import::csv::import_events_csv;
use crate::infra::sqlite::schema::init_db;
use crate::usecase::services::query_composer::{render, QueryComposer};
use crate::*;

const TABLE: &str = "PageviewActivity_REALTIME";

fn unique_test_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("pageview-{prefix}-{nanos}"))
}

fn seed_events(db_path: &Path, events: &[(&str, &str, &str, &str)]) {
    init_db(db_path, TABLE).expect("init_db should succeed");
    let conn = Connection::open(db_path).expect("should open sqlite db");
    for (gender, region, activity, viewtime) in events {
        conn.execute(
            &format!(
                "INSERT INTO \"{TABLE}\"(GENDER, REGIONID, ACTIVITY, VIEWTIME) VALUES (?1, ?2, ?3, ?4)"
            ),
            params![gender, region, activity, viewtime],
        )
        .expect("should insert event");
    }
}

fn sample_events() -> Vec<(&'static str, &'static str, &'static str, &'static str)> {
    vec![
        ("MALE", "Region_1", "view", "100"),
        ("MALE", "Region_1", "click", "20"),
        ("MALE", "Region_2", "view", "15000000"),
        ("FEMALE", "Region_2", "view", "95"),
        ("FEMALE", "Region_3", "scroll", "400"),
        ("OTHER", "Region_3", "view", "7"),
    ]
}

fn service_for(db_path: &Path) -> RefreshService {
    let store = SqliteEventStore::new(db_path.to_path_buf(), Duration::from_secs(5));
    RefreshService::new(Arc::new(store), TABLE)
}

fn text_set(values: &[&str]) -> BTreeSet<DimensionValue> {
    values.iter().map(|v| DimensionValue::text(*v)).collect()
}

#[test]
fn init_db_creates_event_table() {
    let temp_dir = unique_test_dir("init-db");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let db_path = temp_dir.join("events.sqlite");

    let result = init_db(&db_path, TABLE);

    assert!(result.is_ok(), "init_db should succeed: {result:?}");

    let conn = Connection::open(&db_path).expect("should open sqlite db");
    let table_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [TABLE],
            |row| row.get(0),
        )
        .expect("table count query should succeed");

    assert_eq!(table_count, 1, "event table should exist");

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn catalog_lists_distinct_values_from_store() {
    let temp_dir = unique_test_dir("catalog");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let db_path = temp_dir.join("events.sqlite");
    seed_events(&db_path, &sample_events());

    let service = service_for(&db_path);
    let genders = service
        .catalogs()
        .catalog(Dimension::Gender)
        .expect("gender catalog should load");

    assert_eq!(genders.to_set(), text_set(&["MALE", "FEMALE", "OTHER"]));
    assert_eq!(genders.values.len(), 3);

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn refresh_against_sqlite_builds_all_views() {
    let temp_dir = unique_test_dir("refresh");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let db_path = temp_dir.join("events.sqlite");
    seed_events(&db_path, &sample_events());

    let dashboard = service_for(&db_path)
        .refresh(&FilterSelection::all())
        .expect("refresh should succeed");

    assert!(dashboard.failed_views().is_empty());

    let ranking = dashboard
        .activity_ranking
        .outcome
        .data()
        .expect("ranking should be ready");
    assert_eq!(ranking[0].activity, DimensionValue::text("view"));
    assert_eq!(ranking[0].count, 4);

    let proportion = dashboard
        .viewtime_by_gender
        .outcome
        .data()
        .expect("proportion should be ready");
    let male = proportion
        .iter()
        .find(|row| row.gender == DimensionValue::text("MALE"))
        .expect("MALE row");
    assert_eq!(male.total_viewtime, 15_000_120);

    let pivot = dashboard
        .activity_by_gender
        .outcome
        .data()
        .expect("pivot should be ready");
    assert_eq!(pivot.get(&"MALE".into(), &"view".into()), Some(2));
    assert_eq!(pivot.get(&"FEMALE".into(), &"click".into()), Some(0));
    assert_eq!(pivot.get(&"OTHER".into(), &"view".into()), Some(1));

    let tiles = dashboard
        .viewtime_by_region
        .outcome
        .data()
        .expect("hierarchy should be ready");
    let order: Vec<String> = tiles.iter().map(|row| row.region.to_string()).collect();
    assert_eq!(order, vec!["Region_1", "Region_3", "Region_2"]);
    assert_eq!(tiles[2].label.to_string(), "15.00M");

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn removing_a_gender_removes_it_from_gender_views_only() {
    let temp_dir = unique_test_dir("remove-gender");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let db_path = temp_dir.join("events.sqlite");
    seed_events(&db_path, &sample_events());

    let selection = FilterSelection {
        genders: Some(vec!["MALE".into(), "OTHER".into()]),
        regions: None,
    };
    let dashboard = service_for(&db_path)
        .refresh(&selection)
        .expect("refresh should succeed");

    let proportion = dashboard
        .viewtime_by_gender
        .outcome
        .data()
        .expect("proportion should be ready");
    assert!(proportion
        .iter()
        .all(|row| row.gender != DimensionValue::text("FEMALE")));
    assert_eq!(proportion.len(), 2);

    let pivot = dashboard
        .activity_by_gender
        .outcome
        .data()
        .expect("pivot should be ready");
    assert!(!pivot.row_keys.contains(&DimensionValue::text("FEMALE")));
    assert!(!pivot.column_keys.contains(&DimensionValue::text("scroll")));

    let ranking = dashboard
        .activity_ranking
        .outcome
        .data()
        .expect("ranking should be ready");
    assert!(ranking
        .iter()
        .any(|row| row.activity == DimensionValue::text("scroll")));

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn empty_selection_yields_empty_views_not_errors() {
    let temp_dir = unique_test_dir("empty-selection");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let db_path = temp_dir.join("events.sqlite");
    seed_events(&db_path, &sample_events());

    let selection = FilterSelection {
        genders: Some(Vec::new()),
        regions: Some(Vec::new()),
    };
    let dashboard = service_for(&db_path)
        .refresh(&selection)
        .expect("refresh should succeed");

    assert_eq!(dashboard.viewtime_by_gender.outcome, ViewOutcome::Empty);
    assert_eq!(dashboard.activity_by_gender.outcome, ViewOutcome::Empty);
    assert_eq!(dashboard.viewtime_by_region.outcome, ViewOutcome::Empty);
    assert!(dashboard.activity_ranking.outcome.data().is_some());

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn quote_in_selected_value_does_not_break_query() {
    let temp_dir = unique_test_dir("quoted-value");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let db_path = temp_dir.join("events.sqlite");
    seed_events(
        &db_path,
        &[("O'NEIL", "Region_1", "view", "10"), ("MALE", "Region_1", "view", "5")],
    );

    let dashboard = service_for(&db_path)
        .refresh(&FilterSelection {
            genders: Some(vec!["O'NEIL".into()]),
            regions: None,
        })
        .expect("refresh should succeed");

    let proportion = dashboard
        .viewtime_by_gender
        .outcome
        .data()
        .expect("proportion should be ready");
    assert_eq!(proportion.len(), 1);
    assert_eq!(proportion[0].total_viewtime, 10);

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn full_catalog_selection_matches_unfiltered_query() {
    let temp_dir = unique_test_dir("round-trip");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let db_path = temp_dir.join("events.sqlite");
    seed_events(&db_path, &sample_events());

    let service = service_for(&db_path);
    let filters = service
        .filter_state(&FilterSelection::all())
        .expect("filters should build");
    let composer = QueryComposer::new(TABLE);
    let filtered = composer.compose(&filters).viewtime_by_region;
    let unfiltered = QuerySpec {
        predicates: Vec::new(),
        ..filtered.clone()
    };

    let store = SqliteEventStore::new(db_path.clone(), Duration::from_secs(5));
    let with_filter = store
        .execute(&render(&filtered))
        .expect("filtered query should run");
    let without_filter = store
        .execute(&render(&unfiltered))
        .expect("unfiltered query should run");

    assert_eq!(with_filter, without_filter);

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn non_numeric_viewtime_is_cast_not_fatal() {
    let temp_dir = unique_test_dir("cast");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let db_path = temp_dir.join("events.sqlite");
    seed_events(
        &db_path,
        &[
            ("MALE", "Region_1", "view", "120"),
            ("MALE", "Region_1", "view", "n/a"),
            ("FEMALE", "Region_2", "view", "95"),
        ],
    );

    let dashboard = service_for(&db_path)
        .refresh(&FilterSelection::all())
        .expect("refresh should succeed");

    assert!(dashboard.failed_views().is_empty());
    let tiles = dashboard
        .viewtime_by_region
        .outcome
        .data()
        .expect("hierarchy should be ready");
    let region_1 = tiles
        .iter()
        .find(|row| row.region == DimensionValue::text("Region_1"))
        .expect("Region_1 tile");
    assert_eq!(region_1.total_viewtime, 120);

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn text_region_selection_filters_integer_region_column() {
    let temp_dir = unique_test_dir("integer-region");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let db_path = temp_dir.join("events.sqlite");
    let conn = Connection::open(&db_path).expect("should open sqlite db");
    conn.execute_batch(&format!(
        "CREATE TABLE \"{TABLE}\" (GENDER TEXT, REGIONID INTEGER, ACTIVITY TEXT, VIEWTIME INTEGER);
         INSERT INTO \"{TABLE}\" VALUES ('MALE', 1, 'view', 100);
         INSERT INTO \"{TABLE}\" VALUES ('FEMALE', 1, 'click', 20);
         INSERT INTO \"{TABLE}\" VALUES ('FEMALE', 2, 'view', 300);"
    ))
    .expect("should seed integer regions");
    drop(conn);

    let selection = FilterSelection {
        genders: None,
        regions: Some(vec![DimensionValue::from("1".to_string())]),
    };
    let dashboard = service_for(&db_path)
        .refresh(&selection)
        .expect("refresh should succeed");

    assert_eq!(
        dashboard.filters.regions,
        BTreeSet::from([DimensionValue::Integer(1)])
    );
    let tiles = dashboard
        .viewtime_by_region
        .outcome
        .data()
        .expect("hierarchy should be ready");
    assert_eq!(tiles.len(), 1);
    assert_eq!(tiles[0].region, DimensionValue::Integer(1));
    assert_eq!(tiles[0].total_viewtime, 120);

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn missing_table_fails_catalog_and_aborts_refresh() {
    let temp_dir = unique_test_dir("missing-table");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let db_path = temp_dir.join("events.sqlite");
    Connection::open(&db_path).expect("should create empty db");

    let result = service_for(&db_path).refresh(&FilterSelection::all());

    assert!(matches!(
        result,
        Err(DashboardError::QueryExecutionFailed { ref scope, .. }) if scope == "gender catalog"
    ));

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn missing_database_is_store_unavailable() {
    let temp_dir = unique_test_dir("missing-db");
    let db_path = temp_dir.join("absent.sqlite");

    let result = service_for(&db_path).refresh(&FilterSelection::all());

    assert!(matches!(result, Err(DashboardError::StoreUnavailable(_))));
    assert!(!db_path.exists(), "refresh must not create the database");
}

#[test]
fn csv_import_appends_events() {
    let temp_dir = unique_test_dir("csv-import");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let db_path = temp_dir.join("events.sqlite");
    let csv_path = temp_dir.join("events.csv");
    fs::write(
        &csv_path,
        "viewtime,gender,regionid,activity\n120,MALE,Region_1,view\n95,FEMALE,Region_2,click\n",
    )
    .expect("should write csv");

    let result = import_events_csv(&db_path, TABLE, &csv_path).expect("import should succeed");

    assert_eq!(result.row_count, 2);
    let dashboard = service_for(&db_path)
        .refresh(&FilterSelection::all())
        .expect("refresh should succeed");
    let proportion = dashboard
        .viewtime_by_gender
        .outcome
        .data()
        .expect("proportion should be ready");
    assert!(proportion.iter().any(|row| row.gender == DimensionValue::text("FEMALE")
        && row.total_viewtime == 95));

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn dashboard_serializes_for_renderer() {
    let temp_dir = unique_test_dir("serialize");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let db_path = temp_dir.join("events.sqlite");
    seed_events(&db_path, &sample_events());

    let dashboard = service_for(&db_path)
        .refresh(&FilterSelection::all())
        .expect("refresh should succeed");
    let value = serde_json::to_value(&dashboard).expect("dashboard should serialize");

    assert_eq!(value["activity_ranking"]["title"], ViewKind::ActivityRanking.title());
    assert_eq!(value["viewtime_by_region"]["status"], "ready");
    assert_eq!(value["viewtime_by_region"]["data"][2]["label"], "15.00M");
    assert!(value["activity_by_gender"]["data"]["rows"].is_array());
    assert!(value["last_update"].is_string());

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}
