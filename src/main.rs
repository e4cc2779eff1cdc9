use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use pageview_dashboard::infra::import::csv::import_events_csv;
use pageview_dashboard::infra::sqlite::schema::init_db;
use pageview_dashboard::{
    DashboardConfig, Dimension, DimensionValue, FilterSelection, RefreshService, SqliteEventStore,
};

#[derive(Parser)]
#[command(name = "pageview-dashboard")]
#[command(about = "Aggregate views over pageview activity events", long_about = None)]
struct Cli {
    /// SQLite database holding the event table
    #[arg(long, global = true, env = "PAGEVIEW_DB")]
    db: Option<PathBuf>,

    /// Event table name
    #[arg(long, global = true, env = "PAGEVIEW_TABLE")]
    table: Option<String>,

    /// Per-query timeout in milliseconds
    #[arg(long, global = true, env = "PAGEVIEW_QUERY_TIMEOUT_MS")]
    timeout_ms: Option<u64>,

    /// Log level written to stderr
    #[arg(long, global = true, default_value = "info")]
    log_level: Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recompute all four views and print them as JSON
    Refresh {
        /// Gender to include (repeatable); all genders when omitted
        #[arg(long = "gender", conflicts_with = "no_genders")]
        genders: Vec<String>,

        /// Region to include (repeatable); all regions when omitted
        #[arg(long = "region", conflicts_with = "no_regions")]
        regions: Vec<String>,

        /// Select no genders at all
        #[arg(long)]
        no_genders: bool,

        /// Select no regions at all
        #[arg(long)]
        no_regions: bool,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Print the distinct values of a filterable dimension
    Catalog {
        /// gender or region
        dimension: String,
    },
    /// Create the event table if it does not exist
    Init,
    /// Append events from a csv file with GENDER, REGIONID, ACTIVITY, VIEWTIME columns
    Import {
        /// Path to the csv file
        csv: PathBuf,
    },
}

fn selection(values: Vec<String>, none: bool) -> Option<Vec<DimensionValue>> {
    if none {
        Some(Vec::new())
    } else if values.is_empty() {
        None
    } else {
        Some(values.into_iter().map(DimensionValue::from).collect())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = DashboardConfig::resolve(cli.db, cli.table, cli.timeout_ms)?;
    info!(db = %config.db_path.display(), table = %config.table, "using event store");

    match cli.command {
        Commands::Init => {
            init_db(&config.db_path, &config.table)?;
            info!("event table ready");
        }
        Commands::Import { csv } => {
            let result = import_events_csv(&config.db_path, &config.table, &csv)?;
            println!("{}", serde_json::json!({ "imported": result.row_count }));
        }
        Commands::Catalog { dimension } => {
            let dimension: Dimension = dimension.parse()?;
            let service = refresh_service(&config);
            let catalog = service.catalogs().catalog(dimension)?;
            println!("{}", serde_json::to_string(&catalog)?);
        }
        Commands::Refresh {
            genders,
            regions,
            no_genders,
            no_regions,
            pretty,
        } => {
            let selection = FilterSelection {
                genders: selection(genders, no_genders),
                regions: selection(regions, no_regions),
            };
            let dashboard = refresh_service(&config)
                .refresh(&selection)
                .context("dashboard refresh failed")?;
            let output = if pretty {
                serde_json::to_string_pretty(&dashboard)?
            } else {
                serde_json::to_string(&dashboard)?
            };
            println!("{output}");
        }
    }

    Ok(())
}

fn refresh_service(config: &DashboardConfig) -> RefreshService {
    let store = SqliteEventStore::new(config.db_path.clone(), config.query_timeout);
    RefreshService::new(Arc::new(store), config.table.clone())
}
