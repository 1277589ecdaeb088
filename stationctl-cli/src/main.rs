//! stationctl CLI - personnel records for transit stations
//!
//! Flag-style entry point: any combination of actions may be given in one
//! invocation. They run in a fixed order: schema, imports (stations,
//! positions, employees), fullness check, swap, then listings.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgGroup, Parser};
use stationctl_core::config::load_dotenv;
use stationctl_core::{SortOrder, StationRef, StationctlConfig, Store};
use tracing::debug;

mod commands;
mod exit;
mod tracing_setup;
mod ui;

use commands::ImportKind;

#[derive(Parser, Debug)]
#[command(
    name = "stationctl",
    author,
    version,
    about = "Manage station, position and employee records",
    long_about = "Import personnel records from JSON, list them, check station staffing \
                  against an expected table, and atomically swap the personnel of two stations."
)]
#[command(group(
    ArgGroup::new("action")
        .required(true)
        .multiple(true)
        .args([
            "init_schema",
            "import_employees",
            "import_stations",
            "import_positions",
            "display_employees",
            "display_stations",
            "display_positions",
            "check_fullness",
            "swap_stations",
        ])
))]
struct Cli {
    /// Import employees from a JSON file
    #[arg(long, value_name = "FILE")]
    import_employees: Option<PathBuf>,

    /// Import stations from a JSON file
    #[arg(long, value_name = "FILE")]
    import_stations: Option<PathBuf>,

    /// Import positions from a JSON file
    #[arg(long, value_name = "FILE")]
    import_positions: Option<PathBuf>,

    /// List all employees
    #[arg(long)]
    display_employees: bool,

    /// List all stations
    #[arg(long)]
    display_stations: bool,

    /// List all positions
    #[arg(long)]
    display_positions: bool,

    /// Sort listings by title (employees by full name)
    #[arg(long)]
    title_sort: bool,

    /// Show position salaries net of this tax percentage
    #[arg(
        long,
        value_name = "PERCENT",
        value_parser = clap::value_parser!(u8).range(0..=100),
        requires = "display_positions"
    )]
    tax_deduction: Option<u8>,

    /// Check station staffing against expected headcounts in a JSON file
    #[arg(long, value_name = "FILE")]
    check_fullness: Option<PathBuf>,

    /// Swap the personnel of --station-one and --station-two
    #[arg(long, requires = "station_one", requires = "station_two")]
    swap_stations: bool,

    /// First station for --swap-stations
    #[arg(long, value_name = "TITLE")]
    station_one: Option<String>,

    /// Second station for --swap-stations
    #[arg(long, value_name = "TITLE")]
    station_two: Option<String>,

    /// Treat --station-one/--station-two as numeric station ids
    #[arg(long, requires = "swap_stations")]
    by_id: bool,

    /// Create the tables if they do not exist yet
    #[arg(long)]
    init_schema: bool,

    /// Database URL (overrides config file and environment)
    #[arg(long, value_name = "URL")]
    database_url: Option<String>,

    /// Config file to use instead of ./stationctl.toml and ~/.stationctl/config.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Suppress progress spinners
    #[arg(long, short = 'q')]
    quiet: bool,
}

impl Cli {
    fn sort(&self) -> SortOrder {
        SortOrder::from_title_sort(self.title_sort)
    }

    fn station_ref(&self, value: &str) -> Result<StationRef> {
        if self.by_id {
            let id = value
                .parse::<i64>()
                .map_err(|_| anyhow::anyhow!("'{}' is not a station id", value))?;
            Ok(StationRef::ById(id))
        } else {
            Ok(StationRef::ByTitle(value.to_string()))
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug }).ok();
    ui::init_quiet_mode(cli.quiet);

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(exit::FULLNESS_FAILED),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(exit::code_for(&err))
        }
    }
}

/// Returns Ok(false) when a fullness check ran and failed
async fn run(cli: Cli) -> Result<bool> {
    load_dotenv();

    let mut config = match &cli.config {
        Some(path) => StationctlConfig::from_path(path)?,
        None => StationctlConfig::load(),
    };
    if let Some(url) = &cli.database_url {
        config.database.url = Some(url.clone());
    }

    let store = Store::connect(&config.database).await?;
    let outcome = execute(&cli, &store).await;
    store.close().await;
    debug!("Disconnected");
    outcome
}

async fn execute(cli: &Cli, store: &Store) -> Result<bool> {
    let mut passed = true;

    if cli.init_schema {
        store.ensure_schema().await?;
        println!("Schema ready");
    }

    // Dependency order: employees reference stations and positions
    let imports = [
        (ImportKind::Stations, &cli.import_stations),
        (ImportKind::Positions, &cli.import_positions),
        (ImportKind::Employees, &cli.import_employees),
    ];
    for (kind, path) in imports {
        if let Some(path) = path {
            commands::run_import(store, kind, path).await?;
        }
    }

    if let Some(path) = &cli.check_fullness {
        passed = commands::run_check_fullness(store, path).await?;
    }

    if cli.swap_stations {
        if let (Some(one), Some(two)) = (&cli.station_one, &cli.station_two) {
            commands::run_swap(store, cli.station_ref(one)?, cli.station_ref(two)?).await?;
        }
    }

    if cli.display_employees {
        commands::run_display_employees(store, cli.sort()).await?;
    }
    if cli.display_positions {
        commands::run_display_positions(store, cli.sort(), cli.tax_deduction).await?;
    }
    if cli.display_stations {
        commands::run_display_stations(store, cli.sort()).await?;
    }

    Ok(passed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn swap_requires_both_stations() {
        let err = Cli::try_parse_from(["stationctl", "--swap-stations", "--station-one", "S1"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn some_action_is_required() {
        assert!(Cli::try_parse_from(["stationctl", "--title-sort"]).is_err());
    }

    #[test]
    fn tax_deduction_is_bounded() {
        assert!(Cli::try_parse_from([
            "stationctl",
            "--display-positions",
            "--tax-deduction",
            "101"
        ])
        .is_err());
        let cli = Cli::try_parse_from([
            "stationctl",
            "--display-positions",
            "--tax-deduction",
            "13",
        ])
        .unwrap();
        assert_eq!(cli.tax_deduction, Some(13));
    }

    #[test]
    fn by_id_parses_numeric_refs() {
        let cli = Cli::try_parse_from([
            "stationctl",
            "--swap-stations",
            "--by-id",
            "--station-one",
            "3",
            "--station-two",
            "x",
        ])
        .unwrap();
        assert_eq!(cli.station_ref("3").unwrap(), StationRef::ById(3));
        assert!(cli.station_ref("x").is_err());
    }

    #[test]
    fn titles_are_the_default_refs() {
        let cli = Cli::try_parse_from([
            "stationctl",
            "--swap-stations",
            "--station-one",
            "S1",
            "--station-two",
            "S2",
        ])
        .unwrap();
        assert_eq!(
            cli.station_ref("S1").unwrap(),
            StationRef::ByTitle("S1".to_string())
        );
    }
}
