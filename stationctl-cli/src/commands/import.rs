use std::path::Path;

use anyhow::{Context, Result};
use stationctl_core::{import_employees, import_positions, import_stations, Store};

use crate::ui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    Stations,
    Positions,
    Employees,
}

impl ImportKind {
    fn plural(self) -> &'static str {
        match self {
            ImportKind::Stations => "stations",
            ImportKind::Positions => "positions",
            ImportKind::Employees => "employees",
        }
    }
}

pub async fn run_import(store: &Store, kind: ImportKind, path: &Path) -> Result<()> {
    let label = kind.plural();
    let report = ui::with_spinner(format!("Importing {} from {}", label, path.display()), async {
        match kind {
            ImportKind::Stations => import_stations(store, path).await,
            ImportKind::Positions => import_positions(store, path).await,
            ImportKind::Employees => import_employees(store, path).await,
        }
    })
    .await
    .with_context(|| format!("failed to import {} from {}", label, path.display()))?;

    println!(
        "Imported {} {} ({} skipped, {} rejected)",
        report.inserted, label, report.skipped, report.failed
    );
    Ok(())
}
