//! Bulk import of stations, positions and employees from JSON arrays
//!
//! Elements that are not objects, or objects that do not fit the record
//! shape, are skipped with a warning. A row the database rejects is logged
//! and counted; the rest of the file is still imported.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{Result, StationError};
use crate::models::{NewEmployee, NewPosition, NewStation};
use crate::store::Store;

/// Outcome of one import file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub inserted: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Read a file that must hold a top-level JSON array
pub fn read_json_array(path: &Path) -> Result<Vec<Value>> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| StationError::import(path, e.to_string()))?;
    let value: Value = serde_json::from_str(&contents)
        .map_err(|e| StationError::import(path, format!("invalid JSON: {}", e)))?;

    match value {
        Value::Array(items) => Ok(items),
        other => Err(StationError::import(
            path,
            format!("expected a JSON array, found {}", json_kind(&other)),
        )),
    }
}

/// Keep the object elements that deserialize as `T`; count the rest
pub fn parse_records<T: DeserializeOwned>(items: Vec<Value>) -> (Vec<T>, usize) {
    let mut records = Vec::with_capacity(items.len());
    let mut skipped = 0;

    for (index, item) in items.into_iter().enumerate() {
        if !item.is_object() {
            warn!("Skipping element {}: expected an object, found {}", index, json_kind(&item));
            skipped += 1;
            continue;
        }
        match serde_json::from_value::<T>(item) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!("Skipping element {}: {}", index, e);
                skipped += 1;
            }
        }
    }

    (records, skipped)
}

pub async fn import_stations(store: &Store, path: &Path) -> Result<ImportReport> {
    let (records, skipped) = parse_records::<NewStation>(read_json_array(path)?);
    let repo = store.stations();
    let mut report = ImportReport {
        skipped,
        ..Default::default()
    };

    for station in &records {
        tally(&mut report, repo.insert(station).await);
    }

    log_report("stations", path, &report);
    Ok(report)
}

pub async fn import_positions(store: &Store, path: &Path) -> Result<ImportReport> {
    let (records, skipped) = parse_records::<NewPosition>(read_json_array(path)?);
    let repo = store.positions();
    let mut report = ImportReport {
        skipped,
        ..Default::default()
    };

    for position in &records {
        tally(&mut report, repo.insert(position).await);
    }

    log_report("positions", path, &report);
    Ok(report)
}

pub async fn import_employees(store: &Store, path: &Path) -> Result<ImportReport> {
    let (records, skipped) = parse_records::<NewEmployee>(read_json_array(path)?);
    let repo = store.employees();
    let mut report = ImportReport {
        skipped,
        ..Default::default()
    };

    for employee in &records {
        tally(&mut report, repo.insert(employee).await);
    }

    log_report("employees", path, &report);
    Ok(report)
}

fn tally(report: &mut ImportReport, outcome: Result<i64>) {
    match outcome {
        Ok(_) => report.inserted += 1,
        Err(e) => {
            warn!("{}", e);
            report.failed += 1;
        }
    }
}

fn log_report(kind: &str, path: &Path, report: &ImportReport) {
    info!(
        inserted = report.inserted,
        skipped = report.skipped,
        failed = report.failed,
        "Imported {} from {}",
        kind,
        path.display()
    );
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
