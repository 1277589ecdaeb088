use std::path::Path;

use anyhow::{Context, Result};
use stationctl_core::{
    check_fullness, swap_station_refs, ExpectedStaffing, FullnessReport, Mismatch, StationRef,
    Store,
};

use crate::ui;

/// Run the fullness check; Ok(false) means the check ran and failed
pub async fn run_check_fullness(store: &Store, path: &Path) -> Result<bool> {
    let expected = ExpectedStaffing::from_path(path)
        .with_context(|| format!("failed to load expected staffing from {}", path.display()))?;

    let report = check_fullness(store, &expected)
        .await
        .context("fullness check aborted")?;

    print!("{}", describe_fullness(&report));
    Ok(report.passed())
}

fn describe_fullness(report: &FullnessReport) -> String {
    let mut out = String::new();
    for m in &report.mismatches {
        out.push_str(&format!(
            "  {} at {}: expected {}, found {}\n",
            m.position,
            station_label(m),
            m.expected,
            m.actual
        ));
    }
    for position in &report.unstaffed_positions {
        out.push_str(&format!("  {}: nobody holds this position, not checked\n", position));
    }
    if report.passed() {
        if report.is_vacuous() {
            out.push_str("Fullness check passed (nothing to compare)\n");
        } else {
            out.push_str("Fullness check passed\n");
        }
    } else {
        out.push_str("Fullness check failed\n");
    }
    out
}

fn station_label(m: &Mismatch) -> String {
    match (&m.station_title, m.station_id) {
        (Some(title), _) => title.clone(),
        (None, Some(id)) => format!("station #{}", id),
        (None, None) => "no station".to_string(),
    }
}

pub async fn run_swap(store: &Store, first: StationRef, second: StationRef) -> Result<()> {
    let report = ui::with_spinner(
        format!("Swapping personnel of {} and {}", first, second),
        swap_station_refs(store, &first, &second),
    )
    .await
    .with_context(|| format!("failed to swap personnel of {} and {}", first, second))?;

    println!(
        "Swapped personnel of stations {} and {}: {} moved to #{}, {} moved to #{}",
        first,
        second,
        report.moved_to_second,
        report.second,
        report.moved_to_first,
        report.first
    );
    Ok(())
}
