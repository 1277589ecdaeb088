//! Staffing aggregation and the fullness check
//!
//! The check compares live per-station headcounts against an expected
//! headcount per position. A position with no employees anywhere returns no
//! groups and therefore passes; `FullnessReport` records such positions so
//! callers can tell a vacuous pass from a real one.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use sqlx::FromRow;
use tracing::{debug, info, warn};

use crate::error::{Result, StationError};
use crate::import::{parse_records, read_json_array};
use crate::store::Store;

/// Live headcount of one position at one station
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct StationHeadcount {
    pub station_id: Option<i64>,
    pub station_title: Option<String>,
    pub headcount: i64,
}

/// Per-station headcounts for employees holding the position titled `position`
pub async fn headcounts_for_position(
    store: &Store,
    position: &str,
) -> Result<Vec<StationHeadcount>> {
    sqlx::query_as::<_, StationHeadcount>(
        r#"
        SELECT e.station_id, s.title AS station_title, COUNT(*) AS headcount
        FROM employees e
        JOIN positions p ON e.position_id = p.id
        LEFT JOIN stations s ON s.id = e.station_id
        WHERE p.title = $1
        GROUP BY e.station_id, s.title
        ORDER BY e.station_id
        "#,
    )
    .bind(position)
    .fetch_all(store.pool())
    .await
    .map_err(|e| StationError::query(format!("count staff for position '{}'", position), e))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ExpectedEntry {
    position: String,
    count: i64,
}

/// Expected headcount per position title
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpectedStaffing {
    counts: BTreeMap<String, i64>,
}

impl ExpectedStaffing {
    /// Load `[{"position": ..., "count": ...}, ...]`; later duplicates win
    pub fn from_path(path: &Path) -> Result<Self> {
        let (entries, skipped) = parse_records::<ExpectedEntry>(read_json_array(path)?);
        if skipped > 0 {
            warn!("Skipped {} malformed entries in {}", skipped, path.display());
        }

        let mut expected = Self::default();
        for entry in entries {
            expected.insert(entry.position, entry.count);
        }
        debug!("Loaded {} expected positions from {}", expected.len(), path.display());
        Ok(expected)
    }

    pub fn insert(&mut self, position: impl Into<String>, count: i64) {
        self.counts.insert(position.into(), count);
    }

    pub fn get(&self, position: &str) -> Option<i64> {
        self.counts.get(position).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.counts.iter().map(|(title, count)| (title.as_str(), *count))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, i64)> for ExpectedStaffing {
    fn from_iter<I: IntoIterator<Item = (S, i64)>>(iter: I) -> Self {
        let mut expected = Self::default();
        for (position, count) in iter {
            expected.insert(position, count);
        }
        expected
    }
}

/// A (position, station) group whose live count differs from the expected one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub position: String,
    pub station_id: Option<i64>,
    pub station_title: Option<String>,
    pub expected: i64,
    pub actual: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FullnessReport {
    /// Number of (position, station) groups compared
    pub checked_groups: usize,
    pub mismatches: Vec<Mismatch>,
    /// Expected positions that nobody currently holds
    pub unstaffed_positions: Vec<String>,
}

impl FullnessReport {
    /// True when every compared group matched, including when none were compared
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }

    /// True when the pass rests on no data at all
    pub fn is_vacuous(&self) -> bool {
        self.checked_groups == 0
    }
}

/// Compare live headcounts against `expected`
///
/// Every mismatch is collected and logged; `passed()` on the result gives
/// the all-or-nothing verdict.
pub async fn check_fullness(store: &Store, expected: &ExpectedStaffing) -> Result<FullnessReport> {
    let mut report = FullnessReport::default();

    for (position, needed) in expected.iter() {
        let groups = headcounts_for_position(store, position).await?;
        if groups.is_empty() {
            debug!("No employees hold position '{}'", position);
            report.unstaffed_positions.push(position.to_string());
            continue;
        }

        for group in groups {
            report.checked_groups += 1;
            if group.headcount != needed {
                warn!(
                    position,
                    station_id = ?group.station_id,
                    expected = needed,
                    actual = group.headcount,
                    "Headcount mismatch"
                );
                report.mismatches.push(Mismatch {
                    position: position.to_string(),
                    station_id: group.station_id,
                    station_title: group.station_title,
                    expected: needed,
                    actual: group.headcount,
                });
            }
        }
    }

    info!(
        positions = expected.len(),
        groups = report.checked_groups,
        mismatches = report.mismatches.len(),
        "Fullness check finished"
    );
    Ok(report)
}
