//! Atomic exchange of the employee rosters of two stations
//!
//! The exchange runs three UPDATEs inside one transaction, using NULL as
//! the parking value for the first station's employees:
//!
//! 1. `station_id = NULL` where `station_id = first`
//! 2. `station_id = first` where `station_id = second`
//! 3. `station_id = second` where `station_id IS NULL`
//!
//! Phase 3 claims every NULL row, so it must touch exactly the rows phase 1
//! parked. Any other count means an assignment was already NULL and the
//! transaction is rolled back. On PostgreSQL the transaction runs at
//! SERIALIZABLE so a concurrent writer cannot slip rows in between phases.

use sqlx::AnyConnection;
use tracing::{debug, error, info, warn};

use crate::error::{Result, StationError, SwapPhase};
use crate::store::{Backend, Store};

/// A station named either by id or by title
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StationRef {
    ById(i64),
    ByTitle(String),
}

impl StationRef {
    /// Resolve to a station id. Ids are not checked here; the swap verifies
    /// them inside its transaction.
    pub async fn resolve(&self, store: &Store) -> Result<i64> {
        match self {
            StationRef::ById(id) => Ok(*id),
            StationRef::ByTitle(title) => store
                .stations()
                .id_by_title(title)
                .await?
                .ok_or_else(|| StationError::UnknownStation {
                    title: title.clone(),
                }),
        }
    }
}

impl std::fmt::Display for StationRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StationRef::ById(id) => write!(f, "#{}", id),
            StationRef::ByTitle(title) => write!(f, "'{}'", title),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapReport {
    pub first: i64,
    pub second: i64,
    /// Employees moved from `first` to `second`
    pub moved_to_second: u64,
    /// Employees moved from `second` to `first`
    pub moved_to_first: u64,
}

/// Resolve both references, then swap
pub async fn swap_station_refs(
    store: &Store,
    first: &StationRef,
    second: &StationRef,
) -> Result<SwapReport> {
    let first_id = first.resolve(store).await?;
    let second_id = second.resolve(store).await?;
    debug!("Resolved {} -> {}, {} -> {}", first, first_id, second, second_id);
    swap_stations(store, first_id, second_id).await
}

/// Exchange the employees of two stations in one transaction
///
/// On error nothing has changed: the transaction is rolled back before the
/// error is returned.
pub async fn swap_stations(store: &Store, first: i64, second: i64) -> Result<SwapReport> {
    let mut tx = store
        .pool()
        .begin()
        .await
        .map_err(|e| StationError::transaction(SwapPhase::Begin, e))?;

    match run_phases(&mut tx, store.backend(), first, second).await {
        Ok(report) => {
            tx.commit()
                .await
                .map_err(|e| StationError::transaction(SwapPhase::Commit, e))?;
            info!(
                first,
                second,
                moved_to_second = report.moved_to_second,
                moved_to_first = report.moved_to_first,
                "Swapped station personnel"
            );
            Ok(report)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                error!("Rollback after failed swap also failed: {}", rollback_err);
            }
            warn!("Swap of stations {} and {} rolled back: {}", first, second, err);
            Err(err)
        }
    }
}

async fn run_phases(
    conn: &mut AnyConnection,
    backend: Backend,
    first: i64,
    second: i64,
) -> Result<SwapReport> {
    if backend == Backend::Postgres {
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *conn)
            .await
            .map_err(|e| StationError::transaction(SwapPhase::Begin, e))?;
    }

    for id in [first, second] {
        let (found,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM stations WHERE id = $1")
            .bind(id)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| StationError::transaction(SwapPhase::Verify, e))?;
        if found == 0 {
            return Err(StationError::StationNotFound { id });
        }
    }

    let parked = sqlx::query("UPDATE employees SET station_id = NULL WHERE station_id = $1")
        .bind(first)
        .execute(&mut *conn)
        .await
        .map_err(|e| StationError::transaction(SwapPhase::ClearFirst, e))?
        .rows_affected();
    debug!("Phase 1: parked {} employees of station {}", parked, first);

    let moved_to_first =
        sqlx::query("UPDATE employees SET station_id = $1 WHERE station_id = $2")
            .bind(first)
            .bind(second)
            .execute(&mut *conn)
            .await
            .map_err(|e| StationError::transaction(SwapPhase::MoveSecond, e))?
            .rows_affected();
    debug!("Phase 2: moved {} employees {} -> {}", moved_to_first, second, first);

    let filled = sqlx::query("UPDATE employees SET station_id = $1 WHERE station_id IS NULL")
        .bind(second)
        .execute(&mut *conn)
        .await
        .map_err(|e| StationError::transaction(SwapPhase::FillSecond, e))?
        .rows_affected();
    debug!("Phase 3: moved {} parked employees to {}", filled, second);

    if filled != parked {
        return Err(StationError::invariant(format!(
            "phase 3 reassigned {} employees but phase 1 parked {}; \
             employees without a station existed before the swap",
            filled, parked
        )));
    }

    Ok(SwapReport {
        first,
        second,
        moved_to_second: parked,
        moved_to_first,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewEmployee, NewPosition, NewStation};

    struct Fixture {
        store: Store,
        stations: Vec<i64>,
    }

    /// Stations S1..Sn, with `roster[i]` employees at station i
    async fn fixture(roster: &[usize]) -> Fixture {
        let store = Store::open_in_memory().await.unwrap();
        let position = store
            .positions()
            .insert(&NewPosition {
                title: "Guard".to_string(),
                add_date: "2020-01-01".to_string(),
                salary: 35_000,
            })
            .await
            .unwrap();

        let mut stations = Vec::new();
        for (n, &count) in roster.iter().enumerate() {
            let station = store
                .stations()
                .insert(&NewStation {
                    title: format!("S{}", n + 1),
                    city: "Vitebsk".to_string(),
                    address: String::new(),
                })
                .await
                .unwrap();
            for k in 0..count {
                store
                    .employees()
                    .insert(&NewEmployee {
                        full_name: format!("Employee {}.{}", n + 1, k),
                        start_date: "2021-06-01".to_string(),
                        station_id: station,
                        position_id: position,
                    })
                    .await
                    .unwrap();
            }
            stations.push(station);
        }
        Fixture { store, stations }
    }

    async fn assignments(store: &Store) -> Vec<(i64, Option<i64>)> {
        store.employees().assignments().await.unwrap()
    }

    #[tokio::test]
    async fn swap_exchanges_rosters_and_leaves_others() {
        let f = fixture(&[2, 3, 1]).await;
        let (a, b, c) = (f.stations[0], f.stations[1], f.stations[2]);
        let before = assignments(&f.store).await;

        let report = swap_stations(&f.store, a, b).await.unwrap();
        assert_eq!(report.moved_to_second, 2);
        assert_eq!(report.moved_to_first, 3);

        let after = assignments(&f.store).await;
        for ((id, old), (same_id, new)) in before.iter().zip(after.iter()) {
            assert_eq!(id, same_id);
            let expected = match *old {
                Some(s) if s == a => Some(b),
                Some(s) if s == b => Some(a),
                other => other,
            };
            assert_eq!(*new, expected, "employee {}", id);
        }
        assert_eq!(f.store.employees().list_at_station(c).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn double_swap_restores_assignments() {
        let f = fixture(&[2, 3]).await;
        let before = assignments(&f.store).await;

        swap_stations(&f.store, f.stations[0], f.stations[1]).await.unwrap();
        swap_stations(&f.store, f.stations[0], f.stations[1]).await.unwrap();

        assert_eq!(assignments(&f.store).await, before);
    }

    #[tokio::test]
    async fn self_swap_is_a_no_op() {
        let f = fixture(&[3, 1]).await;
        let before = assignments(&f.store).await;

        swap_stations(&f.store, f.stations[0], f.stations[0]).await.unwrap();

        assert_eq!(assignments(&f.store).await, before);
    }

    #[tokio::test]
    async fn swap_with_empty_station_succeeds() {
        let f = fixture(&[3, 0]).await;

        let report = swap_stations(&f.store, f.stations[0], f.stations[1]).await.unwrap();
        assert_eq!(report.moved_to_second, 3);
        assert_eq!(report.moved_to_first, 0);
        assert!(f.store.employees().list_at_station(f.stations[0]).await.unwrap().is_empty());
        assert_eq!(f.store.employees().list_at_station(f.stations[1]).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn unknown_station_id_fails_without_changes() {
        let f = fixture(&[2]).await;
        let before = assignments(&f.store).await;

        let err = swap_stations(&f.store, f.stations[0], 9_999).await.unwrap_err();
        assert!(matches!(err, StationError::StationNotFound { id: 9_999 }));
        assert_eq!(assignments(&f.store).await, before);
    }

    #[tokio::test]
    async fn unknown_title_fails_before_swapping() {
        let f = fixture(&[2, 2]).await;
        let err = swap_station_refs(
            &f.store,
            &StationRef::ByTitle("S1".to_string()),
            &StationRef::ByTitle("Nowhere".to_string()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, StationError::UnknownStation { ref title } if title == "Nowhere"));
    }

    #[tokio::test]
    async fn swap_by_mixed_refs() {
        let f = fixture(&[1, 2]).await;
        let report = swap_station_refs(
            &f.store,
            &StationRef::ByTitle("S1".to_string()),
            &StationRef::ById(f.stations[1]),
        )
        .await
        .unwrap();
        assert_eq!(report.first, f.stations[0]);
        assert_eq!(report.second, f.stations[1]);
    }

    #[tokio::test]
    async fn failure_in_phase_two_rolls_back() {
        let f = fixture(&[2, 3]).await;
        let (a, b) = (f.stations[0], f.stations[1]);
        let trigger = format!(
            "CREATE TRIGGER fail_move_second BEFORE UPDATE OF station_id ON employees
             WHEN OLD.station_id = {b} AND NEW.station_id = {a}
             BEGIN SELECT RAISE(ABORT, 'injected failure'); END"
        );
        sqlx::query(&trigger).execute(f.store.pool()).await.unwrap();
        let before = assignments(&f.store).await;

        let err = swap_stations(&f.store, a, b).await.unwrap_err();
        assert!(matches!(
            err,
            StationError::Transaction {
                phase: SwapPhase::MoveSecond,
                ..
            }
        ));
        assert_eq!(assignments(&f.store).await, before);
    }

    #[tokio::test]
    async fn failure_in_phase_three_rolls_back() {
        let f = fixture(&[2, 3]).await;
        let trigger = "CREATE TRIGGER fail_fill_second BEFORE UPDATE OF station_id ON employees
             WHEN OLD.station_id IS NULL
             BEGIN SELECT RAISE(ABORT, 'injected failure'); END";
        sqlx::query(trigger).execute(f.store.pool()).await.unwrap();
        let before = assignments(&f.store).await;

        let err = swap_stations(&f.store, f.stations[0], f.stations[1])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StationError::Transaction {
                phase: SwapPhase::FillSecond,
                ..
            }
        ));
        assert_eq!(assignments(&f.store).await, before);
    }

    #[tokio::test]
    async fn pre_existing_unassigned_employee_aborts_swap() {
        let f = fixture(&[1, 1]).await;
        sqlx::query("UPDATE employees SET station_id = NULL WHERE station_id = $1")
            .bind(f.stations[1])
            .execute(f.store.pool())
            .await
            .unwrap();
        let before = assignments(&f.store).await;

        let err = swap_stations(&f.store, f.stations[0], f.stations[1])
            .await
            .unwrap_err();
        assert!(matches!(err, StationError::Invariant { .. }));
        assert_eq!(assignments(&f.store).await, before);
    }
}
