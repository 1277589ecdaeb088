//! stationctl-core: personnel records for transit stations
//!
//! Stations, positions and employees live in a relational database reached
//! through [`Store`]. On top of plain listing and JSON import the crate
//! provides the two operations with real contracts:
//! - [`swap_stations`]: atomically exchange the rosters of two stations
//! - [`check_fullness`]: compare live headcounts with an expected table

pub mod config;
pub mod error;
pub mod import;
pub mod models;
pub mod repos;
pub mod staffing;
pub mod store;
pub mod swap;

pub use config::{DatabaseConfig, StationctlConfig};
pub use error::{Result, StationError, SwapPhase};
pub use import::{import_employees, import_positions, import_stations, ImportReport};
pub use models::{
    Employee, EmployeeView, NewEmployee, NewPosition, NewStation, Position, SortOrder, Station,
};
pub use staffing::{
    check_fullness, headcounts_for_position, ExpectedStaffing, FullnessReport, Mismatch,
    StationHeadcount,
};
pub use store::{Backend, Store};
pub use swap::{swap_station_refs, swap_stations, StationRef, SwapReport};
