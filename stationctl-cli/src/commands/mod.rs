//! Action implementations for the stationctl CLI
//!
//! Each action prints its result to stdout and returns errors to main,
//! which maps them to exit codes.

pub mod display;
pub mod import;
pub mod staffing;

pub use display::{run_display_employees, run_display_positions, run_display_stations};
pub use import::{run_import, ImportKind};
pub use staffing::{run_check_fullness, run_swap};
