//! Repository implementations for database access
//!
//! Each repository borrows the pool and issues one statement per call:
//! - list operations JOIN what they display (no per-row lookups)
//! - inserts return the generated id
//! - lookups return `Option` instead of a sentinel value

pub mod employees;
pub mod positions;
pub mod stations;

pub use employees::EmployeeRepo;
pub use positions::PositionRepo;
pub use stations::StationRepo;
