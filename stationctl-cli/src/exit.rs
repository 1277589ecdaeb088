//! Process exit codes, one per failure kind (sysexits.h numbering)

use stationctl_core::StationError;

/// The fullness check ran and found a mismatch
pub const FULLNESS_FAILED: u8 = 1;
/// Failure that carries no `StationError`
pub const GENERIC: u8 = 2;

pub const DATA_ERROR: u8 = 65;
pub const NO_INPUT: u8 = 66;
pub const UNAVAILABLE: u8 = 69;
pub const SOFTWARE: u8 = 70;
pub const TEMP_FAIL: u8 = 75;
pub const PROTOCOL: u8 = 76;
pub const CONFIG: u8 = 78;

pub fn code_for(err: &anyhow::Error) -> u8 {
    let Some(station_err) = err.chain().find_map(|e| e.downcast_ref::<StationError>()) else {
        return GENERIC;
    };

    match station_err {
        StationError::Config { .. } => CONFIG,
        StationError::Connection { .. } => UNAVAILABLE,
        StationError::Query { .. } => SOFTWARE,
        StationError::Transaction { .. } => TEMP_FAIL,
        StationError::UnknownStation { .. } | StationError::StationNotFound { .. } => DATA_ERROR,
        StationError::Import { .. } => NO_INPUT,
        StationError::Invariant { .. } => PROTOCOL,
    }
}
