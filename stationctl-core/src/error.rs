/// Structured error types for stationctl-core.
///
/// The binary maps each variant to its own exit code, so keep the variants
/// coarse: one per failure kind an operator would react to differently.
use std::path::PathBuf;
use thiserror::Error;

/// Which step of the station swap failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapPhase {
    Begin,
    Verify,
    ClearFirst,
    MoveSecond,
    FillSecond,
    Commit,
}

impl std::fmt::Display for SwapPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SwapPhase::Begin => "begin",
            SwapPhase::Verify => "verify stations",
            SwapPhase::ClearFirst => "clear first station",
            SwapPhase::MoveSecond => "move second station",
            SwapPhase::FillSecond => "move parked employees to second station",
            SwapPhase::Commit => "commit",
        };
        f.write_str(name)
    }
}

/// Main error type for stationctl-core operations
#[derive(Error, Debug)]
pub enum StationError {
    /// Database unreachable or credentials rejected
    #[error("Could not connect to database: {source}")]
    Connection {
        #[source]
        source: sqlx::Error,
    },

    /// Missing or malformed configuration
    #[error("Configuration error: {reason}")]
    Config { reason: String },

    /// A single statement failed outside a transaction
    #[error("Query failed ({context}): {source}")]
    Query {
        context: String,
        #[source]
        source: sqlx::Error,
    },

    /// The station swap failed and was rolled back
    #[error("Station swap failed during '{phase}' and was rolled back: {source}")]
    Transaction {
        phase: SwapPhase,
        #[source]
        source: sqlx::Error,
    },

    /// No station carries the given title
    #[error("Unknown station title '{title}'")]
    UnknownStation { title: String },

    /// No station carries the given id
    #[error("Station with id {id} does not exist")]
    StationNotFound { id: i64 },

    /// Import or expected-staffing file could not be read
    #[error("Cannot read {path:?}: {reason}")]
    Import { path: PathBuf, reason: String },

    /// A data invariant did not hold; any open transaction was rolled back
    #[error("Invariant violated: {reason}")]
    Invariant { reason: String },
}

/// Result type alias for stationctl-core operations
pub type Result<T> = std::result::Result<T, StationError>;

impl StationError {
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    pub fn query(context: impl Into<String>, source: sqlx::Error) -> Self {
        Self::Query {
            context: context.into(),
            source,
        }
    }

    pub fn transaction(phase: SwapPhase, source: sqlx::Error) -> Self {
        Self::Transaction { phase, source }
    }

    pub fn import(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Import {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn invariant(reason: impl Into<String>) -> Self {
        Self::Invariant {
            reason: reason.into(),
        }
    }
}
