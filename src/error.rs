//! Error taxonomy for the projection engine
//!
//! Validation failures are surfaced to the caller immediately. Data-integrity
//! problems are not errors: they travel as warnings inside the projection result.

use thiserror::Error;

/// Input rejected before any computation runs
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("malformed month '{0}': expected YYYY-MM")]
    MalformedMonth(String),

    #[error("horizon of {value} {unit} is outside the allowed range 1..={max}")]
    HorizonOutOfRange {
        value: u32,
        unit: &'static str,
        max: u32,
    },

    #[error("negative {field} on {entity} '{id}': {value}")]
    NegativeValue {
        entity: &'static str,
        id: String,
        field: &'static str,
        value: f64,
    },

    #[error("liability '{0}' has a zero-month tenure")]
    ZeroTenure(String),

    #[error("liability '{id}' has a tenure of {value} months, above the limit of {max}")]
    TenureTooLong { id: String, value: u32, max: u32 },

    #[error("shifting {now} by {months} months leaves the supported years 0000-9999")]
    WindowOutOfRange { now: String, months: i32 },

    #[error("unknown {field} '{value}'")]
    UnknownVariant { field: &'static str, value: String },
}

/// Failure while reading holdings or snapshots from a backing store
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("failed to read {what}: {source}")]
    Csv {
        what: &'static str,
        #[source]
        source: csv::Error,
    },

    #[error("invalid record in {what}: {source}")]
    InvalidRecord {
        what: &'static str,
        #[source]
        source: ValidationError,
    },

    #[error("no data for user '{0}'")]
    UnknownUser(String),
}

/// Top-level error returned by the repository-backed projection service
#[derive(Error, Debug)]
pub enum ProjectionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
