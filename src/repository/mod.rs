//! Read-only data access boundary
//!
//! The engine never writes through these traits. Read consistency against
//! concurrent snapshot writes is the implementor's responsibility.

mod memory;
mod snapshot;

pub use memory::InMemoryRepository;
pub use snapshot::{load_snapshots, load_snapshots_from_reader, Snapshot};

use crate::error::RepositoryError;
use crate::holdings::{Asset, Liability};
use crate::month::Month;

/// Access to a user's historical snapshots
pub trait SnapshotRepository {
    fn list_snapshots(&self, user_id: &str) -> Result<Vec<Snapshot>, RepositoryError>;

    fn get_snapshot(&self, user_id: &str, month: Month) -> Result<Option<Snapshot>, RepositoryError>;
}

/// Access to a user's current assets and liabilities
pub trait HoldingsRepository {
    fn list_assets(&self, user_id: &str) -> Result<Vec<Asset>, RepositoryError>;

    fn list_liabilities(&self, user_id: &str) -> Result<Vec<Liability>, RepositoryError>;
}
