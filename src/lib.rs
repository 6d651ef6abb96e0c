//! Net Worth Projection - month-by-month net worth timelines from financial holdings
//!
//! This library provides:
//! - Loan amortization and asset growth calculators
//! - Point-in-time net worth from assets and liabilities
//! - Timelines stitched from stored snapshots, live values and projections
//! - Loan payoff, crossover and freed-up cash flow milestones
//! - Batch projections across horizons or users

pub mod calculators;
pub mod error;
pub mod holdings;
pub mod month;
pub mod projection;
pub mod repository;
pub mod scenario;

// Re-export commonly used types
pub use error::{ProjectionError, RepositoryError, ValidationError};
pub use holdings::{Asset, AssetKind, Liability};
pub use month::Month;
pub use projection::{
    Granularity, Horizon, ProjectionConfig, ProjectionEngine, ProjectionMode, ProjectionRequest, ProjectionResult,
    ProjectionService, TimelinePoint,
};
pub use repository::{HoldingsRepository, InMemoryRepository, Snapshot, SnapshotRepository};
pub use scenario::{Portfolio, ScenarioRunner};
