//! Net worth timeline projection

mod cash_flow;
mod engine;
mod evaluator;
pub mod heuristic;
mod milestones;
mod point;
mod result;
mod service;
mod timeline;

pub use cash_flow::{annotate, total_improvement};
pub use engine::{Horizon, ProjectionConfig, ProjectionEngine, ProjectionMode, ProjectionRequest};
pub use evaluator::NetWorthEvaluator;
pub use heuristic::{AggregateDropHeuristic, EstimatedPayoff};
pub use milestones::{crossover_month, LiabilityOutlook, MilestoneDetector, Milestones, PayoffStatus};
pub use point::{PayoffEvent, PointSource, TimelinePoint};
pub use result::{IntegrityIssue, ProjectionInsights, ProjectionResult, ProjectionWarning};
pub use service::{ProjectionService, SnapshotDrift};
pub use timeline::{resample, Granularity, TimelineComposer};
