//! Scenario runner for batch projections
//!
//! Every projection is independent and side-effect free, so batches fan out
//! across rayon's thread pool without coordination.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::holdings::{Asset, Liability};
use crate::month::Month;
use crate::projection::{ProjectionConfig, ProjectionEngine, ProjectionRequest, ProjectionResult};
use crate::repository::Snapshot;

/// One user's complete input set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Portfolio {
    pub user_id: String,
    pub assets: Vec<Asset>,
    pub liabilities: Vec<Liability>,
    #[serde(default)]
    pub snapshots: Vec<Snapshot>,
}

/// Runs many projections against a shared engine
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new();
/// let requests: Vec<_> = [12, 60, 120]
///     .iter()
///     .map(|&m| ProjectionRequest::new(Horizon::Months(m), ProjectionMode::Future, Granularity::Year))
///     .collect();
/// let results = runner.run_scenarios(&portfolio, &requests, now);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    engine: ProjectionEngine,
}

impl ScenarioRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ProjectionConfig) -> Self {
        Self {
            engine: ProjectionEngine::new(config),
        }
    }

    pub fn engine(&self) -> &ProjectionEngine {
        &self.engine
    }

    /// Run a single projection
    pub fn run(
        &self,
        portfolio: &Portfolio,
        request: &ProjectionRequest,
        now: Month,
    ) -> Result<ProjectionResult, ValidationError> {
        self.engine.project(
            &portfolio.assets,
            &portfolio.liabilities,
            &portfolio.snapshots,
            request,
            now,
        )
    }

    /// Same request for many portfolios, in input order
    pub fn run_batch(
        &self,
        portfolios: &[Portfolio],
        request: &ProjectionRequest,
        now: Month,
    ) -> Vec<Result<ProjectionResult, ValidationError>> {
        portfolios
            .par_iter()
            .map(|portfolio| self.run(portfolio, request, now))
            .collect()
    }

    /// Several requests (e.g. horizons or modes) for one portfolio, in input order
    pub fn run_scenarios(
        &self,
        portfolio: &Portfolio,
        requests: &[ProjectionRequest],
        now: Month,
    ) -> Vec<Result<ProjectionResult, ValidationError>> {
        requests
            .par_iter()
            .map(|request| self.run(portfolio, request, now))
            .collect()
    }
}
