//! Repository-backed entry point: project a stored user's holdings

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::ProjectionError;
use crate::month::Month;
use crate::repository::{HoldingsRepository, SnapshotRepository};

use super::engine::{ProjectionEngine, ProjectionRequest};
use super::result::ProjectionResult;

/// Recorded snapshot next to the value recomputed from current holdings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDrift {
    pub month: Month,
    pub recorded_net_worth: f64,
    pub computed_net_worth: f64,
    /// Computed minus recorded
    pub drift: f64,
}

/// Loads a user's data from a repository and runs the engine on it
#[derive(Debug, Clone)]
pub struct ProjectionService<R> {
    repository: R,
    engine: ProjectionEngine,
}

impl<R> ProjectionService<R>
where
    R: SnapshotRepository + HoldingsRepository,
{
    pub fn new(repository: R, engine: ProjectionEngine) -> Self {
        Self { repository, engine }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn engine(&self) -> &ProjectionEngine {
        &self.engine
    }

    /// Project one user's stored holdings
    pub fn project(
        &self,
        user_id: &str,
        request: &ProjectionRequest,
        now: Month,
    ) -> Result<ProjectionResult, ProjectionError> {
        let assets = self.repository.list_assets(user_id)?;
        let liabilities = self.repository.list_liabilities(user_id)?;
        let snapshots = if request.mode.uses_snapshots() {
            self.repository.list_snapshots(user_id)?
        } else {
            Vec::new()
        };
        debug!("loaded data for user '{}'", user_id);

        Ok(self.engine.project(&assets, &liabilities, &snapshots, request, now)?)
    }

    /// Compare a stored snapshot against today's holdings; `None` when no
    /// snapshot exists for `month`
    pub fn snapshot_drift(&self, user_id: &str, month: Month) -> Result<Option<SnapshotDrift>, ProjectionError> {
        let Some(snapshot) = self.repository.get_snapshot(user_id, month)? else {
            return Ok(None);
        };
        let assets = self.repository.list_assets(user_id)?;
        let liabilities = self.repository.list_liabilities(user_id)?;
        let computed = self.engine.evaluator().evaluate(&assets, &liabilities, month);

        Ok(Some(SnapshotDrift {
            month,
            recorded_net_worth: snapshot.net_worth,
            computed_net_worth: computed.net_worth,
            drift: computed.net_worth - snapshot.net_worth,
        }))
    }
}
