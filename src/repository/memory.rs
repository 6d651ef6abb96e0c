//! In-memory repository keyed by user id

use std::collections::HashMap;

use super::{HoldingsRepository, Snapshot, SnapshotRepository};
use crate::error::RepositoryError;
use crate::holdings::{Asset, Liability};
use crate::month::Month;

#[derive(Debug, Clone, Default)]
struct UserData {
    assets: Vec<Asset>,
    liabilities: Vec<Liability>,
    snapshots: Vec<Snapshot>,
}

/// Holds every user's holdings and snapshots in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    users: HashMap<String, UserData>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_assets(&mut self, user_id: &str, assets: Vec<Asset>) {
        self.users.entry(user_id.to_string()).or_default().assets = assets;
    }

    pub fn insert_liabilities(&mut self, user_id: &str, liabilities: Vec<Liability>) {
        self.users.entry(user_id.to_string()).or_default().liabilities = liabilities;
    }

    /// Replace a user's snapshots; stored in month order
    pub fn insert_snapshots(&mut self, user_id: &str, mut snapshots: Vec<Snapshot>) {
        snapshots.sort_by_key(|s| s.month);
        self.users.entry(user_id.to_string()).or_default().snapshots = snapshots;
    }

    pub fn user_ids(&self) -> impl Iterator<Item = &str> {
        self.users.keys().map(String::as_str)
    }

    fn user(&self, user_id: &str) -> Result<&UserData, RepositoryError> {
        self.users
            .get(user_id)
            .ok_or_else(|| RepositoryError::UnknownUser(user_id.to_string()))
    }
}

impl SnapshotRepository for InMemoryRepository {
    fn list_snapshots(&self, user_id: &str) -> Result<Vec<Snapshot>, RepositoryError> {
        Ok(self.user(user_id)?.snapshots.clone())
    }

    fn get_snapshot(&self, user_id: &str, month: Month) -> Result<Option<Snapshot>, RepositoryError> {
        Ok(self
            .user(user_id)?
            .snapshots
            .iter()
            .find(|s| s.month == month)
            .cloned())
    }
}

impl HoldingsRepository for InMemoryRepository {
    fn list_assets(&self, user_id: &str) -> Result<Vec<Asset>, RepositoryError> {
        Ok(self.user(user_id)?.assets.clone())
    }

    fn list_liabilities(&self, user_id: &str) -> Result<Vec<Liability>, RepositoryError> {
        Ok(self.user(user_id)?.liabilities.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(s: &str) -> Month {
        s.parse().unwrap()
    }

    #[test]
    fn test_snapshot_lookup() {
        let mut repo = InMemoryRepository::new();
        repo.insert_snapshots(
            "alice",
            vec![
                Snapshot::new(month("2025-03"), 300.0, 100.0, 50.0),
                Snapshot::new(month("2025-01"), 100.0, 100.0, 10.0),
            ],
        );

        let listed = repo.list_snapshots("alice").unwrap();
        assert_eq!(listed[0].month, month("2025-01"));

        let found = repo.get_snapshot("alice", month("2025-03")).unwrap().unwrap();
        assert_eq!(found.net_worth, 200.0);
        assert!(repo.get_snapshot("alice", month("2025-02")).unwrap().is_none());
    }

    #[test]
    fn test_unknown_user() {
        let repo = InMemoryRepository::new();
        assert!(matches!(repo.list_assets("bob"), Err(RepositoryError::UnknownUser(_))));
    }

    #[test]
    fn test_holdings_round_trip_per_user() {
        let mut repo = InMemoryRepository::new();
        repo.insert_assets("alice", vec![Asset::lump_sum("fd", 1000.0, 7.0, month("2024-01"))]);
        repo.insert_liabilities("bob", vec![Liability::new("car", 500.0, 9.0, 50.0, month("2024-01"), 12)]);

        assert_eq!(repo.list_assets("alice").unwrap().len(), 1);
        assert!(repo.list_liabilities("alice").unwrap().is_empty());
        assert_eq!(repo.list_liabilities("bob").unwrap()[0].id, "car");
        assert_eq!(repo.user_ids().count(), 2);
    }
}
