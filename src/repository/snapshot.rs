//! Persisted monthly net worth snapshots

use std::io::Read;
use std::path::Path;

use csv::Reader;
use serde::{Deserialize, Serialize};

use crate::error::RepositoryError;
use crate::month::Month;

/// Net worth recorded for a past month. Read-only input to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub month: Month,
    pub total_assets: f64,
    pub total_liabilities: f64,
    pub net_worth: f64,
    pub liquid_assets: f64,
}

impl Snapshot {
    /// Snapshot whose net worth is derived from the two totals
    pub fn new(month: Month, total_assets: f64, total_liabilities: f64, liquid_assets: f64) -> Self {
        Self {
            month,
            total_assets,
            total_liabilities,
            net_worth: total_assets - total_liabilities,
            liquid_assets,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SnapshotRow {
    month: String,
    total_assets: f64,
    total_liabilities: f64,
    #[serde(default)]
    net_worth: Option<f64>,
    #[serde(default)]
    liquid_assets: Option<f64>,
}

impl SnapshotRow {
    fn to_snapshot(self) -> Result<Snapshot, RepositoryError> {
        let month = self
            .month
            .parse()
            .map_err(|source| RepositoryError::InvalidRecord { what: "snapshots", source })?;
        Ok(Snapshot {
            month,
            total_assets: self.total_assets,
            total_liabilities: self.total_liabilities,
            net_worth: self
                .net_worth
                .unwrap_or(self.total_assets - self.total_liabilities),
            liquid_assets: self.liquid_assets.unwrap_or(0.0),
        })
    }
}

/// Load snapshots from a CSV file with columns
/// `month,total_assets,total_liabilities[,net_worth][,liquid_assets]`
pub fn load_snapshots<P: AsRef<Path>>(path: P) -> Result<Vec<Snapshot>, RepositoryError> {
    let reader =
        Reader::from_path(path).map_err(|source| RepositoryError::Csv { what: "snapshots", source })?;
    read_snapshots(reader)
}

pub fn load_snapshots_from_reader<R: Read>(reader: R) -> Result<Vec<Snapshot>, RepositoryError> {
    read_snapshots(Reader::from_reader(reader))
}

fn read_snapshots<R: Read>(mut reader: Reader<R>) -> Result<Vec<Snapshot>, RepositoryError> {
    let mut snapshots = Vec::new();
    for result in reader.deserialize() {
        let row: SnapshotRow = result.map_err(|source| RepositoryError::Csv { what: "snapshots", source })?;
        snapshots.push(row.to_snapshot()?);
    }
    snapshots.sort_by_key(|s| s.month);
    Ok(snapshots)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_snapshots_derives_missing_fields() {
        let data = "\
month,total_assets,total_liabilities,net_worth,liquid_assets
2025-02,1200000,900000,300000,150000
2025-01,1100000,950000,,
";
        let snapshots = load_snapshots_from_reader(data.as_bytes()).unwrap();
        assert_eq!(snapshots.len(), 2);
        // sorted chronologically
        assert_eq!(snapshots[0].month.to_string(), "2025-01");
        assert_eq!(snapshots[0].net_worth, 150_000.0);
        assert_eq!(snapshots[0].liquid_assets, 0.0);
        assert_eq!(snapshots[1].net_worth, 300_000.0);
    }

    #[test]
    fn test_bad_month_is_rejected() {
        let data = "month,total_assets,total_liabilities\nJan 2025,1,1\n";
        assert!(load_snapshots_from_reader(data.as_bytes()).is_err());
    }
}
