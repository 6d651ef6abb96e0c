//! Holdings: the assets and liabilities a projection is built from

mod data;
pub mod loader;

pub use data::{Asset, AssetKind, Liability, MAX_TENURE_MONTHS};
pub use loader::{load_assets, load_assets_from_reader, load_liabilities, load_liabilities_from_reader};
