//! Load assets and liabilities from CSV exports

use std::io::Read;
use std::path::Path;

use csv::Reader;

use super::{Asset, AssetKind, Liability};
use crate::error::{RepositoryError, ValidationError};

/// Raw CSV row for an asset
#[derive(Debug, serde::Deserialize)]
struct AssetRow {
    id: String,
    #[serde(default)]
    name: Option<String>,
    kind: String,
    amount: f64,
    annual_growth_rate: f64,
    start_month: String,
    #[serde(default)]
    liquid: Option<String>,
}

impl AssetRow {
    fn to_asset(self) -> Result<Asset, ValidationError> {
        let kind = match self.kind.trim().to_ascii_lowercase().as_str() {
            "lump_sum" | "lump" | "lumpsum" => AssetKind::LumpSum,
            "recurring" | "sip" => AssetKind::Recurring,
            other => {
                return Err(ValidationError::UnknownVariant {
                    field: "asset kind",
                    value: other.to_string(),
                })
            }
        };

        let liquid = match self.liquid.as_deref().map(str::trim) {
            None | Some("") => false,
            Some(v) => parse_flag(v)?,
        };

        let asset = Asset {
            name: self.name.filter(|n| !n.trim().is_empty()).unwrap_or_else(|| self.id.clone()),
            id: self.id,
            kind,
            amount: self.amount,
            annual_growth_rate: self.annual_growth_rate,
            start_month: self.start_month.parse()?,
            liquid,
        };
        asset.validate()?;
        Ok(asset)
    }
}

/// Raw CSV row for a liability
#[derive(Debug, serde::Deserialize)]
struct LiabilityRow {
    id: String,
    #[serde(default)]
    name: Option<String>,
    principal: f64,
    annual_interest_rate: f64,
    emi_amount: f64,
    start_month: String,
    original_tenure_months: u32,
    #[serde(default)]
    current_balance_hint: Option<f64>,
}

impl LiabilityRow {
    fn to_liability(self) -> Result<Liability, ValidationError> {
        let liability = Liability {
            name: self.name.filter(|n| !n.trim().is_empty()).unwrap_or_else(|| self.id.clone()),
            id: self.id,
            principal: self.principal,
            annual_interest_rate: self.annual_interest_rate,
            emi_amount: self.emi_amount,
            start_month: self.start_month.parse()?,
            original_tenure_months: self.original_tenure_months,
            current_balance_hint: self.current_balance_hint,
        };
        liability.validate()?;
        Ok(liability)
    }
}

fn parse_flag(value: &str) -> Result<bool, ValidationError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Ok(true),
        "false" | "no" | "n" | "0" => Ok(false),
        other => Err(ValidationError::UnknownVariant {
            field: "liquid flag",
            value: other.to_string(),
        }),
    }
}

/// Load assets from a CSV file
pub fn load_assets<P: AsRef<Path>>(path: P) -> Result<Vec<Asset>, RepositoryError> {
    let reader = Reader::from_path(path).map_err(|source| RepositoryError::Csv { what: "assets", source })?;
    read_assets(reader)
}

/// Load assets from any reader (e.g. a string buffer or request body)
pub fn load_assets_from_reader<R: Read>(reader: R) -> Result<Vec<Asset>, RepositoryError> {
    read_assets(Reader::from_reader(reader))
}

fn read_assets<R: Read>(mut reader: Reader<R>) -> Result<Vec<Asset>, RepositoryError> {
    let mut assets = Vec::new();
    for result in reader.deserialize() {
        let row: AssetRow = result.map_err(|source| RepositoryError::Csv { what: "assets", source })?;
        let asset = row
            .to_asset()
            .map_err(|source| RepositoryError::InvalidRecord { what: "assets", source })?;
        assets.push(asset);
    }
    Ok(assets)
}

/// Load liabilities from a CSV file
pub fn load_liabilities<P: AsRef<Path>>(path: P) -> Result<Vec<Liability>, RepositoryError> {
    let reader =
        Reader::from_path(path).map_err(|source| RepositoryError::Csv { what: "liabilities", source })?;
    read_liabilities(reader)
}

/// Load liabilities from any reader
pub fn load_liabilities_from_reader<R: Read>(reader: R) -> Result<Vec<Liability>, RepositoryError> {
    read_liabilities(Reader::from_reader(reader))
}

fn read_liabilities<R: Read>(mut reader: Reader<R>) -> Result<Vec<Liability>, RepositoryError> {
    let mut liabilities = Vec::new();
    for result in reader.deserialize() {
        let row: LiabilityRow =
            result.map_err(|source| RepositoryError::Csv { what: "liabilities", source })?;
        let liability = row
            .to_liability()
            .map_err(|source| RepositoryError::InvalidRecord { what: "liabilities", source })?;
        liabilities.push(liability);
    }
    Ok(liabilities)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_assets() {
        let data = "\
id,name,kind,amount,annual_growth_rate,start_month,liquid
fd,Fixed deposit,lump_sum,500000,7.1,2023-04,false
nifty,,recurring,10000,12,2022-01,yes
";
        let assets = load_assets_from_reader(data.as_bytes()).unwrap();
        assert_eq!(assets.len(), 2);
        assert_eq!(assets[0].name, "Fixed deposit");
        assert_eq!(assets[0].kind, AssetKind::LumpSum);
        assert!(!assets[0].liquid);
        assert_eq!(assets[1].name, "nifty");
        assert_eq!(assets[1].kind, AssetKind::Recurring);
        assert!(assets[1].liquid);
        assert_eq!(assets[1].start_month.to_string(), "2022-01");
    }

    #[test]
    fn test_load_liabilities_with_optional_hint() {
        let data = "\
id,name,principal,annual_interest_rate,emi_amount,start_month,original_tenure_months,current_balance_hint
home,Home loan,2500000,8.5,21714,2024-10,180,2400000
car,Car loan,600000,9,12455,2025-01,60,
";
        let liabilities = load_liabilities_from_reader(data.as_bytes()).unwrap();
        assert_eq!(liabilities.len(), 2);
        assert_eq!(liabilities[0].current_balance_hint, Some(2_400_000.0));
        assert_eq!(liabilities[1].current_balance_hint, None);
        assert_eq!(liabilities[1].original_tenure_months, 60);
    }

    #[test]
    fn test_rejects_unknown_kind() {
        let data = "\
id,name,kind,amount,annual_growth_rate,start_month,liquid
gold,,bullion,100,5,2023-01,false
";
        let err = load_assets_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::InvalidRecord {
                source: ValidationError::UnknownVariant { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_malformed_month() {
        let data = "\
id,name,principal,annual_interest_rate,emi_amount,start_month,original_tenure_months,current_balance_hint
home,,2500000,8.5,21714,10/2024,180,
";
        let err = load_liabilities_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::InvalidRecord {
                source: ValidationError::MalformedMonth(_),
                ..
            }
        ));
    }
}
