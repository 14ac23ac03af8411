// ⚙️ Ledger Configuration
// Tunables shared by every group a registry creates.

use crate::money::UNITS_PER_CENT;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Allowed distance of a percentage map's sum from 100 (default: 0.01)
    pub percentage_tolerance: f64,

    /// Net balances below this many units are reported as settled (default: 1 cent)
    pub settlement_threshold_units: i64,

    /// Members a group needs before it accepts expenses (default: 2)
    pub min_group_size: usize,
}

impl LedgerConfig {
    pub fn new() -> Self {
        LedgerConfig {
            percentage_tolerance: 0.01,
            settlement_threshold_units: UNITS_PER_CENT,
            min_group_size: 2,
        }
    }

    /// Parse a JSON document; absent fields keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse ledger config")
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read ledger config {}", path.display()))?;
        Self::from_json_str(&raw)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = LedgerConfig::default();
        assert_eq!(config.percentage_tolerance, 0.01);
        assert_eq!(config.settlement_threshold_units, 1_000);
        assert_eq!(config.min_group_size, 2);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = LedgerConfig::from_json_str(r#"{ "percentage_tolerance": 0.5 }"#).unwrap();
        assert_eq!(config.percentage_tolerance, 0.5);
        assert_eq!(config.settlement_threshold_units, 1_000);
        assert_eq!(config.min_group_size, 2);
    }

    #[test]
    fn test_invalid_json() {
        let err = LedgerConfig::from_json_str("{ nope").unwrap_err();
        assert!(err.to_string().contains("Failed to parse ledger config"));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "settlement_threshold_units": 1, "min_group_size": 3 }}"#).unwrap();

        let config = LedgerConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.settlement_threshold_units, 1);
        assert_eq!(config.min_group_size, 3);

        let missing = LedgerConfig::from_json_file(Path::new("/definitely/not/here.json"));
        assert!(missing.is_err());
    }
}
