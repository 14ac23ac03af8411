// 🧾 Expense Entity
// An expense is immutable once ingested. Only its split-parameter keys are
// rewritten to canonical form before it is stored.

use crate::error::{LedgerError, LedgerResult};
use crate::identity::canonicalize;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// SPLIT METHOD
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMethod {
    /// Every member pays the same share (pennies go to the smallest keys)
    Equal,

    /// Named participants pay a percentage each, summing to 100
    Percentage,

    /// Named participants pay in proportion to a weight; weight 0 excludes
    Weights,
}

impl SplitMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SplitMethod::Equal => "equal",
            SplitMethod::Percentage => "percentage",
            SplitMethod::Weights => "weights",
        }
    }
}

impl FromStr for SplitMethod {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "equal" => Ok(SplitMethod::Equal),
            "percentage" => Ok(SplitMethod::Percentage),
            "weights" => Ok(SplitMethod::Weights),
            other => Err(LedgerError::UnknownSplitMethod(other.to_string())),
        }
    }
}

impl fmt::Display for SplitMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// NEW EXPENSE (request)
// ============================================================================

/// An expense as submitted, before validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExpense {
    pub paid_by: String,
    pub total_units: i64,
    pub description: String,
    pub split_method: String,

    /// Percentages or weights keyed by any spelling of a member name
    #[serde(default)]
    pub split_params: HashMap<String, f64>,
}

impl NewExpense {
    pub fn equal(paid_by: &str, total_units: i64, description: &str) -> Self {
        NewExpense {
            paid_by: paid_by.to_string(),
            total_units,
            description: description.to_string(),
            split_method: SplitMethod::Equal.as_str().to_string(),
            split_params: HashMap::new(),
        }
    }

    pub fn percentage(
        paid_by: &str,
        total_units: i64,
        description: &str,
        percentages: &[(&str, f64)],
    ) -> Self {
        NewExpense {
            split_method: SplitMethod::Percentage.as_str().to_string(),
            split_params: to_param_map(percentages),
            ..Self::equal(paid_by, total_units, description)
        }
    }

    pub fn weights(
        paid_by: &str,
        total_units: i64,
        description: &str,
        weights: &[(&str, f64)],
    ) -> Self {
        NewExpense {
            split_method: SplitMethod::Weights.as_str().to_string(),
            split_params: to_param_map(weights),
            ..Self::equal(paid_by, total_units, description)
        }
    }
}

fn to_param_map(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), *value))
        .collect()
}

// ============================================================================
// EXPENSE (stored)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// Unique and strictly increasing within the group (1, 2, 3, ...)
    pub id: u64,
    pub total_units: i64,

    /// Canonical key of the payer
    pub paid_by: String,
    pub description: String,
    pub split_method: SplitMethod,

    /// Canonicalized split parameters (empty for equal splits)
    pub split_params: BTreeMap<String, f64>,
    pub created_at: DateTime<Utc>,
}

/// Rewrite split-parameter keys to canonical form
///
/// Fails on an empty name or when two spellings collapse onto one key.
pub fn canonicalize_split_params(
    params: &HashMap<String, f64>,
) -> LedgerResult<BTreeMap<String, f64>> {
    let mut out = BTreeMap::new();
    for (name, value) in params {
        let key = canonicalize(name);
        if key.is_empty() {
            return Err(LedgerError::EmptySplitName);
        }
        if out.insert(key, *value).is_some() {
            return Err(LedgerError::DuplicateSplitName(name.clone()));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_method_parse() {
        assert_eq!("equal".parse::<SplitMethod>().unwrap(), SplitMethod::Equal);
        assert_eq!(
            "percentage".parse::<SplitMethod>().unwrap(),
            SplitMethod::Percentage
        );
        assert_eq!("weights".parse::<SplitMethod>().unwrap(), SplitMethod::Weights);
        assert_eq!(
            "EQUAL".parse::<SplitMethod>().unwrap_err(),
            LedgerError::UnknownSplitMethod("EQUAL".to_string())
        );
    }

    #[test]
    fn test_split_method_serde() {
        let json = serde_json::to_string(&SplitMethod::Weights).unwrap();
        assert_eq!(json, "\"weights\"");
    }

    #[test]
    fn test_canonicalize_split_params() {
        let params = to_param_map(&[(" Alice", 20.0), ("BOB", 80.0)]);
        let canonical = canonicalize_split_params(&params).unwrap();
        assert_eq!(canonical.get("alice"), Some(&20.0));
        assert_eq!(canonical.get("bob"), Some(&80.0));
    }

    #[test]
    fn test_canonicalize_split_params_rejects_collisions() {
        let params = to_param_map(&[("Alice", 50.0), ("alice ", 50.0)]);
        assert!(matches!(
            canonicalize_split_params(&params),
            Err(LedgerError::DuplicateSplitName(_))
        ));

        let params = to_param_map(&[("  ", 100.0)]);
        assert_eq!(
            canonicalize_split_params(&params).unwrap_err(),
            LedgerError::EmptySplitName
        );
    }

    #[test]
    fn test_new_expense_deserializes_without_params() {
        let json = r#"{
            "paid_by": "Alice",
            "total_units": 10000000,
            "description": "dinner",
            "split_method": "equal"
        }"#;
        let expense: NewExpense = serde_json::from_str(json).unwrap();
        assert!(expense.split_params.is_empty());
        assert_eq!(expense.total_units, 10_000_000);
    }
}
