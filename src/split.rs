// ➗ Split Engine - exact integer allocation of an expense total
//
// Every strategy returns participant key → non-negative share, and the shares
// always sum to the total exactly. Rounding leftovers are handed out with the
// largest-remainder method, ties broken by ascending key so the result never
// depends on map iteration order.

use crate::error::SplitError;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

pub type Shares = BTreeMap<String, i64>;

// ============================================================================
// SPLIT ENGINE
// ============================================================================

pub struct SplitEngine {
    /// Allowed distance of a percentage sum from 100 (default: 0.01)
    pub percentage_tolerance: f64,
}

impl SplitEngine {
    pub fn new() -> Self {
        SplitEngine {
            percentage_tolerance: 0.01,
        }
    }

    pub fn with_tolerance(percentage_tolerance: f64) -> Self {
        SplitEngine {
            percentage_tolerance,
        }
    }

    /// Equal split across `participants` (already canonical keys)
    ///
    /// `total mod n` participants - the smallest keys - get one extra unit.
    ///
    /// ```
    /// use expense_ledger::SplitEngine;
    ///
    /// let shares = SplitEngine::new()
    ///     .equal(10_000_000, &["charlie", "alice", "bob"])
    ///     .unwrap();
    /// assert_eq!(shares["alice"], 3_333_334);
    /// assert_eq!(shares["charlie"], 3_333_333);
    /// ```
    pub fn equal<S: AsRef<str>>(&self, total: i64, participants: &[S]) -> Result<Shares, SplitError> {
        let n = participants.len();
        if n < 2 {
            return Err(SplitError::InsufficientParticipants(n));
        }

        let base = total / n as i64;
        let remainder = (total % n as i64) as usize;

        let mut sorted: Vec<&str> = participants.iter().map(AsRef::as_ref).collect();
        sorted.sort_unstable();

        let shares: Shares = sorted
            .into_iter()
            .enumerate()
            .map(|(i, key)| {
                let share = if i < remainder { base + 1 } else { base };
                (key.to_string(), share)
            })
            .collect();

        debug!(total, participants = n, base, remainder, "equal split");
        Ok(shares)
    }

    /// Percentage split; `percentages` must sum to 100 within tolerance
    pub fn percentage(
        &self,
        total: i64,
        percentages: &BTreeMap<String, f64>,
    ) -> Result<Shares, SplitError> {
        let mut sum = 0.0;
        for (key, pct) in percentages {
            if !pct.is_finite() {
                return Err(SplitError::NonFiniteValue(key.clone()));
            }
            if *pct < 0.0 {
                return Err(SplitError::NegativePercentage(key.clone()));
            }
            sum += pct;
        }
        if (sum - 100.0).abs() > self.percentage_tolerance {
            return Err(SplitError::PercentageSumMismatch(sum));
        }

        let raw = percentages
            .iter()
            .map(|(key, pct)| (key.as_str(), pct / 100.0 * total as f64));
        let shares = largest_remainder(total, raw);

        debug!(total, participants = shares.len(), "percentage split");
        Ok(shares)
    }

    /// Weighted split; zero-weight participants get no entry at all
    pub fn weights(&self, total: i64, weights: &BTreeMap<String, f64>) -> Result<Shares, SplitError> {
        let mut sum = 0.0;
        for (key, weight) in weights {
            if !weight.is_finite() {
                return Err(SplitError::NonFiniteValue(key.clone()));
            }
            if *weight < 0.0 {
                return Err(SplitError::NegativeWeight(key.clone()));
            }
            sum += weight;
        }
        if sum <= 0.0 {
            return Err(SplitError::NonPositiveWeightSum(sum));
        }

        let raw = weights
            .iter()
            .filter(|(_, weight)| **weight != 0.0)
            .map(|(key, weight)| (key.as_str(), weight / sum * total as f64));
        let shares = largest_remainder(total, raw);

        debug!(total, participants = shares.len(), "weights split");
        Ok(shares)
    }
}

impl Default for SplitEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// LARGEST REMAINDER
// ============================================================================

struct Portion<'a> {
    key: &'a str,
    base: i64,
    frac: f64,
}

/// Floor every raw share, then hand out the leftover one unit at a time by
/// descending fractional remainder (ties: ascending key), wrapping around.
///
/// If the floors overshoot the total (a percentage sum a hair above 100),
/// units are taken back in the reverse order, skipping empty shares.
fn largest_remainder<'a>(total: i64, raw: impl Iterator<Item = (&'a str, f64)>) -> Shares {
    let mut portions: Vec<Portion<'a>> = raw
        .map(|(key, value)| {
            let base = value.floor() as i64;
            Portion {
                key,
                base,
                frac: value - base as f64,
            }
        })
        .collect();

    if portions.is_empty() {
        return Shares::new();
    }

    portions.sort_by(|a, b| {
        b.frac
            .partial_cmp(&a.frac)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.key.cmp(b.key))
    });

    // floors of totals near i64::MAX can sum past it
    let used: i128 = portions.iter().map(|p| i128::from(p.base)).sum();
    let mut leftover = i128::from(total) - used;
    let n = portions.len();

    let mut i = 0;
    while leftover > 0 {
        portions[i % n].base += 1;
        leftover -= 1;
        i += 1;
    }

    let mut i = 0;
    let mut idle = 0;
    while leftover < 0 && idle < n {
        let portion = &mut portions[n - 1 - (i % n)];
        if portion.base > 0 {
            portion.base -= 1;
            leftover += 1;
            idle = 0;
        } else {
            idle += 1;
        }
        i += 1;
    }

    portions
        .into_iter()
        .map(|p| (p.key.to_string(), p.base))
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn sum(shares: &Shares) -> i64 {
        shares.values().sum()
    }

    #[test]
    fn test_equal_split_scenario() {
        let engine = SplitEngine::new();
        let shares = engine
            .equal(10_000_000, &["alice", "bob", "charlie"])
            .unwrap();

        assert_eq!(sum(&shares), 10_000_000);
        assert_eq!(shares["alice"], 3_333_334);
        assert_eq!(shares["bob"], 3_333_333);
        assert_eq!(shares["charlie"], 3_333_333);
    }

    #[test]
    fn test_equal_split_remainder_goes_to_smallest_keys() {
        let engine = SplitEngine::new();
        let shares = engine.equal(11, &["dave", "bob", "carol", "alice"]).unwrap();

        // 11 = 4 * 2 + 3
        assert_eq!(shares["alice"], 3);
        assert_eq!(shares["bob"], 3);
        assert_eq!(shares["carol"], 3);
        assert_eq!(shares["dave"], 2);
        assert_eq!(sum(&shares), 11);
    }

    #[test]
    fn test_equal_split_needs_two() {
        let engine = SplitEngine::new();
        assert_eq!(
            engine.equal(100, &["alice"]).unwrap_err(),
            SplitError::InsufficientParticipants(1)
        );
        let empty: [&str; 0] = [];
        assert_eq!(
            engine.equal(100, &empty).unwrap_err(),
            SplitError::InsufficientParticipants(0)
        );
    }

    #[test]
    fn test_percentage_split_exact() {
        let engine = SplitEngine::new();
        let shares = engine
            .percentage(
                10_000_000,
                &params(&[("alice", 20.0), ("bob", 40.0), ("charlie", 40.0)]),
            )
            .unwrap();

        assert_eq!(shares["alice"], 2_000_000);
        assert_eq!(shares["bob"], 4_000_000);
        assert_eq!(shares["charlie"], 4_000_000);
    }

    #[test]
    fn test_percentage_split_thirds() {
        let engine = SplitEngine::new();
        let third = 100.0 / 3.0;
        let shares = engine
            .percentage(100, &params(&[("c", third), ("a", third), ("b", third)]))
            .unwrap();

        assert_eq!(sum(&shares), 100);
        // equal remainders: ties broken by ascending key
        assert_eq!(shares["a"], 34);
        assert_eq!(shares["b"], 33);
        assert_eq!(shares["c"], 33);
    }

    #[test]
    fn test_percentage_largest_remainder_first() {
        let engine = SplitEngine::new();
        // raw: a=0.15, b=0.85 of 1 unit
        let shares = engine.percentage(1, &params(&[("a", 15.0), ("b", 85.0)])).unwrap();
        assert_eq!(shares["a"], 0);
        assert_eq!(shares["b"], 1);
    }

    #[test]
    fn test_percentage_within_tolerance_still_exact() {
        let engine = SplitEngine::new();

        // 99.992%: floors leave 800 units over, handed out alternately
        let under = engine
            .percentage(10_000_000, &params(&[("a", 49.996), ("b", 49.996)]))
            .unwrap();
        assert_eq!(under["a"], 5_000_000);
        assert_eq!(under["b"], 5_000_000);

        // 100.008%: floors overshoot the total and units are taken back
        let over = engine
            .percentage(10_000_000, &params(&[("a", 50.004), ("b", 50.004)]))
            .unwrap();
        assert_eq!(over["a"], 5_000_000);
        assert_eq!(over["b"], 5_000_000);
        assert_eq!(sum(&over), 10_000_000);
    }

    #[test]
    fn test_totals_near_i64_max_do_not_overflow() {
        let engine = SplitEngine::new();
        let shares = engine
            .weights(i64::MAX, &params(&[("bob", 1.0), ("charlie", 1.0)]))
            .unwrap();

        let total: i128 = shares.values().map(|s| i128::from(*s)).sum();
        assert_eq!(total, i128::from(i64::MAX));
        assert_eq!(shares["bob"], 1 << 62);
        assert_eq!(shares["charlie"], (1 << 62) - 1);
    }

    #[test]
    fn test_percentage_leftover_wraps_around() {
        let engine = SplitEngine::new();
        // 99.995% of a large total leaves more leftover units than participants
        let shares = engine
            .percentage(100_000_000, &params(&[("a", 50.0), ("b", 49.995)]))
            .unwrap();
        assert_eq!(sum(&shares), 100_000_000);
        assert!(shares["a"] > 50_000_000);
    }

    #[test]
    fn test_percentage_errors() {
        let engine = SplitEngine::new();
        assert_eq!(
            engine
                .percentage(100, &params(&[("a", 50.0), ("b", 40.0)]))
                .unwrap_err(),
            SplitError::PercentageSumMismatch(90.0)
        );
        assert_eq!(
            engine
                .percentage(100, &params(&[("a", 120.0), ("b", -20.0)]))
                .unwrap_err(),
            SplitError::NegativePercentage("b".to_string())
        );
        assert!(matches!(
            engine.percentage(100, &params(&[])),
            Err(SplitError::PercentageSumMismatch(_))
        ));
        assert_eq!(
            engine
                .percentage(100, &params(&[("a", f64::NAN)]))
                .unwrap_err(),
            SplitError::NonFiniteValue("a".to_string())
        );
    }

    #[test]
    fn test_custom_tolerance() {
        let engine = SplitEngine::with_tolerance(1.0);
        let shares = engine
            .percentage(1_000, &params(&[("a", 49.5), ("b", 50.0)]))
            .unwrap();
        assert_eq!(sum(&shares), 1_000);
    }

    #[test]
    fn test_weights_exclude_zero() {
        let engine = SplitEngine::new();
        let shares = engine
            .weights(
                10_000_000,
                &params(&[("alice", 0.0), ("bob", 4.0), ("charlie", 4.0)]),
            )
            .unwrap();

        assert!(!shares.contains_key("alice"));
        assert_eq!(shares["bob"], 5_000_000);
        assert_eq!(shares["charlie"], 5_000_000);
    }

    #[test]
    fn test_weights_uneven() {
        let engine = SplitEngine::new();
        let shares = engine
            .weights(100, &params(&[("a", 1.0), ("b", 1.0), ("c", 1.0)]))
            .unwrap();
        assert_eq!(sum(&shares), 100);
        assert_eq!(shares["a"], 34);

        let shares = engine
            .weights(1_000, &params(&[("a", 2.0), ("b", 1.0)]))
            .unwrap();
        assert_eq!(shares["a"], 667);
        assert_eq!(shares["b"], 333);
    }

    #[test]
    fn test_weights_errors() {
        let engine = SplitEngine::new();
        assert_eq!(
            engine
                .weights(100, &params(&[("a", -1.0), ("b", 2.0)]))
                .unwrap_err(),
            SplitError::NegativeWeight("a".to_string())
        );
        assert_eq!(
            engine
                .weights(100, &params(&[("a", 0.0), ("b", 0.0)]))
                .unwrap_err(),
            SplitError::NonPositiveWeightSum(0.0)
        );
        assert_eq!(
            engine.weights(100, &params(&[])).unwrap_err(),
            SplitError::NonPositiveWeightSum(0.0)
        );
        assert_eq!(
            engine
                .weights(100, &params(&[("a", f64::INFINITY)]))
                .unwrap_err(),
            SplitError::NonFiniteValue("a".to_string())
        );
    }

    #[test]
    fn test_reclaim_skips_empty_shares() {
        // floors overshoot by 2; "z" has nothing to give back
        let raw = vec![("a", 5.9), ("b", 5.8), ("z", 0.0)];
        let shares = largest_remainder(9, raw.into_iter());
        assert_eq!(sum(&shares), 9);
        assert_eq!(shares["z"], 0);
    }
}
