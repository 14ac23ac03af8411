// ⚖️ Settlement Calculator - net every pair of members into one balance
//
// net(A, B) = Σ edges A→B − Σ edges B→A, across all expenses.
// Only the positive direction of a pair is ever reported.

use crate::entities::MembershipStore;
use crate::graph::DebtGraph;
use crate::money::{format_major, units_to_major, UNITS_PER_CENT};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// SETTLEMENT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub from_key: String,
    pub from: String,
    pub to_key: String,
    pub to: String,
    pub amount_units: i64,
}

impl Settlement {
    /// "Bob owes Alice"
    pub fn label(&self) -> String {
        format!("{} owes {}", self.from, self.to)
    }

    /// Amount in major currency units (dollars)
    pub fn amount(&self) -> f64 {
        units_to_major(self.amount_units)
    }
}

impl fmt::Display for Settlement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.label(), format_major(self.amount_units))
    }
}

// ============================================================================
// SETTLEMENT CALCULATOR
// ============================================================================

pub struct SettlementCalculator {
    /// Net balances below this many units count as settled (default: 1 cent)
    pub threshold_units: i64,
}

impl SettlementCalculator {
    pub fn new() -> Self {
        SettlementCalculator {
            threshold_units: UNITS_PER_CENT,
        }
    }

    pub fn with_threshold(threshold_units: i64) -> Self {
        SettlementCalculator { threshold_units }
    }

    /// Signed net amount `from` owes `to`, zeroed below the threshold
    pub fn net_balance(&self, graph: &DebtGraph, from: &str, to: &str) -> i64 {
        let net = graph.total_between(from, to) - graph.total_between(to, from);
        self.clamp(net)
    }

    /// Every ordered pair with a strictly positive net balance, sorted by
    /// (from key, to key)
    pub fn settlements(&self, graph: &DebtGraph, members: &MembershipStore) -> Vec<Settlement> {
        let totals = graph.pair_totals();
        let total = |a: &str, b: &str| -> i64 {
            totals
                .get(&(a.to_string(), b.to_string()))
                .copied()
                .unwrap_or(0)
        };

        let keys: Vec<&str> = members.keys().collect();
        let mut settlements = Vec::new();

        for &from in &keys {
            for &to in &keys {
                if from == to {
                    continue;
                }
                let net = self.clamp(total(from, to) - total(to, from));
                if net > 0 {
                    settlements.push(Settlement {
                        from_key: from.to_string(),
                        from: members.display_name(from).to_string(),
                        to_key: to.to_string(),
                        to: members.display_name(to).to_string(),
                        amount_units: net,
                    });
                }
            }
        }
        settlements
    }

    /// `"<From> owes <To>"` → amount in major units
    pub fn settlement_map(
        &self,
        graph: &DebtGraph,
        members: &MembershipStore,
    ) -> BTreeMap<String, f64> {
        self.settlements(graph, members)
            .into_iter()
            .map(|s| (s.label(), s.amount()))
            .collect()
    }

    fn clamp(&self, net: i64) -> i64 {
        if net.abs() < self.threshold_units {
            0
        } else {
            net
        }
    }
}

impl Default for SettlementCalculator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Person;

    fn setup(names: &[&str]) -> (DebtGraph, MembershipStore) {
        let mut graph = DebtGraph::new("trip");
        let mut members = MembershipStore::new();
        for name in names {
            let person = Person::new(name).unwrap();
            graph.add_node(&person.key).unwrap();
            members.insert("trip", person).unwrap();
        }
        (graph, members)
    }

    #[test]
    fn test_net_balance_antisymmetric() {
        let (mut graph, _) = setup(&["Alice", "Bob"]);
        graph.add_edge("bob", "alice", 5_000_000, 1).unwrap();
        graph.add_edge("alice", "bob", 2_000_000, 2).unwrap();

        let calc = SettlementCalculator::new();
        assert_eq!(calc.net_balance(&graph, "bob", "alice"), 3_000_000);
        assert_eq!(calc.net_balance(&graph, "alice", "bob"), -3_000_000);
    }

    #[test]
    fn test_settlements_report_one_direction() {
        let (mut graph, members) = setup(&["Alice", "Bob", "Charlie"]);
        graph.add_edge("bob", "alice", 4_000_000, 1).unwrap();
        graph.add_edge("charlie", "alice", 4_000_000, 1).unwrap();
        graph.add_edge("alice", "bob", 1_000_000, 2).unwrap();

        let calc = SettlementCalculator::new();
        let settlements = calc.settlements(&graph, &members);

        assert_eq!(settlements.len(), 2);
        assert_eq!(settlements[0].label(), "Bob owes Alice");
        assert_eq!(settlements[0].amount_units, 3_000_000);
        assert_eq!(settlements[1].to_string(), "Charlie owes Alice $40.00");

        let map = calc.settlement_map(&graph, &members);
        assert_eq!(map.get("Bob owes Alice"), Some(&30.0));
        assert!(!map.contains_key("Alice owes Bob"));
    }

    #[test]
    fn test_sub_cent_balance_is_settled() {
        let (mut graph, members) = setup(&["Alice", "Bob"]);
        graph.add_edge("bob", "alice", 1_000_999, 1).unwrap();
        graph.add_edge("alice", "bob", 1_000_000, 2).unwrap();

        let calc = SettlementCalculator::new();
        assert_eq!(calc.net_balance(&graph, "bob", "alice"), 0);
        assert!(calc.settlements(&graph, &members).is_empty());

        // a custom threshold of 1 unit reports everything
        let strict = SettlementCalculator::with_threshold(1);
        assert_eq!(strict.net_balance(&graph, "bob", "alice"), 999);
    }

    #[test]
    fn test_fully_offset_pair_is_omitted() {
        let (mut graph, members) = setup(&["Alice", "Bob"]);
        graph.add_edge("bob", "alice", 700, 1).unwrap();
        graph.add_edge("alice", "bob", 700, 2).unwrap();

        let calc = SettlementCalculator::with_threshold(1);
        assert!(calc.settlements(&graph, &members).is_empty());
    }
}
