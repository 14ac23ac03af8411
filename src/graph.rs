// 🕸️ Debt Graph - directed multigraph of obligations
//
// Edge A → B: A owes B `amount_units` for expense `expense_id`.
// One edge per (ower, expense); parallel edges are never coalesced on write,
// only summed at read time.

use crate::error::GraphError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, error};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgePayload {
    pub amount_units: i64,
    pub expense_id: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub to: String,
    pub payload: EdgePayload,
    pub created_at: DateTime<Utc>,
}

/// Adjacency list keyed by member key (BTreeMap: iteration is already sorted)
#[derive(Debug, Clone)]
pub struct DebtGraph {
    name: String,
    nodes: BTreeMap<String, Vec<Edge>>,
}

impl DebtGraph {
    pub fn new(name: &str) -> Self {
        DebtGraph {
            name: name.to_string(),
            nodes: BTreeMap::new(),
        }
    }

    pub fn add_node(&mut self, key: &str) -> Result<(), GraphError> {
        if self.nodes.contains_key(key) {
            return Err(GraphError::DuplicateNode {
                graph: self.name.clone(),
                node: key.to_string(),
            });
        }
        self.nodes.insert(key.to_string(), Vec::new());
        debug!(graph = %self.name, node = key, "node added");
        Ok(())
    }

    pub fn add_edge(
        &mut self,
        from: &str,
        to: &str,
        amount_units: i64,
        expense_id: u64,
    ) -> Result<(), GraphError> {
        self.add_edges(&[(from, amount_units)], to, expense_id)
    }

    /// Add one edge per `(from, amount)` towards `to`, all or none
    ///
    /// Every endpoint is checked before the first edge is pushed.
    pub fn add_edges(
        &mut self,
        owers: &[(&str, i64)],
        to: &str,
        expense_id: u64,
    ) -> Result<(), GraphError> {
        let endpoints = owers.iter().map(|(from, _)| *from).chain([to]);
        for node in endpoints {
            if !self.nodes.contains_key(node) {
                error!(graph = %self.name, to, missing = node, expense_id, "edge endpoint missing");
                return Err(GraphError::UnknownNode {
                    graph: self.name.clone(),
                    node: node.to_string(),
                });
            }
        }

        let created_at = Utc::now();
        for (from, amount_units) in owers {
            if let Some(edges) = self.nodes.get_mut(*from) {
                edges.push(Edge {
                    to: to.to_string(),
                    payload: EdgePayload {
                        amount_units: *amount_units,
                        expense_id,
                    },
                    created_at,
                });
            }
        }
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    pub fn node_keys(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn edges_from(&self, key: &str) -> &[Edge] {
        self.nodes.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of nodes
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(Vec::len).sum()
    }

    /// Sum of every edge amount per ordered (from, to) pair
    ///
    /// Sums saturate at `i64::MAX`; ingestion refuses edges that would get there.
    pub fn pair_totals(&self) -> BTreeMap<(String, String), i64> {
        let mut totals = BTreeMap::new();
        for (from, edges) in &self.nodes {
            for edge in edges {
                let total = totals.entry((from.clone(), edge.to.clone())).or_insert(0i64);
                *total = total.saturating_add(edge.payload.amount_units);
            }
        }
        totals
    }

    /// Sum of edge amounts from → to
    pub fn total_between(&self, from: &str, to: &str) -> i64 {
        self.edges_from(from)
            .iter()
            .filter(|edge| edge.to == to)
            .fold(0i64, |acc, edge| acc.saturating_add(edge.payload.amount_units))
    }

    /// Sum of every edge produced by one expense
    pub fn expense_total(&self, expense_id: u64) -> i64 {
        self.nodes
            .values()
            .flatten()
            .filter(|edge| edge.payload.expense_id == expense_id)
            .fold(0i64, |acc, edge| acc.saturating_add(edge.payload.amount_units))
    }
}
