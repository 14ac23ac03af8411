// 👥 Group - one debt ledger
//
// Concurrency: a single mutex guards membership, expense log, id counter and
// graph together, so cross-structure invariants change atomically. Reads take
// the same lock.
//
// Invariants (checked before every commit):
// - graph node set == membership key set
// - every edge endpoint is a member
// - the edges of an expense sum to its total

use crate::config::LedgerConfig;
use crate::entities::{canonicalize_split_params, Expense, MembershipStore, NewExpense, Person, SplitMethod};
use crate::error::{LedgerError, LedgerResult};
use crate::export::GraphExporter;
use crate::graph::DebtGraph;
use crate::money::MAX_TOTAL_UNITS;
use crate::settlement::{Settlement, SettlementCalculator};
use crate::split::{Shares, SplitEngine};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, error, info, warn};

// ============================================================================
// GROUP STATE (everything behind the lock)
// ============================================================================

struct GroupState {
    members: MembershipStore,
    expenses: Vec<Expense>,
    next_expense_id: u64,
    graph: DebtGraph,
}

impl GroupState {
    fn new(name: &str) -> Self {
        GroupState {
            members: MembershipStore::new(),
            expenses: Vec::new(),
            next_expense_id: 1,
            graph: DebtGraph::new(name),
        }
    }

    /// Graph nodes and membership keys must be the same set
    fn verify_consistency(&self, group: &str) -> LedgerResult<()> {
        let violation = |detail: String| {
            error!(group, %detail, "graph/membership out of sync");
            LedgerError::InvariantViolation {
                group: group.to_string(),
                detail,
            }
        };

        if self.members.len() != self.graph.size() {
            return Err(violation(format!(
                "{} members but {} graph nodes",
                self.members.len(),
                self.graph.size()
            )));
        }
        if let Some(key) = self.members.keys().find(|key| !self.graph.contains(key)) {
            return Err(violation(format!("person({}) missing from graph", key)));
        }
        if let Some(key) = self.graph.node_keys().find(|key| !self.members.contains(key)) {
            return Err(violation(format!("graph has extra node({})", key)));
        }
        Ok(())
    }
}

// ============================================================================
// GROUP INFO (reporting snapshot)
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupInfo {
    pub group_name: String,
    pub created_at: DateTime<Utc>,
    pub names: Vec<String>,
    pub expense_details: BTreeMap<String, f64>,
    pub graph_dot: String,
}

// ============================================================================
// GROUP
// ============================================================================

pub struct Group {
    name: String,
    created_at: DateTime<Utc>,
    config: LedgerConfig,
    state: Mutex<GroupState>,
}

impl Group {
    /// Create an empty group (name must already be validated)
    pub(crate) fn new(name: String, config: LedgerConfig) -> Self {
        let state = Mutex::new(GroupState::new(&name));
        Group {
            name,
            created_at: Utc::now(),
            config,
            state,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    // ------------------------------------------------------------------------
    // Membership
    // ------------------------------------------------------------------------

    /// Register a member; the graph gains an isolated node for them
    pub fn add_member(&self, name: &str) -> LedgerResult<()> {
        let person = Person::new(name)?;

        let mut state = self.state.lock();
        state.verify_consistency(&self.name)?;

        if let Some(existing) = state.members.get(&person.key) {
            warn!(group = %self.name, person = %existing.display_name, "person already in the group");
            return Err(LedgerError::DuplicateMember {
                member: existing.display_name.clone(),
                group: self.name.clone(),
            });
        }

        // graph first: if it refuses, membership is untouched
        state.graph.add_node(&person.key)?;
        let display_name = person.display_name.clone();
        state.members.insert(&self.name, person)?;

        debug_assert!(state.verify_consistency(&self.name).is_ok());
        info!(group = %self.name, person = %display_name, "member added");
        Ok(())
    }

    /// Add several members in order, stopping at the first failure
    pub fn add_members<S: AsRef<str>>(&self, names: &[S]) -> LedgerResult<()> {
        for name in names {
            self.add_member(name.as_ref())?;
        }
        Ok(())
    }

    /// Display names, case-insensitively sorted
    pub fn list_members(&self) -> Vec<String> {
        self.state.lock().members.display_names()
    }

    pub fn size(&self) -> usize {
        self.state.lock().members.len()
    }

    // ------------------------------------------------------------------------
    // Expense ingestion
    // ------------------------------------------------------------------------

    /// Validate, split and record an expense; returns the new expense id
    ///
    /// Either every edge of the expense is added and the expense is logged,
    /// or nothing changes.
    pub fn add_expense(&self, request: NewExpense) -> LedgerResult<u64> {
        // lock-free validation
        if request.total_units <= 0 {
            warn!(group = %self.name, total_units = request.total_units, "non-positive expense total");
            return Err(LedgerError::NonPositiveAmount(request.total_units));
        }
        let description = request.description.trim().to_string();
        if description.is_empty() {
            warn!(group = %self.name, "empty expense description");
            return Err(LedgerError::EmptyDescription);
        }
        if request.total_units > MAX_TOTAL_UNITS {
            warn!(group = %self.name, total_units = request.total_units, "expense total too large");
            return Err(LedgerError::AmountTooLarge {
                units: request.total_units,
                max: MAX_TOTAL_UNITS,
            });
        }
        let method: SplitMethod = request.split_method.parse().inspect_err(|_| {
            warn!(group = %self.name, split_method = %request.split_method, "unknown split method");
        })?;

        let mut state = self.state.lock();

        let required = self.config.min_group_size.max(2);
        if state.members.len() < required {
            warn!(group = %self.name, size = state.members.len(), "group too small for an expense");
            return Err(LedgerError::InsufficientGroupSize {
                group: self.name.clone(),
                size: state.members.len(),
                required,
            });
        }

        let payer = match state.members.resolve(&request.paid_by) {
            Some(key) => key.to_string(),
            None => {
                warn!(group = %self.name, paid_by = %request.paid_by, "payer not in the group");
                return Err(LedgerError::UnknownPayer {
                    payer: request.paid_by.clone(),
                    group: self.name.clone(),
                });
            }
        };

        let split_params = canonicalize_split_params(&request.split_params)?;
        if let Some(unknown) = split_params.keys().find(|key| !state.members.contains(key)) {
            warn!(group = %self.name, participant = %unknown, "split participant not in the group");
            return Err(LedgerError::UnknownParticipant {
                participant: unknown.clone(),
                group: self.name.clone(),
            });
        }

        let shares = self.split(&state, method, request.total_units, &split_params)?;

        state.verify_consistency(&self.name)?;
        let allocated: i128 = shares.values().map(|units| i128::from(*units)).sum();
        if allocated != i128::from(request.total_units) {
            error!(group = %self.name, %allocated, total_units = request.total_units, "split leaked units");
            return Err(LedgerError::InvariantViolation {
                group: self.name.clone(),
                detail: format!(
                    "split allocated {} of {} units",
                    allocated, request.total_units
                ),
            });
        }

        let owers: Vec<(&str, i64)> = shares
            .iter()
            .filter(|(key, _)| **key != payer)
            .map(|(key, owed)| (key.as_str(), *owed))
            .collect();
        for (ower, owed) in &owers {
            if state.graph.total_between(ower, &payer).checked_add(*owed).is_none() {
                warn!(group = %self.name, from = %ower, to = %payer, owed_units = owed, "pair total would overflow");
                return Err(LedgerError::PairTotalOverflow {
                    group: self.name.clone(),
                    from: ower.to_string(),
                    to: payer.clone(),
                });
            }
        }

        // commit: edges first, so a refused batch leaves the id unused
        let id = state.next_expense_id;
        state.graph.add_edges(&owers, &payer, id)?;
        state.next_expense_id += 1;

        for (ower, owed) in &owers {
            debug!(
                group = %self.name,
                split_method = %method,
                from = %ower,
                to = %payer,
                owed_units = owed,
                "edge added"
            );
        }

        state.expenses.push(Expense {
            id,
            total_units: request.total_units,
            paid_by: payer.clone(),
            description,
            split_method: method,
            split_params,
            created_at: Utc::now(),
        });

        info!(
            group = %self.name,
            expense_id = id,
            paid_by = %payer,
            total_units = request.total_units,
            split_method = %method,
            "expense added"
        );
        Ok(id)
    }

    fn split(
        &self,
        state: &GroupState,
        method: SplitMethod,
        total: i64,
        params: &BTreeMap<String, f64>,
    ) -> LedgerResult<Shares> {
        let engine = SplitEngine::with_tolerance(self.config.percentage_tolerance);
        let result = match method {
            SplitMethod::Equal => {
                let everyone: Vec<&str> = state.members.keys().collect();
                engine.equal(total, &everyone)
            }
            SplitMethod::Percentage => engine.percentage(total, params),
            SplitMethod::Weights => engine.weights(total, params),
        };
        result.map_err(|err| {
            warn!(group = %self.name, split_method = %method, error = %err, "split failed");
            LedgerError::from(err)
        })
    }

    pub fn expenses(&self) -> Vec<Expense> {
        self.state.lock().expenses.clone()
    }

    pub fn expense_count(&self) -> usize {
        self.state.lock().expenses.len()
    }

    pub fn edge_count(&self) -> usize {
        self.state.lock().graph.edge_count()
    }

    /// Sum of the edges one expense produced (payer's own share excluded)
    pub fn expense_edge_total(&self, expense_id: u64) -> i64 {
        self.state.lock().graph.expense_total(expense_id)
    }

    // ------------------------------------------------------------------------
    // Settlements & export
    // ------------------------------------------------------------------------

    fn calculator(&self) -> SettlementCalculator {
        SettlementCalculator::with_threshold(self.config.settlement_threshold_units)
    }

    /// Signed net units `from` owes `to` (names in any spelling)
    pub fn net_balance(&self, from: &str, to: &str) -> LedgerResult<i64> {
        let state = self.state.lock();
        let resolve = |name: &str| {
            state
                .members
                .resolve(name)
                .map(str::to_string)
                .ok_or_else(|| LedgerError::UnknownParticipant {
                    participant: name.to_string(),
                    group: self.name.clone(),
                })
        };
        let (from, to) = (resolve(from)?, resolve(to)?);
        Ok(self.calculator().net_balance(&state.graph, &from, &to))
    }

    pub fn settlements(&self) -> Vec<Settlement> {
        let state = self.state.lock();
        self.calculator().settlements(&state.graph, &state.members)
    }

    /// `"<From> owes <To>"` → major units
    pub fn settlement_map(&self) -> BTreeMap<String, f64> {
        let state = self.state.lock();
        self.calculator().settlement_map(&state.graph, &state.members)
    }

    pub fn export_graph(&self) -> String {
        let state = self.state.lock();
        GraphExporter::to_dot(&self.name, &state.graph, &state.members)
    }

    /// Members, settlements and DOT text from one consistent view
    pub fn info(&self) -> GroupInfo {
        let state = self.state.lock();
        GroupInfo {
            group_name: self.name.clone(),
            created_at: self.created_at,
            names: state.members.display_names(),
            expense_details: self.calculator().settlement_map(&state.graph, &state.members),
            graph_dot: GraphExporter::to_dot(&self.name, &state.graph, &state.members),
        }
    }
}

impl std::fmt::Debug for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.name)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// TESTS
// ============================================================================
