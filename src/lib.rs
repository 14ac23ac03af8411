// Expense Ledger - Core Library
// Per-group debt graphs, exact expense splitting, settlements and DOT export.

pub mod config;
pub mod entities;
pub mod error;
pub mod export;
pub mod graph;
pub mod group;
pub mod identity;
pub mod money;
pub mod registry;
pub mod settlement;
pub mod split;

// Re-export commonly used types
pub use config::LedgerConfig;
pub use entities::{Expense, MembershipStore, NewExpense, Person, SplitMethod};
pub use error::{ErrorKind, GraphError, LedgerError, LedgerResult, SplitError};
pub use export::GraphExporter;
pub use graph::{DebtGraph, Edge, EdgePayload};
pub use group::{Group, GroupInfo};
pub use identity::canonicalize;
pub use money::{
    format_major, parse_amount, units_to_major, MAX_TOTAL_UNITS, UNITS_PER_CENT, UNITS_PER_MAJOR,
};
pub use registry::GroupRegistry;
pub use settlement::{Settlement, SettlementCalculator};
pub use split::{Shares, SplitEngine};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
