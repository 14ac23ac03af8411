// Entity Models
// People are identified by canonical key; expenses by a per-group id.

pub mod expense;
pub mod person;

pub use expense::{canonicalize_split_params, Expense, NewExpense, SplitMethod};
pub use person::{MembershipStore, Person};
