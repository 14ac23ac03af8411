// 🚨 Ledger Errors
// One error type for every group operation, grouped into five kinds so the
// service layer can map them onto its own responses.

use thiserror::Error;

// ============================================================================
// ERROR KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input (bad name, empty description, non-positive amount)
    Validation,

    /// Name already taken (group or member)
    Conflict,

    /// Referenced group/member/payer/participant does not exist
    NotFound,

    /// The split parameters cannot produce an allocation
    Split,

    /// Internal structures disagree - a defect, never caused by input
    Invariant,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "ValidationError",
            ErrorKind::Conflict => "ConflictError",
            ErrorKind::NotFound => "NotFoundError",
            ErrorKind::Split => "SplitError",
            ErrorKind::Invariant => "InvariantViolation",
        }
    }
}

// ============================================================================
// SPLIT ERRORS
// ============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SplitError {
    #[error("equal split needs at least 2 participants, got {0}")]
    InsufficientParticipants(usize),

    #[error("percentages must sum to 100 (got {0:.4})")]
    PercentageSumMismatch(f64),

    #[error("percentage for {0} cannot be negative")]
    NegativePercentage(String),

    #[error("weight for {0} cannot be negative")]
    NegativeWeight(String),

    #[error("sum of weights must be > 0 (got {0})")]
    NonPositiveWeightSum(f64),

    #[error("split value for {0} is not a finite number")]
    NonFiniteValue(String),
}

// ============================================================================
// GRAPH ERRORS
// ============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("node({node}) already exists in graph({graph})")]
    DuplicateNode { graph: String, node: String },

    #[error("node({node}) does not exist in graph({graph})")]
    UnknownNode { graph: String, node: String },
}

// ============================================================================
// LEDGER ERROR
// ============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    // === Validation ===
    #[error("invalid name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("expense description cannot be empty")]
    EmptyDescription,

    #[error("expense total({0}) must be positive")]
    NonPositiveAmount(i64),

    #[error("expense total({units}) exceeds the maximum of {max} units")]
    AmountTooLarge { units: i64, max: i64 },

    #[error("debt from {from} to {to} in group({group}) would exceed the representable range")]
    PairTotalOverflow {
        group: String,
        from: String,
        to: String,
    },

    #[error("invalid amount {input:?}: {reason}")]
    InvalidAmount { input: String, reason: &'static str },

    #[error("split method must be one of equal|percentage|weights, got {0:?}")]
    UnknownSplitMethod(String),

    #[error("split map contains an empty name")]
    EmptySplitName,

    #[error("duplicate name in split map after normalization: {0:?}")]
    DuplicateSplitName(String),

    #[error("group({group}) must contain at least {required} people to add an expense, current size={size}")]
    InsufficientGroupSize {
        group: String,
        size: usize,
        required: usize,
    },

    // === Conflict ===
    #[error("group({0}) already exists")]
    DuplicateGroup(String),

    #[error("person({member}) already exists in group({group})")]
    DuplicateMember { member: String, group: String },

    // === Not found ===
    #[error("group({0}) not found")]
    UnknownGroup(String),

    #[error("payer({payer}) is not a member of group({group})")]
    UnknownPayer { payer: String, group: String },

    #[error("participant({participant}) is not a member of group({group})")]
    UnknownParticipant { participant: String, group: String },

    // === Split ===
    #[error(transparent)]
    Split(#[from] SplitError),

    // === Invariant ===
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("group({group}) invariant violated: {detail}")]
    InvariantViolation { group: String, detail: String },
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::InvalidName { .. }
            | LedgerError::EmptyDescription
            | LedgerError::NonPositiveAmount(_)
            | LedgerError::AmountTooLarge { .. }
            | LedgerError::PairTotalOverflow { .. }
            | LedgerError::InvalidAmount { .. }
            | LedgerError::UnknownSplitMethod(_)
            | LedgerError::EmptySplitName
            | LedgerError::DuplicateSplitName(_)
            | LedgerError::InsufficientGroupSize { .. } => ErrorKind::Validation,

            LedgerError::DuplicateGroup(_) | LedgerError::DuplicateMember { .. } => {
                ErrorKind::Conflict
            }

            LedgerError::UnknownGroup(_)
            | LedgerError::UnknownPayer { .. }
            | LedgerError::UnknownParticipant { .. } => ErrorKind::NotFound,

            LedgerError::Split(_) => ErrorKind::Split,

            LedgerError::Graph(_) | LedgerError::InvariantViolation { .. } => {
                ErrorKind::Invariant
            }
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;

// ============================================================================
// TESTS
// ============================================================================
