use std::fmt::Display;

use thiserror::Error;
use tracing::debug;

/// Convenient result alias used throughout the runtime.
pub type Result<T> = std::result::Result<T, CypherError>;

/// Errors raised while evaluating an expression.
///
/// Missing values are never errors; they surface as
/// [`Value::Undefined`](crate::values::Value::Undefined). Every variant here
/// aborts evaluation of the current row.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CypherError {
    /// An operand or argument has the wrong variant for the operation.
    #[error("{0}")]
    Type(String),
    /// The variant is right but the value is semantically invalid.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Integer division by zero or integer overflow.
    #[error("arithmetic error: {0}")]
    Arithmetic(String),
    /// A reference created earlier in this transaction now dangles.
    #[error("{kind} with id {id} has been deleted in this transaction")]
    EntityNotFound {
        /// Either `"node"` or `"relationship"`.
        kind: &'static str,
        /// Id of the entity that disappeared.
        id: u64,
    },
    /// A regular expression failed to compile.
    #[error("invalid regular expression '{pattern}': {reason}")]
    InvalidRegex {
        /// The offending pattern.
        pattern: String,
        /// Reason reported by the regex compiler.
        reason: String,
    },
    /// A memory tracker refused an allocation.
    #[error("memory limit exceeded: requested {requested} bytes with {used} of {limit} in use")]
    MemoryLimitExceeded {
        /// Bytes requested by the refused allocation.
        requested: usize,
        /// Bytes already accounted.
        used: usize,
        /// Configured limit.
        limit: usize,
    },
    /// A caller broke a documented calling contract.
    #[error("contract violation: {0}")]
    ContractViolation(String),
    /// Configuration could not be parsed or validated.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl CypherError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            CypherError::Type(_) => "TypeError",
            CypherError::InvalidArgument(_) => "InvalidArgument",
            CypherError::Arithmetic(_) => "ArithmeticError",
            CypherError::EntityNotFound { .. } => "EntityNotFound",
            CypherError::InvalidRegex { .. } => "InvalidSemantics",
            CypherError::MemoryLimitExceeded { .. } => "MemoryLimitExceeded",
            CypherError::ContractViolation(_) => "ContractViolation",
            CypherError::Config(_) => "InvalidConfiguration",
        }
    }

    /// Builds a type error from a preformatted message.
    pub fn type_error(message: impl Into<String>) -> Self {
        CypherError::Type(message.into())
    }

    /// Type error for operators that reject the runtime pair of operand variants.
    pub fn type_mismatch(op: &str, lhs: &impl Display, rhs: &impl Display) -> Self {
        CypherError::Type(format!("cannot apply `{op}` to {lhs} and {rhs}"))
    }

    /// Type error raised by numeric functions handed a non-number.
    pub fn needs_numbers(function: &str) -> Self {
        CypherError::Type(format!("{function} requires numbers"))
    }

    /// Type error raised by text functions handed a non-string.
    pub fn not_a_string(function: &str, value: &impl Display) -> Self {
        CypherError::Type(format!(
            "Expected a string value for `{function}`, but got: {value}; consider converting it to a string with toString()."
        ))
    }

    /// Builds an argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        CypherError::InvalidArgument(message.into())
    }

    /// Builds an arithmetic error.
    pub fn arithmetic(message: impl Into<String>) -> Self {
        CypherError::Arithmetic(message.into())
    }

    /// The dedicated integer division-by-zero error.
    pub fn division_by_zero() -> Self {
        CypherError::Arithmetic("/ by zero".into())
    }

    /// Integer overflow in `op`.
    pub fn overflow(op: &str) -> Self {
        CypherError::Arithmetic(format!("result of integer {op} overflowed"))
    }

    /// Dangling same-transaction reference to a node.
    pub fn deleted_node(id: u64) -> Self {
        debug!(id, "entity.deleted_in_tx.node");
        CypherError::EntityNotFound { kind: "node", id }
    }

    /// Dangling same-transaction reference to a relationship.
    pub fn deleted_relationship(id: u64) -> Self {
        debug!(id, "entity.deleted_in_tx.relationship");
        CypherError::EntityNotFound {
            kind: "relationship",
            id,
        }
    }
}
