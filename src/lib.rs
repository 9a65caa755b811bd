//! Expression-evaluation runtime for Cypher query plans.
//!
//! The crate is organised leaves first: [`values`] defines the closed value
//! model, [`operations`] implements ternary logic, arithmetic, coercion, the
//! function library, graph-cursor operators, the path builder and the
//! membership cache, and [`storage`] describes the read/cursor contract those
//! operators consume together with an in-memory implementation of it.

#![warn(missing_docs)]

pub mod error;
pub mod memory;
pub mod metrics;
pub mod operations;
pub mod options;
pub mod storage;
pub mod types;
pub mod values;

pub use error::{CypherError, Result};
pub use options::EvalOptions;
pub use values::{Equality, Value};
