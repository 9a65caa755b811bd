//! Value operations invoked by compiled query plans.
//!
//! Pure value functions live in [`boolean`], [`math`], [`functions`] and
//! [`coercion`]. Operations that read the graph go through
//! [`GraphOperators`], which owns no cursors itself: callers pass the
//! cursors they allocated once per operator, see
//! [`crate::storage::ExpressionCursors`].

pub mod boolean;
pub mod coercion;
pub mod cursor;
pub mod entity;
pub mod expand;
pub mod functions;
pub mod in_cache;
pub mod math;
pub mod path;

pub use boolean::CompiledPattern;
pub use coercion::{CypherCoercions, CypherType};
pub use cursor::GraphOperators;
pub use entity::{EntityAccess, EntityReader, NoEntityAccess};
pub use expand::ConnectingRelationships;
pub use in_cache::InCache;
pub use path::PathValueBuilder;
