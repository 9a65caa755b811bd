//! Read/cursor contract consumed by the graph-cursor operators.
//!
//! Storage engines expose positioned cursors; callers own and reuse them.
//! A cursor is positioned with one of the `single_*` or `node_*` calls on
//! [`ReadAccess`] and then advanced with `next()`, which reports whether an
//! entity was found.

mod memory;

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use smallvec::SmallVec;

use crate::types::{LabelId, NodeId, PropertyKeyId, RelId, RelTypeId};
use crate::values::Value;

pub use memory::{MemGraph, DEFAULT_DENSE_THRESHOLD};

/// Direction of a relationship relative to a node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Relationships starting at the node.
    Outgoing,
    /// Relationships ending at the node.
    Incoming,
    /// Either.
    Both,
}

impl Direction {
    /// The same relationships seen from the other endpoint.
    pub fn reverse(self) -> Self {
        match self {
            Direction::Outgoing => Direction::Incoming,
            Direction::Incoming => Direction::Outgoing,
            Direction::Both => Direction::Both,
        }
    }

    /// Whether outgoing relationships are included.
    pub fn includes_outgoing(self) -> bool {
        matches!(self, Direction::Outgoing | Direction::Both)
    }

    /// Whether incoming relationships are included.
    pub fn includes_incoming(self) -> bool {
        matches!(self, Direction::Incoming | Direction::Both)
    }
}

/// Direction plus optional relationship-type filter.
///
/// `types == None` selects every type; an empty list selects none.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelationshipSelection {
    direction: Direction,
    types: Option<SmallVec<[RelTypeId; 4]>>,
}

impl RelationshipSelection {
    /// All relationships in `direction`.
    pub fn all(direction: Direction) -> Self {
        Self {
            direction,
            types: None,
        }
    }

    /// Relationships in `direction` whose type is in `types`, or all when `None`.
    pub fn new(direction: Direction, types: Option<&[RelTypeId]>) -> Self {
        Self {
            direction,
            types: types.map(SmallVec::from_slice),
        }
    }

    /// Selected direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Type filter.
    pub fn types(&self) -> Option<&[RelTypeId]> {
        self.types.as_deref()
    }

    /// Same filter seen from the other endpoint.
    pub fn reverse(&self) -> Self {
        Self {
            direction: self.direction.reverse(),
            types: self.types.clone(),
        }
    }

    /// Whether a relationship of `rel_type` passes the type filter.
    pub fn test_type(&self, rel_type: RelTypeId) -> bool {
        self.types
            .as_ref()
            .map_or(true, |types| types.contains(&rel_type))
    }

    /// Whether a relationship `start -> end` of `rel_type` is selected from `origin`.
    pub fn test(&self, origin: NodeId, start: NodeId, end: NodeId, rel_type: RelTypeId) -> bool {
        if !self.test_type(rel_type) {
            return false;
        }
        (self.direction.includes_outgoing() && start == origin)
            || (self.direction.includes_incoming() && end == origin)
    }
}

/// Behaviour shared by every cursor.
pub trait Cursor {
    /// Releases the current position so the cursor can be reused.
    fn reset(&mut self);
}

/// Cursor over nodes.
pub trait NodeCursor: Cursor {
    /// Moves to the positioned node; `false` when it does not exist.
    fn next(&mut self) -> bool;
    /// Id of the current node.
    fn node_reference(&self) -> NodeId;
    /// Whether the current node carries `label`.
    fn has_label(&self, label: LabelId) -> bool;
    /// Labels of the current node.
    fn labels(&self) -> SmallVec<[LabelId; 4]>;
    /// Whether the current node stores precomputed degrees (is dense).
    fn supports_fast_degree_lookup(&self) -> bool;
    /// Precomputed degree for `selection`; only meaningful for dense nodes.
    fn degree(&self, selection: &RelationshipSelection) -> u64;
}

/// Cursor over relationships by id.
pub trait RelationshipScanCursor: Cursor {
    /// Moves to the positioned relationship; `false` when it does not exist.
    fn next(&mut self) -> bool;
    /// Id of the current relationship.
    fn relationship_reference(&self) -> RelId;
    /// Start node of the current relationship.
    fn source_node_reference(&self) -> NodeId;
    /// End node of the current relationship.
    fn target_node_reference(&self) -> NodeId;
    /// Type of the current relationship.
    fn rel_type(&self) -> RelTypeId;
}

/// Cursor over the properties of a positioned entity.
pub trait PropertyCursor: Cursor {
    /// Advances to the next property.
    fn next(&mut self) -> bool;
    /// Key of the current property.
    fn property_key(&self) -> PropertyKeyId;
    /// Value of the current property.
    fn property_value(&self) -> Value;

    /// Advances until `key` is found.
    fn seek(&mut self, key: PropertyKeyId) -> bool {
        while self.next() {
            if self.property_key() == key {
                return true;
            }
        }
        false
    }
}

/// Cursor over the relationships of one node.
pub trait RelationshipTraversalCursor: Cursor {
    /// Advances to the next selected relationship.
    fn next(&mut self) -> bool;
    /// Id of the current relationship.
    fn relationship_reference(&self) -> RelId;
    /// Start node of the current relationship.
    fn source_node_reference(&self) -> NodeId;
    /// End node of the current relationship.
    fn target_node_reference(&self) -> NodeId;
    /// Type of the current relationship.
    fn rel_type(&self) -> RelTypeId;
    /// Node the traversal started from.
    fn origin_node_reference(&self) -> NodeId;

    /// Endpoint of the current relationship that is not the origin.
    fn other_node_reference(&self) -> NodeId {
        let source = self.source_node_reference();
        if source == self.origin_node_reference() {
            self.target_node_reference()
        } else {
            source
        }
    }
}

/// Read access to a graph snapshot plus same-transaction state.
pub trait ReadAccess {
    /// Node cursor type.
    type Nodes: NodeCursor;
    /// Relationship scan cursor type.
    type Relationships: RelationshipScanCursor;
    /// Property cursor type.
    type Properties: PropertyCursor;
    /// Relationship traversal cursor type.
    type Traversal: RelationshipTraversalCursor;

    /// Resolves a property key name.
    fn property_key(&self, name: &str) -> Option<PropertyKeyId>;
    /// Resolves a relationship type name.
    fn relationship_type(&self, name: &str) -> Option<RelTypeId>;
    /// Resolves a label name.
    fn label(&self, name: &str) -> Option<LabelId>;
    /// Name of a property key token.
    fn property_key_name(&self, key: PropertyKeyId) -> Option<Arc<str>>;
    /// Name of a relationship type token.
    fn relationship_type_name(&self, rel_type: RelTypeId) -> Option<Arc<str>>;
    /// Name of a label token.
    fn label_name(&self, label: LabelId) -> Option<Arc<str>>;

    /// Positions `cursor` on node `id`.
    fn single_node(&self, id: NodeId, cursor: &mut Self::Nodes);
    /// Positions `cursor` on relationship `id`.
    fn single_relationship(&self, id: RelId, cursor: &mut Self::Relationships);
    /// Positions `properties` on the properties of the node under `node`.
    fn node_properties(&self, node: &Self::Nodes, properties: &mut Self::Properties);
    /// Positions `properties` on the properties of the relationship under `rel`.
    fn relationship_properties(&self, rel: &Self::Relationships, properties: &mut Self::Properties);
    /// Positions `traversal` on the selected relationships of the node under `node`.
    fn node_relationships(
        &self,
        node: &Self::Nodes,
        selection: &RelationshipSelection,
        traversal: &mut Self::Traversal,
    );

    /// Whether node `id` was deleted earlier in this transaction.
    fn node_deleted_in_this_transaction(&self, id: NodeId) -> bool;
    /// Whether relationship `id` was deleted earlier in this transaction.
    fn relationship_deleted_in_this_transaction(&self, id: RelId) -> bool;

    /// Allocates a node cursor.
    fn allocate_node_cursor(&self) -> Self::Nodes;
    /// Allocates a relationship scan cursor.
    fn allocate_relationship_scan_cursor(&self) -> Self::Relationships;
    /// Allocates a property cursor.
    fn allocate_property_cursor(&self) -> Self::Properties;
    /// Allocates a relationship traversal cursor.
    fn allocate_relationship_traversal_cursor(&self) -> Self::Traversal;
}

/// The cursor set a query worker hands to entity functions.
pub struct ExpressionCursors<A: ReadAccess> {
    /// Node cursor.
    pub nodes: A::Nodes,
    /// Relationship scan cursor.
    pub relationships: A::Relationships,
    /// Property cursor.
    pub properties: A::Properties,
    /// Relationship traversal cursor.
    pub traversal: A::Traversal,
}

impl<A: ReadAccess> ExpressionCursors<A> {
    /// Allocates one cursor of each kind from `read`.
    pub fn new(read: &A) -> Self {
        Self {
            nodes: read.allocate_node_cursor(),
            relationships: read.allocate_relationship_scan_cursor(),
            properties: read.allocate_property_cursor(),
            traversal: read.allocate_relationship_traversal_cursor(),
        }
    }
}

/// Borrows a cursor and resets it when dropped, on every exit path.
pub struct CursorScope<'c, C: Cursor> {
    cursor: &'c mut C,
}

impl<'c, C: Cursor> CursorScope<'c, C> {
    /// Wraps `cursor`.
    pub fn new(cursor: &'c mut C) -> Self {
        Self { cursor }
    }
}

impl<C: Cursor> Deref for CursorScope<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.cursor
    }
}

impl<C: Cursor> DerefMut for CursorScope<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        self.cursor
    }
}

impl<C: Cursor> Drop for CursorScope<'_, C> {
    fn drop(&mut self) {
        self.cursor.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_filters_direction_and_type() {
        let a = NodeId(1);
        let b = NodeId(2);
        let knows = RelTypeId(0);
        let likes = RelTypeId(1);
        let out = RelationshipSelection::new(Direction::Outgoing, Some(&[knows]));
        assert!(out.test(a, a, b, knows));
        assert!(!out.test(a, a, b, likes));
        assert!(!out.test(b, a, b, knows));
        assert!(out.reverse().test(b, a, b, knows));
        let none = RelationshipSelection::new(Direction::Both, Some(&[]));
        assert!(!none.test(a, a, b, knows));
        assert!(RelationshipSelection::all(Direction::Both).test(b, a, b, likes));
    }

    #[test]
    fn direction_reverse() {
        assert_eq!(Direction::Outgoing.reverse(), Direction::Incoming);
        assert_eq!(Direction::Both.reverse(), Direction::Both);
        assert!(Direction::Both.includes_incoming() && Direction::Both.includes_outgoing());
    }
}
