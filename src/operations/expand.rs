//! Adaptive expand-into: the relationships directly connecting two known nodes.
//!
//! The traversal starts from whichever endpoint is cheaper to enumerate, so a
//! supernode on one side never forces a scan of its full adjacency list.

use tracing::trace;

use crate::operations::cursor::GraphOperators;
use crate::storage::{
    Cursor, CursorScope, Direction, NodeCursor, ReadAccess, RelationshipSelection,
    RelationshipTraversalCursor,
};
use crate::types::{NodeId, RelTypeId};
use crate::values::{RelationshipData, RelationshipValue};

impl<A: ReadAccess> GraphOperators<'_, A> {
    /// Lazily yields the relationships between `from` and `to` that match
    /// `direction` (as seen from `from`) and the optional `types` filter.
    ///
    /// Strategy:
    /// 1. `from` dense with filtered degree zero: nothing to do.
    /// 2. Both dense: start from the endpoint with the smaller degree.
    /// 3. One dense: start from the sparse one.
    /// 4. Neither dense: start from `to`.
    ///
    /// Starting from `to` flips the direction. The returned iterator keeps
    /// only relationships whose other endpoint is the far node and resets
    /// `traversal` when dropped.
    pub fn connecting_relationships<'c>(
        &self,
        from: NodeId,
        direction: Direction,
        to: NodeId,
        types: Option<&[RelTypeId]>,
        nodes: &mut A::Nodes,
        traversal: &'c mut A::Traversal,
    ) -> ConnectingRelationships<'c, A::Traversal> {
        let selection = RelationshipSelection::new(direction, types);
        let from_degree = self.node_degree_if_dense(from, &selection, nodes);
        if from_degree == Some(0) {
            trace!(from = from.0, to = to.0, "expand_into.empty");
            self.metrics().expand_into("empty");
            return ConnectingRelationships::empty();
        }
        let to_dense = self.is_dense(to, nodes);
        let start_from_to = match (from_degree, to_dense) {
            (Some(from_degree), true) => {
                let to_degree = self
                    .node_degree_if_dense(to, &selection.reverse(), nodes)
                    .unwrap_or(u64::MAX);
                to_degree < from_degree
            }
            (Some(_), false) => true,
            (None, true) => false,
            (None, false) => true,
        };
        let (start, far, selection) = if start_from_to {
            trace!(from = from.0, to = to.0, "expand_into.start_from_to");
            self.metrics().expand_into("to");
            (to, from, selection.reverse())
        } else {
            trace!(from = from.0, to = to.0, "expand_into.start_from_from");
            self.metrics().expand_into("from");
            (from, to, selection)
        };
        let mut nodes = CursorScope::new(nodes);
        self.read().single_node(start, &mut nodes);
        if !nodes.next() {
            return ConnectingRelationships::empty();
        }
        self.read().node_relationships(&nodes, &selection, traversal);
        ConnectingRelationships {
            cursor: Some(traversal),
            far,
        }
    }

    fn is_dense(&self, node: NodeId, nodes: &mut A::Nodes) -> bool {
        let mut nodes = CursorScope::new(nodes);
        self.read().single_node(node, &mut nodes);
        nodes.next() && nodes.supports_fast_degree_lookup()
    }
}

/// Relationships whose other endpoint is a fixed far node.
pub struct ConnectingRelationships<'c, T: RelationshipTraversalCursor> {
    cursor: Option<&'c mut T>,
    far: NodeId,
}

impl<T: RelationshipTraversalCursor> ConnectingRelationships<'_, T> {
    fn empty() -> Self {
        Self {
            cursor: None,
            far: NodeId(u64::MAX),
        }
    }
}

impl<T: RelationshipTraversalCursor> Iterator for ConnectingRelationships<'_, T> {
    type Item = RelationshipValue;

    fn next(&mut self) -> Option<RelationshipValue> {
        let cursor = self.cursor.as_mut()?;
        while cursor.next() {
            if cursor.other_node_reference() == self.far {
                return Some(RelationshipValue::with_data(
                    cursor.relationship_reference(),
                    RelationshipData {
                        start: cursor.source_node_reference(),
                        end: cursor.target_node_reference(),
                        rel_type: cursor.rel_type(),
                    },
                ));
            }
        }
        None
    }
}

impl<T: RelationshipTraversalCursor> Drop for ConnectingRelationships<'_, T> {
    fn drop(&mut self) {
        if let Some(cursor) = self.cursor.as_mut() {
            cursor.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::CounterMetrics;
    use crate::storage::{ExpressionCursors, MemGraph};
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    #[test]
    fn finds_parallel_relationships_in_direction() {
        let mut g = MemGraph::new();
        let a = g.add_node(&[], []);
        let b = g.add_node(&[], []);
        let c = g.add_node(&[], []);
        let r1 = g.add_relationship(a, b, "R", []).unwrap();
        let r2 = g.add_relationship(a, b, "R", []).unwrap();
        let back = g.add_relationship(b, a, "R", []).unwrap();
        g.add_relationship(a, c, "R", []).unwrap();
        let ops = GraphOperators::new(&g);
        let mut cur = ExpressionCursors::new(&g);
        let ids: Vec<_> = ops
            .connecting_relationships(a, Direction::Outgoing, b, None, &mut cur.nodes, &mut cur.traversal)
            .map(|r| r.id())
            .collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&r1) && ids.contains(&r2));
        let both: Vec<_> = ops
            .connecting_relationships(a, Direction::Both, b, None, &mut cur.nodes, &mut cur.traversal)
            .map(|r| r.id())
            .collect();
        assert_eq!(both.len(), 3);
        assert!(both.contains(&back));
        let incoming: Vec<_> = ops
            .connecting_relationships(a, Direction::Incoming, b, None, &mut cur.nodes, &mut cur.traversal)
            .map(|r| r.id())
            .collect();
        assert_eq!(incoming, vec![back]);
    }

    #[test]
    fn dense_side_with_zero_degree_short_circuits() {
        let mut g = MemGraph::new().with_dense_threshold(1);
        let a = g.add_node(&[], []);
        let b = g.add_node(&[], []);
        g.add_relationship(b, a, "R", []).unwrap();
        let metrics = Arc::new(CounterMetrics::default());
        let ops = GraphOperators::new(&g).with_metrics(metrics.clone());
        let mut cur = ExpressionCursors::new(&g);
        let found = ops
            .connecting_relationships(a, Direction::Outgoing, b, None, &mut cur.nodes, &mut cur.traversal)
            .count();
        assert_eq!(found, 0);
        assert_eq!(metrics.expand_empty.load(Ordering::Relaxed), 1);
        assert_eq!(g.relationships_scanned(), 0);
    }
}
