//! In-memory implementation of the read contract.
//!
//! [`MemGraph`] keeps adjacency lists per node and precomputed per-type
//! degree counts. Nodes whose relationship count reaches the dense threshold
//! answer degree queries from those counts; others must be scanned. Deleting
//! an entity records it as deleted in the current transaction.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use tracing::trace;

use super::{
    Cursor, Direction, NodeCursor, PropertyCursor, ReadAccess, RelationshipScanCursor,
    RelationshipSelection, RelationshipTraversalCursor,
};
use crate::types::{LabelId, NodeId, PropertyKeyId, RelId, RelTypeId};
use crate::values::Value;

/// Relationship count at which a node switches to the dense representation.
pub const DEFAULT_DENSE_THRESHOLD: usize = 50;

const NO_NODE: NodeId = NodeId(u64::MAX);
const NO_RELATIONSHIP: RelId = RelId(u64::MAX);

#[derive(Clone, Copy, Debug, Default)]
struct DegreeCounts {
    outgoing: u64,
    incoming: u64,
    loops: u64,
}

#[derive(Clone, Debug, Default)]
struct NodeRecord {
    labels: SmallVec<[LabelId; 4]>,
    props: Vec<(PropertyKeyId, Value)>,
    rels: Vec<RelId>,
    degrees: FxHashMap<RelTypeId, DegreeCounts>,
}

#[derive(Clone, Debug)]
struct RelRecord {
    start: NodeId,
    end: NodeId,
    rel_type: RelTypeId,
    props: Vec<(PropertyKeyId, Value)>,
}

#[derive(Clone, Debug, Default)]
struct Tokens {
    names: Vec<Arc<str>>,
    ids: FxHashMap<Arc<str>, u32>,
}

impl Tokens {
    fn intern(&mut self, name: &str) -> u32 {
        if let Some(id) = self.ids.get(name) {
            return *id;
        }
        let id = self.names.len() as u32;
        let name: Arc<str> = Arc::from(name);
        self.names.push(name.clone());
        self.ids.insert(name, id);
        id
    }

    fn lookup(&self, name: &str) -> Option<u32> {
        self.ids.get(name).copied()
    }

    fn name(&self, id: u32) -> Option<Arc<str>> {
        self.names.get(id as usize).cloned()
    }
}

#[derive(Clone, Debug)]
struct GraphData {
    nodes: FxHashMap<NodeId, NodeRecord>,
    rels: FxHashMap<RelId, RelRecord>,
    labels: Tokens,
    rel_types: Tokens,
    prop_keys: Tokens,
    deleted_nodes: FxHashSet<NodeId>,
    deleted_rels: FxHashSet<RelId>,
    dense_threshold: usize,
}

impl GraphData {
    fn is_dense(&self, node: &NodeRecord) -> bool {
        node.rels.len() >= self.dense_threshold
    }
}

/// Mutable in-memory graph exposing [`ReadAccess`].
///
/// Cursors pick up the current graph state whenever they are positioned.
pub struct MemGraph {
    data: Arc<GraphData>,
    scanned: Arc<AtomicU64>,
    next_node: u64,
    next_rel: u64,
}

impl MemGraph {
    /// Creates an empty graph with the default dense threshold.
    pub fn new() -> Self {
        Self {
            data: Arc::new(GraphData {
                nodes: FxHashMap::default(),
                rels: FxHashMap::default(),
                labels: Tokens::default(),
                rel_types: Tokens::default(),
                prop_keys: Tokens::default(),
                deleted_nodes: FxHashSet::default(),
                deleted_rels: FxHashSet::default(),
                dense_threshold: DEFAULT_DENSE_THRESHOLD,
            }),
            scanned: Arc::new(AtomicU64::new(0)),
            next_node: 0,
            next_rel: 0,
        }
    }

    /// Sets the relationship count at which nodes become dense.
    pub fn with_dense_threshold(mut self, threshold: usize) -> Self {
        Arc::make_mut(&mut self.data).dense_threshold = threshold;
        self
    }

    /// Registers a property key name ahead of use.
    pub fn with_property_key(mut self, name: &str) -> Self {
        Arc::make_mut(&mut self.data).prop_keys.intern(name);
        self
    }

    /// Registers a relationship type name ahead of use.
    pub fn with_relationship_type(mut self, name: &str) -> Self {
        Arc::make_mut(&mut self.data).rel_types.intern(name);
        self
    }

    /// Creates a node.
    pub fn add_node<'k>(
        &mut self,
        labels: &[&str],
        props: impl IntoIterator<Item = (&'k str, Value)>,
    ) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        let data = Arc::make_mut(&mut self.data);
        let labels = labels
            .iter()
            .map(|name| LabelId(data.labels.intern(name)))
            .collect();
        let props = intern_props(&mut data.prop_keys, props);
        data.nodes.insert(
            id,
            NodeRecord {
                labels,
                props,
                ..NodeRecord::default()
            },
        );
        id
    }

    /// Creates a relationship `start -[rel_type]-> end`.
    ///
    /// Returns `None` when either endpoint is missing.
    pub fn add_relationship<'k>(
        &mut self,
        start: NodeId,
        end: NodeId,
        rel_type: &str,
        props: impl IntoIterator<Item = (&'k str, Value)>,
    ) -> Option<RelId> {
        let data = Arc::make_mut(&mut self.data);
        if !data.nodes.contains_key(&start) || !data.nodes.contains_key(&end) {
            return None;
        }
        let id = RelId(self.next_rel);
        self.next_rel += 1;
        let rel_type = RelTypeId(data.rel_types.intern(rel_type));
        let props = intern_props(&mut data.prop_keys, props);
        data.rels.insert(
            id,
            RelRecord {
                start,
                end,
                rel_type,
                props,
            },
        );
        if start == end {
            let node = data.nodes.get_mut(&start)?;
            node.rels.push(id);
            node.degrees.entry(rel_type).or_default().loops += 1;
        } else {
            let node = data.nodes.get_mut(&start)?;
            node.rels.push(id);
            node.degrees.entry(rel_type).or_default().outgoing += 1;
            let node = data.nodes.get_mut(&end)?;
            node.rels.push(id);
            node.degrees.entry(rel_type).or_default().incoming += 1;
        }
        Some(id)
    }

    /// Deletes a relationship within the current transaction.
    pub fn delete_relationship(&mut self, id: RelId) -> bool {
        let data = Arc::make_mut(&mut self.data);
        let Some(rel) = data.rels.remove(&id) else {
            return false;
        };
        for (endpoint, loop_or_out) in [(rel.start, true), (rel.end, false)] {
            if let Some(node) = data.nodes.get_mut(&endpoint) {
                node.rels.retain(|r| *r != id);
                if let Some(counts) = node.degrees.get_mut(&rel.rel_type) {
                    if rel.start == rel.end {
                        counts.loops = counts.loops.saturating_sub(1);
                    } else if loop_or_out {
                        counts.outgoing = counts.outgoing.saturating_sub(1);
                    } else {
                        counts.incoming = counts.incoming.saturating_sub(1);
                    }
                }
            }
            if rel.start == rel.end {
                break;
            }
        }
        data.deleted_rels.insert(id);
        trace!(id = id.0, "mem_graph.delete_relationship");
        true
    }

    /// Deletes a node and its relationships within the current transaction.
    pub fn delete_node(&mut self, id: NodeId) -> bool {
        let rels = match self.data.nodes.get(&id) {
            Some(node) => node.rels.clone(),
            None => return false,
        };
        for rel in rels {
            self.delete_relationship(rel);
        }
        let data = Arc::make_mut(&mut self.data);
        data.nodes.remove(&id);
        data.deleted_nodes.insert(id);
        trace!(id = id.0, "mem_graph.delete_node");
        true
    }

    /// Relationships examined by traversal cursors so far.
    pub fn relationships_scanned(&self) -> u64 {
        self.scanned.load(Ordering::Relaxed)
    }

    /// Resets the traversal counter.
    pub fn reset_scan_counter(&self) {
        self.scanned.store(0, Ordering::Relaxed);
    }
}

impl Default for MemGraph {
    fn default() -> Self {
        Self::new()
    }
}

fn intern_props<'k>(
    keys: &mut Tokens,
    props: impl IntoIterator<Item = (&'k str, Value)>,
) -> Vec<(PropertyKeyId, Value)> {
    let mut out: Vec<(PropertyKeyId, Value)> = Vec::new();
    for (name, value) in props {
        let key = PropertyKeyId(keys.intern(name));
        match out.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => out.push((key, value)),
        }
    }
    out
}

/// Node cursor over a [`MemGraph`].
pub struct MemNodeCursor {
    data: Arc<GraphData>,
    target: Option<NodeId>,
    current: Option<NodeId>,
}

impl MemNodeCursor {
    fn record(&self) -> Option<&NodeRecord> {
        self.current.and_then(|id| self.data.nodes.get(&id))
    }
}

impl Cursor for MemNodeCursor {
    fn reset(&mut self) {
        self.target = None;
        self.current = None;
    }
}

impl NodeCursor for MemNodeCursor {
    fn next(&mut self) -> bool {
        self.current = self
            .target
            .take()
            .filter(|id| self.data.nodes.contains_key(id));
        self.current.is_some()
    }

    fn node_reference(&self) -> NodeId {
        self.current.unwrap_or(NO_NODE)
    }

    fn has_label(&self, label: LabelId) -> bool {
        self.record().is_some_and(|n| n.labels.contains(&label))
    }

    fn labels(&self) -> SmallVec<[LabelId; 4]> {
        self.record().map(|n| n.labels.clone()).unwrap_or_default()
    }

    fn supports_fast_degree_lookup(&self) -> bool {
        self.record().is_some_and(|n| self.data.is_dense(n))
    }

    fn degree(&self, selection: &RelationshipSelection) -> u64 {
        let Some(node) = self.record() else {
            return 0;
        };
        node.degrees
            .iter()
            .filter(|(rel_type, _)| selection.test_type(**rel_type))
            .map(|(_, c)| match selection.direction() {
                Direction::Outgoing => c.outgoing + c.loops,
                Direction::Incoming => c.incoming + c.loops,
                Direction::Both => c.outgoing + c.incoming + c.loops,
            })
            .sum()
    }
}

/// Relationship scan cursor over a [`MemGraph`].
pub struct MemRelationshipScanCursor {
    data: Arc<GraphData>,
    target: Option<RelId>,
    current: Option<RelId>,
}

impl MemRelationshipScanCursor {
    fn record(&self) -> Option<&RelRecord> {
        self.current.and_then(|id| self.data.rels.get(&id))
    }
}

impl Cursor for MemRelationshipScanCursor {
    fn reset(&mut self) {
        self.target = None;
        self.current = None;
    }
}

impl RelationshipScanCursor for MemRelationshipScanCursor {
    fn next(&mut self) -> bool {
        self.current = self
            .target
            .take()
            .filter(|id| self.data.rels.contains_key(id));
        self.current.is_some()
    }

    fn relationship_reference(&self) -> RelId {
        self.current.unwrap_or(NO_RELATIONSHIP)
    }

    fn source_node_reference(&self) -> NodeId {
        self.record().map_or(NO_NODE, |r| r.start)
    }

    fn target_node_reference(&self) -> NodeId {
        self.record().map_or(NO_NODE, |r| r.end)
    }

    fn rel_type(&self) -> RelTypeId {
        self.record().map_or(RelTypeId(u32::MAX), |r| r.rel_type)
    }
}

/// Property cursor over a [`MemGraph`] entity.
#[derive(Default)]
pub struct MemPropertyCursor {
    props: Vec<(PropertyKeyId, Value)>,
    pos: usize,
}

impl Cursor for MemPropertyCursor {
    fn reset(&mut self) {
        self.props.clear();
        self.pos = 0;
    }
}

impl PropertyCursor for MemPropertyCursor {
    fn next(&mut self) -> bool {
        if self.pos < self.props.len() {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn property_key(&self) -> PropertyKeyId {
        self.props
            .get(self.pos.wrapping_sub(1))
            .map_or(PropertyKeyId(u32::MAX), |(k, _)| *k)
    }

    fn property_value(&self) -> Value {
        self.props
            .get(self.pos.wrapping_sub(1))
            .map_or(Value::Undefined, |(_, v)| v.clone())
    }
}

/// Relationship traversal cursor over a [`MemGraph`] node.
pub struct MemTraversalCursor {
    data: Arc<GraphData>,
    scanned: Arc<AtomicU64>,
    origin: NodeId,
    selection: RelationshipSelection,
    pos: usize,
    current: Option<RelId>,
}

impl MemTraversalCursor {
    fn record(&self) -> Option<&RelRecord> {
        self.current.and_then(|id| self.data.rels.get(&id))
    }
}

impl Cursor for MemTraversalCursor {
    fn reset(&mut self) {
        self.origin = NO_NODE;
        self.pos = 0;
        self.current = None;
    }
}

impl RelationshipTraversalCursor for MemTraversalCursor {
    fn next(&mut self) -> bool {
        let Some(node) = self.data.nodes.get(&self.origin) else {
            self.current = None;
            return false;
        };
        while let Some(id) = node.rels.get(self.pos).copied() {
            self.pos += 1;
            self.scanned.fetch_add(1, Ordering::Relaxed);
            if let Some(rel) = self.data.rels.get(&id) {
                if self
                    .selection
                    .test(self.origin, rel.start, rel.end, rel.rel_type)
                {
                    self.current = Some(id);
                    return true;
                }
            }
        }
        self.current = None;
        false
    }

    fn relationship_reference(&self) -> RelId {
        self.current.unwrap_or(NO_RELATIONSHIP)
    }

    fn source_node_reference(&self) -> NodeId {
        self.record().map_or(NO_NODE, |r| r.start)
    }

    fn target_node_reference(&self) -> NodeId {
        self.record().map_or(NO_NODE, |r| r.end)
    }

    fn rel_type(&self) -> RelTypeId {
        self.record().map_or(RelTypeId(u32::MAX), |r| r.rel_type)
    }

    fn origin_node_reference(&self) -> NodeId {
        self.origin
    }
}

impl ReadAccess for MemGraph {
    type Nodes = MemNodeCursor;
    type Relationships = MemRelationshipScanCursor;
    type Properties = MemPropertyCursor;
    type Traversal = MemTraversalCursor;

    fn property_key(&self, name: &str) -> Option<PropertyKeyId> {
        self.data.prop_keys.lookup(name).map(PropertyKeyId)
    }

    fn relationship_type(&self, name: &str) -> Option<RelTypeId> {
        self.data.rel_types.lookup(name).map(RelTypeId)
    }

    fn label(&self, name: &str) -> Option<LabelId> {
        self.data.labels.lookup(name).map(LabelId)
    }

    fn property_key_name(&self, key: PropertyKeyId) -> Option<Arc<str>> {
        self.data.prop_keys.name(key.0)
    }

    fn relationship_type_name(&self, rel_type: RelTypeId) -> Option<Arc<str>> {
        self.data.rel_types.name(rel_type.0)
    }

    fn label_name(&self, label: LabelId) -> Option<Arc<str>> {
        self.data.labels.name(label.0)
    }

    fn single_node(&self, id: NodeId, cursor: &mut MemNodeCursor) {
        cursor.data = Arc::clone(&self.data);
        cursor.target = Some(id);
        cursor.current = None;
    }

    fn single_relationship(&self, id: RelId, cursor: &mut MemRelationshipScanCursor) {
        cursor.data = Arc::clone(&self.data);
        cursor.target = Some(id);
        cursor.current = None;
    }

    fn node_properties(&self, node: &MemNodeCursor, properties: &mut MemPropertyCursor) {
        properties.props = node.record().map(|n| n.props.clone()).unwrap_or_default();
        properties.pos = 0;
    }

    fn relationship_properties(
        &self,
        rel: &MemRelationshipScanCursor,
        properties: &mut MemPropertyCursor,
    ) {
        properties.props = rel.record().map(|r| r.props.clone()).unwrap_or_default();
        properties.pos = 0;
    }

    fn node_relationships(
        &self,
        node: &MemNodeCursor,
        selection: &RelationshipSelection,
        traversal: &mut MemTraversalCursor,
    ) {
        traversal.data = Arc::clone(&node.data);
        traversal.origin = node.node_reference();
        traversal.selection = selection.clone();
        traversal.pos = 0;
        traversal.current = None;
    }

    fn node_deleted_in_this_transaction(&self, id: NodeId) -> bool {
        self.data.deleted_nodes.contains(&id)
    }

    fn relationship_deleted_in_this_transaction(&self, id: RelId) -> bool {
        self.data.deleted_rels.contains(&id)
    }

    fn allocate_node_cursor(&self) -> MemNodeCursor {
        MemNodeCursor {
            data: Arc::clone(&self.data),
            target: None,
            current: None,
        }
    }

    fn allocate_relationship_scan_cursor(&self) -> MemRelationshipScanCursor {
        MemRelationshipScanCursor {
            data: Arc::clone(&self.data),
            target: None,
            current: None,
        }
    }

    fn allocate_property_cursor(&self) -> MemPropertyCursor {
        MemPropertyCursor::default()
    }

    fn allocate_relationship_traversal_cursor(&self) -> MemTraversalCursor {
        MemTraversalCursor {
            data: Arc::clone(&self.data),
            scanned: Arc::clone(&self.scanned),
            origin: NO_NODE,
            selection: RelationshipSelection::all(Direction::Both),
            pos: 0,
            current: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> (MemGraph, NodeId, NodeId, NodeId) {
        let mut g = MemGraph::new().with_dense_threshold(2);
        let a = g.add_node(&["Person"], [("name", Value::text("a"))]);
        let b = g.add_node(&["Person", "Admin"], []);
        let c = g.add_node(&[], []);
        g.add_relationship(a, b, "KNOWS", []).unwrap();
        g.add_relationship(b, c, "KNOWS", [("since", Value::Integer(2001))]).unwrap();
        g.add_relationship(a, a, "LIKES", []).unwrap();
        (g, a, b, c)
    }

    #[test]
    fn positions_nodes_and_reads_labels() {
        let (g, a, b, _) = triangle();
        let mut nodes = g.allocate_node_cursor();
        g.single_node(b, &mut nodes);
        assert!(nodes.next());
        let admin = g.label("Admin").unwrap();
        assert!(nodes.has_label(admin));
        assert_eq!(nodes.labels().len(), 2);
        g.single_node(a, &mut nodes);
        assert!(nodes.next());
        assert!(!nodes.has_label(admin));
        g.single_node(NodeId(99), &mut nodes);
        assert!(!nodes.next());
    }

    #[test]
    fn dense_degrees_count_loops_once() {
        let (g, a, _, _) = triangle();
        let mut nodes = g.allocate_node_cursor();
        g.single_node(a, &mut nodes);
        assert!(nodes.next());
        assert!(nodes.supports_fast_degree_lookup());
        assert_eq!(nodes.degree(&RelationshipSelection::all(Direction::Outgoing)), 2);
        assert_eq!(nodes.degree(&RelationshipSelection::all(Direction::Incoming)), 1);
        assert_eq!(nodes.degree(&RelationshipSelection::all(Direction::Both)), 2);
        let likes = g.relationship_type("LIKES").unwrap();
        let sel = RelationshipSelection::new(Direction::Both, Some(&[likes]));
        assert_eq!(nodes.degree(&sel), 1);
    }

    #[test]
    fn traversal_respects_selection_and_counts_scans() {
        let (g, _, b, _) = triangle();
        let mut nodes = g.allocate_node_cursor();
        let mut traversal = g.allocate_relationship_traversal_cursor();
        g.single_node(b, &mut nodes);
        assert!(nodes.next());
        g.node_relationships(
            &nodes,
            &RelationshipSelection::all(Direction::Outgoing),
            &mut traversal,
        );
        assert!(traversal.next());
        assert_eq!(traversal.source_node_reference(), b);
        assert!(!traversal.next());
        assert_eq!(g.relationships_scanned(), 2);
    }

    #[test]
    fn deletion_is_visible_to_new_positions() {
        let (mut g, a, b, _) = triangle();
        let since = g.property_key("since").unwrap();
        assert!(g.delete_node(b));
        assert!(g.node_deleted_in_this_transaction(b));
        assert!(g.relationship_deleted_in_this_transaction(RelId(1)));
        let mut nodes = g.allocate_node_cursor();
        g.single_node(b, &mut nodes);
        assert!(!nodes.next());
        g.single_node(a, &mut nodes);
        assert!(nodes.next());
        assert_eq!(nodes.degree(&RelationshipSelection::all(Direction::Both)), 1);
        assert_eq!(g.property_key_name(since).as_deref(), Some("since"));
    }

    #[test]
    fn property_cursor_seeks() {
        let (g, _, _, _) = triangle();
        let since = g.property_key("since").unwrap();
        let mut rels = g.allocate_relationship_scan_cursor();
        let mut props = g.allocate_property_cursor();
        g.single_relationship(RelId(1), &mut rels);
        assert!(rels.next());
        g.relationship_properties(&rels, &mut props);
        assert!(props.seek(since));
        assert_eq!(props.property_value(), Value::Integer(2001));
    }
}
