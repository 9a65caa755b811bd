//! Property, label and degree reads for entities identified by id.
//!
//! Every operation positions caller-supplied cursors and resets them before
//! returning, on success and error paths alike. A node or relationship that
//! cannot be positioned is absent; when it was deleted earlier in the same
//! transaction and strict mode is on, reads through it fail with
//! [`CypherError::EntityNotFound`].

use std::sync::Arc;

use tracing::trace;

use crate::error::{CypherError, Result};
use crate::metrics::{default_metrics, EvalMetrics};
use crate::options::EvalOptions;
use crate::storage::{
    CursorScope, Direction, NodeCursor, PropertyCursor, ReadAccess, RelationshipScanCursor,
    RelationshipSelection, RelationshipTraversalCursor,
};
use crate::types::{LabelId, NodeId, PropertyKeyId, RelId, RelTypeId};
use crate::values::{ListValue, MapValue, RelationshipData, Value};

/// Graph-cursor operators bound to one read context.
///
/// Cheap to construct; holds no cursors of its own.
pub struct GraphOperators<'r, A: ReadAccess> {
    read: &'r A,
    raise_on_deleted: bool,
    metrics: Arc<dyn EvalMetrics>,
}

impl<'r, A: ReadAccess> GraphOperators<'r, A> {
    /// Operators over `read` with default options.
    pub fn new(read: &'r A) -> Self {
        Self {
            read,
            raise_on_deleted: true,
            metrics: default_metrics(),
        }
    }

    /// Applies `options`.
    pub fn with_options(mut self, options: &EvalOptions) -> Self {
        self.raise_on_deleted = options.raise_on_deleted_entity;
        self
    }

    /// Records degree lookups and expand-into choices in `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<dyn EvalMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// The underlying read access.
    pub fn read(&self) -> &'r A {
        self.read
    }

    pub(crate) fn metrics(&self) -> &dyn EvalMetrics {
        self.metrics.as_ref()
    }

    /// Reads property `key` of `node`.
    ///
    /// Absent nodes and unknown keys yield [`Value::Undefined`].
    pub fn node_property(
        &self,
        node: NodeId,
        key: Option<PropertyKeyId>,
        nodes: &mut A::Nodes,
        properties: &mut A::Properties,
    ) -> Result<Value> {
        let mut nodes = CursorScope::new(nodes);
        self.read.single_node(node, &mut nodes);
        if !nodes.next() {
            if self.raise_on_deleted && self.read.node_deleted_in_this_transaction(node) {
                return Err(CypherError::deleted_node(node.0));
            }
            return Ok(Value::Undefined);
        }
        let Some(key) = key else {
            return Ok(Value::Undefined);
        };
        let mut properties = CursorScope::new(properties);
        self.read.node_properties(&nodes, &mut properties);
        Ok(if properties.seek(key) {
            properties.property_value()
        } else {
            Value::Undefined
        })
    }

    /// Reads property `key` of `rel`.
    pub fn relationship_property(
        &self,
        rel: RelId,
        key: Option<PropertyKeyId>,
        relationships: &mut A::Relationships,
        properties: &mut A::Properties,
    ) -> Result<Value> {
        let mut relationships = CursorScope::new(relationships);
        self.read.single_relationship(rel, &mut relationships);
        if !relationships.next() {
            if self.raise_on_deleted && self.read.relationship_deleted_in_this_transaction(rel) {
                return Err(CypherError::deleted_relationship(rel.0));
            }
            return Ok(Value::Undefined);
        }
        let Some(key) = key else {
            return Ok(Value::Undefined);
        };
        let mut properties = CursorScope::new(properties);
        self.read.relationship_properties(&relationships, &mut properties);
        Ok(if properties.seek(key) {
            properties.property_value()
        } else {
            Value::Undefined
        })
    }

    /// Whether `node` exists and has property `key`.
    pub fn node_has_property(
        &self,
        node: NodeId,
        key: Option<PropertyKeyId>,
        nodes: &mut A::Nodes,
        properties: &mut A::Properties,
    ) -> bool {
        let Some(key) = key else {
            return false;
        };
        let mut nodes = CursorScope::new(nodes);
        self.read.single_node(node, &mut nodes);
        if !nodes.next() {
            return false;
        }
        let mut properties = CursorScope::new(properties);
        self.read.node_properties(&nodes, &mut properties);
        properties.seek(key)
    }

    /// Whether `rel` exists and has property `key`.
    pub fn relationship_has_property(
        &self,
        rel: RelId,
        key: Option<PropertyKeyId>,
        relationships: &mut A::Relationships,
        properties: &mut A::Properties,
    ) -> bool {
        let Some(key) = key else {
            return false;
        };
        let mut relationships = CursorScope::new(relationships);
        self.read.single_relationship(rel, &mut relationships);
        if !relationships.next() {
            return false;
        }
        let mut properties = CursorScope::new(properties);
        self.read.relationship_properties(&relationships, &mut properties);
        properties.seek(key)
    }

    /// All properties of `node` as a map; empty when the node is absent.
    pub fn node_as_map(
        &self,
        node: NodeId,
        nodes: &mut A::Nodes,
        properties: &mut A::Properties,
    ) -> Result<MapValue> {
        let mut nodes = CursorScope::new(nodes);
        self.read.single_node(node, &mut nodes);
        if !nodes.next() {
            if self.read.node_deleted_in_this_transaction(node) {
                return Err(CypherError::deleted_node(node.0));
            }
            return Ok(MapValue::empty());
        }
        let mut properties = CursorScope::new(properties);
        self.read.node_properties(&nodes, &mut properties);
        self.collect_properties(&mut properties)
    }

    /// All properties of `rel` as a map; empty when the relationship is absent.
    pub fn relationship_as_map(
        &self,
        rel: RelId,
        relationships: &mut A::Relationships,
        properties: &mut A::Properties,
    ) -> Result<MapValue> {
        let mut relationships = CursorScope::new(relationships);
        self.read.single_relationship(rel, &mut relationships);
        if !relationships.next() {
            if self.read.relationship_deleted_in_this_transaction(rel) {
                return Err(CypherError::deleted_relationship(rel.0));
            }
            return Ok(MapValue::empty());
        }
        let mut properties = CursorScope::new(properties);
        self.read.relationship_properties(&relationships, &mut properties);
        self.collect_properties(&mut properties)
    }

    fn collect_properties(&self, properties: &mut A::Properties) -> Result<MapValue> {
        let mut entries: Vec<(Arc<str>, Value)> = Vec::new();
        while properties.next() {
            let key = properties.property_key();
            let name = self.read.property_key_name(key).ok_or_else(|| {
                CypherError::invalid_argument(format!("unknown property key token {key}"))
            })?;
            entries.push((name, properties.property_value()));
        }
        Ok(MapValue::from_entries(entries))
    }

    /// Property keys present on `node`.
    pub fn node_property_keys(
        &self,
        node: NodeId,
        nodes: &mut A::Nodes,
        properties: &mut A::Properties,
    ) -> Result<Vec<PropertyKeyId>> {
        let mut nodes = CursorScope::new(nodes);
        self.read.single_node(node, &mut nodes);
        if !nodes.next() {
            if self.read.node_deleted_in_this_transaction(node) {
                return Err(CypherError::deleted_node(node.0));
            }
            return Ok(Vec::new());
        }
        let mut properties = CursorScope::new(properties);
        self.read.node_properties(&nodes, &mut properties);
        let mut keys = Vec::new();
        while properties.next() {
            keys.push(properties.property_key());
        }
        Ok(keys)
    }

    /// Property keys present on `rel`.
    pub fn relationship_property_keys(
        &self,
        rel: RelId,
        relationships: &mut A::Relationships,
        properties: &mut A::Properties,
    ) -> Result<Vec<PropertyKeyId>> {
        let mut relationships = CursorScope::new(relationships);
        self.read.single_relationship(rel, &mut relationships);
        if !relationships.next() {
            if self.read.relationship_deleted_in_this_transaction(rel) {
                return Err(CypherError::deleted_relationship(rel.0));
            }
            return Ok(Vec::new());
        }
        let mut properties = CursorScope::new(properties);
        self.read.relationship_properties(&relationships, &mut properties);
        let mut keys = Vec::new();
        while properties.next() {
            keys.push(properties.property_key());
        }
        Ok(keys)
    }

    /// Whether `node` exists and carries `label`. An unknown label is never set.
    pub fn has_label(&self, node: NodeId, label: Option<LabelId>, nodes: &mut A::Nodes) -> bool {
        let Some(label) = label else {
            return false;
        };
        let mut nodes = CursorScope::new(nodes);
        self.read.single_node(node, &mut nodes);
        nodes.next() && nodes.has_label(label)
    }

    /// Whether `node` exists and carries any of `labels`.
    pub fn has_any_label(&self, node: NodeId, labels: &[LabelId], nodes: &mut A::Nodes) -> bool {
        let mut nodes = CursorScope::new(nodes);
        self.read.single_node(node, &mut nodes);
        nodes.next() && labels.iter().any(|label| nodes.has_label(*label))
    }

    /// Label names of `node`; empty when the node is absent.
    pub fn node_labels(&self, node: NodeId, nodes: &mut A::Nodes) -> Result<ListValue> {
        let mut nodes = CursorScope::new(nodes);
        self.read.single_node(node, &mut nodes);
        if !nodes.next() {
            if self.read.node_deleted_in_this_transaction(node) {
                return Err(CypherError::deleted_node(node.0));
            }
            return Ok(ListValue::empty());
        }
        let mut names = Vec::new();
        for label in nodes.labels() {
            let name = self.read.label_name(label).ok_or_else(|| {
                CypherError::invalid_argument(format!("unknown label token {label}"))
            })?;
            names.push(Value::Text(name));
        }
        Ok(ListValue::from_vec(names))
    }

    /// Endpoints and type of `rel`, or `None` when it cannot be positioned.
    pub fn relationship_data(
        &self,
        rel: RelId,
        relationships: &mut A::Relationships,
    ) -> Option<RelationshipData> {
        let mut relationships = CursorScope::new(relationships);
        self.read.single_relationship(rel, &mut relationships);
        relationships.next().then(|| RelationshipData {
            start: relationships.source_node_reference(),
            end: relationships.target_node_reference(),
            rel_type: relationships.rel_type(),
        })
    }

    /// Degree of `node` for `selection` when the node is dense; `None` otherwise.
    ///
    /// An absent node has degree zero.
    pub fn node_degree_if_dense(
        &self,
        node: NodeId,
        selection: &RelationshipSelection,
        nodes: &mut A::Nodes,
    ) -> Option<u64> {
        let mut nodes = CursorScope::new(nodes);
        self.read.single_node(node, &mut nodes);
        if !nodes.next() {
            return Some(0);
        }
        if nodes.supports_fast_degree_lookup() {
            self.metrics.degree_query(true);
            Some(nodes.degree(selection))
        } else {
            None
        }
    }

    /// Degree of `node` for `selection`, from precomputed counts when dense and
    /// by scanning otherwise.
    pub fn node_degree(
        &self,
        node: NodeId,
        selection: &RelationshipSelection,
        nodes: &mut A::Nodes,
        traversal: &mut A::Traversal,
    ) -> u64 {
        let mut nodes = CursorScope::new(nodes);
        self.read.single_node(node, &mut nodes);
        if !nodes.next() {
            return 0;
        }
        if nodes.supports_fast_degree_lookup() {
            self.metrics.degree_query(true);
            return nodes.degree(selection);
        }
        self.metrics.degree_query(false);
        let mut traversal = CursorScope::new(traversal);
        self.read.node_relationships(&nodes, selection, &mut traversal);
        let mut count = 0;
        while traversal.next() {
            count += 1;
        }
        trace!(node = node.0, count, "degree.scanned");
        count
    }

    /// Outgoing degree, optionally restricted to `types`.
    pub fn outgoing_degree(
        &self,
        node: NodeId,
        types: Option<&[RelTypeId]>,
        nodes: &mut A::Nodes,
        traversal: &mut A::Traversal,
    ) -> u64 {
        let selection = RelationshipSelection::new(Direction::Outgoing, types);
        self.node_degree(node, &selection, nodes, traversal)
    }

    /// Incoming degree, optionally restricted to `types`.
    pub fn incoming_degree(
        &self,
        node: NodeId,
        types: Option<&[RelTypeId]>,
        nodes: &mut A::Nodes,
        traversal: &mut A::Traversal,
    ) -> u64 {
        let selection = RelationshipSelection::new(Direction::Incoming, types);
        self.node_degree(node, &selection, nodes, traversal)
    }

    /// Degree in both directions, optionally restricted to `types`. Self-loops
    /// count once.
    pub fn total_degree(
        &self,
        node: NodeId,
        types: Option<&[RelTypeId]>,
        nodes: &mut A::Nodes,
        traversal: &mut A::Traversal,
    ) -> u64 {
        let selection = RelationshipSelection::new(Direction::Both, types);
        self.node_degree(node, &selection, nodes, traversal)
    }
}
