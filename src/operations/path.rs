//! Incremental construction of path values from traversal steps.

use crate::error::{CypherError, Result};
use crate::operations::cursor::GraphOperators;
use crate::storage::ReadAccess;
use crate::types::NodeId;
use crate::values::{NodeValue, PathValue, RelationshipData, RelationshipValue, Value};

/// Accumulates nodes and relationships in traversal order.
///
/// An undefined input anywhere turns every later call into a no-op and makes
/// [`PathValueBuilder::build`] return [`Value::Undefined`]. Relationships
/// built from a bare id have their endpoints loaded through the relationship
/// scan cursor when orientation needs them.
pub struct PathValueBuilder<'a, A: ReadAccess> {
    ops: &'a GraphOperators<'a, A>,
    cursor: &'a mut A::Relationships,
    nodes: Vec<NodeValue>,
    relationships: Vec<RelationshipValue>,
    seen_undefined: bool,
}

enum Orientation {
    Outgoing,
    Incoming,
    Undirected,
}

impl<'a, A: ReadAccess> PathValueBuilder<'a, A> {
    /// Empty builder reading relationship endpoints through `cursor`.
    pub fn new(ops: &'a GraphOperators<'a, A>, cursor: &'a mut A::Relationships) -> Self {
        Self {
            ops,
            cursor,
            nodes: Vec::new(),
            relationships: Vec::new(),
            seen_undefined: false,
        }
    }

    /// Whether an undefined input has been seen.
    pub fn seen_undefined(&self) -> bool {
        self.seen_undefined
    }

    /// Appends a node.
    pub fn add_node(&mut self, node: &Value) -> Result<()> {
        if self.skip(node) {
            return Ok(());
        }
        let node = as_node(node)?;
        self.nodes.push(node);
        Ok(())
    }

    /// Appends a relationship without its far node.
    pub fn add_relationship(&mut self, rel: &Value) -> Result<()> {
        if self.skip(rel) {
            return Ok(());
        }
        let rel = as_relationship(rel)?;
        self.relationships.push(rel);
        Ok(())
    }

    /// Appends a relationship traversed start to end, followed by its end node.
    pub fn add_outgoing(&mut self, rel: &Value) -> Result<()> {
        if self.skip(rel) {
            return Ok(());
        }
        let rel = as_relationship(rel)?;
        let data = self.resolve(&rel)?;
        self.push_step(rel, data.end);
        Ok(())
    }

    /// Appends a relationship traversed end to start, followed by its start node.
    pub fn add_incoming(&mut self, rel: &Value) -> Result<()> {
        if self.skip(rel) {
            return Ok(());
        }
        let rel = as_relationship(rel)?;
        let data = self.resolve(&rel)?;
        self.push_step(rel, data.start);
        Ok(())
    }

    /// Appends a relationship oriented by whichever endpoint matches the
    /// current last node.
    ///
    /// Fails with [`CypherError::ContractViolation`] when neither does.
    pub fn add_undirected(&mut self, rel: &Value) -> Result<()> {
        if self.skip(rel) {
            return Ok(());
        }
        let rel = as_relationship(rel)?;
        let data = self.resolve(&rel)?;
        let last = self.last_node()?;
        if data.start == last {
            self.push_step(rel, data.end);
        } else if data.end == last {
            self.push_step(rel, data.start);
        } else {
            return Err(CypherError::ContractViolation(format!(
                "relationship {} is not connected to the last node {last} of the path",
                rel.id()
            )));
        }
        Ok(())
    }

    /// Appends a batch of outgoing relationships.
    pub fn add_multiple_outgoing(&mut self, rels: &Value) -> Result<()> {
        self.add_multiple(rels, None, Orientation::Outgoing)
    }

    /// Appends a batch of outgoing relationships ending at `target`.
    pub fn add_multiple_outgoing_with_target(&mut self, rels: &Value, target: &Value) -> Result<()> {
        self.add_multiple(rels, Some(target), Orientation::Outgoing)
    }

    /// Appends a batch of incoming relationships.
    pub fn add_multiple_incoming(&mut self, rels: &Value) -> Result<()> {
        self.add_multiple(rels, None, Orientation::Incoming)
    }

    /// Appends a batch of incoming relationships ending at `target`.
    pub fn add_multiple_incoming_with_target(&mut self, rels: &Value, target: &Value) -> Result<()> {
        self.add_multiple(rels, Some(target), Orientation::Incoming)
    }

    /// Appends a batch of undirected relationships.
    ///
    /// The batch is walked forward when its first relationship touches the
    /// current last node and backward otherwise.
    pub fn add_multiple_undirected(&mut self, rels: &Value) -> Result<()> {
        self.add_multiple(rels, None, Orientation::Undirected)
    }

    /// Appends a batch of undirected relationships ending at `target`.
    pub fn add_multiple_undirected_with_target(&mut self, rels: &Value, target: &Value) -> Result<()> {
        self.add_multiple(rels, Some(target), Orientation::Undirected)
    }

    fn add_multiple(&mut self, rels: &Value, target: Option<&Value>, orientation: Orientation) -> Result<()> {
        if self.skip(rels) {
            return Ok(());
        }
        let Value::List(list) = rels else {
            return Err(CypherError::type_error(format!(
                "Expected a list of relationships, got: {rels}"
            )));
        };
        let mut batch = list.to_vec();
        if batch.is_empty() {
            return Ok(());
        }
        if matches!(orientation, Orientation::Undirected) && !self.batch_is_forward(&batch)? {
            batch.reverse();
        }
        let Some((last, interior)) = batch.split_last() else {
            return Ok(());
        };
        for rel in interior {
            self.add_oriented(rel, &orientation)?;
        }
        match target {
            // The far node is known, so the final relationship needs no endpoint lookup.
            Some(target) => {
                if self.skip(last) {
                    return Ok(());
                }
                self.add_relationship(last)?;
                self.add_node(target)
            }
            None => self.add_oriented(last, &orientation),
        }
    }

    fn add_oriented(&mut self, rel: &Value, orientation: &Orientation) -> Result<()> {
        match orientation {
            Orientation::Outgoing => self.add_outgoing(rel),
            Orientation::Incoming => self.add_incoming(rel),
            Orientation::Undirected => self.add_undirected(rel),
        }
    }

    fn batch_is_forward(&mut self, batch: &[Value]) -> Result<bool> {
        let Some(Value::Relationship(first)) = batch.first() else {
            return Ok(true);
        };
        let data = self.resolve(first)?;
        let last = self.last_node()?;
        Ok(data.start == last || data.end == last)
    }

    /// Finishes the path, or [`Value::Undefined`] if an undefined input was seen.
    pub fn build(self) -> Result<Value> {
        if self.seen_undefined {
            return Ok(Value::Undefined);
        }
        Ok(Value::Path(PathValue::new(self.nodes, self.relationships)?))
    }

    fn skip(&mut self, value: &Value) -> bool {
        if value.is_undefined() {
            self.seen_undefined = true;
        }
        self.seen_undefined
    }

    fn push_step(&mut self, rel: RelationshipValue, node: NodeId) {
        self.relationships.push(rel);
        self.nodes.push(NodeValue { id: node });
    }

    fn last_node(&self) -> Result<NodeId> {
        self.nodes
            .last()
            .map(|n| n.id)
            .ok_or_else(|| CypherError::ContractViolation("path has no node to extend from".into()))
    }

    fn resolve(&mut self, rel: &RelationshipValue) -> Result<RelationshipData> {
        if let Some(data) = rel.data() {
            return Ok(*data);
        }
        self.ops
            .relationship_data(rel.id(), self.cursor)
            .ok_or(CypherError::EntityNotFound {
                kind: "relationship",
                id: rel.id().0,
            })
    }
}

fn as_node(value: &Value) -> Result<NodeValue> {
    match value {
        Value::Node(n) => Ok(*n),
        other => Err(CypherError::type_error(format!("Expected a Node, got: {other}"))),
    }
}

fn as_relationship(value: &Value) -> Result<RelationshipValue> {
    match value {
        Value::Relationship(r) => Ok(*r),
        other => Err(CypherError::type_error(format!(
            "Expected a Relationship, got: {other}"
        ))),
    }
}
