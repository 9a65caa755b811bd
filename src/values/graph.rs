use std::fmt;
use std::sync::Arc;

use super::{ListValue, Value};
use crate::error::{CypherError, Result};
use crate::types::{NodeId, RelId, RelTypeId};

/// Reference to a node by id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeValue {
    /// Node identifier.
    pub id: NodeId,
}

impl NodeValue {
    /// Wraps a raw id.
    pub fn new(id: u64) -> Self {
        Self { id: NodeId(id) }
    }
}

impl fmt::Display for NodeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.id)
    }
}

/// Endpoints and type of a relationship.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RelationshipData {
    /// Start node.
    pub start: NodeId,
    /// End node.
    pub end: NodeId,
    /// Relationship type token.
    pub rel_type: RelTypeId,
}

/// Reference to a relationship, optionally carrying its endpoints and type.
///
/// Relationships produced by traversal arrive resolved; ones built from a
/// bare id resolve lazily through a relationship cursor.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RelationshipValue {
    id: RelId,
    data: Option<RelationshipData>,
}

impl RelationshipValue {
    /// Resolved relationship.
    pub fn new(id: u64, start: u64, end: u64, rel_type: u32) -> Self {
        Self {
            id: RelId(id),
            data: Some(RelationshipData {
                start: NodeId(start),
                end: NodeId(end),
                rel_type: RelTypeId(rel_type),
            }),
        }
    }

    /// Relationship known only by id.
    pub fn unresolved(id: u64) -> Self {
        Self {
            id: RelId(id),
            data: None,
        }
    }

    /// Relationship with already-loaded endpoint data.
    pub fn with_data(id: RelId, data: RelationshipData) -> Self {
        Self {
            id,
            data: Some(data),
        }
    }

    /// Identifier.
    pub fn id(&self) -> RelId {
        self.id
    }

    /// Endpoints and type, if resolved.
    pub fn data(&self) -> Option<&RelationshipData> {
        self.data.as_ref()
    }
}

impl fmt::Display for RelationshipValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.id)
    }
}

/// Alternating node/relationship sequence with one more node than relationships.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathValue {
    nodes: Arc<[NodeValue]>,
    relationships: Arc<[RelationshipValue]>,
}

impl PathValue {
    /// Creates a path, checking `nodes.len() == relationships.len() + 1`.
    pub fn new(nodes: Vec<NodeValue>, relationships: Vec<RelationshipValue>) -> Result<Self> {
        if nodes.len() != relationships.len() + 1 {
            return Err(CypherError::ContractViolation(format!(
                "a path needs one more node than relationships, got {} nodes and {} relationships",
                nodes.len(),
                relationships.len()
            )));
        }
        Ok(Self {
            nodes: nodes.into(),
            relationships: relationships.into(),
        })
    }

    /// Nodes in traversal order.
    pub fn nodes(&self) -> &[NodeValue] {
        &self.nodes
    }

    /// Relationships in traversal order.
    pub fn relationships(&self) -> &[RelationshipValue] {
        &self.relationships
    }

    /// Number of relationships.
    pub fn length(&self) -> usize {
        self.relationships.len()
    }

    /// Alternating `[n0, r0, n1, ..., nk]` list.
    pub fn as_list(&self) -> ListValue {
        let mut out = Vec::with_capacity(self.nodes.len() + self.relationships.len());
        for (idx, node) in self.nodes.iter().enumerate() {
            out.push(Value::Node(*node));
            if let Some(rel) = self.relationships.get(idx) {
                out.push(Value::Relationship(*rel));
            }
        }
        ListValue::from_vec(out)
    }

    pub(crate) fn estimated_heap_usage(&self) -> usize {
        self.nodes.len() * std::mem::size_of::<NodeValue>()
            + self.relationships.len() * std::mem::size_of::<RelationshipValue>()
    }
}

impl fmt::Display for PathValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, node) in self.nodes.iter().enumerate() {
            write!(f, "{node}")?;
            if let Some(rel) = self.relationships.get(idx) {
                let next = self.nodes.get(idx + 1).map(|n| n.id);
                match rel.data() {
                    Some(data) if Some(data.start) == next => write!(f, "<-{rel}-")?,
                    Some(_) => write!(f, "-{rel}->")?,
                    None => write!(f, "-{rel}-")?,
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_shape_is_enforced() {
        assert!(PathValue::new(vec![NodeValue::new(0)], vec![]).is_ok());
        let err = PathValue::new(vec![NodeValue::new(0)], vec![RelationshipValue::unresolved(1)]);
        assert!(matches!(err, Err(CypherError::ContractViolation(_))));
    }

    #[test]
    fn path_as_list_alternates() {
        let path = PathValue::new(
            vec![NodeValue::new(0), NodeValue::new(1)],
            vec![RelationshipValue::new(5, 1, 0, 0)],
        )
        .unwrap();
        let list = path.as_list();
        assert_eq!(list.len(), 3);
        assert_eq!(list.get(1), Some(Value::Relationship(RelationshipValue::new(5, 1, 0, 0))));
        assert_eq!(path.to_string(), "(0)<-[5]-(1)");
    }
}
