//! Functions over graph entities and containers that may need storage access.
//!
//! Node and relationship values carry identity only, so anything beyond the
//! id is read through [`GraphOperators`] with the caller's
//! [`ExpressionCursors`].

use std::cell::RefCell;

use crate::error::{CypherError, Result};
use crate::operations::cursor::GraphOperators;
use crate::operations::functions::point_from_map;
use crate::storage::{ExpressionCursors, ReadAccess};
use crate::types::{LabelId, NodeId, RelId, RelTypeId};
use crate::values::temporal::temporal_field;
use crate::values::{ListValue, MapValue, RelationshipData, RelationshipValue, Value};

const POINT_KEYS: [&str; 8] = ["x", "y", "z", "longitude", "latitude", "height", "crs", "srid"];

/// Entity metadata needed by value-level operations such as map coercion.
pub trait EntityAccess {
    /// Current properties of `node`.
    fn node_properties(&self, node: NodeId) -> Result<MapValue>;
    /// Current properties of `rel`.
    fn relationship_properties(&self, rel: RelId) -> Result<MapValue>;
    /// Start and end node of `rel`.
    fn relationship_endpoints(&self, rel: RelId) -> Result<(NodeId, NodeId)>;
    /// Label names of `node`.
    fn node_labels(&self, node: NodeId) -> Result<ListValue>;
}

/// [`EntityAccess`] backed by graph operators and an owned cursor set.
pub struct EntityReader<'r, A: ReadAccess> {
    ops: GraphOperators<'r, A>,
    cursors: RefCell<ExpressionCursors<A>>,
}

impl<'r, A: ReadAccess> EntityReader<'r, A> {
    /// Allocates a cursor set from the operators' read access.
    pub fn new(ops: GraphOperators<'r, A>) -> Self {
        let cursors = RefCell::new(ExpressionCursors::new(ops.read()));
        Self { ops, cursors }
    }

    fn with_cursors<T>(&self, f: impl FnOnce(&mut ExpressionCursors<A>) -> Result<T>) -> Result<T> {
        let mut cursors = self
            .cursors
            .try_borrow_mut()
            .map_err(|_| CypherError::ContractViolation("entity reader used re-entrantly".into()))?;
        f(&mut cursors)
    }
}

impl<A: ReadAccess> EntityAccess for EntityReader<'_, A> {
    fn node_properties(&self, node: NodeId) -> Result<MapValue> {
        self.with_cursors(|c| self.ops.node_as_map(node, &mut c.nodes, &mut c.properties))
    }

    fn relationship_properties(&self, rel: RelId) -> Result<MapValue> {
        self.with_cursors(|c| {
            self.ops
                .relationship_as_map(rel, &mut c.relationships, &mut c.properties)
        })
    }

    fn relationship_endpoints(&self, rel: RelId) -> Result<(NodeId, NodeId)> {
        self.with_cursors(|c| {
            self.ops
                .relationship_data(rel, &mut c.relationships)
                .map(|data| (data.start, data.end))
                .ok_or(CypherError::EntityNotFound {
                    kind: "relationship",
                    id: rel.0,
                })
        })
    }

    fn node_labels(&self, node: NodeId) -> Result<ListValue> {
        self.with_cursors(|c| self.ops.node_labels(node, &mut c.nodes))
    }
}

/// [`EntityAccess`] for contexts without a graph; every lookup fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoEntityAccess;

impl NoEntityAccess {
    fn unavailable(what: &str) -> CypherError {
        CypherError::ContractViolation(format!("no graph access available to read {what}"))
    }
}

impl EntityAccess for NoEntityAccess {
    fn node_properties(&self, _node: NodeId) -> Result<MapValue> {
        Err(Self::unavailable("node properties"))
    }

    fn relationship_properties(&self, _rel: RelId) -> Result<MapValue> {
        Err(Self::unavailable("relationship properties"))
    }

    fn relationship_endpoints(&self, _rel: RelId) -> Result<(NodeId, NodeId)> {
        Err(Self::unavailable("relationship endpoints"))
    }

    fn node_labels(&self, _node: NodeId) -> Result<ListValue> {
        Err(Self::unavailable("node labels"))
    }
}

/// Endpoints and type of `rel`, loading them through the scan cursor when the
/// value was built from a bare id.
pub fn resolve_relationship<A: ReadAccess>(
    rel: &RelationshipValue,
    ops: &GraphOperators<'_, A>,
    cursors: &mut ExpressionCursors<A>,
) -> Result<RelationshipData> {
    if let Some(data) = rel.data() {
        return Ok(*data);
    }
    ops.relationship_data(rel.id(), &mut cursors.relationships)
        .ok_or(CypherError::EntityNotFound {
            kind: "relationship",
            id: rel.id().0,
        })
}

/// `id(entity)`.
pub fn id(item: &Value) -> Result<Value> {
    match item {
        Value::Node(n) => Ok(Value::Integer(n.id.0 as i64)),
        Value::Relationship(r) => Ok(Value::Integer(r.id().0 as i64)),
        other => Err(CypherError::type_error(format!(
            "Invalid input for function 'id()': Expected {other} to be a node or relationship, but it was `{}`",
            other.type_name()
        ))),
    }
}

/// `labels(node)`.
pub fn labels<A: ReadAccess>(
    item: &Value,
    ops: &GraphOperators<'_, A>,
    cursors: &mut ExpressionCursors<A>,
) -> Result<Value> {
    match item {
        Value::Node(n) => Ok(Value::List(ops.node_labels(n.id, &mut cursors.nodes)?)),
        other => Err(CypherError::type_error(format!(
            "Invalid input for function 'labels()': Expected a Node, got: {other}"
        ))),
    }
}

/// `n:Label`. An unknown label token is never set.
pub fn has_label<A: ReadAccess>(
    item: &Value,
    label: Option<LabelId>,
    ops: &GraphOperators<'_, A>,
    cursors: &mut ExpressionCursors<A>,
) -> Result<bool> {
    match item {
        Value::Node(n) => Ok(ops.has_label(n.id, label, &mut cursors.nodes)),
        other => Err(CypherError::type_error(format!("Expected a Node, got: {other}"))),
    }
}

/// `n:A|B`.
pub fn has_any_label<A: ReadAccess>(
    item: &Value,
    labels: &[LabelId],
    ops: &GraphOperators<'_, A>,
    cursors: &mut ExpressionCursors<A>,
) -> Result<bool> {
    match item {
        Value::Node(n) => Ok(ops.has_any_label(n.id, labels, &mut cursors.nodes)),
        other => Err(CypherError::type_error(format!("Expected a Node, got: {other}"))),
    }
}

/// `type(rel)`: undefined when the relationship cannot be resolved.
pub fn rel_type<A: ReadAccess>(
    item: &Value,
    ops: &GraphOperators<'_, A>,
    cursors: &mut ExpressionCursors<A>,
) -> Result<Value> {
    let Value::Relationship(rel) = item else {
        return Err(CypherError::type_error(format!(
            "Invalid input for function 'type()': Expected a Relationship, got: {item}"
        )));
    };
    let rel_type = match rel.data() {
        Some(data) => Some(data.rel_type),
        None => ops
            .relationship_data(rel.id(), &mut cursors.relationships)
            .map(|data| data.rel_type),
    };
    Ok(rel_type
        .and_then(|t| ops.read().relationship_type_name(t))
        .map_or(Value::Undefined, Value::Text))
}

/// `r:TYPE`. An unknown type token never matches.
pub fn has_type<A: ReadAccess>(
    item: &Value,
    rel_type: Option<RelTypeId>,
    ops: &GraphOperators<'_, A>,
    cursors: &mut ExpressionCursors<A>,
) -> Result<bool> {
    let Value::Relationship(rel) = item else {
        return Err(CypherError::type_error(format!("Expected a Relationship, got: {item}")));
    };
    let Some(wanted) = rel_type else {
        return Ok(false);
    };
    let actual = match rel.data() {
        Some(data) => Some(data.rel_type),
        None => ops
            .relationship_data(rel.id(), &mut cursors.relationships)
            .map(|data| data.rel_type),
    };
    Ok(actual == Some(wanted))
}

fn relationship_arg<'v>(function: &str, item: &'v Value) -> Result<&'v RelationshipValue> {
    match item {
        Value::Relationship(rel) => Ok(rel),
        other => Err(CypherError::type_error(format!(
            "Invalid input for function '{function}()': Expected {other} to be a relationship"
        ))),
    }
}

/// `startNode(rel)`.
pub fn start_node<A: ReadAccess>(
    item: &Value,
    ops: &GraphOperators<'_, A>,
    cursors: &mut ExpressionCursors<A>,
) -> Result<Value> {
    let rel = relationship_arg("startNode", item)?;
    let data = resolve_relationship(rel, ops, cursors)?;
    Ok(Value::node(data.start.0))
}

/// `endNode(rel)`.
pub fn end_node<A: ReadAccess>(
    item: &Value,
    ops: &GraphOperators<'_, A>,
    cursors: &mut ExpressionCursors<A>,
) -> Result<Value> {
    let rel = relationship_arg("endNode", item)?;
    let data = resolve_relationship(rel, ops, cursors)?;
    Ok(Value::node(data.end.0))
}

/// The endpoint of `rel` that is not `node`.
pub fn other_node<A: ReadAccess>(
    item: &Value,
    node: &Value,
    ops: &GraphOperators<'_, A>,
    cursors: &mut ExpressionCursors<A>,
) -> Result<Value> {
    let rel = relationship_arg("otherNode", item)?;
    let node = node_id(node)?;
    let data = resolve_relationship(rel, ops, cursors)?;
    let other = if node == data.start { data.end } else { data.start };
    Ok(Value::node(other.0))
}

/// `keys(x)` for nodes, relationships and maps.
pub fn keys<A: ReadAccess>(
    item: &Value,
    ops: &GraphOperators<'_, A>,
    cursors: &mut ExpressionCursors<A>,
) -> Result<Value> {
    let ids = match item {
        Value::Map(map) => return Ok(Value::List(map.keys())),
        Value::Node(n) => ops.node_property_keys(n.id, &mut cursors.nodes, &mut cursors.properties)?,
        Value::Relationship(r) => ops.relationship_property_keys(
            r.id(),
            &mut cursors.relationships,
            &mut cursors.properties,
        )?,
        other => {
            return Err(CypherError::type_error(format!(
                "Invalid input for function 'keys()': Expected a node, a relationship or a literal map but got {other}"
            )))
        }
    };
    let mut names = Vec::with_capacity(ids.len());
    for key in ids {
        let name = ops.read().property_key_name(key).ok_or_else(|| {
            CypherError::invalid_argument(format!("unknown property key token {key}"))
        })?;
        names.push(Value::Text(name));
    }
    Ok(Value::list(names))
}

/// `properties(x)` for nodes, relationships and maps.
pub fn properties<A: ReadAccess>(
    item: &Value,
    ops: &GraphOperators<'_, A>,
    cursors: &mut ExpressionCursors<A>,
) -> Result<Value> {
    Ok(Value::Map(match item {
        Value::Map(map) => map.clone(),
        Value::Node(n) => ops.node_as_map(n.id, &mut cursors.nodes, &mut cursors.properties)?,
        Value::Relationship(r) => {
            ops.relationship_as_map(r.id(), &mut cursors.relationships, &mut cursors.properties)?
        }
        other => {
            return Err(CypherError::type_error(format!(
                "Invalid input for function 'properties()': Expected a node, a relationship or a literal map but got {other}"
            )))
        }
    }))
}

/// `exists(x.key)`.
pub fn property_exists<A: ReadAccess>(
    key: &str,
    container: &Value,
    ops: &GraphOperators<'_, A>,
    cursors: &mut ExpressionCursors<A>,
) -> Result<bool> {
    let token = ops.read().property_key(key);
    match container {
        Value::Node(n) => Ok(ops.node_has_property(n.id, token, &mut cursors.nodes, &mut cursors.properties)),
        Value::Relationship(r) => Ok(ops.relationship_has_property(
            r.id(),
            token,
            &mut cursors.relationships,
            &mut cursors.properties,
        )),
        Value::Map(map) => Ok(!map.get(key).is_undefined()),
        other => Err(CypherError::type_error(format!(
            "Invalid input for function 'exists()': Expected {other} to be a node, relationship or map"
        ))),
    }
}

/// `x.key` for entities, maps, and the components of temporal, duration and
/// point values.
pub fn property_get<A: ReadAccess>(
    key: &str,
    container: &Value,
    ops: &GraphOperators<'_, A>,
    cursors: &mut ExpressionCursors<A>,
) -> Result<Value> {
    match container {
        Value::Node(n) => ops.node_property(
            n.id,
            ops.read().property_key(key),
            &mut cursors.nodes,
            &mut cursors.properties,
        ),
        Value::Relationship(r) => ops.relationship_property(
            r.id(),
            ops.read().property_key(key),
            &mut cursors.relationships,
            &mut cursors.properties,
        ),
        Value::Map(map) => Ok(map.get(key)),
        Value::Duration(d) => d.field(key),
        Value::Point(p) => p.field(key),
        v if v.is_temporal() => temporal_field(v, key),
        other => Err(CypherError::type_error(format!(
            "Type mismatch: expected a map but was {other}"
        ))),
    }
}

/// `container[index]`: property by name for entities, key lookup for maps,
/// element lookup for lists with negative indices counting from the end.
pub fn container_index<A: ReadAccess>(
    container: &Value,
    index: &Value,
    ops: &GraphOperators<'_, A>,
    cursors: &mut ExpressionCursors<A>,
) -> Result<Value> {
    match container {
        Value::Node(_) | Value::Relationship(_) => {
            let key = key_arg(index, "Cannot use a property key with non string name")?;
            property_get(key, container, ops, cursors)
        }
        Value::Map(map) => Ok(map.get(key_arg(index, "Cannot access a map by a non-string key")?)),
        Value::List(list) => list_index(list, index),
        other => Err(CypherError::type_error(format!(
            "`{other}` is not a collection or a map. Element access is only possible by performing a collection lookup using an integer index, or by performing a map lookup using a string key (found: {other}[{index}])"
        ))),
    }
}

/// Whether `container[index]` exists for entities and maps.
pub fn container_index_exists<A: ReadAccess>(
    container: &Value,
    index: &Value,
    ops: &GraphOperators<'_, A>,
    cursors: &mut ExpressionCursors<A>,
) -> Result<bool> {
    match container {
        Value::Node(_) | Value::Relationship(_) => {
            let key = key_arg(index, "Cannot use a property key with non string name")?;
            property_exists(key, container, ops, cursors)
        }
        Value::Map(map) => Ok(map.contains_key(key_arg(
            index,
            "Cannot use non string value as or in map keys",
        )?)),
        other => Err(CypherError::type_error(format!(
            "`{other}` is not a map. Element access is only possible by performing a collection lookup by performing a map lookup using a string key (found: {other}[{index}])"
        ))),
    }
}

fn key_arg<'v>(index: &'v Value, context: &str) -> Result<&'v str> {
    index
        .as_str()
        .ok_or_else(|| CypherError::type_error(format!("{context}. It was {index}")))
}

fn list_index(list: &ListValue, index: &Value) -> Result<Value> {
    let idx = match index {
        Value::Integer(i) => *i,
        Value::Float(_) => {
            return Err(CypherError::type_error(format!(
                "Cannot access a list using an non-integer number index, got {index}"
            )))
        }
        other => {
            return Err(CypherError::type_error(format!(
                "Cannot access a list '{}' using a non-number index, got {other}",
                Value::List(list.clone())
            )))
        }
    };
    if idx > i32::MAX as i64 || idx < i32::MIN as i64 {
        return Err(CypherError::invalid_argument(format!(
            "Cannot index a list using a value greater than {} or lesser than {}, got {idx}",
            i32::MAX,
            i32::MIN
        )));
    }
    let len = list.len() as i64;
    let idx = if idx < 0 { len + idx } else { idx };
    if idx < 0 || idx >= len {
        return Ok(Value::Undefined);
    }
    Ok(list.get(idx as usize).unwrap_or(Value::Undefined))
}

/// `point(x)` from a map, or from the point-shaped properties of an entity.
pub fn point<A: ReadAccess>(
    item: &Value,
    ops: &GraphOperators<'_, A>,
    cursors: &mut ExpressionCursors<A>,
) -> Result<Value> {
    match item {
        Value::Node(_) | Value::Relationship(_) => {
            let mut entries = Vec::new();
            for key in POINT_KEYS {
                let value = property_get(key, item, ops, cursors)?;
                if !value.is_undefined() {
                    entries.push((key, value));
                }
            }
            point_from_map(&Value::Map(MapValue::from_entries(entries)))
        }
        other => point_from_map(other),
    }
}

/// `nodes(path)`.
pub fn nodes(item: &Value) -> Result<Value> {
    match item {
        Value::Path(path) => Ok(Value::list(path.nodes().iter().map(|n| Value::Node(*n)))),
        other => Err(CypherError::type_error(format!(
            "Invalid input for function 'nodes()': Expected {other} to be a path"
        ))),
    }
}

/// `relationships(path)`.
pub fn relationships(item: &Value) -> Result<Value> {
    match item {
        Value::Path(path) => Ok(Value::list(
            path.relationships().iter().map(|r| Value::Relationship(*r)),
        )),
        other => Err(CypherError::type_error(format!(
            "Invalid input for function 'relationships()': Expected {other} to be a path"
        ))),
    }
}

/// Id of a node value.
pub fn node_id(value: &Value) -> Result<NodeId> {
    match value {
        Value::Node(n) => Ok(n.id),
        other => Err(CypherError::type_error(format!(
            "Expected a Node, got {}",
            other.type_name()
        ))),
    }
}

/// `true` for nodes, a type error otherwise.
pub fn assert_is_node(item: &Value) -> Result<Value> {
    node_id(item).map(|_| Value::Boolean(true))
}
