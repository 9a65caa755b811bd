mod common;

use cypher_runtime::operations::{GraphOperators, PathValueBuilder};
use cypher_runtime::storage::{ExpressionCursors, MemGraph};
use cypher_runtime::types::NodeId;
use cypher_runtime::values::{PathValue, RelationshipValue};
use cypher_runtime::Value;

fn rel(id: u64, start: u64, end: u64) -> Value {
    Value::Relationship(RelationshipValue::new(id, start, end, 0))
}

fn node_ids(path: &PathValue) -> Vec<u64> {
    path.nodes().iter().map(|n| n.id.0).collect()
}

fn expect_path(value: Value) -> PathValue {
    match value {
        Value::Path(path) => path,
        other => panic!("expected a path, got {other}"),
    }
}

#[test]
fn undirected_step_appends_the_far_endpoint() {
    common::init_tracing();
    let graph = MemGraph::new();
    let ops = GraphOperators::new(&graph);
    let mut cursors = ExpressionCursors::new(&graph);
    let mut builder = PathValueBuilder::new(&ops, &mut cursors.relationships);
    builder.add_node(&Value::node(0)).unwrap();
    builder.add_undirected(&rel(10, 1, 0)).unwrap();
    builder.add_undirected(&rel(11, 1, 2)).unwrap();
    let path = expect_path(builder.build().unwrap());
    assert_eq!(node_ids(&path), vec![0, 1, 2]);
    assert_eq!(path.to_string(), "(0)<-[10]-(1)-[11]->(2)");
}

#[test]
fn unresolved_relationships_load_endpoints_from_the_graph() {
    let mut graph = MemGraph::new();
    let a = graph.add_node(&[], []);
    let b = graph.add_node(&[], []);
    let r = graph.add_relationship(a, b, "R", []).unwrap();
    let ops = GraphOperators::new(&graph);
    let mut cursors = ExpressionCursors::new(&graph);
    let mut builder = PathValueBuilder::new(&ops, &mut cursors.relationships);
    builder.add_node(&Value::node(b.0)).unwrap();
    builder
        .add_incoming(&Value::Relationship(RelationshipValue::unresolved(r.0)))
        .unwrap();
    let path = expect_path(builder.build().unwrap());
    assert_eq!(path.nodes()[1].id, a);

    let mut builder = PathValueBuilder::new(&ops, &mut cursors.relationships);
    builder.add_node(&Value::node(a.0)).unwrap();
    let err = builder
        .add_outgoing(&Value::Relationship(RelationshipValue::unresolved(999)))
        .unwrap_err();
    assert_eq!(err.code(), "EntityNotFound");
}

#[test]
fn batches_walk_forward_or_backward() {
    let graph = MemGraph::new();
    let ops = GraphOperators::new(&graph);
    let mut cursors = ExpressionCursors::new(&graph);

    let forward = Value::list([rel(1, 0, 1), rel(2, 2, 1), rel(3, 2, 3)]);
    let mut builder = PathValueBuilder::new(&ops, &mut cursors.relationships);
    builder.add_node(&Value::node(0)).unwrap();
    builder.add_multiple_undirected(&forward).unwrap();
    assert_eq!(node_ids(&expect_path(builder.build().unwrap())), vec![0, 1, 2, 3]);

    let backward = Value::list([rel(3, 2, 3), rel(2, 2, 1), rel(1, 0, 1)]);
    let mut builder = PathValueBuilder::new(&ops, &mut cursors.relationships);
    builder.add_node(&Value::node(0)).unwrap();
    builder.add_multiple_undirected(&backward).unwrap();
    let path = expect_path(builder.build().unwrap());
    assert_eq!(node_ids(&path), vec![0, 1, 2, 3]);
    assert_eq!(path.relationships()[0].id().0, 1);
}

#[test]
fn batches_with_a_target_append_it_last() {
    let graph = MemGraph::new();
    let ops = GraphOperators::new(&graph);
    let mut cursors = ExpressionCursors::new(&graph);

    let mut builder = PathValueBuilder::new(&ops, &mut cursors.relationships);
    builder.add_node(&Value::node(0)).unwrap();
    builder
        .add_multiple_outgoing_with_target(
            &Value::list([rel(1, 0, 1), Value::Relationship(RelationshipValue::unresolved(2))]),
            &Value::node(7),
        )
        .unwrap();
    let path = expect_path(builder.build().unwrap());
    assert_eq!(node_ids(&path), vec![0, 1, 7]);

    let mut builder = PathValueBuilder::new(&ops, &mut cursors.relationships);
    builder.add_node(&Value::node(0)).unwrap();
    builder
        .add_multiple_incoming_with_target(&Value::list([]), &Value::node(7))
        .unwrap();
    assert_eq!(node_ids(&expect_path(builder.build().unwrap())), vec![0]);

    let mut builder = PathValueBuilder::new(&ops, &mut cursors.relationships);
    builder.add_node(&Value::node(0)).unwrap();
    builder
        .add_multiple_outgoing_with_target(&Value::list([rel(1, 0, 1), Value::Undefined]), &Value::node(7))
        .unwrap();
    assert_eq!(builder.build().unwrap(), Value::Undefined);
}

#[test]
fn building_requires_a_start_node() {
    let graph = MemGraph::new();
    let ops = GraphOperators::new(&graph);
    let mut cursors = ExpressionCursors::new(&graph);
    let builder = PathValueBuilder::new(&ops, &mut cursors.relationships);
    assert_eq!(builder.build().unwrap_err().code(), "ContractViolation");

    let mut builder = PathValueBuilder::new(&ops, &mut cursors.relationships);
    assert_eq!(builder.add_undirected(&rel(1, 0, 1)).unwrap_err().code(), "ContractViolation");
    builder.add_node(&Value::node(NodeId(5).0)).unwrap();
    assert!(builder.add_node(&Value::Integer(5)).is_err());
}

/// Rebuilds a path from its alternating list form, resolving every step
/// against the node before it.
fn rebuild(list: &cypher_runtime::values::ListValue, graph: &MemGraph) -> PathValue {
    let ops = GraphOperators::new(graph);
    let mut cursors = ExpressionCursors::new(graph);
    let mut builder = PathValueBuilder::new(&ops, &mut cursors.relationships);
    let mut items = list.iter();
    builder.add_node(&items.next().unwrap()).unwrap();
    for item in items {
        if let Value::Relationship(_) = item {
            builder.add_undirected(&item).unwrap();
        }
    }
    expect_path(builder.build().unwrap())
}

#[test]
fn out_and_back_over_one_relationship_round_trips_through_a_list() {
    let graph = MemGraph::new();
    let ops = GraphOperators::new(&graph);
    let mut cursors = ExpressionCursors::new(&graph);
    let mut builder = PathValueBuilder::new(&ops, &mut cursors.relationships);
    builder.add_node(&Value::node(0)).unwrap();
    builder.add_outgoing(&rel(7, 0, 1)).unwrap();
    builder.add_incoming(&rel(7, 0, 1)).unwrap();
    let path = expect_path(builder.build().unwrap());
    assert_eq!(node_ids(&path), vec![0, 1, 0]);
    assert_eq!(path.to_string(), "(0)-[7]->(1)<-[7]-(0)");

    let list = path.as_list();
    assert_eq!(
        list.iter().collect::<Vec<_>>(),
        vec![Value::node(0), rel(7, 0, 1), Value::node(1), rel(7, 0, 1), Value::node(0)]
    );
    let rebuilt = rebuild(&list, &graph);
    assert_eq!(rebuilt, path);
    assert_eq!(Value::List(rebuilt.as_list()), Value::List(list));
}
