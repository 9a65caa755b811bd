mod common;

use cypher_runtime::operations::{CypherCoercions, CypherType, EntityReader, GraphOperators, NoEntityAccess};
use cypher_runtime::storage::MemGraph;
use cypher_runtime::values::{ListValue, RelationshipValue};
use cypher_runtime::Value;

#[test]
fn scalars_coerce_or_fail_with_type_errors() {
    common::init_tracing();
    let c = CypherCoercions::new();
    let none = NoEntityAccess;
    assert_eq!(c.coerce(&Value::Float(2.9), &CypherType::Integer, &none).unwrap(), Value::Integer(2));
    assert_eq!(c.coerce(&Value::Integer(2), &CypherType::Float, &none).unwrap(), Value::Float(2.0));
    assert_eq!(c.coerce(&Value::Integer(2), &CypherType::Number, &none).unwrap(), Value::Integer(2));
    assert_eq!(c.coerce(&Value::Undefined, &CypherType::Date, &none).unwrap(), Value::Undefined);
    let err = c.coerce(&Value::text("1"), &CypherType::Integer, &none).unwrap_err();
    assert_eq!(err.code(), "TypeError");
    assert!(err.to_string().contains("INTEGER"));
}

#[test]
fn any_lists_pass_through_untouched() {
    let c = CypherCoercions::new();
    let list = ListValue::from_vec(vec![Value::Integer(1), Value::text("x")]);
    let Value::List(out) = c
        .coerce(&Value::List(list.clone()), &CypherType::list_of(CypherType::Any), &NoEntityAccess)
        .unwrap()
    else {
        panic!("expected a list");
    };
    assert!(out.same_instance(&list));
}

#[test]
fn typed_lists_coerce_each_element() {
    let c = CypherCoercions::new();
    let floats = CypherType::list_of(CypherType::Float);
    let mixed = Value::list([Value::Integer(1), Value::Undefined, Value::Float(2.5)]);
    assert_eq!(
        c.coerce(&mixed, &floats, &NoEntityAccess).unwrap(),
        Value::list([Value::Float(1.0), Value::Undefined, Value::Float(2.5)])
    );
    let lazy = Value::List(ListValue::range(1, 3, 1).unwrap());
    let concatenated = Value::List(ListValue::range(1, 2, 1).unwrap().concat(&ListValue::range(3, 3, 1).unwrap()));
    for input in [lazy, concatenated] {
        assert_eq!(
            c.coerce(&input, &floats, &NoEntityAccess).unwrap(),
            Value::list([1.0, 2.0, 3.0].map(Value::Float))
        );
    }
    let nested = CypherType::list_of(CypherType::list_of(CypherType::Integer));
    assert_eq!(nested.to_string(), "LIST<LIST<INTEGER>>");
    assert!(c.coerce(&Value::list([Value::Integer(1)]), &nested, &NoEntityAccess).is_err());
}

#[test]
fn entities_coerce_to_their_property_maps() {
    let mut graph = MemGraph::new();
    let a = graph.add_node(&[], [("name", Value::text("Ada")), ("born", Value::Integer(1815))]);
    let b = graph.add_node(&[], []);
    let rel = graph.add_relationship(a, b, "R", [("w", Value::Float(0.5))]).unwrap();
    let reader = EntityReader::new(GraphOperators::new(&graph));
    let c = CypherCoercions::new();

    let Value::Map(props) = c.coerce(&Value::node(a.0), &CypherType::Map, &reader).unwrap() else {
        panic!("expected a map");
    };
    assert_eq!(props.get("name"), Value::text("Ada"));
    assert_eq!(props.get("born"), Value::Integer(1815));

    let rel = Value::Relationship(RelationshipValue::unresolved(rel.0));
    let Value::Map(props) = c.coerce(&rel, &CypherType::Map, &reader).unwrap() else {
        panic!("expected a map");
    };
    assert_eq!(props.get("w"), Value::Float(0.5));

    let err = c.coerce(&Value::node(a.0), &CypherType::Map, &NoEntityAccess).unwrap_err();
    assert_eq!(err.code(), "ContractViolation");
}
