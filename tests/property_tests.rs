use proptest::prelude::*;

use cypher_runtime::memory::EmptyMemoryTracker;
use cypher_runtime::operations::boolean::{equals, greater_than, in_list, less_than, less_than_or_equal};
use cypher_runtime::operations::{
    CypherCoercions, CypherType, GraphOperators, InCache, NoEntityAccess, PathValueBuilder,
};
use cypher_runtime::storage::{ExpressionCursors, MemGraph};
use cypher_runtime::values::RelationshipValue;
use cypher_runtime::{Equality, EvalOptions, Value};

fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Undefined),
        any::<bool>().prop_map(Value::Boolean),
        any::<i64>().prop_map(Value::Integer),
        (-10i64..10).prop_map(Value::Integer),
        any::<f64>().prop_map(Value::Float),
        (-10i64..10).prop_map(|i| Value::Float(i as f64)),
        "[a-c]{0,3}".prop_map(Value::text),
        (0u64..5).prop_map(Value::node),
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    arb_scalar().prop_recursive(2, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::list),
            prop::collection::vec(("[a-c]", inner), 0..3).prop_map(Value::map),
        ]
    })
}

fn arb_type() -> impl Strategy<Value = CypherType> {
    let leaf = prop_oneof![
        Just(CypherType::Any),
        Just(CypherType::Integer),
        Just(CypherType::Float),
        Just(CypherType::Number),
        Just(CypherType::Text),
        Just(CypherType::Boolean),
        Just(CypherType::Map),
        Just(CypherType::Node),
    ];
    leaf.prop_recursive(2, 4, 1, |inner| inner.prop_map(CypherType::list_of))
}

proptest! {
    #[test]
    fn prop_coercion_is_idempotent(value in arb_value(), target in arb_type()) {
        let coercions = CypherCoercions::new();
        if let Ok(once) = coercions.coerce(&value, &target, &NoEntityAccess) {
            let twice = coercions.coerce(&once, &target, &NoEntityAccess).unwrap();
            prop_assert_eq!(twice, once);
        }
    }

    #[test]
    fn prop_equality_is_symmetric(a in arb_value(), b in arb_value()) {
        prop_assert_eq!(equals(&a, &b), equals(&b, &a));
    }

    #[test]
    fn prop_ordering_is_consistent(a in arb_value(), b in arb_value()) {
        let lt = less_than(&a, &b);
        let gt = greater_than(&b, &a);
        prop_assert_eq!(lt, gt);
        if lt == Equality::True {
            prop_assert_eq!(less_than_or_equal(&a, &b), Equality::True);
            prop_assert_ne!(equals(&a, &b), Equality::True);
        }
    }

    #[test]
    fn prop_cached_membership_agrees(find in arb_value(), list in prop::collection::vec(arb_value(), 0..8)) {
        let list = Value::list(list);
        let tracker = EmptyMemoryTracker;
        let mut cache = InCache::with_options(&EvalOptions::new(), &tracker);
        let expected = in_list(&find, &list);
        prop_assert_eq!(cache.check(&find, &list).unwrap(), expected);
        prop_assert_eq!(cache.check(&find, &list).unwrap(), expected);
    }

    #[test]
    fn prop_directed_paths_rebuild_from_their_list(steps in prop::collection::vec(any::<bool>(), 0..12)) {
        let graph = MemGraph::new();
        let ops = GraphOperators::new(&graph);
        let mut cursors = ExpressionCursors::new(&graph);

        let mut builder = PathValueBuilder::new(&ops, &mut cursors.relationships);
        builder.add_node(&Value::node(0)).unwrap();
        for (i, forward) in steps.iter().enumerate() {
            let (id, here, next) = (100 + i as u64, i as u64, i as u64 + 1);
            if *forward {
                builder.add_outgoing(&Value::Relationship(RelationshipValue::new(id, here, next, 0))).unwrap();
            } else {
                builder.add_incoming(&Value::Relationship(RelationshipValue::new(id, next, here, 0))).unwrap();
            }
        }
        let path = builder.build().unwrap();
        let Value::Path(original) = &path else {
            return Err(TestCaseError::fail("builder did not produce a path"));
        };
        let list = original.as_list();

        let mut builder = PathValueBuilder::new(&ops, &mut cursors.relationships);
        let mut items = list.iter();
        builder.add_node(&items.next().unwrap()).unwrap();
        for item in items.filter(|item| matches!(item, Value::Relationship(_))) {
            builder.add_undirected(&item).unwrap();
        }
        let rebuilt = builder.build().unwrap();
        prop_assert_eq!(&rebuilt, &path);
        if let Value::Path(rebuilt) = &rebuilt {
            prop_assert_eq!(Value::List(rebuilt.as_list()), Value::List(list));
        }
    }
}
