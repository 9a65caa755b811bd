#![forbid(unsafe_code)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use cypher_runtime::operations::GraphOperators;
use cypher_runtime::storage::{Direction, ExpressionCursors, MemGraph};
use cypher_runtime::types::NodeId;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const HUB_DEGREE: usize = 50_000;
const LEAF_EDGES: usize = 2_048;

fn micro_expand_into(c: &mut Criterion) {
    let mut group = c.benchmark_group("micro/expand_into");
    group.sample_size(40);
    group.throughput(Throughput::Elements(1));

    let harness = StarHarness::new(HUB_DEGREE, LEAF_EDGES);
    let ops = GraphOperators::new(&harness.graph);
    let mut cursors = ExpressionCursors::new(&harness.graph);
    let mut rng = ChaCha8Rng::seed_from_u64(0x5EED);

    for (name, dir) in [("hub_to_leaf", Direction::Outgoing), ("leaf_to_hub", Direction::Incoming)] {
        group.bench_with_input(BenchmarkId::new("supernode", name), &dir, |b, dir| {
            b.iter(|| {
                let leaf = harness.leaves[rng.gen_range(0..harness.leaves.len())];
                let (from, to) = match dir {
                    Direction::Outgoing => (harness.hub, leaf),
                    _ => (leaf, harness.hub),
                };
                let found = ops
                    .connecting_relationships(from, *dir, to, None, &mut cursors.nodes, &mut cursors.traversal)
                    .count();
                black_box(found)
            });
        });
    }

    group.bench_function("sparse_pairs", |b| {
        b.iter(|| {
            let a = harness.leaves[rng.gen_range(0..harness.leaves.len())];
            let z = harness.leaves[rng.gen_range(0..harness.leaves.len())];
            let found = ops
                .connecting_relationships(a, Direction::Both, z, None, &mut cursors.nodes, &mut cursors.traversal)
                .count();
            black_box(found)
        });
    });
    group.finish();
}

struct StarHarness {
    graph: MemGraph,
    hub: NodeId,
    leaves: Vec<NodeId>,
}

impl StarHarness {
    fn new(hub_degree: usize, leaf_edges: usize) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(0xA11CE);
        let mut graph = MemGraph::new();
        let hub = graph.add_node(&["Hub"], []);
        let leaves: Vec<NodeId> = (0..hub_degree)
            .map(|_| {
                let leaf = graph.add_node(&["Leaf"], []);
                graph.add_relationship(hub, leaf, "LINK", []);
                leaf
            })
            .collect();
        for _ in 0..leaf_edges {
            let a = leaves[rng.gen_range(0..leaves.len())];
            let z = leaves[rng.gen_range(0..leaves.len())];
            graph.add_relationship(a, z, "PEER", []);
        }
        Self { graph, hub, leaves }
    }
}

criterion_group!(benches, micro_expand_into);
criterion_main!(benches);
