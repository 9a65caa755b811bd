#![allow(dead_code)]

use std::sync::Once;

use cypher_runtime::storage::MemGraph;
use cypher_runtime::types::NodeId;
use cypher_runtime::Value;
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("cypher_runtime=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .try_init();
    });
}

/// Star graph: `center -[:LINK]-> leaf` for every leaf.
pub fn star(leaves: usize) -> (MemGraph, NodeId, Vec<NodeId>) {
    let mut graph = MemGraph::new();
    let center = graph.add_node(&["Hub"], [("name", Value::text("center"))]);
    let mut out = Vec::with_capacity(leaves);
    for i in 0..leaves {
        let leaf = graph.add_node(&["Leaf"], [("idx", Value::Integer(i as i64))]);
        graph.add_relationship(center, leaf, "LINK", []);
        out.push(leaf);
    }
    (graph, center, out)
}
