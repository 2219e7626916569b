use foldgraph_core::{Edge, EdgeId, Node, NodeId, Vec2};
use foldgraph_graph::{CompoundGraph, GraphDocument, GraphHost};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Synthetic compound graph: `roots` trees of the given `depth` and `fanout`, plus one edge
/// from every leaf to a leaf of the next tree so that most edges cross compound boundaries.
pub fn generate_compound_graph(roots: usize, depth: usize, fanout: usize) -> CompoundGraph {
    let mut graph = CompoundGraph::new();
    let mut next_id = 0i64;
    let mut leaves_per_root = Vec::with_capacity(roots);

    for root in 0..roots {
        let root_id = NodeId(next_id);
        next_id += 1;
        graph.add_node(
            Node::new(root_id, format!("Root_{}", root))
                .with_position(Vec2::new(root as f32 * 400.0, 0.0)),
        );

        let mut level = vec![root_id];
        for d in 1..=depth {
            let mut next_level = Vec::with_capacity(level.len() * fanout);
            for parent in &level {
                for i in 0..fanout {
                    let id = NodeId(next_id);
                    next_id += 1;
                    graph.add_node(
                        Node::new(id, format!("Node_{}_{}", d, i))
                            .with_parent(*parent)
                            .with_position(Vec2::new(
                                root as f32 * 400.0 + i as f32 * 50.0,
                                d as f32 * 60.0,
                            )),
                    );
                    next_level.push(id);
                }
            }
            level = next_level;
        }
        leaves_per_root.push(level);
    }

    let mut edge_id = 0i64;
    for (root, leaves) in leaves_per_root.iter().enumerate() {
        let Some(targets) = leaves_per_root.get((root + 1) % roots.max(1)) else {
            continue;
        };
        for (i, leaf) in leaves.iter().enumerate() {
            if let Some(target) = targets.get(i % targets.len().max(1)) {
                graph.add_edge(Edge::new(EdgeId(edge_id), *leaf, *target));
                edge_id += 1;
            }
        }
    }
    graph
}

/// Write a synthetic graph document to a temp dir, returning the dir guard and file path.
pub fn write_synthetic_document(
    roots: usize,
    depth: usize,
    fanout: usize,
) -> anyhow::Result<(TempDir, PathBuf)> {
    let temp_dir = tempfile::tempdir()?;
    let path = temp_dir.path().join("graph.json");
    let doc: GraphDocument = generate_compound_graph(roots, depth, fanout).to_document();
    fs::write(&path, serde_json::to_string(&doc)?)?;
    Ok((temp_dir, path))
}
