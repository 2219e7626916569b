//! Capability contract the expand/collapse engine needs from the host graph.

use crate::viewport::Viewport;
use foldgraph_core::{Edge, EdgeId, ElementData, Node, NodeId, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

/// Layout invocation requested after an expand (`layoutBy`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSpec {
    pub name: String,
    #[serde(flatten)]
    pub params: ElementData,
}

impl LayoutSpec {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: ElementData::new(),
        }
    }
}

/// A layout algorithm the host can run over a subset of nodes.
pub trait Layouter {
    /// Compute new model-space positions for (some of) `nodes`.
    fn execute(
        &self,
        graph: &dyn GraphHost,
        nodes: &[NodeId],
        spec: &LayoutSpec,
    ) -> HashMap<NodeId, Vec2>;
}

/// Everything the engine reads or mutates on the host graph.
///
/// Implementations only hold *visible* elements; the engine keeps collapsed subtrees in its own
/// side table and hands them back through `add_node`/`add_edge` on expand.
pub trait GraphHost {
    fn node(&self, id: NodeId) -> Option<&Node>;

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node>;

    fn contains_node(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Ids of all visible nodes in a stable order.
    fn node_ids(&self) -> Vec<NodeId>;

    /// Direct visible children of `id`, in a stable order.
    fn children(&self, id: NodeId) -> Vec<NodeId>;

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)
            .and_then(|node| node.parent)
            .filter(|parent| self.contains_node(*parent))
    }

    /// Visible descendants of `id`, breadth first (parents before their children).
    fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut seen = HashSet::new();
        let mut queue: VecDeque<NodeId> = self.children(id).into();
        while let Some(next) = queue.pop_front() {
            if next == id || !seen.insert(next) {
                continue;
            }
            result.push(next);
            queue.extend(self.children(next));
        }
        result
    }

    /// Number of visible ancestors.
    fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.parent(id);
        while let Some(parent) = current {
            depth += 1;
            if parent == id || depth > self.node_count() {
                break;
            }
            current = self.parent(parent);
        }
        depth
    }

    fn node_count(&self) -> usize {
        self.node_ids().len()
    }

    fn add_node(&mut self, node: Node);

    fn remove_node(&mut self, id: NodeId) -> Option<Node>;

    fn edge(&self, id: EdgeId) -> Option<&Edge>;

    fn contains_edge(&self, id: EdgeId) -> bool {
        self.edge(id).is_some()
    }

    fn edge_ids(&self) -> Vec<EdgeId>;

    /// Edges with `id` as source or target.
    fn connected_edges(&self, id: NodeId) -> Vec<EdgeId>;

    fn add_edge(&mut self, edge: Edge);

    fn remove_edge(&mut self, id: EdgeId) -> Option<Edge>;

    /// A fresh id for a synthesized edge; never reused.
    fn allocate_edge_id(&mut self) -> EdgeId;

    fn viewport(&self) -> Viewport;

    /// Re-position `nodes` with the named layout. Hosts without layout support ignore it.
    fn run_layout(&mut self, spec: &LayoutSpec, nodes: &[NodeId]) {
        tracing::debug!(
            "Host has no layout support; skipping layout `{}` for {} nodes",
            spec.name,
            nodes.len()
        );
    }
}
