use crate::host::{GraphHost, LayoutSpec, Layouter};
use crate::viewport::Viewport;
use foldgraph_core::{Edge, EdgeId, Node, NodeId, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

/// Serialized form of a graph: flat node and edge lists plus the viewport.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub viewport: Viewport,
}

/// Structural snapshot used to compare graph states.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphSnapshot {
    pub nodes: BTreeMap<NodeId, Node>,
    pub edges: BTreeMap<EdgeId, Edge>,
}

/// In-memory compound graph: nodes with optional parents, directed edges, and a viewport.
#[derive(Default)]
pub struct CompoundGraph {
    nodes: BTreeMap<NodeId, Node>,
    edges: BTreeMap<EdgeId, Edge>,
    children: HashMap<NodeId, BTreeSet<NodeId>>,
    adjacency: HashMap<NodeId, BTreeSet<EdgeId>>,
    viewport: Viewport,
    /// Next id handed out by `allocate_edge_id`, above every id seen so far.
    next_edge_id: i64,
    /// Set once an id of `i64::MAX` is seen; allocation then counts down instead.
    upper_ids_exhausted: bool,
    /// Lowest edge id seen or allocated (at most zero).
    lowest_edge_id: i64,
    layouts: HashMap<String, Box<dyn Layouter>>,
}

impl fmt::Debug for CompoundGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompoundGraph")
            .field("nodes", &self.nodes.len())
            .field("edges", &self.edges.len())
            .field("viewport", &self.viewport)
            .field("layouts", &self.layouts.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl CompoundGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_document(doc: GraphDocument) -> Self {
        let mut graph = Self::new();
        graph.viewport = doc.viewport;
        for node in doc.nodes {
            if graph.nodes.contains_key(&node.id) {
                tracing::warn!("Dropping duplicate node {}", node.id);
                continue;
            }
            graph.add_node(node);
        }
        for edge in doc.edges {
            if !graph.nodes.contains_key(&edge.source) {
                tracing::warn!(
                    "Dropping edge {} because source node {} is missing from graph",
                    edge.id,
                    edge.source
                );
                continue;
            }
            if !graph.nodes.contains_key(&edge.target) {
                tracing::warn!(
                    "Dropping edge {} because target node {} is missing from graph",
                    edge.id,
                    edge.target
                );
                continue;
            }
            graph.add_edge(edge);
        }
        graph
    }

    pub fn to_document(&self) -> GraphDocument {
        GraphDocument {
            nodes: self.nodes.values().cloned().collect(),
            edges: self.edges.values().cloned().collect(),
            viewport: self.viewport,
        }
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
        }
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Edges running between `a` and `b` in either direction.
    pub fn edges_between(&self, a: NodeId, b: NodeId) -> Vec<&Edge> {
        self.edges
            .values()
            .filter(|e| (e.source == a && e.target == b) || (e.source == b && e.target == a))
            .collect()
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn set_position(&mut self, id: NodeId, position: Vec2) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.position = position;
                true
            }
            None => false,
        }
    }

    pub fn register_layout(&mut self, name: impl Into<String>, layouter: Box<dyn Layouter>) {
        self.layouts.insert(name.into(), layouter);
    }
}

impl GraphHost for CompoundGraph {
    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.keys().copied().collect()
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.children
            .get(&id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    fn add_node(&mut self, node: Node) {
        if let Some(parent) = node.parent {
            self.children.entry(parent).or_default().insert(node.id);
        }
        if let Some(previous) = self.nodes.insert(node.id, node) {
            tracing::warn!("Replaced existing node {}", previous.id);
        }
    }

    fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        let node = self.nodes.remove(&id)?;
        if let Some(parent) = node.parent
            && let Some(siblings) = self.children.get_mut(&parent)
        {
            siblings.remove(&id);
            if siblings.is_empty() {
                self.children.remove(&parent);
            }
        }
        // Dangling edges are not allowed to outlive their endpoints.
        if let Some(edge_ids) = self.adjacency.remove(&id) {
            for edge_id in edge_ids {
                self.remove_edge(edge_id);
            }
        }
        Some(node)
    }

    fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    fn edge_ids(&self) -> Vec<EdgeId> {
        self.edges.keys().copied().collect()
    }

    fn connected_edges(&self, id: NodeId) -> Vec<EdgeId> {
        self.adjacency
            .get(&id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    fn add_edge(&mut self, edge: Edge) {
        match edge.id.0.checked_add(1) {
            Some(after) => self.next_edge_id = self.next_edge_id.max(after),
            None => self.upper_ids_exhausted = true,
        }
        self.lowest_edge_id = self.lowest_edge_id.min(edge.id.0);
        self.adjacency.entry(edge.source).or_default().insert(edge.id);
        self.adjacency.entry(edge.target).or_default().insert(edge.id);
        self.edges.insert(edge.id, edge);
    }

    fn remove_edge(&mut self, id: EdgeId) -> Option<Edge> {
        let edge = self.edges.remove(&id)?;
        for endpoint in [edge.source, edge.target] {
            if let Some(set) = self.adjacency.get_mut(&endpoint) {
                set.remove(&id);
                if set.is_empty() {
                    self.adjacency.remove(&endpoint);
                }
            }
        }
        Some(edge)
    }

    fn allocate_edge_id(&mut self) -> EdgeId {
        if !self.upper_ids_exhausted {
            let id = self.next_edge_id;
            match id.checked_add(1) {
                Some(next) => self.next_edge_id = next,
                None => self.upper_ids_exhausted = true,
            }
            return EdgeId(id);
        }
        if let Some(id) = self.lowest_edge_id.checked_sub(1) {
            self.lowest_edge_id = id;
            return EdgeId(id);
        }
        tracing::error!("Edge id space exhausted; reusing the lowest id not in the graph");
        (0..=i64::MAX)
            .map(EdgeId)
            .find(|id| !self.edges.contains_key(id))
            .unwrap_or(EdgeId(0))
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn run_layout(&mut self, spec: &LayoutSpec, nodes: &[NodeId]) {
        let Some(layouter) = self.layouts.get(&spec.name) else {
            tracing::warn!("No layout registered under `{}`", spec.name);
            return;
        };
        let positions = layouter.execute(&*self, nodes, spec);
        tracing::debug!(
            "Layout `{}` positioned {} of {} nodes",
            spec.name,
            positions.len(),
            nodes.len()
        );
        for (id, position) in positions {
            self.set_position(id, position);
        }
    }
}
