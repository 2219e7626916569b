//! Side table holding everything a collapse took out of the visible graph.

use foldgraph_core::{CollapseState, Edge, EdgeId, Node, NodeId, Vec2};
use std::collections::HashMap;

/// Saved state of one collapsed node. Exists exactly while the node is collapsed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollapsedEntry {
    /// Direct children hidden by this collapse, in graph order.
    pub saved_children: Vec<NodeId>,
    /// Every node of the hidden subtree, parents before children.
    pub saved_nodes: Vec<Node>,
    /// Internal edges and the boundary edges that synthesized edges stand in for.
    pub saved_edges: Vec<Edge>,
    /// Synthesized edges owned by this node.
    pub synthesized: Vec<EdgeId>,
    /// Position of the node when it was collapsed.
    pub collapsed_at: Vec2,
}

/// Provenance of a synthesized boundary edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedEdge {
    /// Collapsed node the edge was created for.
    pub owner: NodeId,
    /// Endpoint outside the owner's subtree.
    pub external: NodeId,
    /// Saved edges this one stands in for.
    pub represents: Vec<EdgeId>,
}

#[derive(Debug, Clone, Default)]
pub struct FoldRegistry {
    collapsed: HashMap<NodeId, CollapsedEntry>,
    synthesized: HashMap<EdgeId, SynthesizedEdge>,
    /// Hidden node -> collapsed node whose entry stores it.
    hidden_in: HashMap<NodeId, NodeId>,
    /// Saved edge -> collapsed node whose entry stores it.
    edge_holder: HashMap<EdgeId, NodeId>,
}

impl FoldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, node: NodeId) -> CollapseState {
        if self.collapsed.contains_key(&node) {
            CollapseState::Collapsed
        } else {
            CollapseState::Expanded
        }
    }

    pub fn is_collapsed(&self, node: NodeId) -> bool {
        self.collapsed.contains_key(&node)
    }

    pub fn entry(&self, node: NodeId) -> Option<&CollapsedEntry> {
        self.collapsed.get(&node)
    }

    pub fn synthesized(&self, edge: EdgeId) -> Option<&SynthesizedEdge> {
        self.synthesized.get(&edge)
    }

    pub fn is_synthesized(&self, edge: EdgeId) -> bool {
        self.synthesized.contains_key(&edge)
    }

    pub fn synthesized_count(&self) -> usize {
        self.synthesized.len()
    }

    /// The collapsed node directly storing `node`, if it is hidden.
    pub fn hidden_in(&self, node: NodeId) -> Option<NodeId> {
        self.hidden_in.get(&node).copied()
    }

    pub fn edge_holder(&self, edge: EdgeId) -> Option<NodeId> {
        self.edge_holder.get(&edge).copied()
    }

    pub(crate) fn insert_entry(&mut self, node: NodeId, entry: CollapsedEntry) {
        for hidden in &entry.saved_nodes {
            self.hidden_in.insert(hidden.id, node);
        }
        for edge in &entry.saved_edges {
            self.edge_holder.insert(edge.id, node);
        }
        self.collapsed.insert(node, entry);
    }

    /// Remove the entry for `node` and release its hidden nodes and saved edges.
    pub(crate) fn take_entry(&mut self, node: NodeId) -> Option<CollapsedEntry> {
        let entry = self.collapsed.remove(&node)?;
        for hidden in &entry.saved_nodes {
            self.hidden_in.remove(&hidden.id);
        }
        for edge in &entry.saved_edges {
            self.edge_holder.remove(&edge.id);
        }
        Some(entry)
    }

    /// Store `edge` in the saved edges of the collapsed node `holder`.
    pub(crate) fn stash_edge(&mut self, holder: NodeId, edge: Edge) -> bool {
        let Some(entry) = self.collapsed.get_mut(&holder) else {
            return false;
        };
        self.edge_holder.insert(edge.id, holder);
        entry.saved_edges.push(edge);
        true
    }

    /// Take a saved edge back out of whichever entry holds it.
    pub(crate) fn unstash_edge(&mut self, edge: EdgeId) -> Option<Edge> {
        let holder = self.edge_holder.remove(&edge)?;
        let entry = self.collapsed.get_mut(&holder)?;
        let index = entry.saved_edges.iter().position(|e| e.id == edge)?;
        Some(entry.saved_edges.remove(index))
    }

    pub(crate) fn register_synthesized(&mut self, edge: EdgeId, info: SynthesizedEdge) {
        if let Some(entry) = self.collapsed.get_mut(&info.owner) {
            entry.synthesized.push(edge);
        }
        self.synthesized.insert(edge, info);
    }

    /// Synthesized edge owned by `owner` that points at `external`.
    pub(crate) fn synthesized_towards(&self, owner: NodeId, external: NodeId) -> Option<EdgeId> {
        let entry = self.collapsed.get(&owner)?;
        entry.synthesized.iter().copied().find(|id| {
            self.synthesized
                .get(id)
                .is_some_and(|info| info.external == external)
        })
    }

    pub(crate) fn add_represented(&mut self, synthesized: EdgeId, edge: EdgeId) {
        if let Some(info) = self.synthesized.get_mut(&synthesized) {
            info.represents.push(edge);
        }
    }

    /// Drop `edge` from whichever synthesized edge represents it.
    /// Returns that synthesized edge when it no longer represents anything.
    pub(crate) fn drop_represented(&mut self, edge: EdgeId) -> Option<EdgeId> {
        let (&parent, info) = self
            .synthesized
            .iter_mut()
            .find(|(_, info)| info.represents.contains(&edge))?;
        info.represents.retain(|id| *id != edge);
        info.represents.is_empty().then_some(parent)
    }

    /// Forget the provenance of a synthesized edge.
    pub(crate) fn unregister_synthesized(&mut self, edge: EdgeId) -> Option<SynthesizedEdge> {
        let info = self.synthesized.remove(&edge)?;
        if let Some(entry) = self.collapsed.get_mut(&info.owner) {
            entry.synthesized.retain(|id| *id != edge);
        }
        Some(info)
    }
}
