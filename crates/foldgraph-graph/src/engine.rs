//! Collapse/expand state transitions.
//!
//! Collapsing a node moves its whole visible subtree, and every edge touching that subtree,
//! into the [`FoldRegistry`]. Edges crossing the subtree boundary are replaced by one
//! synthesized edge per external endpoint. Expanding reverses this. Restored edges are placed
//! through [`FoldEngine::place_edge`], which routes an edge whose endpoint is still hidden by
//! some other collapse onto that collapse's synthesized edges, so any interleaving of
//! operations leaves a consistent graph.

use crate::host::GraphHost;
use crate::options::ExpandCollapseOptions;
use crate::registry::{CollapsedEntry, FoldRegistry, SynthesizedEdge};
use foldgraph_core::{CollapseState, Edge, EdgeId, NodeId};
use foldgraph_events::{Event, EventBus};
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, warn};

/// Engine context, one per graph instance.
#[derive(Debug)]
pub struct FoldEngine<G: GraphHost> {
    graph: G,
    registry: FoldRegistry,
    options: ExpandCollapseOptions,
    events: Option<EventBus>,
}

impl<G: GraphHost> FoldEngine<G> {
    pub fn new(graph: G, options: ExpandCollapseOptions) -> Self {
        Self {
            graph,
            registry: FoldRegistry::new(),
            options,
            events: None,
        }
    }

    pub fn with_event_bus(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }

    /// Direct access to the host graph. Structural edits made here bypass the engine.
    pub fn graph_mut(&mut self) -> &mut G {
        &mut self.graph
    }

    pub fn into_graph(self) -> G {
        self.graph
    }

    pub fn registry(&self) -> &FoldRegistry {
        &self.registry
    }

    pub fn options(&self) -> &ExpandCollapseOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut ExpandCollapseOptions {
        &mut self.options
    }

    pub fn event_bus(&self) -> Option<&EventBus> {
        self.events.as_ref()
    }

    // ------------------------------------------------------------------
    // Predicates
    // ------------------------------------------------------------------

    pub fn collapse_state(&self, node: NodeId) -> CollapseState {
        self.registry.state(node)
    }

    /// Visible, expanded, and has at least one visible child.
    pub fn is_collapsible(&self, node: NodeId) -> bool {
        self.graph.contains_node(node)
            && !self.registry.is_collapsed(node)
            && !self.graph.children(node).is_empty()
    }

    pub fn is_expandable(&self, node: NodeId) -> bool {
        self.registry.is_collapsed(node)
    }

    /// Whether the overlay draws a handle for `node`. Independent of `is_collapsible`:
    /// a collapsed node has no visible children but still gets a handle.
    pub fn has_handle(&self, node: NodeId) -> bool {
        self.graph.contains_node(node)
            && (self.registry.is_collapsed(node) || !self.graph.children(node).is_empty())
    }

    pub fn collapsible_nodes(&self) -> Vec<NodeId> {
        self.graph
            .node_ids()
            .into_iter()
            .filter(|id| self.is_collapsible(*id))
            .collect()
    }

    /// Visible collapsed nodes.
    pub fn expandable_nodes(&self) -> Vec<NodeId> {
        self.graph
            .node_ids()
            .into_iter()
            .filter(|id| self.is_expandable(*id))
            .collect()
    }

    // ------------------------------------------------------------------
    // Public transitions
    // ------------------------------------------------------------------

    /// Collapse every collapsible node in `nodes`, deepest first.
    pub fn collapse(&mut self, nodes: &[NodeId]) -> Vec<NodeId> {
        let affected = self.collapse_nodes(nodes);
        self.notify(Event::NodesCollapsed {
            ids: affected.clone(),
        });
        affected
    }

    /// Collapse `nodes` together with all their collapsible descendants.
    pub fn collapse_recursively(&mut self, nodes: &[NodeId]) -> Vec<NodeId> {
        let mut targets = Vec::new();
        let mut seen = HashSet::new();
        for &node in nodes {
            if !self.is_collapsible(node) {
                continue;
            }
            for id in std::iter::once(node).chain(self.graph.descendants(node)) {
                if seen.insert(id) {
                    targets.push(id);
                }
            }
        }
        self.collapse(&targets)
    }

    pub fn collapse_all(&mut self) -> Vec<NodeId> {
        let roots = self.collapsible_nodes();
        self.collapse_recursively(&roots)
    }

    /// Expand every expandable node in `nodes`, shallowest first.
    pub fn expand(&mut self, nodes: &[NodeId]) -> Vec<NodeId> {
        let options = self.options.clone();
        self.expand_with(nodes, &options)
    }

    /// [`FoldEngine::expand`] with call-specific options in place of the engine-wide ones.
    pub fn expand_with(
        &mut self,
        nodes: &[NodeId],
        options: &ExpandCollapseOptions,
    ) -> Vec<NodeId> {
        let affected = self.expand_nodes(nodes);
        self.after_expand(&affected, options);
        affected
    }

    /// Expand `nodes`, then every collapsed node each expansion reveals, until none remain.
    pub fn expand_recursively(&mut self, nodes: &[NodeId]) -> Vec<NodeId> {
        let options = self.options.clone();
        self.expand_recursively_with(nodes, &options)
    }

    pub fn expand_recursively_with(
        &mut self,
        nodes: &[NodeId],
        options: &ExpandCollapseOptions,
    ) -> Vec<NodeId> {
        let mut affected = Vec::new();
        let mut frontier: Vec<NodeId> = nodes
            .iter()
            .copied()
            .filter(|id| self.is_expandable(*id))
            .collect();
        while !frontier.is_empty() {
            let expanded = self.expand_nodes(&frontier);
            let mut next = Vec::new();
            let mut seen = HashSet::new();
            for &node in &expanded {
                for descendant in self.graph.descendants(node) {
                    if self.is_expandable(descendant) && seen.insert(descendant) {
                        next.push(descendant);
                    }
                }
            }
            affected.extend(expanded);
            frontier = next;
        }
        self.after_expand(&affected, options);
        affected
    }

    pub fn expand_all(&mut self) -> Vec<NodeId> {
        let roots = self.expandable_nodes();
        self.expand_recursively(&roots)
    }

    /// Drop saved state for a node the host removed from the graph.
    pub fn forget(&mut self, node: NodeId) {
        let Some(entry) = self.registry.take_entry(node) else {
            return;
        };
        debug!("Forgetting collapsed state of removed node {}", node);
        for synthesized in entry.synthesized {
            self.retire_synthesized(synthesized);
        }
        for hidden in entry.saved_nodes {
            self.forget(hidden.id);
        }
    }

    // ------------------------------------------------------------------
    // Transition internals
    // ------------------------------------------------------------------

    fn notify(&self, event: Event) {
        let empty = match &event {
            Event::NodesCollapsed { ids } | Event::NodesExpanded { ids } => ids.is_empty(),
            _ => false,
        };
        if empty {
            return;
        }
        if let Some(bus) = &self.events {
            bus.publish(event);
        }
    }

    fn after_expand(&mut self, affected: &[NodeId], options: &ExpandCollapseOptions) {
        if affected.is_empty() {
            return;
        }
        if let Some(layout) = &options.layout_by {
            let mut revealed = Vec::new();
            let mut seen = HashSet::new();
            for &node in affected {
                for id in std::iter::once(node).chain(self.graph.descendants(node)) {
                    if seen.insert(id) {
                        revealed.push(id);
                    }
                }
            }
            self.graph.run_layout(layout, &revealed);
        }
        self.notify(Event::NodesExpanded {
            ids: affected.to_vec(),
        });
    }

    /// Collapse without notifications. Deepest nodes go first so that a descendant's
    /// synthesized edges exist before an ancestor partitions its boundary.
    fn collapse_nodes(&mut self, nodes: &[NodeId]) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        let mut targets: Vec<(usize, NodeId)> = nodes
            .iter()
            .copied()
            .filter(|id| seen.insert(*id) && self.is_collapsible(*id))
            .map(|id| (self.graph.depth(id), id))
            .collect();
        targets.sort_by(|a, b| b.0.cmp(&a.0));

        let mut affected = Vec::new();
        for (_, node) in targets {
            if self.is_collapsible(node) {
                self.collapse_node(node);
                affected.push(node);
            }
        }
        affected
    }

    /// Expand without notifications. A requested node hidden inside another requested
    /// node is handled once its ancestor has revealed it.
    fn expand_nodes(&mut self, nodes: &[NodeId]) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        let mut pending: Vec<NodeId> = nodes
            .iter()
            .copied()
            .filter(|id| seen.insert(*id) && self.is_expandable(*id))
            .collect();

        let mut affected = Vec::new();
        loop {
            let (mut ready, rest): (Vec<NodeId>, Vec<NodeId>) = pending
                .into_iter()
                .partition(|id| self.graph.contains_node(*id));
            if ready.is_empty() {
                if !rest.is_empty() {
                    debug!("Skipping {} hidden nodes in expand", rest.len());
                }
                break;
            }
            ready.sort_by_key(|id| self.graph.depth(*id));
            for node in ready {
                if self.is_expandable(node) && self.graph.contains_node(node) {
                    self.expand_node(node);
                    affected.push(node);
                }
            }
            pending = rest;
        }
        affected
    }

    fn collapse_node(&mut self, node: NodeId) {
        let subtree = self.graph.descendants(node);
        let inside: HashSet<NodeId> = subtree.iter().copied().chain([node]).collect();

        let touching: BTreeSet<EdgeId> = subtree
            .iter()
            .flat_map(|id| self.graph.connected_edges(*id))
            .collect();

        let mut saved_edges = Vec::new();
        // (external endpoint, represented edges, original points away from the subtree)
        let mut boundary: Vec<(NodeId, Vec<EdgeId>, bool)> = Vec::new();
        for edge_id in touching {
            let Some(edge) = self.graph.remove_edge(edge_id) else {
                continue;
            };
            let source_in = inside.contains(&edge.source);
            let target_in = inside.contains(&edge.target);
            if !(source_in && target_in) {
                let external = if source_in { edge.target } else { edge.source };
                match boundary.iter_mut().find(|(ext, _, _)| *ext == external) {
                    Some((_, represents, _)) => represents.push(edge.id),
                    None => boundary.push((external, vec![edge.id], source_in)),
                }
            }
            saved_edges.push(edge);
        }

        let saved_children = self.graph.children(node);
        let saved_nodes: Vec<_> = subtree
            .iter()
            .filter_map(|id| self.graph.node(*id).cloned())
            .collect();
        for id in subtree.iter().rev() {
            self.graph.remove_node(*id);
        }
        let collapsed_at = self
            .graph
            .node(node)
            .map(|n| n.position)
            .unwrap_or_default();

        debug!(
            "Collapsing node {}: {} hidden nodes, {} saved edges, {} boundary groups",
            node,
            saved_nodes.len(),
            saved_edges.len(),
            boundary.len()
        );

        self.registry.insert_entry(
            node,
            CollapsedEntry {
                saved_children,
                saved_nodes,
                saved_edges,
                synthesized: Vec::new(),
                collapsed_at,
            },
        );

        for (external, represents, outward) in boundary {
            let id = self.graph.allocate_edge_id();
            let edge = if outward {
                Edge::new(id, node, external)
            } else {
                Edge::new(id, external, node)
            };
            self.registry.register_synthesized(
                id,
                SynthesizedEdge {
                    owner: node,
                    external,
                    represents,
                },
            );
            self.graph.add_edge(edge);
        }
    }

    fn expand_node(&mut self, node: NodeId) {
        let Some(entry) = self.registry.take_entry(node) else {
            return;
        };
        let offset = self
            .graph
            .node(node)
            .map(|n| n.position - entry.collapsed_at)
            .unwrap_or_default();

        debug!(
            "Expanding node {}: restoring {} nodes, {} edges",
            node,
            entry.saved_nodes.len(),
            entry.saved_edges.len()
        );

        for mut hidden in entry.saved_nodes {
            hidden.position = hidden.position + offset;
            self.graph.add_node(hidden);
        }
        for synthesized in entry.synthesized {
            self.retire_synthesized(synthesized);
        }
        for edge in entry.saved_edges {
            self.place_edge(edge);
        }
    }

    /// Delete a synthesized edge wherever it currently lives.
    ///
    /// If a later collapse absorbed it, it is pulled out of that collapse's saved edges and
    /// out of the synthesized edge that represented it, which is retired in turn once it
    /// represents nothing.
    fn retire_synthesized(&mut self, edge: EdgeId) {
        if self.registry.unregister_synthesized(edge).is_none() {
            return;
        }
        if self.graph.remove_edge(edge).is_some() {
            return;
        }
        if self.registry.unstash_edge(edge).is_some()
            && let Some(empty) = self.registry.drop_represented(edge)
        {
            self.retire_synthesized(empty);
        }
    }

    /// Visible stand-in for `node`: itself, or the nearest visible collapsed node hiding it.
    fn representative(&self, node: NodeId) -> Option<NodeId> {
        let mut current = node;
        let mut visited = HashSet::new();
        while visited.insert(current) {
            if self.graph.contains_node(current) {
                return Some(current);
            }
            current = self.registry.hidden_in(current)?;
        }
        None
    }

    /// Put a restored edge back where it belongs given the current collapse states.
    fn place_edge(&mut self, edge: Edge) {
        let (Some(source), Some(target)) = (
            self.representative(edge.source),
            self.representative(edge.target),
        ) else {
            warn!(
                "Dropping edge {} ({} -> {}): endpoint no longer in graph",
                edge.id, edge.source, edge.target
            );
            if self.registry.is_synthesized(edge.id) {
                self.registry.unregister_synthesized(edge.id);
            }
            return;
        };

        if source == edge.source && target == edge.target {
            self.graph.add_edge(edge);
        } else if source == target {
            self.registry.stash_edge(source, edge);
        } else if source != edge.source {
            let external = edge.target;
            self.absorb(edge, source, external, true);
        } else {
            let external = edge.source;
            self.absorb(edge, target, external, false);
        }
    }

    /// Hand a boundary-crossing edge to the collapsed node `holder` and connect it to the
    /// holder's synthesized edge towards `external`, creating one if needed.
    fn absorb(&mut self, edge: Edge, holder: NodeId, external: NodeId, outward: bool) {
        let edge_id = edge.id;
        if !self.registry.stash_edge(holder, edge) {
            return;
        }
        if let Some(existing) = self.registry.synthesized_towards(holder, external) {
            self.registry.add_represented(existing, edge_id);
            return;
        }

        let id = self.graph.allocate_edge_id();
        let synthesized = if outward {
            Edge::new(id, holder, external)
        } else {
            Edge::new(id, external, holder)
        };
        self.registry.register_synthesized(
            id,
            SynthesizedEdge {
                owner: holder,
                external,
                represents: vec![edge_id],
            },
        );
        self.place_edge(synthesized);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::CompoundGraph;
    use foldgraph_core::{Node, Vec2};

    const P: NodeId = NodeId(1);
    const A: NodeId = NodeId(2);
    const B: NodeId = NodeId(3);
    const X: NodeId = NodeId(4);

    /// P{A, B}, X outside, edge A -> X and an internal edge A -> B.
    fn scenario() -> FoldEngine<CompoundGraph> {
        let mut graph = CompoundGraph::new();
        graph.add_node(Node::new(P, "P"));
        graph.add_node(Node::new(A, "A").with_parent(P));
        graph.add_node(Node::new(B, "B").with_parent(P));
        graph.add_node(Node::new(X, "X"));
        let mut edge = Edge::new(EdgeId(1), A, X);
        edge.data
            .insert("weight".to_string(), serde_json::json!(3));
        graph.add_edge(edge);
        graph.add_edge(Edge::new(EdgeId(2), A, B));
        FoldEngine::new(graph, ExpandCollapseOptions::default())
    }

    #[test]
    fn test_predicates() {
        let engine = scenario();
        assert!(engine.is_collapsible(P));
        assert!(!engine.is_expandable(P));
        assert!(!engine.is_collapsible(A));
        assert!(!engine.is_expandable(A));
        assert!(engine.has_handle(P));
        assert!(!engine.has_handle(X));
        assert_eq!(engine.collapsible_nodes(), vec![P]);
        assert!(engine.expandable_nodes().is_empty());
    }

    #[test]
    fn test_collapse_scenario() {
        let mut engine = scenario();
        let affected = engine.collapse(&[P]);
        assert_eq!(affected, vec![P]);
        assert_eq!(engine.collapse_state(P), CollapseState::Collapsed);
        assert!(!engine.graph().contains_node(A));
        assert!(!engine.graph().contains_node(B));
        assert!(!engine.graph().contains_edge(EdgeId(1)));
        assert!(!engine.graph().contains_edge(EdgeId(2)));

        let between = engine.graph().edges_between(P, X);
        assert_eq!(between.len(), 1);
        let synthesized = between[0];
        assert_eq!((synthesized.source, synthesized.target), (P, X));
        let info = engine.registry().synthesized(synthesized.id).unwrap();
        assert_eq!(info.owner, P);
        assert_eq!(info.represents, vec![EdgeId(1)]);

        let entry = engine.registry().entry(P).unwrap();
        assert_eq!(entry.saved_children, vec![A, B]);
        assert_eq!(entry.saved_edges.len(), 2);

        assert!(engine.is_expandable(P));
        assert!(!engine.is_collapsible(P));
        assert!(engine.has_handle(P));
    }

    #[test]
    fn test_expand_restores_scenario() {
        let mut engine = scenario();
        let before = engine.graph().snapshot();
        engine.collapse(&[P]);
        let affected = engine.expand(&[P]);

        assert_eq!(affected, vec![P]);
        assert_eq!(engine.collapse_state(P), CollapseState::Expanded);
        assert_eq!(engine.graph().snapshot(), before);
        assert_eq!(engine.registry().synthesized_count(), 0);
        assert!(engine.registry().entry(P).is_none());
        let restored = engine.graph().edge(EdgeId(1)).unwrap();
        assert_eq!(restored.data.get("weight"), Some(&serde_json::json!(3)));
    }

    #[test]
    fn test_noop_transitions() {
        let mut engine = scenario();
        let before = engine.graph().snapshot();
        assert!(engine.collapse(&[A]).is_empty());
        assert!(engine.collapse(&[NodeId(99)]).is_empty());
        assert!(engine.expand(&[P]).is_empty());
        assert!(engine.expand(&[]).is_empty());
        assert_eq!(engine.graph().snapshot(), before);
    }

    #[test]
    fn test_many_boundary_edges_share_one_synthesized_edge() {
        let mut engine = scenario();
        engine.graph_mut().add_edge(Edge::new(EdgeId(3), X, B));
        engine.graph_mut().add_edge(Edge::new(EdgeId(4), B, X));
        engine.collapse(&[P]);

        let between = engine.graph().edges_between(P, X);
        assert_eq!(between.len(), 1);
        let info = engine.registry().synthesized(between[0].id).unwrap();
        assert_eq!(info.represents.len(), 3);
        // First represented edge (A -> X) points outward.
        assert_eq!(between[0].source, P);
    }

    #[test]
    fn test_edge_to_collapsing_node_is_internal() {
        let mut engine = scenario();
        engine.graph_mut().add_edge(Edge::new(EdgeId(3), P, A));
        engine.collapse(&[P]);
        assert!(engine.graph().edges_between(P, P).is_empty());
        assert_eq!(engine.graph().edge_count(), 1);
        engine.expand(&[P]);
        assert!(engine.graph().contains_edge(EdgeId(3)));
    }

    #[test]
    fn test_incoming_boundary_edge_direction() {
        let mut graph = CompoundGraph::new();
        graph.add_node(Node::new(P, "P"));
        graph.add_node(Node::new(A, "A").with_parent(P));
        graph.add_node(Node::new(X, "X"));
        graph.add_edge(Edge::new(EdgeId(1), X, A));
        let mut engine = FoldEngine::new(graph, ExpandCollapseOptions::default());
        engine.collapse(&[P]);
        let between = engine.graph().edges_between(P, X);
        assert_eq!((between[0].source, between[0].target), (X, P));
    }

    #[test]
    fn test_expand_translates_moved_subtree() {
        let mut engine = scenario();
        engine
            .graph_mut()
            .node_mut(A)
            .unwrap()
            .position = Vec2::new(5.0, 5.0);
        engine.collapse(&[P]);
        engine.graph_mut().node_mut(P).unwrap().position = Vec2::new(100.0, 50.0);
        engine.expand(&[P]);
        assert_eq!(
            engine.graph().node(A).unwrap().position,
            Vec2::new(105.0, 55.0)
        );
    }

    #[test]
    fn test_events_published() {
        let bus = EventBus::new();
        let mut engine = scenario().with_event_bus(bus.clone());
        engine.collapse(&[A]);
        assert!(bus.drain().is_empty());

        engine.collapse(&[P]);
        engine.expand(&[P]);
        assert_eq!(
            bus.drain(),
            vec![
                Event::NodesCollapsed { ids: vec![P] },
                Event::NodesExpanded { ids: vec![P] }
            ]
        );
    }

    #[test]
    fn test_forget_removed_collapsed_node() {
        let mut engine = scenario();
        engine.collapse(&[P]);
        engine.graph_mut().remove_node(P);
        engine.forget(P);
        assert!(engine.registry().entry(P).is_none());
        assert_eq!(engine.registry().synthesized_count(), 0);
        assert_eq!(engine.registry().hidden_in(A), None);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::graph::CompoundGraph;
    use foldgraph_core::Node;
    use proptest::prelude::*;

    /// Random forest of up to 12 nodes; node `i` may only parent on a lower index.
    fn graph_strategy() -> impl Strategy<Value = CompoundGraph> {
        (2usize..12)
            .prop_flat_map(|n| {
                let parents = (0..n)
                    .map(|i| {
                        if i == 0 {
                            Just(None).boxed()
                        } else {
                            proptest::option::of(0..i).boxed()
                        }
                    })
                    .collect::<Vec<_>>();
                let edges = proptest::collection::vec((0..n, 0..n), 0..16);
                (parents, edges)
            })
            .prop_map(|(parents, edges)| {
                let mut graph = CompoundGraph::new();
                for (i, parent) in parents.iter().enumerate() {
                    let mut node = Node::new(NodeId(i as i64), format!("n{}", i));
                    if let Some(parent) = parent {
                        node = node.with_parent(NodeId(*parent as i64));
                    }
                    graph.add_node(node);
                }
                for (i, (source, target)) in edges.into_iter().enumerate() {
                    graph.add_edge(Edge::new(
                        EdgeId(i as i64 + 1),
                        NodeId(source as i64),
                        NodeId(target as i64),
                    ));
                }
                graph
            })
    }

    #[derive(Debug, Clone)]
    enum Step {
        Collapse(i64),
        Expand(i64),
        CollapseRecursively(i64),
        ExpandRecursively(i64),
    }

    fn step_strategy() -> impl Strategy<Value = Step> {
        prop_oneof![
            (0i64..12).prop_map(Step::Collapse),
            (0i64..12).prop_map(Step::Expand),
            (0i64..12).prop_map(Step::CollapseRecursively),
            (0i64..12).prop_map(Step::ExpandRecursively),
        ]
    }

    fn assert_consistent(engine: &FoldEngine<CompoundGraph>) -> Result<(), TestCaseError> {
        let graph = engine.graph();
        for edge in graph.edges() {
            prop_assert!(graph.contains_node(edge.source), "edge {} has hidden source", edge.id);
            prop_assert!(graph.contains_node(edge.target), "edge {} has hidden target", edge.id);
        }
        for id in graph.node_ids() {
            if engine.has_handle(id) {
                prop_assert!(engine.is_collapsible(id) ^ engine.is_expandable(id));
            } else {
                prop_assert!(!engine.is_collapsible(id) && !engine.is_expandable(id));
            }
        }
        Ok(())
    }

    proptest! {
        /// Collapsing everything and expanding it again yields the original graph.
        #[test]
        fn prop_collapse_all_expand_all_round_trip(graph in graph_strategy()) {
            let before = graph.snapshot();
            let mut engine = FoldEngine::new(graph, ExpandCollapseOptions::default());

            engine.collapse_all();
            assert_consistent(&engine)?;
            prop_assert!(engine.collapsible_nodes().is_empty());

            engine.expand_all();
            prop_assert_eq!(engine.graph().snapshot(), before);
            prop_assert_eq!(engine.registry().synthesized_count(), 0);
        }

        /// Any interleaving of transitions keeps the visible graph well formed, and
        /// expanding everything afterwards restores every original node and edge.
        #[test]
        fn prop_interleaved_transitions_stay_consistent(
            graph in graph_strategy(),
            steps in proptest::collection::vec(step_strategy(), 1..12),
        ) {
            let before = graph.snapshot();
            let mut engine = FoldEngine::new(graph, ExpandCollapseOptions::default());

            for step in steps {
                match step {
                    Step::Collapse(id) => engine.collapse(&[NodeId(id)]),
                    Step::Expand(id) => engine.expand(&[NodeId(id)]),
                    Step::CollapseRecursively(id) => engine.collapse_recursively(&[NodeId(id)]),
                    Step::ExpandRecursively(id) => engine.expand_recursively(&[NodeId(id)]),
                };
                assert_consistent(&engine)?;
            }

            engine.expand_all();
            prop_assert_eq!(engine.graph().snapshot(), before);
            prop_assert_eq!(engine.registry().synthesized_count(), 0);
        }

        /// Collapsing a leaf or expanding an expanded node changes nothing.
        #[test]
        fn prop_invalid_selections_are_noops(graph in graph_strategy(), id in 0i64..12) {
            let before = graph.snapshot();
            let mut engine = FoldEngine::new(graph, ExpandCollapseOptions::default());
            let node = NodeId(id);

            if !engine.is_collapsible(node) {
                prop_assert!(engine.collapse(&[node]).is_empty());
            }
            prop_assert!(engine.expand(&[node]).is_empty());
            prop_assert_eq!(engine.graph().snapshot(), before);
        }
    }
}
