//! Typed operation surface: one entry point per graph instance.

use crate::engine::FoldEngine;
use crate::history::{CommandHistory, TransitionCommand, TransitionKind};
use crate::host::GraphHost;
use crate::options::{ExpandCollapseOptions, OptionKey};
use foldgraph_core::{FoldError, NodeId};
use foldgraph_events::EventBus;
use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Collapse(Vec<NodeId>),
    Expand(Vec<NodeId>),
    CollapseRecursively(Vec<NodeId>),
    ExpandRecursively(Vec<NodeId>),
    CollapseAll,
    ExpandAll,
    GetOption(OptionKey),
    SetOption(OptionKey, Value),
}

impl Operation {
    /// Build a transition from its name. Accepts both `collapseAll` and `collapse-all`.
    pub fn from_name(name: &str, nodes: Vec<NodeId>) -> Result<Self, FoldError> {
        let normalized: String = name
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "collapse" => Ok(Self::Collapse(nodes)),
            "expand" => Ok(Self::Expand(nodes)),
            "collapserecursively" => Ok(Self::CollapseRecursively(nodes)),
            "expandrecursively" => Ok(Self::ExpandRecursively(nodes)),
            "collapseall" => Ok(Self::CollapseAll),
            "expandall" => Ok(Self::ExpandAll),
            _ => Err(FoldError::UnknownOperation(name.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self.transition() {
            Some((kind, _)) => kind.name(),
            None => match self {
                Self::GetOption(_) => "option",
                _ => "setOption",
            },
        }
    }

    fn transition(&self) -> Option<(TransitionKind, &[NodeId])> {
        let (kind, nodes) = match self {
            Self::Collapse(nodes) => (TransitionKind::Collapse, nodes.as_slice()),
            Self::Expand(nodes) => (TransitionKind::Expand, nodes.as_slice()),
            Self::CollapseRecursively(nodes) => {
                (TransitionKind::CollapseRecursively, nodes.as_slice())
            }
            Self::ExpandRecursively(nodes) => (TransitionKind::ExpandRecursively, nodes.as_slice()),
            Self::CollapseAll => (TransitionKind::CollapseAll, &[][..]),
            Self::ExpandAll => (TransitionKind::ExpandAll, &[][..]),
            Self::GetOption(_) | Self::SetOption(..) => return None,
        };
        Some((kind, nodes))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OperationOutput {
    /// Nodes whose state changed.
    Affected(Vec<NodeId>),
    OptionValue(Value),
    Unit,
}

impl OperationOutput {
    pub fn affected(&self) -> &[NodeId] {
        match self {
            Self::Affected(nodes) => nodes,
            _ => &[],
        }
    }
}

/// Expand/collapse engine plus its undo history.
///
/// Top-level calls are recorded as one history entry each while `undoable` is set.
#[derive(Debug)]
pub struct ExpandCollapse<G: GraphHost> {
    engine: FoldEngine<G>,
    history: CommandHistory<G>,
}

impl<G: GraphHost> ExpandCollapse<G> {
    pub fn new(graph: G, options: ExpandCollapseOptions) -> Self {
        Self {
            engine: FoldEngine::new(graph, options),
            history: CommandHistory::default(),
        }
    }

    /// Publish lifecycle and history events on `events`.
    pub fn with_event_bus(self, events: EventBus) -> Self {
        Self {
            engine: self.engine.with_event_bus(events.clone()),
            history: self.history.with_event_bus(events),
        }
    }

    pub fn with_history(mut self, history: CommandHistory<G>) -> Self {
        self.history = history;
        self
    }

    pub fn engine(&self) -> &FoldEngine<G> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut FoldEngine<G> {
        &mut self.engine
    }

    pub fn graph(&self) -> &G {
        self.engine.graph()
    }

    pub fn graph_mut(&mut self) -> &mut G {
        self.engine.graph_mut()
    }

    pub fn history(&self) -> &CommandHistory<G> {
        &self.history
    }

    pub fn options(&self) -> &ExpandCollapseOptions {
        self.engine.options()
    }

    pub fn is_collapsible(&self, node: NodeId) -> bool {
        self.engine.is_collapsible(node)
    }

    pub fn is_expandable(&self, node: NodeId) -> bool {
        self.engine.is_expandable(node)
    }

    pub fn collapse(&mut self, nodes: &[NodeId]) -> Vec<NodeId> {
        self.transition(TransitionKind::Collapse, nodes, None)
    }

    pub fn expand(&mut self, nodes: &[NodeId]) -> Vec<NodeId> {
        self.transition(TransitionKind::Expand, nodes, None)
    }

    pub fn collapse_recursively(&mut self, nodes: &[NodeId]) -> Vec<NodeId> {
        self.transition(TransitionKind::CollapseRecursively, nodes, None)
    }

    pub fn expand_recursively(&mut self, nodes: &[NodeId]) -> Vec<NodeId> {
        self.transition(TransitionKind::ExpandRecursively, nodes, None)
    }

    pub fn collapse_all(&mut self) -> Vec<NodeId> {
        self.transition(TransitionKind::CollapseAll, &[], None)
    }

    pub fn expand_all(&mut self) -> Vec<NodeId> {
        self.transition(TransitionKind::ExpandAll, &[], None)
    }

    // Variants taking per-call option overrides (e.g. a one-off `layoutBy`). Recognized keys
    // are merged over the current options for this call only; undo and redo reuse the result.

    pub fn collapse_with(
        &mut self,
        nodes: &[NodeId],
        overrides: &Map<String, Value>,
    ) -> Result<Vec<NodeId>, FoldError> {
        self.transition_with(TransitionKind::Collapse, nodes, overrides)
    }

    pub fn expand_with(
        &mut self,
        nodes: &[NodeId],
        overrides: &Map<String, Value>,
    ) -> Result<Vec<NodeId>, FoldError> {
        self.transition_with(TransitionKind::Expand, nodes, overrides)
    }

    pub fn collapse_recursively_with(
        &mut self,
        nodes: &[NodeId],
        overrides: &Map<String, Value>,
    ) -> Result<Vec<NodeId>, FoldError> {
        self.transition_with(TransitionKind::CollapseRecursively, nodes, overrides)
    }

    pub fn expand_recursively_with(
        &mut self,
        nodes: &[NodeId],
        overrides: &Map<String, Value>,
    ) -> Result<Vec<NodeId>, FoldError> {
        self.transition_with(TransitionKind::ExpandRecursively, nodes, overrides)
    }

    pub fn collapse_all_with(
        &mut self,
        overrides: &Map<String, Value>,
    ) -> Result<Vec<NodeId>, FoldError> {
        self.transition_with(TransitionKind::CollapseAll, &[], overrides)
    }

    pub fn expand_all_with(
        &mut self,
        overrides: &Map<String, Value>,
    ) -> Result<Vec<NodeId>, FoldError> {
        self.transition_with(TransitionKind::ExpandAll, &[], overrides)
    }

    pub fn undo(&mut self) -> Result<(), FoldError> {
        self.history.undo(&mut self.engine)
    }

    pub fn redo(&mut self) -> Result<(), FoldError> {
        self.history.redo(&mut self.engine)
    }

    pub fn option(&self, key: OptionKey) -> Value {
        self.engine.options().get(key)
    }

    pub fn set_option(&mut self, key: OptionKey, value: Value) -> Result<(), FoldError> {
        self.engine.options_mut().set(key, value)
    }

    pub fn dispatch(&mut self, operation: Operation) -> Result<OperationOutput, FoldError> {
        self.dispatch_with(operation, &Map::new())
    }

    /// Dispatch with per-call option overrides. Overrides only affect transitions.
    pub fn dispatch_with(
        &mut self,
        operation: Operation,
        overrides: &Map<String, Value>,
    ) -> Result<OperationOutput, FoldError> {
        tracing::debug!("Dispatching operation `{}`", operation);
        if let Some((kind, nodes)) = operation.transition() {
            let affected = if overrides.is_empty() {
                self.transition(kind, nodes, None)
            } else {
                self.transition_with(kind, nodes, overrides)?
            };
            return Ok(OperationOutput::Affected(affected));
        }
        match operation {
            Operation::GetOption(key) => Ok(OperationOutput::OptionValue(self.option(key))),
            Operation::SetOption(key, value) => {
                self.set_option(key, value)?;
                Ok(OperationOutput::Unit)
            }
            _ => Ok(OperationOutput::Unit),
        }
    }

    /// Dispatch a transition given by name, as read from a config file or command line.
    pub fn dispatch_named(
        &mut self,
        name: &str,
        nodes: Vec<NodeId>,
    ) -> Result<OperationOutput, FoldError> {
        let operation = Operation::from_name(name, nodes)?;
        self.dispatch(operation)
    }

    pub fn into_graph(self) -> G {
        self.engine.into_graph()
    }

    fn transition_with(
        &mut self,
        kind: TransitionKind,
        nodes: &[NodeId],
        overrides: &Map<String, Value>,
    ) -> Result<Vec<NodeId>, FoldError> {
        let options = self.engine.options().merged(overrides)?;
        Ok(self.transition(kind, nodes, Some(options)))
    }

    fn transition(
        &mut self,
        kind: TransitionKind,
        nodes: &[NodeId],
        options: Option<ExpandCollapseOptions>,
    ) -> Vec<NodeId> {
        let resolved = kind.resolve(&self.engine, nodes);
        let undoable = options
            .as_ref()
            .unwrap_or_else(|| self.engine.options())
            .undoable;
        if !undoable {
            let options = options.unwrap_or_else(|| self.engine.options().clone());
            return kind.apply(&mut self.engine, &resolved, &options);
        }
        let cmd = match options {
            Some(options) => TransitionCommand::new(kind, resolved).with_options(options),
            None => TransitionCommand::new(kind, resolved),
        };
        match self.history.execute(Box::new(cmd), &mut self.engine) {
            Ok(affected) => affected,
            Err(err) => {
                tracing::warn!("{} failed: {}", kind.name(), err);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::CompoundGraph;
    use foldgraph_core::{Edge, EdgeId, Node};
    use serde_json::json;

    fn facade() -> ExpandCollapse<CompoundGraph> {
        let mut graph = CompoundGraph::new();
        graph.add_node(Node::new(NodeId(1), "P"));
        graph.add_node(Node::new(NodeId(2), "A").with_parent(NodeId(1)));
        graph.add_node(Node::new(NodeId(3), "A1").with_parent(NodeId(2)));
        graph.add_node(Node::new(NodeId(4), "X"));
        graph.add_edge(Edge::new(EdgeId(1), NodeId(3), NodeId(4)));
        ExpandCollapse::new(graph, ExpandCollapseOptions::default())
    }

    #[test]
    fn test_operation_names() {
        assert_eq!(
            Operation::from_name("collapse-all", vec![]),
            Ok(Operation::CollapseAll)
        );
        assert_eq!(
            Operation::from_name("expandRecursively", vec![NodeId(1)]),
            Ok(Operation::ExpandRecursively(vec![NodeId(1)]))
        );
        assert_eq!(
            Operation::from_name("explode", vec![]),
            Err(FoldError::UnknownOperation("explode".to_string()))
        );
        assert_eq!(Operation::CollapseAll.to_string(), "collapseAll");
    }

    #[test]
    fn test_dispatch_transitions_and_undo() {
        let mut api = facade();
        let before = api.graph().snapshot();

        let output = api.dispatch(Operation::CollapseAll).unwrap();
        assert_eq!(output.affected(), &[NodeId(2), NodeId(1)]);
        assert_eq!(api.graph().node_count(), 2);

        api.undo().unwrap();
        assert_eq!(api.graph().snapshot(), before);
        api.redo().unwrap();
        assert!(api.is_expandable(NodeId(1)));
        assert!(!api.is_collapsible(NodeId(1)));
    }

    #[test]
    fn test_dispatch_options() {
        let mut api = facade();
        let output = api
            .dispatch(Operation::SetOption(OptionKey::Undoable, json!(false)))
            .unwrap();
        assert_eq!(output, OperationOutput::Unit);
        assert_eq!(
            api.dispatch(Operation::GetOption(OptionKey::Undoable)).unwrap(),
            OperationOutput::OptionValue(json!(false))
        );

        api.collapse(&[NodeId(1)]);
        assert!(!api.history().can_undo());
        assert_eq!(api.undo(), Err(FoldError::NothingToUndo));
    }

    #[test]
    fn test_dispatch_with_overrides_only_that_call() {
        let mut api = facade();
        let overrides = json!({"undoable": false}).as_object().cloned().unwrap();

        let output = api.dispatch_with(Operation::CollapseAll, &overrides).unwrap();
        assert_eq!(output.affected(), &[NodeId(2), NodeId(1)]);
        assert!(!api.history().can_undo());
        assert_eq!(api.option(OptionKey::Undoable), json!(true));

        api.expand_all();
        assert!(api.history().can_undo());
    }

    #[test]
    fn test_dispatch_named_unknown() {
        let mut api = facade();
        let err = api.dispatch_named("fold", vec![NodeId(1)]).unwrap_err();
        assert_eq!(err, FoldError::UnknownOperation("fold".to_string()));
        assert_eq!(api.graph().node_count(), 4);
    }

    #[test]
    fn test_invalid_option_value_is_reported() {
        let mut api = facade();
        let err = api
            .dispatch(Operation::SetOption(OptionKey::HoverDelay, json!("soon")))
            .unwrap_err();
        assert!(matches!(err, FoldError::InvalidOptionValue { .. }));
        assert_eq!(api.option(OptionKey::HoverDelay), json!(150));
    }
}
