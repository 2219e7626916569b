//! Command pattern implementation for undo/redo of expand/collapse transitions.

use crate::engine::FoldEngine;
use crate::host::GraphHost;
use crate::options::ExpandCollapseOptions;
use foldgraph_core::{FoldError, NodeId, Vec2};
use foldgraph_events::telemetry::{
    command_failure, command_lifecycle, new_correlation_id, CommandLifecycle,
};
use foldgraph_events::{Event, EventBus};
use std::collections::HashMap;
use std::fmt::Debug;

/// Default number of commands kept on the undo stack.
pub const DEFAULT_HISTORY_SIZE: usize = 100;

/// Trait for commands that can be executed and undone against an engine.
pub trait Command<G: GraphHost>: Debug {
    /// Execute (or re-execute) the command. Returns the nodes that changed state.
    fn execute(&mut self, engine: &mut FoldEngine<G>) -> Result<Vec<NodeId>, FoldError>;

    /// Revert the last execution.
    fn undo(&mut self, engine: &mut FoldEngine<G>) -> Result<(), FoldError>;

    /// Human-readable description
    fn description(&self) -> String;

    /// Id tying together the telemetry of every lifecycle phase of this command.
    fn correlation_id(&self) -> &str;
}

/// The transition a history entry replays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    Collapse,
    Expand,
    CollapseRecursively,
    ExpandRecursively,
    CollapseAll,
    ExpandAll,
}

impl TransitionKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Collapse => "collapse",
            Self::Expand => "expand",
            Self::CollapseRecursively => "collapseRecursively",
            Self::ExpandRecursively => "expandRecursively",
            Self::CollapseAll => "collapseAll",
            Self::ExpandAll => "expandAll",
        }
    }

    pub fn is_collapse(&self) -> bool {
        matches!(
            self,
            Self::Collapse | Self::CollapseRecursively | Self::CollapseAll
        )
    }

    /// Node set the transition operates on, fixed at call time.
    /// The `All` variants resolve to the graph's current collapsible/expandable nodes.
    pub fn resolve<G: GraphHost>(&self, engine: &FoldEngine<G>, requested: &[NodeId]) -> Vec<NodeId> {
        match self {
            Self::CollapseAll => engine.collapsible_nodes(),
            Self::ExpandAll => engine.expandable_nodes(),
            _ => requested.to_vec(),
        }
    }

    /// Run the transition over an already resolved node set.
    pub fn apply<G: GraphHost>(
        &self,
        engine: &mut FoldEngine<G>,
        nodes: &[NodeId],
        options: &ExpandCollapseOptions,
    ) -> Vec<NodeId> {
        match self {
            Self::Collapse => engine.collapse(nodes),
            Self::Expand => engine.expand_with(nodes, options),
            Self::CollapseRecursively | Self::CollapseAll => engine.collapse_recursively(nodes),
            Self::ExpandRecursively | Self::ExpandAll => {
                engine.expand_recursively_with(nodes, options)
            }
        }
    }
}

/// One top-level collapse/expand call recorded for undo.
#[derive(Debug)]
pub struct TransitionCommand {
    kind: TransitionKind,
    nodes: Vec<NodeId>,
    affected: Vec<NodeId>,
    /// Call-specific options; the engine's own options when `None`.
    options: Option<ExpandCollapseOptions>,
    positions: HashMap<NodeId, Vec2>,
    correlation_id: String,
}

impl TransitionCommand {
    pub fn new(kind: TransitionKind, nodes: Vec<NodeId>) -> Self {
        Self {
            kind,
            nodes,
            affected: Vec::new(),
            options: None,
            positions: HashMap::new(),
            correlation_id: new_correlation_id(),
        }
    }

    /// Run with `options` instead of the engine's options, on every execute and undo.
    pub fn with_options(mut self, options: ExpandCollapseOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn kind(&self) -> TransitionKind {
        self.kind
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Nodes changed by the last execution.
    pub fn affected(&self) -> &[NodeId] {
        &self.affected
    }

    fn resolved_options<G: GraphHost>(&self, engine: &FoldEngine<G>) -> ExpandCollapseOptions {
        self.options
            .clone()
            .unwrap_or_else(|| engine.options().clone())
    }

    fn restore_positions<G: GraphHost>(&self, engine: &mut FoldEngine<G>) {
        let graph = engine.graph_mut();
        for (id, position) in &self.positions {
            if let Some(node) = graph.node_mut(*id) {
                node.position = *position;
            }
        }
    }
}

impl<G: GraphHost> Command<G> for TransitionCommand {
    fn execute(&mut self, engine: &mut FoldEngine<G>) -> Result<Vec<NodeId>, FoldError> {
        let graph = engine.graph();
        self.positions = graph
            .node_ids()
            .into_iter()
            .filter_map(|id| graph.node(id).map(|node| (id, node.position)))
            .collect();
        let options = self.resolved_options(engine);
        self.affected = self.kind.apply(engine, &self.nodes, &options);
        Ok(self.affected.clone())
    }

    fn undo(&mut self, engine: &mut FoldEngine<G>) -> Result<(), FoldError> {
        if self.kind.is_collapse() {
            let options = self.resolved_options(engine);
            engine.expand_with(&self.affected, &options);
            self.restore_positions(engine);
        } else {
            self.restore_positions(engine);
            engine.collapse(&self.affected);
        }
        Ok(())
    }

    fn description(&self) -> String {
        match self.affected.len() {
            1 => format!("{} node {}", self.kind.name(), self.affected[0]),
            n => format!("{} {} nodes", self.kind.name(), n),
        }
    }

    fn correlation_id(&self) -> &str {
        &self.correlation_id
    }
}

/// Manages command history for undo/redo
pub struct CommandHistory<G: GraphHost> {
    undo_stack: Vec<Box<dyn Command<G>>>,
    redo_stack: Vec<Box<dyn Command<G>>>,
    max_size: usize,
    event_bus: Option<EventBus>,
}

impl<G: GraphHost> Debug for CommandHistory<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandHistory")
            .field("undo", &self.undo_stack.len())
            .field("redo", &self.redo_stack.len())
            .field("max_size", &self.max_size)
            .finish()
    }
}

impl<G: GraphHost> Default for CommandHistory<G> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_SIZE)
    }
}

impl<G: GraphHost> CommandHistory<G> {
    pub fn new(max_size: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_size,
            event_bus: None,
        }
    }

    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Execute a command and add it to the history.
    /// Commands that change nothing are not recorded.
    pub fn execute(
        &mut self,
        mut cmd: Box<dyn Command<G>>,
        engine: &mut FoldEngine<G>,
    ) -> Result<Vec<NodeId>, FoldError> {
        let affected = match cmd.execute(engine) {
            Ok(affected) => affected,
            Err(err) => {
                command_failure(&cmd.description(), cmd.correlation_id(), err.to_string());
                return Err(err);
            }
        };
        if affected.is_empty() {
            return Ok(affected);
        }
        command_lifecycle(
            &cmd.description(),
            cmd.correlation_id(),
            CommandLifecycle::Execute,
            affected.len(),
        );

        // Clear redo stack on new command
        self.redo_stack.clear();
        self.undo_stack.push(cmd);

        // Enforce max size
        while self.undo_stack.len() > self.max_size {
            self.undo_stack.remove(0);
        }

        self.notify_change();
        Ok(affected)
    }

    /// Undo the last command
    pub fn undo(&mut self, engine: &mut FoldEngine<G>) -> Result<(), FoldError> {
        let Some(mut cmd) = self.undo_stack.pop() else {
            return Err(FoldError::NothingToUndo);
        };
        if let Err(err) = cmd.undo(engine) {
            command_failure(&cmd.description(), cmd.correlation_id(), err.to_string());
            self.notify_change();
            return Err(err);
        }
        command_lifecycle(&cmd.description(), cmd.correlation_id(), CommandLifecycle::Undo, 0);
        self.redo_stack.push(cmd);
        self.notify_change();
        Ok(())
    }

    /// Redo the last undone command
    pub fn redo(&mut self, engine: &mut FoldEngine<G>) -> Result<(), FoldError> {
        let Some(mut cmd) = self.redo_stack.pop() else {
            return Err(FoldError::NothingToRedo);
        };
        match cmd.execute(engine) {
            Ok(affected) => {
                command_lifecycle(
                    &cmd.description(),
                    cmd.correlation_id(),
                    CommandLifecycle::Redo,
                    affected.len(),
                );
                self.undo_stack.push(cmd);
                self.notify_change();
                Ok(())
            }
            Err(err) => {
                command_failure(&cmd.description(), cmd.correlation_id(), err.to_string());
                self.notify_change();
                Err(err)
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_description(&self) -> Option<String> {
        self.undo_stack.last().map(|c| c.description())
    }

    pub fn redo_description(&self) -> Option<String> {
        self.redo_stack.last().map(|c| c.description())
    }

    pub fn len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.notify_change();
    }

    fn notify_change(&self) {
        let Some(bus) = &self.event_bus else {
            return;
        };
        bus.publish(Event::UndoStackChanged {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            undo_description: self.undo_description(),
            redo_description: self.redo_description(),
        });
    }
}
