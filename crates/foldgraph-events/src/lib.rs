use crossbeam_channel::{unbounded, Receiver, Sender};
use foldgraph_core::NodeId;
use serde::{Deserialize, Serialize};

pub mod telemetry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // ========================================================================
    // Pointer Events (screen coordinates)
    // ========================================================================
    Tap {
        node: Option<NodeId>,
        x: f32,
        y: f32,
    },
    NodeHoverEnter {
        id: NodeId,
    },
    NodeHoverLeave {
        id: NodeId,
    },

    // ========================================================================
    // Graph / Viewport Events
    // ========================================================================
    NodePositionChanged {
        id: NodeId,
    },
    NodeRemoved {
        id: NodeId,
    },
    ViewportChanged {
        zoom: f32,
        pan_x: f32,
        pan_y: f32,
    },
    WindowResized {
        width: f32,
        height: f32,
    },

    // ========================================================================
    // Expand/Collapse Lifecycle
    // ========================================================================
    NodesCollapsed {
        ids: Vec<NodeId>,
    },
    NodesExpanded {
        ids: Vec<NodeId>,
    },

    // ========================================================================
    // Undo/Redo Events
    // ========================================================================
    Undo,
    Redo,
    UndoStackChanged {
        can_undo: bool,
        can_redo: bool,
        undo_description: Option<String>,
        redo_description: Option<String>,
    },
}

impl Event {
    /// Events after which the overlay must clear and redraw its handles.
    pub fn requires_redraw(&self) -> bool {
        matches!(
            self,
            Event::NodeHoverEnter { .. }
                | Event::NodeHoverLeave { .. }
                | Event::NodePositionChanged { .. }
                | Event::NodeRemoved { .. }
                | Event::ViewportChanged { .. }
                | Event::NodesCollapsed { .. }
                | Event::NodesExpanded { .. }
        )
    }
}

#[derive(Clone)]
pub struct EventBus {
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("pending", &self.rx.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> Sender<Event> {
        self.tx.clone()
    }

    pub fn receiver(&self) -> Receiver<Event> {
        self.rx.clone()
    }

    pub fn publish(&self, event: Event) {
        let _ = self.tx.send(event);
    }

    /// Dispatch all pending events to a listener.
    /// Events published by the listener while handling are dispatched in the same call.
    pub fn dispatch_to<L: EventListener>(&self, listener: &mut L) {
        while let Ok(event) = self.rx.try_recv() {
            listener.handle_event(&event);
        }
    }

    /// Drop every pending event, returning them in publish order.
    pub fn drain(&self) -> Vec<Event> {
        self.rx.try_iter().collect()
    }
}

/// Trait for components that respond to events.
/// Implement this to receive events from the EventBus.
pub trait EventListener {
    fn handle_event(&mut self, event: &Event);
}
