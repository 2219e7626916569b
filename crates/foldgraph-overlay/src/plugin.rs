//! Event wiring between the host, the expand/collapse engine and the overlay.

use crate::overlay::Overlay;
use crate::surface::Surface;
use foldgraph_core::{NodeId, Vec2};
use foldgraph_events::{Event, EventListener};
use foldgraph_graph::{ExpandCollapse, GraphHost};
use std::time::Instant;

/// Interactive expand/collapse for one graph: reacts to pointer, viewport and graph events,
/// keeps the handles on screen current, and turns handle taps into transitions.
#[derive(Debug)]
pub struct ExpandCollapsePlugin<G: GraphHost, S: Surface> {
    api: ExpandCollapse<G>,
    overlay: Overlay<S>,
}

impl<G: GraphHost, S: Surface> ExpandCollapsePlugin<G, S> {
    pub fn new(api: ExpandCollapse<G>, surface: S) -> Self {
        let viewport = api.graph().viewport();
        let mut plugin = Self {
            api,
            overlay: Overlay::new(surface, &viewport),
        };
        plugin.redraw();
        plugin
    }

    pub fn api(&self) -> &ExpandCollapse<G> {
        &self.api
    }

    pub fn api_mut(&mut self) -> &mut ExpandCollapse<G> {
        &mut self.api
    }

    pub fn overlay(&self) -> &Overlay<S> {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut Overlay<S> {
        &mut self.overlay
    }

    pub fn redraw(&mut self) {
        self.overlay.redraw(self.api.engine());
    }

    /// Advance timers: debounced resizes and delayed hover handles.
    pub fn poll(&mut self) {
        self.poll_at(Instant::now());
    }

    pub fn poll_at(&mut self, now: Instant) {
        let resized = self.overlay.poll_resize(now);
        let hovered = self.overlay.poll_hover(now);
        if resized || hovered {
            self.redraw();
        }
    }

    pub fn handle_event_at(&mut self, event: &Event, now: Instant) {
        match event {
            Event::Tap { node, x, y } => {
                if let Some(target) = self.tap(*node, Vec2::new(*x, *y)) {
                    tracing::debug!("Handle tapped on node {}", target);
                }
                return;
            }
            Event::NodeHoverEnter { id } => {
                if !self.api.options().enabled {
                    return;
                }
                let delay = self.api.options().hover_delay;
                self.overlay.hover_enter(*id, delay, now);
            }
            Event::NodeHoverLeave { id } => self.overlay.hover_leave(*id),
            Event::NodeRemoved { id } => {
                self.api.engine_mut().forget(*id);
                self.overlay.forget(*id);
            }
            Event::WindowResized { width, height } => {
                self.overlay.schedule_resize(*width, *height, now);
            }
            Event::Undo => {
                if let Err(err) = self.api.undo() {
                    tracing::debug!("Undo ignored: {}", err);
                }
                self.redraw();
                return;
            }
            Event::Redo => {
                if let Err(err) = self.api.redo() {
                    tracing::debug!("Redo ignored: {}", err);
                }
                self.redraw();
                return;
            }
            _ => {}
        }
        if event.requires_redraw() {
            self.redraw();
        }
    }

    /// Toggle the node whose handle is under `point`. Returns the toggled node.
    fn tap(&mut self, node: Option<NodeId>, point: Vec2) -> Option<NodeId> {
        if !self.api.options().enabled {
            return None;
        }
        let target = self.overlay.handle_at(node, point)?;
        let affected = if self.api.is_collapsible(target) {
            self.api.collapse(&[target])
        } else {
            self.api.expand(&[target])
        };
        self.redraw();
        (!affected.is_empty()).then_some(target)
    }
}

impl<G: GraphHost, S: Surface> EventListener for ExpandCollapsePlugin<G, S> {
    fn handle_event(&mut self, event: &Event) {
        self.handle_event_at(event, Instant::now());
    }
}
