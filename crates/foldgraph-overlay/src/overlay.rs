//! Handle rendering and hover/resize bookkeeping.

use crate::debounce::{Debouncer, RESIZE_DEBOUNCE};
use crate::geometry::HandleGeometry;
use crate::hit_tester::{HandleBounds, HandleHitTester};
use crate::surface::Surface;
use foldgraph_core::{Color, Node, NodeId, Vec2};
use foldgraph_graph::{ExpandCollapseOptions, FoldEngine, GraphHost, Viewport};
use std::time::{Duration, Instant};

/// Draws expand/collapse handles onto a [`Surface`] and remembers where they went.
#[derive(Debug)]
pub struct Overlay<S: Surface> {
    surface: S,
    hit_tester: HandleHitTester,
    hovered: Option<NodeId>,
    /// Node being hovered and the instant its handle becomes visible.
    pending_hover: Option<(NodeId, Instant)>,
    resize: Debouncer<(f32, f32)>,
}

impl<S: Surface> Overlay<S> {
    /// Wrap `surface`, sized to the viewport.
    pub fn new(mut surface: S, viewport: &Viewport) -> Self {
        surface.resize(viewport.width, viewport.height);
        Self {
            surface,
            hit_tester: HandleHitTester::new(),
            hovered: None,
            pending_hover: None,
            resize: Debouncer::new(RESIZE_DEBOUNCE),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn hit_tester(&self) -> &HandleHitTester {
        &self.hit_tester
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    pub fn set_resize_debounce(&mut self, duration: Duration) {
        self.resize.set_debounce(duration);
    }

    /// Start hovering `node`. Its handle shows once `hover_delay_ms` has passed.
    pub fn hover_enter(&mut self, node: NodeId, hover_delay_ms: u64, now: Instant) {
        if hover_delay_ms == 0 {
            self.hovered = Some(node);
            self.pending_hover = None;
        } else {
            self.hovered = None;
            self.pending_hover = Some((node, now + Duration::from_millis(hover_delay_ms)));
        }
    }

    pub fn hover_leave(&mut self, node: NodeId) {
        if self.hovered == Some(node) {
            self.hovered = None;
        }
        if self.pending_hover.is_some_and(|(pending, _)| pending == node) {
            self.pending_hover = None;
        }
    }

    /// Promote a pending hover whose delay has elapsed. Returns true if a redraw is needed.
    pub fn poll_hover(&mut self, now: Instant) -> bool {
        match self.pending_hover {
            Some((node, due)) if now >= due => {
                self.pending_hover = None;
                self.hovered = Some(node);
                true
            }
            _ => false,
        }
    }

    pub fn schedule_resize(&mut self, width: f32, height: f32, now: Instant) {
        self.resize.schedule_at((width, height), now);
    }

    /// Apply a debounced resize. Returns true if the surface changed size.
    pub fn poll_resize(&mut self, now: Instant) -> bool {
        match self.resize.poll_at(now) {
            Some((width, height)) => {
                tracing::debug!("Resizing overlay surface to {}x{}", width, height);
                self.surface.resize(width, height);
                true
            }
            None => false,
        }
    }

    /// Forget everything known about a node the host removed.
    pub fn forget(&mut self, node: NodeId) {
        self.hit_tester.forget(node);
        self.hover_leave(node);
    }

    /// Clear the surface and draw a handle for every visible collapsed node, plus the
    /// hovered node when it has one.
    pub fn redraw<G: GraphHost>(&mut self, engine: &FoldEngine<G>) {
        self.surface.clear();
        self.hit_tester.clear();

        let options = engine.options();
        if !options.enabled {
            return;
        }
        let graph = engine.graph();
        let viewport = graph.viewport();

        for id in engine.expandable_nodes() {
            if let Some(node) = graph.node(id) {
                self.draw_handle(node, true, options, &viewport);
            }
        }
        if let Some(id) = self.hovered
            && !engine.is_expandable(id)
            && engine.has_handle(id)
            && let Some(node) = graph.node(id)
        {
            self.draw_handle(node, false, options, &viewport);
        }
        tracing::trace!("Overlay drew {} handles", self.hit_tester.len());
    }

    fn draw_handle(
        &mut self,
        node: &Node,
        collapsed: bool,
        options: &ExpandCollapseOptions,
        viewport: &Viewport,
    ) {
        let handle = HandleGeometry::for_node(node, options, viewport);
        self.surface
            .fill_circle(handle.center, handle.size / 2.0, options.handle_color);

        let (from, to) = handle.horizontal_bar();
        self.surface
            .stroke_line(from, to, handle.line_width, Color::WHITE);
        if collapsed {
            let (from, to) = handle.vertical_bar();
            self.surface
                .stroke_line(from, to, handle.line_width, Color::WHITE);
        }

        self.hit_tester.record(node.id, HandleBounds::from(&handle));
    }

    /// Node whose handle is under `point`. A tap reported on `node` only ever hits that node's
    /// own handle; a tap on the background checks every drawn handle.
    pub fn handle_at(&self, node: Option<NodeId>, point: Vec2) -> Option<NodeId> {
        match node {
            Some(id) => self.hit_tester.hit_node(id, point).then_some(id),
            None => self.hit_tester.hit_test(point),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCommand, DrawList};
    use foldgraph_graph::CompoundGraph;

    fn engine() -> FoldEngine<CompoundGraph> {
        let mut graph = CompoundGraph::new();
        graph.add_node(Node::new(NodeId(1), "P").with_position(Vec2::new(100.0, 100.0)));
        graph.add_node(Node::new(NodeId(2), "A").with_parent(NodeId(1)));
        graph.add_node(Node::new(NodeId(3), "Q").with_position(Vec2::new(300.0, 100.0)));
        graph.add_node(Node::new(NodeId(4), "B").with_parent(NodeId(3)));
        graph.add_node(Node::new(NodeId(5), "leaf"));
        FoldEngine::new(graph, ExpandCollapseOptions::default())
    }

    fn overlay() -> Overlay<DrawList> {
        Overlay::new(DrawList::default(), &Viewport::default())
    }

    #[test]
    fn test_new_sizes_surface_to_viewport() {
        let overlay = overlay();
        assert_eq!(overlay.surface().size(), (800.0, 600.0));
    }

    #[test]
    fn test_redraw_draws_collapsed_nodes_as_plus() {
        let mut engine = engine();
        engine.collapse(&[NodeId(1)]);
        let mut overlay = overlay();

        overlay.redraw(&engine);
        let commands = overlay.surface().commands();
        assert_eq!(commands.len(), 3);
        assert!(matches!(
            commands[0],
            DrawCommand::Circle { radius, color, .. } if radius == 6.0 && color == Color::BLACK
        ));
        assert_eq!(overlay.hit_tester().len(), 1);
        assert!(overlay.hit_tester().bounds(NodeId(1)).is_some());
    }

    #[test]
    fn test_hovered_expanded_node_draws_minus() {
        let engine = engine();
        let mut overlay = overlay();
        let now = Instant::now();

        overlay.hover_enter(NodeId(3), 0, now);
        overlay.redraw(&engine);
        assert_eq!(overlay.surface().line_count(), 1);
        assert!(overlay.hit_tester().bounds(NodeId(3)).is_some());

        // Leaves have no handle even while hovered.
        overlay.hover_enter(NodeId(5), 0, now);
        overlay.redraw(&engine);
        assert!(overlay.surface().commands().is_empty());
    }

    #[test]
    fn test_hover_delay() {
        let engine = engine();
        let mut overlay = overlay();
        let now = Instant::now();

        overlay.hover_enter(NodeId(1), 150, now);
        assert_eq!(overlay.hovered(), None);
        assert!(!overlay.poll_hover(now + Duration::from_millis(100)));
        assert!(overlay.poll_hover(now + Duration::from_millis(150)));
        assert_eq!(overlay.hovered(), Some(NodeId(1)));

        overlay.redraw(&engine);
        assert_eq!(overlay.hit_tester().len(), 1);

        overlay.hover_leave(NodeId(1));
        overlay.redraw(&engine);
        assert!(overlay.hit_tester().is_empty());
    }

    #[test]
    fn test_leave_cancels_pending_hover() {
        let mut overlay = overlay();
        let now = Instant::now();
        overlay.hover_enter(NodeId(1), 150, now);
        overlay.hover_leave(NodeId(1));
        assert!(!overlay.poll_hover(now + Duration::from_secs(1)));
        assert_eq!(overlay.hovered(), None);
    }

    #[test]
    fn test_disabled_draws_nothing() {
        let mut engine = engine();
        engine.collapse(&[NodeId(1)]);
        engine.options_mut().enabled = false;
        let mut overlay = overlay();
        overlay.redraw(&engine);
        assert!(overlay.surface().commands().is_empty());
        assert_eq!(overlay.surface().clear_count(), 1);
        assert_eq!(overlay.handle_at(None, Vec2::new(83.0, 83.0)), None);
    }

    #[test]
    fn test_resize_is_debounced() {
        let mut overlay = overlay();
        let now = Instant::now();
        overlay.schedule_resize(1024.0, 768.0, now);
        overlay.schedule_resize(1280.0, 720.0, now + Duration::from_millis(100));
        assert!(!overlay.poll_resize(now + Duration::from_millis(200)));
        assert_eq!(overlay.surface().size(), (800.0, 600.0));
        assert!(overlay.poll_resize(now + Duration::from_millis(400)));
        assert_eq!(overlay.surface().size(), (1280.0, 720.0));
    }

    #[test]
    fn test_handle_at_only_checks_the_tapped_node() {
        let mut engine = engine();
        engine.collapse(&[NodeId(1), NodeId(3)]);
        let mut overlay = overlay();
        overlay.redraw(&engine);

        // Default 40x40 node at (100, 100): handle centered at (83, 83).
        let on_p = Vec2::new(83.0, 83.0);
        assert_eq!(overlay.handle_at(Some(NodeId(1)), on_p), Some(NodeId(1)));
        assert_eq!(overlay.handle_at(None, on_p), Some(NodeId(1)));
        assert_eq!(overlay.handle_at(Some(NodeId(3)), on_p), None);
        assert_eq!(overlay.handle_at(None, Vec2::new(200.0, 200.0)), None);
    }
}
