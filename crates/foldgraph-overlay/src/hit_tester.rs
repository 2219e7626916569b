use crate::geometry::{HIT_MARGIN, HandleGeometry};
use foldgraph_core::{NodeId, Rect, Vec2};
use std::collections::HashMap;

/// Last-drawn screen position of a node's handle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleBounds {
    /// Top-left corner of the handle square.
    pub origin: Vec2,
    pub size: f32,
}

impl HandleBounds {
    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.origin, Vec2::new(self.size, self.size))
    }

    /// Inclusive on the edges of the tolerance band.
    pub fn hit(&self, point: Vec2) -> bool {
        self.rect().expand(self.size * HIT_MARGIN).contains(point)
    }
}

impl From<&HandleGeometry> for HandleBounds {
    fn from(geometry: &HandleGeometry) -> Self {
        Self {
            origin: geometry.origin(),
            size: geometry.size,
        }
    }
}

/// Hit tester for expand/collapse handles.
///
/// Only handles drawn since the last [`HandleHitTester::clear`] can be hit, so taps always
/// match what is on screen.
#[derive(Debug, Clone, Default)]
pub struct HandleHitTester {
    handles: HashMap<NodeId, HandleBounds>,
}

impl HandleHitTester {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.handles.clear();
    }

    pub fn record(&mut self, node: NodeId, bounds: HandleBounds) {
        self.handles.insert(node, bounds);
    }

    pub fn forget(&mut self, node: NodeId) {
        self.handles.remove(&node);
    }

    pub fn bounds(&self, node: NodeId) -> Option<HandleBounds> {
        self.handles.get(&node).copied()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Whether `point` falls on the handle last drawn for `node`.
    pub fn hit_node(&self, node: NodeId, point: Vec2) -> bool {
        self.handles
            .get(&node)
            .is_some_and(|bounds| bounds.hit(point))
    }

    /// Handle under `point`. When tolerance bands overlap, the handle whose center is nearest
    /// wins; ties go to the lower node id.
    pub fn hit_test(&self, point: Vec2) -> Option<NodeId> {
        self.handles
            .iter()
            .filter(|(_, bounds)| bounds.hit(point))
            .map(|(id, bounds)| {
                let center = bounds.rect().center();
                let dx = center.x - point.x;
                let dy = center.y - point.y;
                (dx * dx + dy * dy, *id)
            })
            .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
            .map(|(_, id)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(x: f32, y: f32, size: f32) -> HandleBounds {
        HandleBounds {
            origin: Vec2::new(x, y),
            size,
        }
    }

    #[test]
    fn test_tolerance_band() {
        let handle = bounds(100.0, 100.0, 12.0);
        assert!(handle.hit(Vec2::new(106.0, 106.0)));
        assert!(handle.hit(Vec2::new(94.0, 94.0)));
        assert!(handle.hit(Vec2::new(118.0, 118.0)));
        assert!(!handle.hit(Vec2::new(93.9, 100.0)));
        assert!(!handle.hit(Vec2::new(100.0, 118.1)));
    }

    #[test]
    fn test_hit_test_prefers_nearest() {
        let mut tester = HandleHitTester::new();
        tester.record(NodeId(1), bounds(0.0, 0.0, 12.0));
        tester.record(NodeId(2), bounds(14.0, 0.0, 12.0));

        assert_eq!(tester.hit_test(Vec2::new(2.0, 6.0)), Some(NodeId(1)));
        assert_eq!(tester.hit_test(Vec2::new(24.0, 6.0)), Some(NodeId(2)));
        assert_eq!(tester.hit_test(Vec2::new(13.0, 6.0)), Some(NodeId(1)));
        assert_eq!(tester.hit_test(Vec2::new(100.0, 100.0)), None);
        assert!(tester.hit_node(NodeId(2), Vec2::new(9.0, 6.0)));
    }

    #[test]
    fn test_clear_forgets_handles() {
        let mut tester = HandleHitTester::new();
        tester.record(NodeId(1), bounds(0.0, 0.0, 12.0));
        tester.forget(NodeId(1));
        assert!(tester.is_empty());

        tester.record(NodeId(2), bounds(0.0, 0.0, 12.0));
        tester.clear();
        assert_eq!(tester.hit_test(Vec2::new(6.0, 6.0)), None);
        assert!(!tester.hit_node(NodeId(2), Vec2::new(6.0, 6.0)));
    }
}
