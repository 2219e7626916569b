use foldgraph_core::Vec2;
use serde::{Deserialize, Serialize};

/// Pan/zoom state of the rendered graph.
///
/// Screen coordinates are `model * zoom + pan`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub zoom: f32,
    pub pan: Vec2,
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::ZERO,
            width: 800.0,
            height: 600.0,
        }
    }
}

impl Viewport {
    pub const MIN_ZOOM: f32 = 0.05;
    pub const MAX_ZOOM: f32 = 20.0;

    pub fn model_to_screen(&self, point: Vec2) -> Vec2 {
        point * self.zoom + self.pan
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(Self::MIN_ZOOM, Self::MAX_ZOOM);
    }
}
