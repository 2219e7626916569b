//! Screen-space placement of expand/collapse handles.

use foldgraph_core::{Node, Vec2};
use foldgraph_graph::{BoxPosition, ExpandCollapseOptions, Viewport};

/// Stroke width of the plus/minus bars at zoom 1.
pub const BAR_WIDTH: f32 = 2.6;

/// Tap tolerance around a handle, as a fraction of its size.
pub const HIT_MARGIN: f32 = 0.5;

/// A handle as drawn on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleGeometry {
    pub center: Vec2,
    /// Diameter of the circle.
    pub size: f32,
    /// Length of each bar.
    pub line_size: f32,
    pub line_width: f32,
}

impl HandleGeometry {
    pub fn for_node(node: &Node, options: &ExpandCollapseOptions, viewport: &Viewport) -> Self {
        let zoom = viewport.zoom;
        let size = options.expand_collapse_box_size * zoom;
        let center = match &options.expand_collapse_box_position {
            BoxPosition::TopLeft => {
                // Square starts a quarter of its size outside the node's top-left corner.
                let corner = viewport.model_to_screen(node.bounds().min);
                Vec2::new(corner.x + size / 4.0, corner.y + size / 4.0)
            }
            BoxPosition::Custom(place) => viewport.model_to_screen(place(node)),
        };
        Self {
            center,
            size,
            line_size: options.expand_collapse_line_size * zoom,
            line_width: BAR_WIDTH * zoom,
        }
    }

    /// Top-left corner of the handle's square.
    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.center.x - self.size / 2.0, self.center.y - self.size / 2.0)
    }

    fn inset(&self) -> f32 {
        (self.size - self.line_size) / 2.0
    }

    /// Endpoints of the horizontal (minus) bar.
    pub fn horizontal_bar(&self) -> (Vec2, Vec2) {
        let origin = self.origin();
        let y = origin.y + self.size / 2.0;
        let start = origin.x + self.inset();
        (Vec2::new(start, y), Vec2::new(start + self.line_size, y))
    }

    /// Endpoints of the vertical bar that turns the minus into a plus.
    pub fn vertical_bar(&self) -> (Vec2, Vec2) {
        let origin = self.origin();
        let x = origin.x + self.size / 2.0;
        let start = origin.y + self.inset();
        (Vec2::new(x, start), Vec2::new(x, start + self.line_size))
    }
}
