//! Drawing surface the overlay paints handles onto.

use foldgraph_core::{Color, Vec2};

/// Minimal 2D canvas contract. Coordinates are screen pixels.
pub trait Surface {
    fn resize(&mut self, width: f32, height: f32);

    /// Erase everything drawn since the last clear.
    fn clear(&mut self);

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Circle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    Line {
        from: Vec2,
        to: Vec2,
        width: f32,
        color: Color,
    },
}

/// Surface that records draw calls instead of rasterizing them.
/// Used headless and in tests.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    width: f32,
    height: f32,
    commands: Vec<DrawCommand>,
    clears: usize,
}

impl DrawList {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of clears so far.
    pub fn clear_count(&self) -> usize {
        self.clears
    }

    pub fn line_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|cmd| matches!(cmd, DrawCommand::Line { .. }))
            .count()
    }
}

impl Surface for DrawList {
    fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.clears += 1;
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            width,
            color,
        });
    }
}

#[cfg(feature = "egui")]
pub use egui_surface::EguiSurface;

#[cfg(feature = "egui")]
mod egui_surface {
    use super::Surface;
    use foldgraph_core::{Color, Vec2};

    fn pos(v: Vec2) -> egui::Pos2 {
        egui::pos2(v.x, v.y)
    }

    fn color32(color: Color) -> egui::Color32 {
        egui::Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
    }

    /// Paints handles with an egui painter, offset by the canvas origin.
    ///
    /// egui redraws every frame, so `clear` only drops the shapes queued since the last
    /// clear and `resize` only changes the clip rectangle.
    pub struct EguiSurface<'a> {
        painter: &'a egui::Painter,
        origin: egui::Vec2,
        clip: egui::Rect,
        shapes: Vec<egui::Shape>,
    }

    impl<'a> EguiSurface<'a> {
        pub fn new(painter: &'a egui::Painter) -> Self {
            let clip = painter.clip_rect();
            Self {
                painter,
                origin: clip.min.to_vec2(),
                clip,
                shapes: Vec::new(),
            }
        }

        /// Hand the queued shapes to the painter.
        pub fn finish(self) {
            self.painter.with_clip_rect(self.clip).extend(self.shapes);
        }
    }

    impl Surface for EguiSurface<'_> {
        fn resize(&mut self, width: f32, height: f32) {
            self.clip = egui::Rect::from_min_size(
                egui::pos2(self.origin.x, self.origin.y),
                egui::vec2(width, height),
            );
        }

        fn clear(&mut self) {
            self.shapes.clear();
        }

        fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
            self.shapes.push(egui::Shape::circle_filled(
                pos(center) + self.origin,
                radius,
                color32(color),
            ));
        }

        fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
            self.shapes.push(egui::Shape::line_segment(
                [pos(from) + self.origin, pos(to) + self.origin],
                egui::Stroke::new(width, color32(color)),
            ));
        }
    }
}
