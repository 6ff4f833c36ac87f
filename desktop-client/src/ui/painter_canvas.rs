use common::render::{Canvas, Rgba};
use eframe::egui::{self, Color32, Pos2, Rect, Stroke};

fn to_color(color: Rgba) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

/// Maps canvas pixel coordinates onto a region of an egui painter.
pub struct PainterCanvas<'a> {
    painter: &'a egui::Painter,
    rect: Rect,
}

impl<'a> PainterCanvas<'a> {
    pub fn new(painter: &'a egui::Painter, rect: Rect) -> Self {
        Self { painter, rect }
    }

    fn point(&self, x: f32, y: f32) -> Pos2 {
        self.rect.min + egui::vec2(x, y)
    }
}

impl Canvas for PainterCanvas<'_> {
    fn clear(&mut self, color: Rgba) {
        self.painter.rect_filled(self.rect, 0.0, to_color(color));
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgba) {
        let rect = Rect::from_min_size(self.point(x, y), egui::vec2(width, height));
        self.painter.rect_filled(rect, 0.0, to_color(color));
    }

    fn fill_circle(&mut self, center_x: f32, center_y: f32, radius: f32, color: Rgba) {
        self.painter
            .circle_filled(self.point(center_x, center_y), radius, to_color(color));
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgba) {
        self.painter.line_segment(
            [self.point(from.0, from.1), self.point(to.0, to.1)],
            Stroke::new(width, to_color(color)),
        );
    }
}
