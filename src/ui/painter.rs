//! egui painting of a [`RenderFrame`]

use egui::{Color32, CornerRadius, FontId, Pos2, Stroke, StrokeKind, Vec2};

use crate::model::CompletionMode;
use crate::render::{AddHandle, EdgeSegment, GroupSprite, RenderFrame, SceneSprite};

const SCENE_FILL: Color32 = Color32::from_rgb(45, 45, 55);
const SCENE_BORDER: Color32 = Color32::from_rgb(80, 80, 90);
const SELECTED_BORDER: Color32 = Color32::from_rgb(100, 150, 255);
const ACTIVE_BORDER: Color32 = Color32::from_rgb(255, 200, 100);
const PENDING_BORDER: Color32 = Color32::from_rgb(120, 220, 140);
const STAGED_FILL: Color32 = Color32::from_rgb(65, 65, 85);
const EDGE_COLOR: Color32 = Color32::from_rgb(160, 160, 175);
const HANDLE_FILL: Color32 = Color32::from_rgb(249, 115, 22);
const DEFAULT_GROUP_TINT: Color32 = Color32::from_rgb(99, 102, 241);

/// Paints frames onto a canvas whose top-left corner sits at `offset`
pub struct GraphPainter {
    offset: Vec2,
}

impl GraphPainter {
    pub fn new(offset: Vec2) -> Self {
        Self { offset }
    }

    /// Paint back to front: groups, edges, scenes, handles, marquee
    pub fn paint(&self, painter: &egui::Painter, frame: &RenderFrame) {
        for group in &frame.groups {
            self.paint_group(painter, group);
        }
        for edge in &frame.edges {
            self.paint_edge(painter, edge);
        }
        for scene in &frame.scenes {
            self.paint_scene(painter, scene);
        }
        for (_, handle) in &frame.add_handles {
            self.paint_handle(painter, handle);
        }
        if let Some(marquee) = frame.marquee {
            let rect = marquee.translate(self.offset);
            painter.rect_filled(rect, 0.0, SELECTED_BORDER.gamma_multiply(0.15));
            painter.rect_stroke(rect, 0.0, Stroke::new(1.0, SELECTED_BORDER), StrokeKind::Inside);
        }
    }

    fn paint_group(&self, painter: &egui::Painter, group: &GroupSprite) {
        let rect = group.rect.translate(self.offset);
        let tint = group
            .color
            .as_deref()
            .and_then(|hex| Color32::from_hex(hex).ok())
            .unwrap_or(DEFAULT_GROUP_TINT);
        painter.rect_filled(rect, 8.0, tint.gamma_multiply(0.12));

        let border = if group.pending_source {
            PENDING_BORDER
        } else if group.selected || group.active {
            SELECTED_BORDER
        } else {
            tint
        };
        painter.rect_stroke(rect, 8.0, Stroke::new(1.5, border), StrokeKind::Inside);

        let mode = match group.mode {
            CompletionMode::All => "ALL",
            CompletionMode::Any => "ANY",
        };
        painter.text(
            rect.min + Vec2::new(10.0, 12.0),
            egui::Align2::LEFT_CENTER,
            format!("{}  [{mode}]", group.title),
            FontId::proportional(13.0),
            Color32::WHITE,
        );
    }

    fn paint_edge(&self, painter: &egui::Painter, edge: &EdgeSegment) {
        let from = edge.from + self.offset;
        let to = edge.to + self.offset;
        draw_arrow(painter, from, to, EDGE_COLOR);
        if !edge.label.is_empty() {
            painter.text(
                from + (to - from) / 2.0,
                egui::Align2::CENTER_BOTTOM,
                &edge.label,
                FontId::proportional(11.0),
                EDGE_COLOR,
            );
        }
    }

    fn paint_scene(&self, painter: &egui::Painter, scene: &SceneSprite) {
        let rect = scene.rect.translate(self.offset);
        let fill = if scene.staged { STAGED_FILL } else { SCENE_FILL };
        painter.rect_filled(rect, CornerRadius::same(6), fill);

        let (width, border) = if scene.pending_source {
            (2.5, PENDING_BORDER)
        } else if scene.active {
            (2.0, ACTIVE_BORDER)
        } else if scene.selected || scene.staged {
            (2.0, SELECTED_BORDER)
        } else {
            (1.0, SCENE_BORDER)
        };
        painter.rect_stroke(rect, CornerRadius::same(6), Stroke::new(width, border), StrokeKind::Outside);

        painter.text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            &scene.title,
            FontId::proportional(14.0),
            Color32::WHITE,
        );
        if scene.is_ending {
            painter.text(
                rect.right_bottom() - Vec2::new(6.0, 4.0),
                egui::Align2::RIGHT_BOTTOM,
                "END",
                FontId::monospace(10.0),
                ACTIVE_BORDER,
            );
        }
    }

    fn paint_handle(&self, painter: &egui::Painter, handle: &AddHandle) {
        let rect = handle.rect.translate(self.offset);
        painter.circle_filled(rect.center(), rect.width() / 2.0, HANDLE_FILL);
        painter.text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            "+",
            FontId::proportional(14.0),
            Color32::WHITE,
        );
    }
}

/// Draw a straight arrow from start to end
pub fn draw_arrow(painter: &egui::Painter, start: Pos2, end: Pos2, color: Color32) {
    let stroke = Stroke::new(2.0, color);
    painter.line_segment([start, end], stroke);

    let direction = (end - start).normalized();
    if direction == Vec2::ZERO || !direction.x.is_finite() {
        return;
    }
    let arrow_length = 8.0;
    let spread = std::f32::consts::FRAC_PI_6.sin();
    let base = end - direction * arrow_length;
    let perpendicular = Vec2::new(-direction.y, direction.x);
    painter.line_segment([end, base + perpendicular * arrow_length * spread], stroke);
    painter.line_segment([end, base - perpendicular * arrow_length * spread], stroke);
}
