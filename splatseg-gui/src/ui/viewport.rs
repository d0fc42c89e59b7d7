//! Central panel with an orthographic preview of the visible splats.

use eframe::egui::{self, Color32, Pos2, Sense, Stroke};

use super::theme::{accent, preview, swatch_color};
use crate::app::SplatsegApp;

/// Degrees of rotation per dragged point.
const DRAG_ROTATION: f32 = 0.5;

impl SplatsegApp {
    /// Render the central preview panel.
    pub(crate) fn render_viewport(&mut self, ctx: &egui::Context) {
        let overlay_text = swatch_color(preview::OVERLAY_TEXT);

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(swatch_color(preview::BACKGROUND)))
            .show(ctx, |ui| {
                let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::drag());
                if response.dragged() {
                    let rotation =
                        self.transform.rotation_y + response.drag_delta().x * DRAG_ROTATION;
                    self.transform.rotation_y = (rotation + 180.0).rem_euclid(360.0) - 180.0;
                }

                let Some(engine) = self.engine() else {
                    return;
                };
                let Some(scene) = engine.scene().filter(|s| !s.is_empty()) else {
                    painter.text(
                        response.rect.center(),
                        egui::Align2::CENTER_CENTER,
                        "No scene loaded",
                        egui::FontId::monospace(12.0),
                        overlay_text,
                    );
                    return;
                };
                let Some(bounds) = scene.bounds() else {
                    return;
                };

                let center = bounds.center();
                let extent = bounds.extent().max(f32::EPSILON);
                let rect = response.rect;
                let pixels_per_unit = 0.8 * rect.width().min(rect.height()) / extent;

                let mut visible: Vec<([f32; 3], Color32, bool)> = scene
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| engine.is_visible(*i))
                    .map(|(i, p)| {
                        let local = [
                            p.position[0] - center[0],
                            p.position[1] - center[1],
                            p.position[2] - center[2],
                        ];
                        (
                            self.transform.apply(local),
                            swatch_color(p.color),
                            engine.is_selected(i),
                        )
                    })
                    .collect();
                // Far splats first.
                visible.sort_by(|a, b| a.0[2].total_cmp(&b.0[2]));

                let radius = self.ui_state.point_size;
                let outline = Stroke::new(1.0, accent::BLUE);
                for (position, color, selected) in visible {
                    let screen = Pos2::new(
                        rect.center().x + position[0] * pixels_per_unit,
                        rect.center().y - position[1] * pixels_per_unit,
                    );
                    if !rect.contains(screen) {
                        continue;
                    }
                    painter.circle_filled(screen, radius, color);
                    if self.ui_state.highlight_selection && selected {
                        painter.circle_stroke(screen, radius + 1.0, outline);
                    }
                }

                painter.text(
                    rect.left_bottom() + egui::vec2(12.0, -12.0),
                    egui::Align2::LEFT_BOTTOM,
                    format!(
                        "{} / {} visible",
                        engine.visible_count(),
                        engine.point_count()
                    ),
                    egui::FontId::monospace(11.0),
                    overlay_text,
                );
            });
    }
}
