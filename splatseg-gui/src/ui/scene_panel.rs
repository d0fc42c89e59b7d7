//! Scene panel (right sidebar) rendering.

use eframe::egui::{self, Align, Layout, Margin};
use rfd::FileDialog;

use super::theme::{
    accent, color_swatch, form_label, primary_button, section_header, stat_label, stat_value,
    ThemeColors,
};
use crate::app::SplatsegApp;

/// Deferred action from the segmentation list, applied after rendering.
enum SegmentationAction {
    Toggle { label: String, active: bool },
    HideUnselected,
    SelectVisible,
    Reset,
    Retry,
}

impl SplatsegApp {
    /// Render the right scene panel.
    pub(crate) fn render_scene_panel(&mut self, ctx: &egui::Context) {
        let colors = ThemeColors::from_ctx(ctx);

        egui::SidePanel::right("scene_panel")
            .default_width(280.0)
            .resizable(true)
            .frame(
                egui::Frame::none()
                    .fill(colors.bg_panel)
                    .inner_margin(Margin::same(12.0)),
            )
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        self.render_scene_header(ui);
                        self.render_splat_list(ui, colors);
                        ui.add_space(12.0);

                        self.render_transform(ui);
                        ui.add_space(20.0);

                        let action = self.render_segmentation(ui, colors);
                        if let Some(action) = action {
                            self.apply_segmentation_action(action);
                        }

                        ui.add_space(12.0);
                        self.render_panel_status(ui, colors);
                    });
            });
    }

    fn render_scene_header(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(section_header("Scene Manager"));
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                let can_load = !self.status.is_loading;
                if ui
                    .add_enabled(can_load, egui::Button::new("+"))
                    .on_hover_text("New Scene")
                    .clicked()
                {
                    self.new_scene();
                }
                if ui
                    .add_enabled(can_load, egui::Button::new("⤓"))
                    .on_hover_text("Import Scene")
                    .clicked()
                {
                    if let Some(path) = FileDialog::new()
                        .add_filter("Splat scene", &["json"])
                        .pick_file()
                    {
                        self.import_scene(path);
                    }
                }
            });
        });
        ui.separator();
    }

    fn render_splat_list(&self, ui: &mut egui::Ui, colors: ThemeColors) {
        let total = self.engine().map_or(0, |e| e.point_count());

        egui::Frame::none()
            .fill(colors.bg_header)
            .rounding(4.0)
            .inner_margin(Margin::symmetric(8.0, 6.0))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new(&self.scene_name)
                            .size(12.0)
                            .color(colors.text_primary),
                    );
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(stat_value(&format!("{total} splats")));
                    });
                });
            });
    }

    fn render_transform(&mut self, ui: &mut egui::Ui) {
        ui.label(section_header("Transform"));
        ui.separator();

        egui::Grid::new("transform_grid")
            .num_columns(2)
            .spacing([8.0, 6.0])
            .show(ui, |ui| {
                ui.label(form_label("Position"));
                ui.horizontal(|ui| {
                    for (axis, value) in ["x ", "y ", "z "]
                        .into_iter()
                        .zip(self.transform.position.iter_mut())
                    {
                        ui.add(egui::DragValue::new(value).speed(0.01).prefix(axis));
                    }
                });
                ui.end_row();

                ui.label(form_label("Rotation"));
                ui.add(
                    egui::DragValue::new(&mut self.transform.rotation_y)
                        .speed(1.0)
                        .range(-180.0..=180.0)
                        .suffix("°"),
                );
                ui.end_row();

                ui.label(form_label("Scale"));
                ui.add(
                    egui::DragValue::new(&mut self.transform.scale)
                        .speed(0.01)
                        .range(0.05..=20.0),
                );
                ui.end_row();

                ui.label(form_label("Splat size"));
                ui.add(egui::Slider::new(&mut self.ui_state.point_size, 0.5..=8.0));
                ui.end_row();
            });

        ui.horizontal(|ui| {
            ui.checkbox(&mut self.ui_state.highlight_selection, "Outline selection");
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                if ui
                    .add_enabled(!self.transform.is_identity(), egui::Button::new("Reset"))
                    .on_hover_text("Reset transform")
                    .clicked()
                {
                    self.transform.reset();
                }
            });
        });
    }

    /// Renders the segmentation toggles; returns the action the user took.
    fn render_segmentation(
        &mut self,
        ui: &mut egui::Ui,
        colors: ThemeColors,
    ) -> Option<SegmentationAction> {
        let mut action = None;

        ui.horizontal(|ui| {
            ui.label(section_header("Segmentation"));
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                let arrow = if self.ui_state.show_segmentation {
                    "▼"
                } else {
                    "▶"
                };
                if ui.small_button(arrow).clicked() {
                    self.ui_state.show_segmentation = !self.ui_state.show_segmentation;
                }
            });
        });
        ui.separator();

        if !self.ui_state.show_segmentation {
            return None;
        }

        for (index, entry) in self.controller.palette().iter().enumerate() {
            let mut active = self.controller.state().contains_index(index);
            ui.horizontal(|ui| {
                let changed = ui.checkbox(&mut active, "").changed();
                color_swatch(ui, entry.color).on_hover_text(entry.color.to_string());
                ui.label(egui::RichText::new(&entry.label).color(colors.text_primary));
                if changed {
                    action = Some(SegmentationAction::Toggle {
                        label: entry.label.clone(),
                        active,
                    });
                }
            });
        }

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if ui
                .button("Hide Unselected")
                .on_hover_text("Hide every splat outside the current selection")
                .clicked()
            {
                action = Some(SegmentationAction::HideUnselected);
            }
            if ui
                .button("Select Visible")
                .on_hover_text("Restrict the selection to visible splats")
                .clicked()
            {
                action = Some(SegmentationAction::SelectVisible);
            }
        });

        let has_active = !self.controller.state().is_empty();
        if ui
            .add_enabled(
                has_active,
                primary_button("Reset").min_size(egui::vec2(ui.available_width(), 0.0)),
            )
            .on_hover_text("Clear every segmentation toggle")
            .clicked()
        {
            action = Some(SegmentationAction::Reset);
        }

        if self.status.last_error.is_some() && ui.button("Retry").clicked() {
            action = Some(SegmentationAction::Retry);
        }

        action
    }

    fn apply_segmentation_action(&mut self, action: SegmentationAction) {
        match action {
            SegmentationAction::Toggle { label, active } => {
                self.toggle_segmentation(&label, active);
            }
            SegmentationAction::HideUnselected => self.hide_unselected(),
            SegmentationAction::SelectVisible => self.select_visible_only(),
            SegmentationAction::Reset => self.reset_segmentation(),
            SegmentationAction::Retry => self.retry_recompute(),
        }
    }

    fn render_panel_status(&self, ui: &mut egui::Ui, colors: ThemeColors) {
        let (visible, total) = self
            .engine()
            .map_or((0, 0), |e| (e.visible_count(), e.point_count()));

        egui::Grid::new("status_grid")
            .num_columns(2)
            .spacing([12.0, 4.0])
            .show(ui, |ui| {
                ui.label(stat_label("Visible"));
                ui.label(stat_value(&format!("{visible} / {total}")));
                ui.end_row();

                let active = self.controller.active_labels();
                ui.label(stat_label("Active"));
                ui.label(stat_value(&if active.is_empty() {
                    "none".to_string()
                } else {
                    active.join(", ")
                }));
                ui.end_row();
            });

        ui.add_space(6.0);
        if self.status.is_busy() {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(egui::RichText::new(&self.status.status_text).color(colors.text_muted));
            });
        } else {
            ui.label(egui::RichText::new(&self.status.status_text).color(colors.text_muted));
        }
        if let Some(error) = &self.status.last_error {
            ui.label(egui::RichText::new(error).color(accent::RED));
        }
    }
}
