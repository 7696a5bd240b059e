//! Top bar UI: app title, view readout, status and export.

use crate::state::AppState;
use eframe::egui::{self, Color32, RichText};

pub fn render_top_bar(ctx: &egui::Context, state: &mut AppState) {
    egui::TopBottomPanel::top("top_bar")
        .exact_height(36.0)
        .show(ctx, |ui| {
            ui.horizontal_centered(|ui| {
                ui.label(
                    RichText::new("Globe Workbench")
                        .strong()
                        .size(16.0)
                        .color(Color32::WHITE),
                );

                ui.separator();

                ui.label(
                    RichText::new(state.view.centre_label())
                        .monospace()
                        .size(12.0)
                        .color(Color32::from_rgb(200, 200, 220)),
                );

                if let Some(label) = &state.view.hovered_label {
                    ui.separator();
                    ui.label(RichText::new(label).size(13.0).color(Color32::WHITE));
                }

                ui.separator();

                ui.label(
                    RichText::new(&state.status_message)
                        .size(13.0)
                        .color(Color32::GRAY),
                );

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let hint = format!("Write the current view to {}", state.export_path.display());
                    if ui.button("Export SVG").on_hover_text(hint).clicked() {
                        state.export_requested = true;
                    }
                });
            });
        });
}
