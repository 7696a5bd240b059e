//! Central canvas UI: the globe and its pointer interaction.

use eframe::egui::{self, Color32, Pos2, Rect, RichText, Sense};
use glam::DVec2;

use globe_workbench::config::GlobeConfig;
use globe_workbench::geo::Surface;
use globe_workbench::globe::{GeometryState, Globe};

use super::globe_painter::GlobePainter;
use crate::state::{AppState, SurfaceState};

const BACKGROUND: Color32 = Color32::from_rgb(20, 20, 35);

/// Render the globe canvas, creating the globe on the first usable frame.
pub fn render_canvas(
    ctx: &egui::Context,
    state: &mut AppState,
    globe: &mut Option<Globe>,
    config: &GlobeConfig,
) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let available_size = ui.available_size();
        let (response, painter) = ui.allocate_painter(available_size, Sense::click_and_drag());
        let rect = response.rect;

        painter.rect_filled(rect, 0.0, BACKGROUND);

        let Some(globe) = ensure_globe(globe, state, config, rect) else {
            if let SurfaceState::Failed(reason) = &state.view.surface {
                let text = format!("Globe unavailable: {}", reason);
                draw_overlay_message(ui, &rect, &text, Color32::from_rgb(220, 120, 120));
            }
            return;
        };

        globe.resize(rect.width() as f64, rect.height() as f64);
        handle_canvas_interaction(&response, &rect, globe);
        globe.tick();

        update_hover(&response, &rect, globe, state);
        state.view.rotation = globe.rotation();

        GlobePainter::new(&painter, rect.min, state.view.hovered_country).paint(globe.frame());

        if globe.geometry().is_loading() {
            draw_overlay_message(
                ui,
                &rect,
                "Loading country data...",
                Color32::from_rgb(200, 200, 220),
            );
        }

        if let Some(label) = state.view.hovered_label.clone() {
            if !globe.is_dragging() {
                response.on_hover_text_at_pointer(label);
            }
        }
    });
}

/// Returns the globe, creating it when the canvas first has a size.
///
/// A failed initialisation is logged once and not retried.
fn ensure_globe<'a>(
    globe: &'a mut Option<Globe>,
    state: &mut AppState,
    config: &GlobeConfig,
    rect: Rect,
) -> Option<&'a mut Globe> {
    if globe.is_none() && state.view.surface == SurfaceState::Pending {
        match Globe::new(config, rect.width() as f64, rect.height() as f64) {
            Ok(created) => {
                *globe = Some(created);
                state.view.surface = SurfaceState::Ready;
            }
            Err(e) => {
                log::error!("Globe not initialised: {}", e);
                state.status_message = format!("Globe not initialised: {}", e);
                state.view.surface = SurfaceState::Failed(e.to_string());
            }
        }
    }
    globe.as_mut()
}

/// Maps drag start/move/stop to the globe's gesture entry points.
fn handle_canvas_interaction(response: &egui::Response, rect: &Rect, globe: &mut Globe) {
    if response.drag_started() {
        let press_origin = response.ctx.input(|i| i.pointer.press_origin());
        if let Some(origin) = gesture_origin(press_origin, response.interact_pointer_pos(), rect) {
            globe.gesture_start(origin);
        }
    }

    if response.dragged() {
        if let Some(pos) = response.interact_pointer_pos() {
            if globe.gesture_move(to_canvas(pos, rect), web_time::Instant::now()) {
                response.ctx.request_repaint();
            }
        }
    }

    if response.drag_stopped() {
        globe.gesture_end();
    }
}

fn update_hover(response: &egui::Response, rect: &Rect, globe: &Globe, state: &mut AppState) {
    let hovered = response
        .hover_pos()
        .and_then(|pos| globe.feature_at(to_canvas(pos, rect)));

    let label = match (hovered, globe.geometry()) {
        (Some(index), GeometryState::Ready(source)) => source
            .countries
            .get(index)
            .and_then(|c| c.label())
            .map(str::to_string),
        _ => None,
    };
    state.view.set_hover(hovered, label);
}

/// Where the gesture began. egui reports a drag only once the pointer has
/// moved past its drag threshold, so the press position is preferred.
fn gesture_origin(
    press_origin: Option<Pos2>,
    interact: Option<Pos2>,
    rect: &Rect,
) -> Option<DVec2> {
    press_origin.or(interact).map(|pos| to_canvas(pos, rect))
}

fn to_canvas(pos: Pos2, rect: &Rect) -> DVec2 {
    DVec2::new((pos.x - rect.min.x) as f64, (pos.y - rect.min.y) as f64)
}

fn draw_overlay_message(ui: &mut egui::Ui, rect: &Rect, text: &str, color: Color32) {
    let overlay_rect = Rect::from_min_size(
        rect.left_top() + egui::Vec2::new(10.0, 10.0),
        egui::Vec2::new(240.0, 24.0),
    );
    ui.scope_builder(egui::UiBuilder::new().max_rect(overlay_rect), |ui| {
        ui.label(RichText::new(text).monospace().size(12.0).color(color));
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_canvas_is_relative_to_rect() {
        let rect = Rect::from_min_size(Pos2::new(0.0, 36.0), egui::Vec2::new(800.0, 600.0));
        assert_eq!(to_canvas(Pos2::new(400.0, 336.0), &rect), DVec2::new(400.0, 300.0));
    }

    #[test]
    fn test_gesture_origin_prefers_press_position() {
        let rect = Rect::from_min_size(Pos2::new(0.0, 36.0), egui::Vec2::new(800.0, 600.0));
        let press = Some(Pos2::new(100.0, 136.0));
        let threshold = Some(Pos2::new(106.0, 136.0));

        assert_eq!(gesture_origin(press, threshold, &rect), Some(DVec2::new(100.0, 100.0)));
        assert_eq!(gesture_origin(None, threshold, &rect), Some(DVec2::new(106.0, 100.0)));
        assert_eq!(gesture_origin(None, None, &rect), None);
    }

    #[test]
    fn test_drag_measured_from_press() {
        let rect = Rect::from_min_size(Pos2::ZERO, egui::Vec2::new(800.0, 600.0));
        let mut globe = Globe::new(&GlobeConfig::default(), 800.0, 600.0).unwrap();

        let origin = gesture_origin(
            Some(Pos2::new(100.0, 100.0)),
            Some(Pos2::new(106.0, 100.0)),
            &rect,
        )
        .unwrap();
        globe.gesture_start(origin);
        assert!(globe.gesture_move(DVec2::new(140.0, 100.0), web_time::Instant::now()));
        assert_eq!(globe.rotation().longitude, 20.0);
        assert_eq!(globe.rotation().latitude, 0.0);
    }

    #[test]
    fn test_zero_sized_canvas_fails_once() {
        let mut state = AppState::new();
        let mut globe = None;
        let config = GlobeConfig::default();
        let empty = Rect::from_min_size(Pos2::ZERO, egui::Vec2::ZERO);

        assert!(ensure_globe(&mut globe, &mut state, &config, empty).is_none());
        assert!(matches!(state.view.surface, SurfaceState::Failed(_)));

        // No retry, even once the canvas has a size.
        let sized = Rect::from_min_size(Pos2::ZERO, egui::Vec2::new(800.0, 600.0));
        assert!(ensure_globe(&mut globe, &mut state, &config, sized).is_none());
    }

    #[test]
    fn test_globe_created_once() {
        let mut state = AppState::new();
        let mut globe = None;
        let config = GlobeConfig::default();
        let rect = Rect::from_min_size(Pos2::ZERO, egui::Vec2::new(800.0, 600.0));

        assert!(ensure_globe(&mut globe, &mut state, &config, rect).is_some());
        assert_eq!(state.view.surface, SurfaceState::Ready);
        assert!(ensure_globe(&mut globe, &mut state, &config, rect).is_some());
    }
}
