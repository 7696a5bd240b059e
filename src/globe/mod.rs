//! The interactive globe.
//!
//! [`Globe`] is the single globe instance a host drives: it forwards pointer
//! gestures to the [`DragController`], drains the [`PendingRedraw`] slot once
//! per display refresh in [`Globe::tick`], and keeps the last rendered
//! [`Frame`] for output surfaces.

mod drag;
mod redraw;

pub use drag::{
    DragController, DragPhase, DragSession, DragSettings, DEFAULT_MAX_TILT, DEFAULT_SENSITIVITY,
    DEFAULT_THROTTLE_MS,
};
pub use redraw::PendingRedraw;

use std::sync::Arc;

use glam::DVec2;
use web_time::Instant;

use crate::config::GlobeConfig;
use crate::error::{GlobeError, Result};
use crate::geo::{Frame, GeometrySource, OrthographicProjection, Renderer, Rotation};

/// Where the country data is in its one-shot load.
#[derive(Debug, Clone, Default)]
pub enum GeometryState {
    #[default]
    Loading,
    Ready(Arc<GeometrySource>),
    /// The load failed; the globe keeps drawing the bare sphere.
    Failed(String),
}

impl GeometryState {
    pub fn source(&self) -> Option<&GeometrySource> {
        match self {
            GeometryState::Ready(source) => Some(source),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, GeometryState::Loading)
    }
}

pub struct Globe {
    projection: OrthographicProjection,
    drag: DragController,
    pending: PendingRedraw,
    renderer: Renderer,
    geometry: GeometryState,
    frame: Frame,
    width: f64,
    height: f64,
}

impl Globe {
    /// Creates the globe for a surface of the given size and renders the
    /// initial frame (sphere only, since geometry is still loading).
    pub fn new(config: &GlobeConfig, width: f64, height: f64) -> Result<Self> {
        check_size(width, height)?;

        let mut projection = OrthographicProjection::new(config.scale, config.clip_angle);
        projection.fit_viewport(width, height);
        let renderer = Renderer::new(config);
        let frame = renderer.redraw(&projection, None, width, height);

        log::info!(
            "Globe initialised at {}x{} (scale {}, clip {} deg)",
            width,
            height,
            config.scale,
            config.clip_angle
        );

        Ok(Self {
            projection,
            drag: DragController::new(config.drag),
            pending: PendingRedraw::new(),
            renderer,
            geometry: GeometryState::Loading,
            frame,
            width,
            height,
        })
    }

    pub fn gesture_start(&mut self, pointer: DVec2) {
        self.drag.gesture_start(pointer, self.projection.rotation);
    }

    /// Returns whether the move changed the rotation.
    pub fn gesture_move(&mut self, pointer: DVec2, now: Instant) -> bool {
        self.drag.gesture_move(
            pointer,
            now,
            &mut self.projection.rotation,
            &mut self.pending,
        )
    }

    pub fn gesture_end(&mut self) {
        self.drag.gesture_end();
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Display-refresh hook: rebuilds the frame if a redraw is pending.
    ///
    /// Returns whether the frame changed.
    pub fn tick(&mut self) -> bool {
        if !self.pending.take() {
            return false;
        }
        self.frame = self.renderer.redraw(
            &self.projection,
            self.geometry.source(),
            self.width,
            self.height,
        );
        true
    }

    /// Re-centres the projection on a new surface size.
    ///
    /// An unchanged or unusable size is ignored.
    pub fn resize(&mut self, width: f64, height: f64) {
        if width == self.width && height == self.height {
            return;
        }
        if let Err(e) = check_size(width, height) {
            log::debug!("Ignoring resize: {}", e);
            return;
        }
        self.width = width;
        self.height = height;
        self.projection.fit_viewport(width, height);
        self.pending.request();
    }

    /// Installs the result of the geometry load.
    pub fn set_geometry(&mut self, result: Result<GeometrySource>) {
        match result {
            Ok(source) => {
                self.geometry = GeometryState::Ready(Arc::new(source));
                self.pending.request();
            }
            Err(e) => {
                log::error!("Failed to load country data: {}", e);
                self.geometry = GeometryState::Failed(e.to_string());
            }
        }
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn rotation(&self) -> Rotation {
        self.projection.rotation
    }

    pub fn projection(&self) -> &OrthographicProjection {
        &self.projection
    }

    pub fn geometry(&self) -> &GeometryState {
        &self.geometry
    }

    pub fn redraw_pending(&self) -> bool {
        self.pending.is_pending()
    }

    /// Country under a surface position, if any.
    pub fn feature_at(&self, point: DVec2) -> Option<usize> {
        let coord = self.projection.invert(point)?;
        self.geometry.source()?.feature_at(coord)
    }
}

fn check_size(width: f64, height: f64) -> Result<()> {
    if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
        Ok(())
    } else {
        Err(GlobeError::Surface(format!(
            "no drawable surface ({}x{})",
            width, height
        )))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::geo::test_data::WORLD;
    use crate::geo::ElementKind;

    fn globe() -> Globe {
        Globe::new(&GlobeConfig::default(), 800.0, 600.0).unwrap()
    }

    fn world() -> GeometrySource {
        GeometrySource::from_topojson(WORLD, "countries").unwrap()
    }

    #[test]
    fn test_zero_size_surface_is_rejected() {
        let result = Globe::new(&GlobeConfig::default(), 0.0, 600.0);
        assert!(matches!(result, Err(GlobeError::Surface(_))));
        assert!(Globe::new(&GlobeConfig::default(), 800.0, f64::NAN).is_err());
    }

    #[test]
    fn test_initial_frame_is_sphere_only() {
        let globe = globe();
        assert!(globe.geometry().is_loading());
        assert!(!globe.frame().data_ready);
        assert_eq!(globe.frame().count(ElementKind::Sphere), 1);
        assert_eq!(globe.frame().elements.len(), 1);
        assert!(!globe.redraw_pending());
    }

    #[test]
    fn test_drag_redraws_once_per_tick() {
        let mut globe = globe();
        let t0 = Instant::now();

        globe.gesture_start(DVec2::new(100.0, 100.0));
        assert!(!globe.tick());

        assert!(globe.gesture_move(DVec2::new(120.0, 100.0), t0));
        assert!(globe.gesture_move(DVec2::new(140.0, 80.0), t0 + Duration::from_millis(15)));
        assert_eq!(globe.rotation(), Rotation::new(20.0, 10.0));

        assert!(globe.tick());
        assert!(!globe.tick());

        globe.gesture_end();
        assert!(!globe.is_dragging());
        assert_eq!(globe.rotation(), Rotation::new(20.0, 10.0));
    }

    #[test]
    fn test_geometry_arrival_triggers_redraw() {
        let mut globe = globe();
        globe.set_geometry(Ok(world()));
        assert!(globe.redraw_pending());
        assert!(globe.tick());

        let frame = globe.frame();
        assert!(frame.data_ready);
        // "Far" is on the back of the globe.
        assert_eq!(frame.count(ElementKind::Country), 2);
        assert_eq!(frame.count(ElementKind::Boundary), 1);
    }

    #[test]
    fn test_failed_geometry_keeps_sphere() {
        let mut globe = globe();
        globe.set_geometry(Err(GlobeError::Fetch("HTTP 404".to_string())));

        assert!(matches!(globe.geometry(), GeometryState::Failed(m) if m.contains("404")));
        assert!(!globe.tick());
        assert_eq!(globe.frame().count(ElementKind::Sphere), 1);
        assert_eq!(globe.frame().count(ElementKind::Country), 0);
    }

    #[test]
    fn test_resize_only_redraws_on_change() {
        let mut globe = globe();
        globe.resize(800.0, 600.0);
        assert!(!globe.redraw_pending());

        globe.resize(1000.0, 500.0);
        assert!(globe.tick());
        assert_eq!(globe.projection().translate, DVec2::new(500.0, 250.0));
        assert_eq!(globe.frame().width, 1000.0);

        globe.resize(0.0, 0.0);
        assert!(!globe.redraw_pending());
        assert_eq!(globe.projection().translate, DVec2::new(500.0, 250.0));
    }

    #[test]
    fn test_feature_at_follows_rotation() {
        let mut globe = globe();
        globe.set_geometry(Ok(world()));
        let centre = DVec2::new(400.0, 300.0);

        // Bring lon 5 (inside "East") to the centre of the view.
        globe.gesture_start(DVec2::ZERO);
        assert!(globe.gesture_move(DVec2::new(-10.0, 0.0), Instant::now()));
        assert_eq!(globe.feature_at(centre), Some(1));

        // Outside the disc.
        assert_eq!(globe.feature_at(DVec2::new(0.0, 0.0)), None);
    }

    #[test]
    fn test_feature_at_without_geometry() {
        let globe = globe();
        assert_eq!(globe.feature_at(DVec2::new(400.0, 300.0)), None);
    }
}
