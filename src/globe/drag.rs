//! Drag-to-rotate controller.
//!
//! A pointer gesture is a small state machine: `Idle` until the pointer goes
//! down, `Dragging` while it moves, back to `Idle` when it is released.
//! Every accepted move recomputes the rotation from the gesture's anchor
//! (pointer and rotation at gesture start), so only the anchor and the
//! latest pointer position matter.
//!
//! Moves are rate limited: a move arriving less than the throttle interval
//! after the last accepted one is dropped outright. It is neither queued nor
//! applied later.

use std::time::Duration;

use glam::DVec2;
use serde::{Deserialize, Serialize};
use web_time::Instant;

use super::PendingRedraw;
use crate::error::{GlobeError, Result};
use crate::geo::Rotation;

/// Degrees of rotation per pixel of pointer travel.
pub const DEFAULT_SENSITIVITY: f64 = 0.5;

/// Minimum time between two accepted moves, in milliseconds.
pub const DEFAULT_THROTTLE_MS: u64 = 10;

/// Latitude limit in degrees; keeps the globe from flipping over the poles.
pub const DEFAULT_MAX_TILT: f64 = 45.0;

/// Tuning for the drag controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DragSettings {
    pub sensitivity: f64,
    pub throttle_ms: u64,
    pub max_tilt: f64,
}

impl Default for DragSettings {
    fn default() -> Self {
        Self {
            sensitivity: DEFAULT_SENSITIVITY,
            throttle_ms: DEFAULT_THROTTLE_MS,
            max_tilt: DEFAULT_MAX_TILT,
        }
    }
}

impl DragSettings {
    pub fn validate(&self) -> Result<()> {
        if !self.sensitivity.is_finite() {
            return Err(GlobeError::Config(format!(
                "drag.sensitivity must be finite, got {}",
                self.sensitivity
            )));
        }
        if !(0.0..=90.0).contains(&self.max_tilt) {
            return Err(GlobeError::Config(format!(
                "drag.maxTilt must be in [0, 90], got {}",
                self.max_tilt
            )));
        }
        Ok(())
    }

    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }
}

/// Anchor of an active gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub origin_pointer: DVec2,
    pub origin_rotation: Rotation,
}

/// Gesture state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum DragPhase {
    #[default]
    Idle,
    Dragging(DragSession),
}

/// Turns pointer gestures into rotation updates.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    settings: DragSettings,
    phase: DragPhase,
    /// When the last move was accepted. Survives gesture boundaries.
    last_render: Option<Instant>,
}

impl DragController {
    pub fn new(settings: DragSettings) -> Self {
        Self {
            settings,
            phase: DragPhase::Idle,
            last_render: None,
        }
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, DragPhase::Dragging(_))
    }

    /// Pointer down: anchors a new gesture at the current rotation.
    pub fn gesture_start(&mut self, pointer: DVec2, current: Rotation) {
        self.phase = DragPhase::Dragging(DragSession {
            origin_pointer: pointer,
            origin_rotation: current,
        });
    }

    /// Pointer move at time `now`.
    ///
    /// Writes the new rotation and requests a redraw unless the controller is
    /// idle or the move falls inside the throttle window. Returns whether the
    /// move was applied.
    pub fn gesture_move(
        &mut self,
        pointer: DVec2,
        now: Instant,
        rotation: &mut Rotation,
        redraw: &mut PendingRedraw,
    ) -> bool {
        let DragPhase::Dragging(session) = self.phase else {
            return false;
        };

        if let Some(last) = self.last_render {
            if now.saturating_duration_since(last) < self.settings.throttle() {
                return false;
            }
        }

        let delta = pointer - session.origin_pointer;
        let sensitivity = self.settings.sensitivity;
        let max_tilt = self.settings.max_tilt;

        *rotation = Rotation {
            longitude: session.origin_rotation.longitude + delta.x * sensitivity,
            latitude: (session.origin_rotation.latitude - delta.y * sensitivity)
                .clamp(-max_tilt, max_tilt),
        };
        redraw.request();
        self.last_render = Some(now);
        true
    }

    /// Pointer up: ends the gesture, keeping the rotation it produced.
    pub fn gesture_end(&mut self) {
        self.phase = DragPhase::Idle;
    }
}
