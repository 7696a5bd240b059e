//! Application state management.
//!
//! The globe itself (rotation, drag session, frame) lives in
//! [`globe_workbench::globe::Globe`]; this module holds the viewer state around
//! it: status text, hover and export requests.

mod view;

pub use view::{SurfaceState, ViewState};

use std::path::PathBuf;

use globe_workbench::error::Result;
use globe_workbench::geo::GeometrySource;

/// Default file name for exported SVG documents.
pub const DEFAULT_EXPORT_PATH: &str = "globe.svg";

/// Root application state.
pub struct AppState {
    /// Application status message displayed in top bar
    pub status_message: String,

    /// Canvas interaction state
    pub view: ViewState,

    /// Set by the top bar; consumed by the app after the frame is drawn.
    pub export_requested: bool,

    /// Where exported SVG documents are written (native only).
    pub export_path: PathBuf,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            status_message: "Ready".to_string(),
            view: ViewState::default(),
            export_requested: false,
            export_path: PathBuf::from(DEFAULT_EXPORT_PATH),
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_load_started(&mut self, location: &str) {
        self.status_message = format!("Loading country data from {}", location);
    }

    /// Updates the status line for a finished geometry load.
    pub fn on_geometry_loaded(&mut self, result: &Result<GeometrySource>) {
        self.status_message = match result {
            Ok(source) => format!("{} countries loaded", source.countries.len()),
            Err(e) => format!("Country data unavailable: {}", e),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use globe_workbench::error::GlobeError;

    #[test]
    fn test_status_follows_geometry_load() {
        let mut state = AppState::new();
        assert_eq!(state.status_message, "Ready");

        state.on_load_started("world.json");
        assert!(state.status_message.contains("world.json"));

        state.on_geometry_loaded(&Ok(GeometrySource::default()));
        assert_eq!(state.status_message, "0 countries loaded");

        state.on_geometry_loaded(&Err(GlobeError::Fetch("HTTP 500".to_string())));
        assert!(state.status_message.starts_with("Country data unavailable"));
        assert!(state.status_message.contains("HTTP 500"));
    }

    #[test]
    fn test_default_export_path() {
        let state = AppState::default();
        assert!(!state.export_requested);
        assert_eq!(state.export_path, PathBuf::from("globe.svg"));
    }
}
