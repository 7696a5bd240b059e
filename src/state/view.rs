//! Canvas interaction state.

use globe_workbench::geo::Rotation;

/// Whether the canvas has produced a globe yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SurfaceState {
    /// Waiting for the first frame with a usable canvas.
    #[default]
    Pending,
    Ready,
    /// Initialisation failed; it is not retried.
    Failed(String),
}

/// What the canvas shows besides the globe itself.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub surface: SurfaceState,

    /// Index of the country under the pointer.
    pub hovered_country: Option<usize>,

    /// Name of the hovered country, shown as a tooltip.
    pub hovered_label: Option<String>,

    /// Rotation after the last frame, for the top bar readout.
    pub rotation: Rotation,
}

impl ViewState {
    pub fn set_hover(&mut self, country: Option<usize>, label: Option<String>) {
        self.hovered_country = country;
        self.hovered_label = country.and(label);
    }

    /// Readout such as `12.5°E 30.0°N`, in the coordinates of the view centre.
    pub fn centre_label(&self) -> String {
        let lon = globe_workbench::geo::normalize_longitude(-self.rotation.longitude);
        let lat = -self.rotation.latitude;
        format!(
            "{:.1}°{} {:.1}°{}",
            lon.abs(),
            if lon < 0.0 { 'W' } else { 'E' },
            lat.abs(),
            if lat < 0.0 { 'S' } else { 'N' }
        )
    }
}
