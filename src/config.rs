//! Globe configuration.
//!
//! The configuration is plain data read from a JSON file. Keys use the same
//! camelCase spelling as the page-level globe settings (`globeColour`,
//! `countriesUrl`, ...) so existing settings files can be reused as-is.

use std::path::Path;

use eframe::egui::Color32;
use serde::{Deserialize, Serialize};

use crate::error::{GlobeError, Result};
use crate::globe::DragSettings;

/// world-atlas 110m countries, the dataset the globe was designed around.
pub const DEFAULT_COUNTRIES_URL: &str =
    "https://cdn.jsdelivr.net/npm/world-atlas@2/countries-110m.json";

/// Display and data settings for a single globe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GlobeConfig {
    /// Projection scale in pixels (sphere radius at a 90 degree clip angle).
    pub scale: f64,
    /// Clip angle in degrees; only points within this distance of the view
    /// centre are drawn.
    pub clip_angle: f64,
    pub globe_colour: String,
    pub country_colour: String,
    pub country_hover_colour: String,
    pub countries_boundary_colour: String,
    /// Location of the TopoJSON dataset (http(s) URL or local path).
    pub countries_url: String,
    /// Name of the object collection inside the topology.
    pub countries_object: String,
    /// Drag-to-rotate tuning.
    pub drag: DragSettings,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            scale: 300.0,
            clip_angle: 90.0,
            globe_colour: "#69b3a2".to_string(),
            country_colour: "#d8d8c0".to_string(),
            country_hover_colour: "#f2b134".to_string(),
            countries_boundary_colour: "#ffffff".to_string(),
            countries_url: DEFAULT_COUNTRIES_URL.to_string(),
            countries_object: "countries".to_string(),
            drag: DragSettings::default(),
        }
    }
}

impl GlobeConfig {
    /// Parses a configuration from a JSON string and validates it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| GlobeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Loads the configuration at `path`, falling back to defaults.
    ///
    /// A missing path yields the defaults silently; an unreadable or invalid
    /// file is logged and also yields the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded globe config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Failed to load config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Checks value ranges and colour syntax.
    pub fn validate(&self) -> Result<()> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(GlobeError::Config(format!(
                "scale must be positive, got {}",
                self.scale
            )));
        }
        if !(self.clip_angle > 0.0 && self.clip_angle <= 90.0) {
            return Err(GlobeError::Config(format!(
                "clipAngle must be in (0, 90], got {}",
                self.clip_angle
            )));
        }
        for (key, value) in [
            ("globeColour", &self.globe_colour),
            ("countryColour", &self.country_colour),
            ("countryHoverColour", &self.country_hover_colour),
            ("countriesBoundaryColour", &self.countries_boundary_colour),
        ] {
            parse_colour(value)
                .ok_or_else(|| GlobeError::Config(format!("{key} is not a hex colour: {value}")))?;
        }
        if self.countries_object.is_empty() {
            return Err(GlobeError::Config("countriesObject is empty".to_string()));
        }
        self.drag.validate()
    }

    pub fn globe_color32(&self) -> Color32 {
        parse_colour(&self.globe_colour).unwrap_or(Color32::GRAY)
    }

    pub fn country_color32(&self) -> Color32 {
        parse_colour(&self.country_colour).unwrap_or(Color32::LIGHT_GRAY)
    }

    pub fn country_hover_color32(&self) -> Color32 {
        parse_colour(&self.country_hover_colour).unwrap_or(Color32::YELLOW)
    }

    pub fn boundary_color32(&self) -> Color32 {
        parse_colour(&self.countries_boundary_colour).unwrap_or(Color32::WHITE)
    }
}

/// Parses `#rgb`, `#rrggbb` or `#rrggbbaa`.
pub fn parse_colour(value: &str) -> Option<Color32> {
    let hex = value.strip_prefix('#')?;
    let expanded: String = if hex.len() == 3 {
        hex.chars().flat_map(|c| [c, c]).collect()
    } else {
        hex.to_string()
    };
    Color32::from_hex(&format!("#{expanded}")).ok()
}
