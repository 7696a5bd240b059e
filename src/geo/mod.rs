//! Geographic data, projection and rendering for the globe.
//!
//! This module covers decoding country topologies, rotating and projecting
//! them orthographically, clipping to the visible hemisphere, and producing
//! path data for output surfaces.

pub mod clip;
mod layer;
mod path;
mod projection;
mod renderer;
mod topology;

#[cfg(test)]
pub(crate) mod test_data;

pub use layer::{GeoFeature, GeometrySource};
pub use path::{format_number, PathData, SubPath};
pub use projection::{normalize_longitude, OrthographicProjection, Rotation};
pub use renderer::{ElementKind, ElementStyle, Frame, PathElement, Renderer, Surface, SvgSurface};
pub use topology::{TopoGeometry, Topology, Transform};
