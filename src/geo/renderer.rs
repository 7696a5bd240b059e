//! Globe rendering.
//!
//! Projects the sphere, the country polygons and the boundary mesh under the
//! current rotation into a [`Frame`] of tagged path elements. A frame is
//! plain data; output surfaces (the egui canvas, SVG export) paint it.

use std::fmt::Write as _;

use geo_types::Coord;
use glam::DVec2;

use super::clip::{ClipCircle, Interior, RingClip};
use super::path::{format_number, PathData, SubPath};
use super::{GeoFeature, GeometrySource, OrthographicProjection};
use crate::config::GlobeConfig;

/// Kind of drawable element, used as its style class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Sphere,
    Country,
    Boundary,
}

impl ElementKind {
    pub fn class(&self) -> &'static str {
        match self {
            ElementKind::Sphere => "sphere",
            ElementKind::Country => "country",
            ElementKind::Boundary => "boundary",
        }
    }
}

/// Paint attributes of an element. Colours are CSS hex strings.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementStyle {
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: f32,
    pub round_join: bool,
}

impl ElementStyle {
    fn filled(fill: &str) -> Self {
        Self {
            fill: Some(fill.to_string()),
            stroke: None,
            stroke_width: 0.0,
            round_join: false,
        }
    }

    fn stroked(stroke: &str, width: f32) -> Self {
        Self {
            fill: None,
            stroke: Some(stroke.to_string()),
            stroke_width: width,
            round_join: true,
        }
    }
}

/// One drawable element of a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PathElement {
    pub kind: ElementKind,
    /// Index of the source country, for country elements.
    pub feature: Option<usize>,
    pub label: Option<String>,
    pub path: PathData,
    pub style: ElementStyle,
}

/// The output of one redraw.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: f64,
    pub height: f64,
    /// Back-to-front: sphere, countries, boundaries.
    pub elements: Vec<PathElement>,
    /// False when the frame was drawn before country data was available.
    pub data_ready: bool,
    /// Fill applied to the country under the pointer.
    pub hover_fill: String,
}

impl Frame {
    pub fn count(&self, kind: ElementKind) -> usize {
        self.elements.iter().filter(|e| e.kind == kind).count()
    }
}

/// Anything a frame can be painted onto.
pub trait Surface {
    fn paint(&mut self, frame: &Frame);
}

/// Colours and stroke widths taken from the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Renderer {
    globe_fill: String,
    country_fill: String,
    country_hover_fill: String,
    boundary_stroke: String,
    boundary_width: f32,
}

impl Renderer {
    pub fn new(config: &GlobeConfig) -> Self {
        Self {
            globe_fill: config.globe_colour.clone(),
            country_fill: config.country_colour.clone(),
            country_hover_fill: config.country_hover_colour.clone(),
            boundary_stroke: config.countries_boundary_colour.clone(),
            boundary_width: 1.0,
        }
    }

    /// Re-projects everything under the projection's current rotation.
    ///
    /// With no geometry (still loading, or the load failed) only the sphere
    /// is drawn.
    pub fn redraw(
        &self,
        projection: &OrthographicProjection,
        geometry: Option<&GeometrySource>,
        width: f64,
        height: f64,
    ) -> Frame {
        let mut elements = vec![PathElement {
            kind: ElementKind::Sphere,
            feature: None,
            label: None,
            path: render_sphere(projection),
            style: ElementStyle::filled(&self.globe_fill),
        }];

        let Some(geometry) = geometry else {
            log::debug!("Waiting for country data");
            return Frame {
                width,
                height,
                elements,
                data_ready: false,
                hover_fill: self.country_hover_fill.clone(),
            };
        };

        let clip = ClipCircle::new(projection.cos_clip(), projection.sin_clip());

        for (index, feature) in geometry.countries.iter().enumerate() {
            let path = render_feature(feature, projection, &clip);
            if path.is_empty() {
                continue;
            }
            elements.push(PathElement {
                kind: ElementKind::Country,
                feature: Some(index),
                label: feature.label().map(str::to_string),
                path,
                style: ElementStyle::filled(&self.country_fill),
            });
        }

        let boundaries = render_lines(&geometry.boundaries, projection, &clip);
        if !boundaries.is_empty() {
            elements.push(PathElement {
                kind: ElementKind::Boundary,
                feature: None,
                label: None,
                path: boundaries,
                style: ElementStyle::stroked(&self.boundary_stroke, self.boundary_width),
            });
        }

        Frame {
            width,
            height,
            elements,
            data_ready: true,
            hover_fill: self.country_hover_fill.clone(),
        }
    }
}

/// The sphere outline is the clip circle itself.
fn render_sphere(projection: &OrthographicProjection) -> PathData {
    PathData::Circle {
        center: projection.translate,
        radius: projection.rim_radius(),
    }
}

/// Projects and clips every ring of a country.
fn render_feature(
    feature: &GeoFeature,
    projection: &OrthographicProjection,
    clip: &ClipCircle,
) -> PathData {
    let mut subpaths = Vec::new();

    for (exterior, holes) in feature.polygons() {
        let rings = std::iter::once(exterior).chain(holes.iter().map(Vec::as_slice));
        for (ring_index, ring) in rings.enumerate() {
            let hole = ring_index > 0;
            let interior = Interior::of_ring(hole);
            let rotated: Vec<_> = ring.iter().map(|c| projection.rotate(*c)).collect();
            match clip.clip_ring(&rotated) {
                RingClip::Inside(points) => {
                    subpaths.push(SubPath::ring(to_screen(projection, &points), hole));
                }
                RingClip::Crossing(runs) => {
                    for polygon in clip.stitch(&runs, interior) {
                        subpaths.push(SubPath::ring(to_screen(projection, &polygon), hole));
                    }
                }
                RingClip::Outside => {
                    if clip.encloses_centre(&rotated, interior) {
                        subpaths.push(SubPath::ring(to_screen(projection, &clip.rim()), hole));
                    }
                }
            }
        }
    }

    PathData::Lines(subpaths)
}

/// Projects and clips line strings (the boundary mesh).
fn render_lines(
    lines: &[Vec<Coord<f64>>],
    projection: &OrthographicProjection,
    clip: &ClipCircle,
) -> PathData {
    let mut subpaths = Vec::new();
    for line in lines {
        let rotated: Vec<_> = line.iter().map(|c| projection.rotate(*c)).collect();
        for piece in clip.clip_line(&rotated) {
            subpaths.push(SubPath::open(to_screen(projection, &piece)));
        }
    }
    PathData::Lines(subpaths)
}

fn to_screen(projection: &OrthographicProjection, points: &[glam::DVec3]) -> Vec<DVec2> {
    points.iter().map(|&v| projection.to_screen(v)).collect()
}

/// Serializes frames as standalone SVG documents.
#[derive(Debug, Default)]
pub struct SvgSurface {
    document: String,
}

impl SvgSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_document(self) -> String {
        self.document
    }
}

impl Surface for SvgSurface {
    fn paint(&mut self, frame: &Frame) {
        let (w, h) = (format_number(frame.width), format_number(frame.height));
        let mut out = String::new();
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
        );
        let _ = writeln!(
            out,
            "<style>.country:hover{{fill:{}}}</style>",
            escape_xml(&frame.hover_fill)
        );

        for element in &frame.elements {
            let _ = write!(
                out,
                r#"<path class="{}" d="{}""#,
                element.kind.class(),
                element.path.to_svg()
            );
            let style = &element.style;
            match &style.fill {
                Some(fill) => {
                    let _ = write!(out, r#" fill="{}""#, escape_xml(fill));
                }
                None => out.push_str(r#" fill="none""#),
            }
            if element.kind == ElementKind::Country {
                out.push_str(r#" fill-rule="evenodd""#);
            }
            if let Some(stroke) = &style.stroke {
                let _ = write!(
                    out,
                    r#" stroke="{}" stroke-width="{}""#,
                    escape_xml(stroke),
                    format_number(style.stroke_width as f64)
                );
                if style.round_join {
                    out.push_str(r#" stroke-linejoin="round""#);
                }
            }
            match &element.label {
                Some(label) => {
                    let _ = writeln!(out, "><title>{}</title></path>", escape_xml(label));
                }
                None => out.push_str("/>\n"),
            }
        }

        out.push_str("</svg>\n");
        self.document = out;
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::test_data::{CONTINENT, OCEAN, WORLD};
    use crate::geo::Rotation;

    fn setup() -> (Renderer, OrthographicProjection, GeometrySource) {
        let config = GlobeConfig::default();
        let mut projection = OrthographicProjection::new(config.scale, config.clip_angle);
        projection.fit_viewport(800.0, 600.0);
        let source = GeometrySource::from_topojson(WORLD, "countries").unwrap();
        (Renderer::new(&config), projection, source)
    }

    fn svg(frame: &Frame) -> String {
        let mut surface = SvgSurface::new();
        surface.paint(frame);
        surface.into_document()
    }

    #[test]
    fn test_far_side_country_is_not_drawn() {
        let (renderer, projection, source) = setup();
        let frame = renderer.redraw(&projection, Some(&source), 800.0, 600.0);

        assert!(frame.data_ready);
        assert_eq!(frame.count(ElementKind::Sphere), 1);
        assert_eq!(frame.count(ElementKind::Country), 2);
        assert_eq!(frame.count(ElementKind::Boundary), 1);
        let labels: Vec<_> = frame.elements.iter().filter_map(|e| e.label.as_deref()).collect();
        assert_eq!(labels, vec!["West", "East"]);
    }

    #[test]
    fn test_rotating_brings_far_country_into_view() {
        let (renderer, mut projection, source) = setup();
        projection.rotation = Rotation::new(-172.0, 0.0);
        let frame = renderer.redraw(&projection, Some(&source), 800.0, 600.0);

        let countries: Vec<_> = frame
            .elements
            .iter()
            .filter(|e| e.kind == ElementKind::Country)
            .filter_map(|e| e.feature)
            .collect();
        assert_eq!(countries, vec![2]);
        assert_eq!(frame.count(ElementKind::Boundary), 0);
    }

    #[test]
    fn test_redraw_is_deterministic() {
        let (renderer, mut projection, source) = setup();
        projection.rotation = Rotation::new(37.5, -12.25);

        let first = svg(&renderer.redraw(&projection, Some(&source), 800.0, 600.0));
        let second = svg(&renderer.redraw(&projection, Some(&source), 800.0, 600.0));
        assert_eq!(first, second);
    }

    #[test]
    fn test_without_geometry_only_sphere() {
        let (renderer, projection, _) = setup();
        let frame = renderer.redraw(&projection, None, 800.0, 600.0);

        assert!(!frame.data_ready);
        assert_eq!(frame.elements.len(), 1);
        let document = svg(&frame);
        assert!(document.contains(r##"<path class="sphere" d="M400,0A300,300,0,1,1,400,600A300,300,0,1,1,400,0Z" fill="#69b3a2"/>"##));
        assert!(!document.contains(r#"class="country""#));
        assert!(!document.contains(r#"class="boundary""#));
    }

    #[test]
    fn test_svg_attributes() {
        let (renderer, projection, source) = setup();
        let document = svg(&renderer.redraw(&projection, Some(&source), 800.0, 600.0));

        assert!(document.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg" width="800" height="600""#));
        assert!(document.contains(".country:hover{fill:#f2b134}"));
        assert!(document.contains("<title>West</title>"));
        assert!(document.contains(
            r##"fill="none" stroke="#ffffff" stroke-width="1" stroke-linejoin="round"/>"##
        ));
        assert!(document.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_boundary_is_centre_meridian() {
        let (renderer, projection, source) = setup();
        let frame = renderer.redraw(&projection, Some(&source), 800.0, 600.0);
        let boundary = frame
            .elements
            .iter()
            .find(|e| e.kind == ElementKind::Boundary)
            .unwrap();
        let PathData::Lines(subpaths) = &boundary.path else {
            panic!("boundary should be lines");
        };
        for p in subpaths.iter().flat_map(|s| &s.points) {
            assert!((p.x - 400.0).abs() < 1e-9);
        }
    }

    /// Screen rings of the only country in a frame.
    fn country_rings(frame: &Frame) -> Vec<SubPath> {
        let countries: Vec<_> = frame
            .elements
            .iter()
            .filter(|e| e.kind == ElementKind::Country)
            .collect();
        assert_eq!(countries.len(), 1);
        let PathData::Lines(subpaths) = &countries[0].path else {
            panic!("country should be rings");
        };
        subpaths.clone()
    }

    fn ring_covers(ring: &[DVec2], point: DVec2) -> bool {
        let mut inside = false;
        let mut j = ring.len() - 1;
        for i in 0..ring.len() {
            let (a, b) = (ring[i], ring[j]);
            if (a.y > point.y) != (b.y > point.y)
                && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    #[test]
    fn test_region_larger_than_view_is_not_inverted() {
        let (renderer, projection, _) = setup();
        let source = GeometrySource::from_topojson(CONTINENT, "countries").unwrap();
        let frame = renderer.redraw(&projection, Some(&source), 800.0, 600.0);

        let rings = country_rings(&frame);
        assert_eq!(rings.len(), 1);
        let ring = &rings[0].points;
        let at = |lon: f64| projection.project(Coord { x: lon, y: 0.0 }).unwrap();
        assert!(ring_covers(ring, DVec2::new(400.0, 300.0)));
        assert!(ring_covers(ring, at(44.0)));
        assert!(ring_covers(ring, at(-87.0)));
        assert!(!ring_covers(ring, at(72.0)));
    }

    #[test]
    fn test_hidden_ring_around_view_fills_disc() {
        let (renderer, projection, _) = setup();
        let source = GeometrySource::from_topojson(OCEAN, "countries").unwrap();
        let frame = renderer.redraw(&projection, Some(&source), 800.0, 600.0);

        let rings = country_rings(&frame);
        assert_eq!(rings.len(), 1);
        assert!(!rings[0].hole);
        for p in &rings[0].points {
            assert!((p.distance(DVec2::new(400.0, 300.0)) - 300.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml(r#"Bosnia & "Herz" <x>"#), "Bosnia &amp; &quot;Herz&quot; &lt;x&gt;");
    }
}
