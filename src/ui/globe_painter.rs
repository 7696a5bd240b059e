//! Paints globe frames with egui shapes.

use eframe::egui::{Color32, Mesh, Painter, Pos2, Shape, Stroke};
use glam::DVec2;

use globe_workbench::config::parse_colour;
use globe_workbench::geo::{ElementKind, Frame, PathData, PathElement, SubPath, Surface};

/// Output surface drawing into an egui painter.
///
/// Frame coordinates are relative to the canvas, so every point is offset
/// by `origin` (the canvas' top-left corner).
pub struct GlobePainter<'a> {
    painter: &'a Painter,
    origin: Pos2,
    hovered: Option<usize>,
}

impl<'a> GlobePainter<'a> {
    pub fn new(painter: &'a Painter, origin: Pos2, hovered: Option<usize>) -> Self {
        Self {
            painter,
            origin,
            hovered,
        }
    }

    fn to_pos(&self, p: DVec2) -> Pos2 {
        Pos2::new(self.origin.x + p.x as f32, self.origin.y + p.y as f32)
    }

    fn fill_for(&self, element: &PathElement, hover_fill: Option<Color32>) -> Option<Color32> {
        let fill = element.style.fill.as_deref().and_then(parse_colour);
        let hovered = element.kind == ElementKind::Country
            && self.hovered.is_some()
            && element.feature == self.hovered;
        if hovered {
            hover_fill.or(fill)
        } else {
            fill
        }
    }
}

impl Surface for GlobePainter<'_> {
    fn paint(&mut self, frame: &Frame) {
        let hover_fill = parse_colour(&frame.hover_fill);

        for element in &frame.elements {
            let fill = self.fill_for(element, hover_fill);
            let stroke = element
                .style
                .stroke
                .as_deref()
                .and_then(parse_colour)
                .map(|color| Stroke::new(element.style.stroke_width, color))
                .unwrap_or(Stroke::NONE);

            match &element.path {
                PathData::Circle { center, radius } => {
                    self.painter.circle(
                        self.to_pos(*center),
                        *radius as f32,
                        fill.unwrap_or(Color32::TRANSPARENT),
                        stroke,
                    );
                }
                PathData::Lines(subpaths) => {
                    if let Some(fill) = fill {
                        for polygon in polygon_groups(subpaths) {
                            if let Some(mesh) = fill_mesh(&polygon, fill, self.origin) {
                                self.painter.add(Shape::mesh(mesh));
                            }
                        }
                    }
                    if stroke.width > 0.0 {
                        for subpath in subpaths.iter().filter(|s| s.points.len() >= 2) {
                            let points: Vec<Pos2> =
                                subpath.points.iter().map(|p| self.to_pos(*p)).collect();
                            if subpath.closed {
                                self.painter.add(Shape::closed_line(points, stroke));
                            } else {
                                self.painter.add(Shape::line(points, stroke));
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Groups closed rings into polygons: each exterior ring followed by the
/// holes that come after it. Open subpaths are not fillable and are skipped.
fn polygon_groups(subpaths: &[SubPath]) -> Vec<Vec<&SubPath>> {
    let mut groups: Vec<Vec<&SubPath>> = Vec::new();
    for subpath in subpaths.iter().filter(|s| s.closed && s.points.len() >= 3) {
        if !subpath.hole {
            groups.push(vec![subpath]);
        } else if let Some(group) = groups.last_mut() {
            group.push(subpath);
        }
    }
    groups
}

/// Triangulates one polygon (exterior plus holes).
///
/// Returns the flattened vertices and triangle indices into them.
fn triangulate(polygon: &[&SubPath]) -> Option<(Vec<DVec2>, Vec<usize>)> {
    let mut vertices = Vec::new();
    let mut coords = Vec::new();
    let mut hole_indices = Vec::new();

    for (ring_index, ring) in polygon.iter().enumerate() {
        let mut points = ring.points.as_slice();
        if points.len() >= 2 && points.first() == points.last() {
            points = &points[..points.len() - 1];
        }
        if points.len() < 3 {
            continue;
        }
        if ring_index > 0 {
            hole_indices.push(vertices.len());
        }
        for p in points {
            coords.push(p.x);
            coords.push(p.y);
            vertices.push(*p);
        }
    }

    if vertices.len() < 3 {
        return None;
    }

    match earcutr::earcut(&coords, &hole_indices, 2) {
        Ok(indices) if !indices.is_empty() => Some((vertices, indices)),
        Ok(_) => None,
        Err(e) => {
            log::debug!("Skipping untriangulable ring: {:?}", e);
            None
        }
    }
}

fn fill_mesh(polygon: &[&SubPath], color: Color32, origin: Pos2) -> Option<Mesh> {
    let (vertices, indices) = triangulate(polygon)?;

    let mut mesh = Mesh::default();
    for v in &vertices {
        mesh.colored_vertex(
            Pos2::new(origin.x + v.x as f32, origin.y + v.y as f32),
            color,
        );
    }
    for triangle in indices.chunks_exact(3) {
        mesh.add_triangle(triangle[0] as u32, triangle[1] as u32, triangle[2] as u32);
    }
    Some(mesh)
}
