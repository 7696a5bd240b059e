//! Projected path data and its SVG serialization.

use std::fmt::Write as _;

use glam::DVec2;

/// One continuous piece of a path.
#[derive(Debug, Clone, PartialEq)]
pub struct SubPath {
    pub points: Vec<DVec2>,
    /// Closed rings end with `Z`.
    pub closed: bool,
    /// Hole of the preceding exterior ring (only meaningful when closed).
    pub hole: bool,
}

impl SubPath {
    pub fn open(points: Vec<DVec2>) -> Self {
        Self {
            points,
            closed: false,
            hole: false,
        }
    }

    pub fn ring(points: Vec<DVec2>, hole: bool) -> Self {
        Self {
            points,
            closed: true,
            hole,
        }
    }
}

/// Screen-space geometry of one drawable element.
#[derive(Debug, Clone, PartialEq)]
pub enum PathData {
    /// A full circle, used for the sphere outline.
    Circle { center: DVec2, radius: f64 },
    /// Polylines and polygon rings.
    Lines(Vec<SubPath>),
}

impl PathData {
    pub fn is_empty(&self) -> bool {
        match self {
            PathData::Circle { radius, .. } => *radius <= 0.0,
            PathData::Lines(subpaths) => subpaths.iter().all(|s| s.points.len() < 2),
        }
    }

    /// Renders the path as an SVG `d` attribute value.
    ///
    /// Output is deterministic: the same geometry always yields the same
    /// string.
    pub fn to_svg(&self) -> String {
        let mut d = String::new();
        match self {
            PathData::Circle { center, radius } => {
                let r = format_number(*radius);
                let top = format_point(DVec2::new(center.x, center.y - radius));
                let bottom = format_point(DVec2::new(center.x, center.y + radius));
                let _ = write!(d, "M{top}A{r},{r},0,1,1,{bottom}A{r},{r},0,1,1,{top}Z");
            }
            PathData::Lines(subpaths) => {
                for subpath in subpaths {
                    if subpath.points.len() < 2 {
                        continue;
                    }
                    for (i, p) in subpath.points.iter().enumerate() {
                        d.push(if i == 0 { 'M' } else { 'L' });
                        d.push_str(&format_point(*p));
                    }
                    if subpath.closed {
                        d.push('Z');
                    }
                }
            }
        }
        d
    }
}

fn format_point(p: DVec2) -> String {
    format!("{},{}", format_number(p.x), format_number(p.y))
}

/// Formats a coordinate with at most three decimals, trimming trailing
/// zeros and normalising negative zero.
pub fn format_number(value: f64) -> String {
    let mut s = format!("{value:.3}");
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(2.123456), "2.123");
        assert_eq!(format_number(-0.0001), "0");
        assert_eq!(format_number(-12.3), "-12.3");
        assert_eq!(format_number(100.0), "100");
    }

    #[test]
    fn test_ring_and_line_commands() {
        let path = PathData::Lines(vec![
            SubPath::ring(
                vec![
                    DVec2::new(0.0, 0.0),
                    DVec2::new(10.0, 0.0),
                    DVec2::new(10.0, 10.0),
                ],
                false,
            ),
            SubPath::open(vec![DVec2::new(1.25, 2.5), DVec2::new(3.0, 4.0)]),
        ]);
        assert_eq!(path.to_svg(), "M0,0L10,0L10,10ZM1.25,2.5L3,4");
    }

    #[test]
    fn test_circle_uses_two_arcs() {
        let path = PathData::Circle {
            center: DVec2::new(400.0, 300.0),
            radius: 250.0,
        };
        assert_eq!(
            path.to_svg(),
            "M400,50A250,250,0,1,1,400,550A250,250,0,1,1,400,50Z"
        );
    }

    #[test]
    fn test_degenerate_subpaths_are_skipped() {
        let path = PathData::Lines(vec![SubPath::open(vec![DVec2::new(1.0, 1.0)])]);
        assert!(path.is_empty());
        assert_eq!(path.to_svg(), "");
    }
}
