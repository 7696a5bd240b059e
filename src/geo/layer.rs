//! Country features and the geometry source built from a topology.

use geo_types::Coord;

use super::Topology;
use crate::error::Result;

/// A polygonal geographic feature (one country).
#[derive(Debug, Clone, PartialEq)]
pub enum GeoFeature {
    /// A single polygon with optional holes.
    Polygon {
        exterior: Vec<Coord<f64>>,
        holes: Vec<Vec<Coord<f64>>>,
        label: Option<String>,
        id: Option<String>,
    },
    /// Several polygons (islands, exclaves) sharing one label.
    MultiPolygon {
        polygons: Vec<(Vec<Coord<f64>>, Vec<Vec<Coord<f64>>>)>,
        label: Option<String>,
        id: Option<String>,
    },
}

impl GeoFeature {
    pub fn label(&self) -> Option<&str> {
        match self {
            GeoFeature::Polygon { label, .. } | GeoFeature::MultiPolygon { label, .. } => {
                label.as_deref()
            }
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            GeoFeature::Polygon { id, .. } | GeoFeature::MultiPolygon { id, .. } => id.as_deref(),
        }
    }

    /// The polygon parts as (exterior, holes) pairs.
    pub fn polygons(&self) -> Vec<(&[Coord<f64>], &[Vec<Coord<f64>>])> {
        match self {
            GeoFeature::Polygon {
                exterior, holes, ..
            } => vec![(exterior.as_slice(), holes.as_slice())],
            GeoFeature::MultiPolygon { polygons, .. } => polygons
                .iter()
                .map(|(exterior, holes)| (exterior.as_slice(), holes.as_slice()))
                .collect(),
        }
    }

    /// Total number of vertices over all rings.
    pub fn vertex_count(&self) -> usize {
        self.polygons()
            .iter()
            .map(|(exterior, holes)| exterior.len() + holes.iter().map(Vec::len).sum::<usize>())
            .sum()
    }

    /// Whether the feature covers a (lon, lat) coordinate.
    ///
    /// Uses an even-odd test in the lon/lat plane, which is exact enough for
    /// hit-testing the pointer against country outlines.
    pub fn contains(&self, coord: Coord<f64>) -> bool {
        self.polygons().iter().any(|(exterior, holes)| {
            let mut inside = ring_contains(exterior, coord);
            for hole in holes.iter() {
                if ring_contains(hole, coord) {
                    inside = !inside;
                }
            }
            inside
        })
    }
}

/// Even-odd ray cast against one ring.
fn ring_contains(ring: &[Coord<f64>], p: Coord<f64>) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (ring[i], ring[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// The immutable geography of one globe session: country polygons plus the
/// mesh of internal borders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometrySource {
    pub countries: Vec<GeoFeature>,
    /// Borders shared by two different countries; coastlines are excluded.
    pub boundaries: Vec<Vec<Coord<f64>>>,
}

impl GeometrySource {
    /// Extracts countries and their shared borders from a topology object.
    pub fn from_topology(topology: &Topology, object: &str) -> Result<Self> {
        let countries = topology.features(object)?;
        let boundaries = topology.mesh(object, |a, b| a != b)?;

        log::info!(
            "Loaded {} countries ({} vertices), {} boundary lines",
            countries.len(),
            countries.iter().map(GeoFeature::vertex_count).sum::<usize>(),
            boundaries.len()
        );

        Ok(Self {
            countries,
            boundaries,
        })
    }

    /// Parses a TopoJSON document and extracts `object` from it.
    pub fn from_topojson(json: &str, object: &str) -> Result<Self> {
        let topology = Topology::from_json(json)?;
        Self::from_topology(&topology, object)
    }

    /// Index of the first country covering `coord`.
    pub fn feature_at(&self, coord: Coord<f64>) -> Option<usize> {
        self.countries.iter().position(|f| f.contains(coord))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::test_data::WORLD;

    fn c(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    #[test]
    fn test_source_from_topojson() {
        let source = GeometrySource::from_topojson(WORLD, "countries").unwrap();
        assert_eq!(source.countries.len(), 3);
        assert_eq!(source.countries[2].label(), Some("Far"));
        assert_eq!(source.countries[2].id(), Some("3"));
        // Only the West/East meridian border is shared.
        assert_eq!(source.boundaries, vec![vec![c(0.0, -10.0), c(0.0, 10.0)]]);
    }

    #[test]
    fn test_contains_and_feature_at() {
        let source = GeometrySource::from_topojson(WORLD, "countries").unwrap();
        assert_eq!(source.feature_at(c(-5.0, 0.0)), Some(0));
        assert_eq!(source.feature_at(c(5.0, 3.0)), Some(1));
        assert_eq!(source.feature_at(c(172.0, 0.0)), Some(2));
        assert_eq!(source.feature_at(c(50.0, 50.0)), None);
    }

    #[test]
    fn test_hole_is_not_contained() {
        let square = |lo: f64, hi: f64| {
            vec![c(lo, lo), c(hi, lo), c(hi, hi), c(lo, hi), c(lo, lo)]
        };
        let feature = GeoFeature::Polygon {
            exterior: square(0.0, 10.0),
            holes: vec![square(4.0, 6.0)],
            label: None,
            id: None,
        };
        assert!(feature.contains(c(2.0, 2.0)));
        assert!(!feature.contains(c(5.0, 5.0)));
        assert_eq!(feature.vertex_count(), 10);
    }
}
