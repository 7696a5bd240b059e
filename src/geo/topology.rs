//! TopoJSON topology decoding.
//!
//! A topology stores every shared edge once as an "arc"; geometries refer to
//! arcs by index, with `!i` (i.e. `-i - 1`) meaning arc `i` walked backwards.
//! Arcs are usually quantized: positions are integer deltas that must be
//! summed and then mapped through the topology transform.

use std::collections::{BTreeMap, HashMap};

use geo_types::Coord;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::GeoFeature;
use crate::error::{GlobeError, Result};

/// Affine transform for quantized arc positions.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Transform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

/// One geometry object of a topology, kept close to the wire format.
#[derive(Debug, Clone, Deserialize)]
pub struct TopoGeometry {
    /// Geometry type; `null` in the file means an empty geometry.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub arcs: Option<Value>,
    #[serde(default)]
    pub geometries: Option<Vec<TopoGeometry>>,
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
}

/// Arc references of a geometry, typed by geometry kind.
#[derive(Debug, Clone, PartialEq)]
enum ArcRefs {
    Polygon(Vec<Vec<i64>>),
    MultiPolygon(Vec<Vec<Vec<i64>>>),
    LineString(Vec<i64>),
    MultiLineString(Vec<Vec<i64>>),
    /// Points, empty geometries and anything without arcs.
    None,
}

impl TopoGeometry {
    /// Display name from `properties.name` (or `NAME`).
    pub fn name(&self) -> Option<String> {
        self.properties
            .as_ref()
            .and_then(|p| p.get("name").or_else(|| p.get("NAME")))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }

    /// Identifier, accepting both string and numeric ids.
    pub fn id_string(&self) -> Option<String> {
        match self.id.as_ref()? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    fn arc_refs(&self) -> Result<ArcRefs> {
        let Some(arcs) = self.arcs.clone() else {
            return Ok(ArcRefs::None);
        };
        let refs = match self.kind.as_deref() {
            Some("Polygon") => ArcRefs::Polygon(serde_json::from_value(arcs)?),
            Some("MultiPolygon") => ArcRefs::MultiPolygon(serde_json::from_value(arcs)?),
            Some("LineString") => ArcRefs::LineString(serde_json::from_value(arcs)?),
            Some("MultiLineString") => ArcRefs::MultiLineString(serde_json::from_value(arcs)?),
            _ => ArcRefs::None,
        };
        Ok(refs)
    }

    /// Every arc index referenced by this geometry, in file order.
    fn arc_indices(&self) -> Result<Vec<i64>> {
        Ok(match self.arc_refs()? {
            ArcRefs::Polygon(rings) | ArcRefs::MultiLineString(rings) => {
                rings.into_iter().flatten().collect()
            }
            ArcRefs::MultiPolygon(polygons) => polygons.into_iter().flatten().flatten().collect(),
            ArcRefs::LineString(arcs) => arcs,
            ArcRefs::None => Vec::new(),
        })
    }
}

/// The on-disk topology document.
#[derive(Debug, Clone, Deserialize)]
struct RawTopology {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    transform: Option<Transform>,
    arcs: Vec<Vec<Vec<f64>>>,
    objects: BTreeMap<String, TopoGeometry>,
}

/// A decoded topology: arcs in absolute coordinates plus named objects.
#[derive(Debug, Clone)]
pub struct Topology {
    arcs: Vec<Vec<Coord<f64>>>,
    objects: BTreeMap<String, TopoGeometry>,
}

impl Topology {
    /// Parses and decodes a TopoJSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawTopology = serde_json::from_str(json)?;
        if raw.kind != "Topology" {
            return Err(GlobeError::Topology(format!(
                "expected type \"Topology\", got {:?}",
                raw.kind
            )));
        }

        let arcs = raw
            .arcs
            .iter()
            .enumerate()
            .map(|(i, arc)| {
                decode_arc(arc, raw.transform.as_ref())
                    .map_err(|e| GlobeError::Topology(format!("arc {i}: {e}")))
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        log::debug!(
            "Decoded topology: {} arcs, objects {:?}",
            arcs.len(),
            raw.objects.keys().collect::<Vec<_>>()
        );

        Ok(Self {
            arcs,
            objects: raw.objects,
        })
    }

    pub fn arc_count(&self) -> usize {
        self.arcs.len()
    }

    fn object(&self, name: &str) -> Result<&TopoGeometry> {
        self.objects
            .get(name)
            .ok_or_else(|| GlobeError::MissingObject(name.to_string()))
    }

    /// The member geometries of an object (the object itself unless it is a
    /// collection).
    fn members<'a>(&'a self, object: &'a TopoGeometry) -> Vec<&'a TopoGeometry> {
        match (object.kind.as_deref(), &object.geometries) {
            (Some("GeometryCollection"), Some(geometries)) => geometries.iter().collect(),
            _ => vec![object],
        }
    }

    /// Converts the polygonal members of an object into features.
    ///
    /// Non-polygonal members are skipped.
    pub fn features(&self, name: &str) -> Result<Vec<GeoFeature>> {
        let object = self.object(name)?;
        let mut features = Vec::new();

        for geometry in self.members(object) {
            let label = geometry.name();
            let id = geometry.id_string();
            match geometry.arc_refs()? {
                ArcRefs::Polygon(rings) => {
                    let mut rings = self.rings(&rings)?;
                    if rings.is_empty() {
                        continue;
                    }
                    let exterior = rings.remove(0);
                    features.push(GeoFeature::Polygon {
                        exterior,
                        holes: rings,
                        label,
                        id,
                    });
                }
                ArcRefs::MultiPolygon(polygons) => {
                    let mut parts = Vec::with_capacity(polygons.len());
                    for polygon in &polygons {
                        let mut rings = self.rings(polygon)?;
                        if rings.is_empty() {
                            continue;
                        }
                        let exterior = rings.remove(0);
                        parts.push((exterior, rings));
                    }
                    features.push(GeoFeature::MultiPolygon {
                        polygons: parts,
                        label,
                        id,
                    });
                }
                _ => {
                    log::debug!("Skipping non-polygon geometry {:?}", geometry.kind);
                }
            }
        }

        Ok(features)
    }

    /// Builds a line mesh from the arcs of an object.
    ///
    /// Each arc is kept when `filter(a, b)` holds, where `a` and `b` are the
    /// indices (within the object) of the first and last member geometry that
    /// reference it. An arc used by a single geometry is passed as `(g, g)`,
    /// so `|a, b| a != b` keeps exactly the borders shared by two different
    /// geometries. Kept arcs are joined into longer lines where they meet.
    pub fn mesh<F>(&self, name: &str, filter: F) -> Result<Vec<Vec<Coord<f64>>>>
    where
        F: Fn(usize, usize) -> bool,
    {
        let object = self.object(name)?;
        let mut geometries_by_arc: BTreeMap<usize, Vec<usize>> = BTreeMap::new();

        for (g, geometry) in self.members(object).into_iter().enumerate() {
            for reference in geometry.arc_indices()? {
                let index = arc_index(reference);
                self.check_arc(index)?;
                geometries_by_arc.entry(index).or_default().push(g);
            }
        }

        let mut stitcher = Stitcher::default();
        for (index, geometries) in &geometries_by_arc {
            let (Some(&first), Some(&last)) = (geometries.first(), geometries.last()) else {
                continue;
            };
            if filter(first, last) {
                stitcher.add(&self.arcs[*index]);
            }
        }
        Ok(stitcher.finish())
    }

    /// Assembles rings from lists of arc references.
    fn rings(&self, rings: &[Vec<i64>]) -> Result<Vec<Vec<Coord<f64>>>> {
        rings
            .iter()
            .map(|refs| self.line(refs))
            .filter(|ring| !matches!(ring, Ok(points) if points.is_empty()))
            .collect()
    }

    /// Concatenates arcs, dropping the point shared by consecutive arcs.
    fn line(&self, refs: &[i64]) -> Result<Vec<Coord<f64>>> {
        let mut points: Vec<Coord<f64>> = Vec::new();
        for &reference in refs {
            let index = arc_index(reference);
            self.check_arc(index)?;
            let arc = &self.arcs[index];
            let skip = usize::from(!points.is_empty());
            if reference < 0 {
                points.extend(arc.iter().rev().skip(skip));
            } else {
                points.extend(arc.iter().skip(skip));
            }
        }
        Ok(points)
    }

    fn check_arc(&self, index: usize) -> Result<()> {
        if index < self.arcs.len() {
            Ok(())
        } else {
            Err(GlobeError::Topology(format!(
                "arc index {index} out of range ({} arcs)",
                self.arcs.len()
            )))
        }
    }
}

/// Absolute arc index for a possibly reversed reference.
fn arc_index(reference: i64) -> usize {
    if reference < 0 {
        (!reference) as usize
    } else {
        reference as usize
    }
}

/// Decodes one arc: delta-decodes quantized positions and applies the
/// transform, or copies absolute positions when there is no transform.
fn decode_arc(
    arc: &[Vec<f64>],
    transform: Option<&Transform>,
) -> std::result::Result<Vec<Coord<f64>>, String> {
    let mut out = Vec::with_capacity(arc.len());
    let (mut x, mut y) = (0.0, 0.0);
    for position in arc {
        let [px, py, ..] = position.as_slice() else {
            return Err(format!("position has {} values", position.len()));
        };
        match transform {
            Some(t) => {
                x += px;
                y += py;
                out.push(Coord {
                    x: x * t.scale[0] + t.translate[0],
                    y: y * t.scale[1] + t.translate[1],
                });
            }
            None => out.push(Coord { x: *px, y: *py }),
        }
    }
    Ok(out)
}

type PointKey = (u64, u64);

fn point_key(c: Coord<f64>) -> PointKey {
    // Adding zero folds -0.0 into 0.0 so both hash alike.
    ((c.x + 0.0).to_bits(), (c.y + 0.0).to_bits())
}

/// Joins lines that share endpoints into longer lines.
#[derive(Default)]
struct Stitcher {
    fragments: Vec<Option<Vec<Coord<f64>>>>,
    by_start: HashMap<PointKey, usize>,
    by_end: HashMap<PointKey, usize>,
}

impl Stitcher {
    fn add(&mut self, line: &[Coord<f64>]) {
        let (Some(&first), Some(&last)) = (line.first(), line.last()) else {
            return;
        };
        let (start, end) = (point_key(first), point_key(last));

        if let Some(f) = self.by_end.remove(&start) {
            // Extends fragment `f` at its end.
            let Some(fragment) = self.fragments[f].as_mut() else {
                return;
            };
            fragment.extend_from_slice(&line[1..]);

            match self.by_start.get(&end).copied() {
                Some(g) if g == f => {
                    // Closed into a ring; nothing left to join.
                    self.by_start.remove(&end);
                }
                Some(g) => {
                    self.by_start.remove(&end);
                    if let Some(tail) = self.fragments[g].take() {
                        if let Some(last) = tail.last() {
                            self.by_end.insert(point_key(*last), f);
                        }
                        if let Some(fragment) = self.fragments[f].as_mut() {
                            fragment.extend_from_slice(&tail[1..]);
                        }
                    }
                }
                None => {
                    self.by_end.insert(end, f);
                }
            }
        } else if let Some(g) = self.by_start.remove(&end) {
            // Prepends to fragment `g`.
            if let Some(fragment) = self.fragments[g].as_mut() {
                let mut joined = line.to_vec();
                joined.extend_from_slice(&fragment[1..]);
                *fragment = joined;
            }
            self.by_start.insert(start, g);
        } else {
            let index = self.fragments.len();
            self.fragments.push(Some(line.to_vec()));
            if start != end {
                self.by_start.insert(start, index);
                self.by_end.insert(end, index);
            }
        }
    }

    fn finish(self) -> Vec<Vec<Coord<f64>>> {
        self.fragments.into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::test_data::TWO_SQUARES;

    fn c(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    #[test]
    fn test_quantized_arcs_are_delta_decoded() {
        let topology = Topology::from_json(TWO_SQUARES).unwrap();
        assert_eq!(topology.arc_count(), 3);
        assert_eq!(
            topology.arcs[1],
            vec![c(1.0, 1.0), c(0.0, 1.0), c(0.0, 0.0), c(1.0, 0.0)]
        );
    }

    #[test]
    fn test_transform_scale_and_translate() {
        let json = r#"{
            "type": "Topology",
            "transform": {"scale": [0.5, 2], "translate": [-10, 5]},
            "arcs": [[[2, 1], [2, 1]]],
            "objects": {}
        }"#;
        let topology = Topology::from_json(json).unwrap();
        assert_eq!(topology.arcs[0], vec![c(-9.0, 7.0), c(-8.0, 9.0)]);
    }

    #[test]
    fn test_untransformed_arcs_are_absolute() {
        let json = r#"{
            "type": "Topology",
            "arcs": [[[10, 20], [11, 21]]],
            "objects": {}
        }"#;
        let topology = Topology::from_json(json).unwrap();
        assert_eq!(topology.arcs[0], vec![c(10.0, 20.0), c(11.0, 21.0)]);
    }

    #[test]
    fn test_features_join_arcs_and_reverse() {
        let topology = Topology::from_json(TWO_SQUARES).unwrap();
        let features = topology.features("countries").unwrap();
        assert_eq!(features.len(), 2);

        let GeoFeature::Polygon { exterior, label, id, .. } = &features[1] else {
            panic!("expected polygon");
        };
        assert_eq!(label.as_deref(), Some("East"));
        assert_eq!(id.as_deref(), Some("2"));
        // Arc 2 then arc 0 reversed; the joint point appears once.
        assert_eq!(
            exterior,
            &vec![c(1.0, 0.0), c(2.0, 0.0), c(2.0, 1.0), c(1.0, 1.0), c(1.0, 0.0)]
        );
        assert_eq!(features[0].label(), Some("West"));
    }

    #[test]
    fn test_mesh_keeps_only_shared_borders() {
        let topology = Topology::from_json(TWO_SQUARES).unwrap();
        let mesh = topology.mesh("countries", |a, b| a != b).unwrap();
        assert_eq!(mesh, vec![vec![c(1.0, 0.0), c(1.0, 1.0)]]);
    }

    #[test]
    fn test_mesh_without_filter_stitches_everything() {
        let topology = Topology::from_json(TWO_SQUARES).unwrap();
        let mesh = topology.mesh("countries", |_, _| true).unwrap();
        let points: usize = mesh.iter().map(Vec::len).sum();
        assert!(mesh.len() < 3, "arcs sharing endpoints should be joined");
        assert!(points >= 8);
    }

    #[test]
    fn test_missing_object() {
        let topology = Topology::from_json(TWO_SQUARES).unwrap();
        let err = topology.features("land").unwrap_err();
        assert!(matches!(err, GlobeError::MissingObject(name) if name == "land"));
    }

    #[test]
    fn test_rejects_non_topology() {
        let err = Topology::from_json(r#"{"type": "FeatureCollection", "arcs": [], "objects": {}}"#)
            .unwrap_err();
        assert!(matches!(err, GlobeError::Topology(_)));
    }

    #[test]
    fn test_out_of_range_arc() {
        let json = r#"{
            "type": "Topology",
            "arcs": [],
            "objects": {"countries": {"type": "Polygon", "arcs": [[3]]}}
        }"#;
        let topology = Topology::from_json(json).unwrap();
        assert!(topology.features("countries").is_err());
    }
}
