//! Small topologies shared by the unit tests.

/// Two unit squares side by side sharing the edge x = 1.
///
/// Arc 0: shared edge (1,0) -> (1,1)
/// Arc 1: left square outline (1,1) -> (0,1) -> (0,0) -> (1,0)
/// Arc 2: right square outline (1,0) -> (2,0) -> (2,1) -> (1,1)
pub const TWO_SQUARES: &str = r#"{
    "type": "Topology",
    "transform": {"scale": [1, 1], "translate": [0, 0]},
    "arcs": [
        [[1, 0], [0, 1]],
        [[1, 1], [-1, 0], [0, -1], [1, 0]],
        [[1, 0], [1, 0], [0, 1], [-1, 0]]
    ],
    "objects": {
        "countries": {
            "type": "GeometryCollection",
            "geometries": [
                {"type": "Polygon", "arcs": [[0, 1]], "id": "001", "properties": {"name": "West"}},
                {"type": "Polygon", "arcs": [[2, -1]], "id": 2, "properties": {"name": "East"}},
                {"type": null}
            ]
        }
    }
}"#;

/// Three countries in degrees: "West" (lon -10..0) and "East" (lon 0..10)
/// share the meridian border between lat -10 and 10; "Far" sits on the
/// opposite side of the globe around lon 172. Rings wind clockwise.
pub const WORLD: &str = r#"{
    "type": "Topology",
    "transform": {"scale": [1, 1], "translate": [0, 0]},
    "arcs": [
        [[0, -10], [0, 20]],
        [[0, 10], [-10, 0], [0, -20], [10, 0]],
        [[0, -10], [10, 0], [0, 20], [-10, 0]],
        [[170, -5], [5, 0], [0, 10], [-5, 0], [0, -10]]
    ],
    "objects": {
        "countries": {
            "type": "GeometryCollection",
            "geometries": [
                {"type": "Polygon", "arcs": [[-2, -1]], "id": "1", "properties": {"name": "West"}},
                {"type": "Polygon", "arcs": [[0, -3]], "id": "2", "properties": {"name": "East"}},
                {"type": "MultiPolygon", "arcs": [[[-4]]], "id": "3", "properties": {"name": "Far"}}
            ]
        }
    }
}"#;

/// One clockwise region spanning lon -100..60 and lat -60..60, larger than
/// the visible half of the globe at the default view.
pub const CONTINENT: &str = r#"{
    "type": "Topology",
    "transform": {"scale": [1, 1], "translate": [0, 0]},
    "arcs": [
        [[-100, -60], [0, 120], [160, 0], [0, -120], [-160, 0]]
    ],
    "objects": {
        "countries": {
            "type": "GeometryCollection",
            "geometries": [
                {"type": "Polygon", "arcs": [[0]], "properties": {"name": "Continent"}}
            ]
        }
    }
}"#;

/// A ring around lon 180 wound counter-clockwise, so the region is the whole
/// globe except a small box on the far side.
pub const OCEAN: &str = r#"{
    "type": "Topology",
    "transform": {"scale": [1, 1], "translate": [0, 0]},
    "arcs": [
        [[170, -10], [20, 0], [0, 20], [-20, 0], [0, -20]]
    ],
    "objects": {
        "countries": {
            "type": "GeometryCollection",
            "geometries": [
                {"type": "Polygon", "arcs": [[0]], "properties": {"name": "Ocean"}}
            ]
        }
    }
}"#;
