//! Sample scene files for testing and demonstration.
//!
//! Coordinates are Web Mercator meters around the Colombian Amazon, the
//! region the source deployments cover.

/// One territory polygon, a river line, and a settlement point.
pub fn territory_scene() -> &'static str {
    r##"{
    "view": { "center_x": -7850000.0, "center_y": -120000.0, "resolution": 120.0 },
    "layers": [
        {
            "name": "Resguardo",
            "color": [46, 125, 50],
            "geometry": [
                { "type": "polygon", "ring": [
                    [-7880000.0, -150000.0],
                    [-7820000.0, -155000.0],
                    [-7805000.0, -100000.0],
                    [-7860000.0, -85000.0],
                    [-7895000.0, -120000.0]
                ] }
            ]
        },
        {
            "name": "Río Caquetá",
            "color": [21, 101, 192],
            "geometry": [
                { "type": "line", "points": [
                    [-7900000.0, -90000.0],
                    [-7855000.0, -110000.0],
                    [-7810000.0, -125000.0],
                    [-7790000.0, -160000.0]
                ] }
            ]
        },
        {
            "name": "Comunidades",
            "color": [198, 40, 40],
            "geometry": [
                { "type": "point", "at": [-7850000.0, -118000.0] },
                { "type": "point", "at": [-7832000.0, -131000.0] }
            ]
        }
    ]
}"##
}

/// Single visible layer, nothing else. The smallest scene that exercises
/// the full pipeline.
pub fn minimal_scene() -> &'static str {
    r##"{
    "view": { "center_x": 0.0, "center_y": 0.0, "resolution": 10.0 },
    "layers": [
        {
            "name": "Zona",
            "color": [120, 90, 60],
            "geometry": [
                { "type": "polygon", "ring": [
                    [-2000.0, -1500.0], [2000.0, -1500.0], [2000.0, 1500.0], [-2000.0, 1500.0]
                ] }
            ]
        }
    ]
}"##
}

/// A scene with one hidden layer, for legend filtering checks.
pub fn mixed_visibility_scene() -> &'static str {
    r##"{
    "view": { "center_x": 500.0, "center_y": 500.0, "resolution": 2.0 },
    "layers": [
        {
            "name": "Visible",
            "color": [0, 100, 0],
            "geometry": [ { "type": "point", "at": [500.0, 500.0] } ]
        },
        {
            "name": "Oculta",
            "color": [100, 0, 0],
            "visible": false,
            "geometry": [ { "type": "point", "at": [400.0, 400.0] } ]
        }
    ]
}"##
}
