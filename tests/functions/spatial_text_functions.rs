// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Spatial Text and Property Function Tests
// Reference: MySQL 8.0 manual, ST_AsText, ST_AsGeoJSON, ST_Dimension,
//            ST_SRID, ST_SwapXY and the Point/LineString/Polygon constructors

use embersql_rust::{AttributeValue, EmberError};
use serde_json::json;

use super::common::*;

fn json_of(value: AttributeValue) -> serde_json::Value {
    match value {
        AttributeValue::Json(v) => v,
        other => panic!("expected json, got {other:?}"),
    }
}

/// Reference: ST_AsText for every kind decoded from WKB
#[test]
fn wkt_rendering() {
    let engine = engine();
    let cases = [
        (POINT_1_2, "POINT(1 2)"),
        (POINT_NEGATIVE, "POINT(-123.45 678.9)"),
        (LINE_1_2_3_4, "LINESTRING(1 2,3 4)"),
        (POLYGON_TRIANGLE, "POLYGON((0 0,1 1,1 0,0 0))"),
        (MULTIPOINT_2, "MULTIPOINT(1 2,3 4)"),
        (MULTILINE_1, "MULTILINESTRING((0 0,1 1,2 2))"),
        (MULTIPOLYGON_1, "MULTIPOLYGON(((0 0,1 0,1 1,0 0)))"),
        (EMPTY_COLLECTION, "GEOMETRYCOLLECTION()"),
    ];
    for (fixture, expected) in cases {
        let g = eval_once(&engine, "st_geomfromwkb", vec![blob(fixture)]);
        assert_eq!(eval_once(&engine, "st_astext", vec![g.clone()]), s(expected));
        assert_eq!(eval_once(&engine, "st_aswkt", vec![g]), s(expected));
    }
}

/// Constructors build the same values the decoder produces.
#[test]
fn constructors_match_decoded_values() {
    let engine = engine();
    let ctx = engine.open_session();
    let p = |x: i64, y: i64| eval(&engine, &ctx, "point", vec![int(x), int(y)]);

    let ring = eval(
        &engine,
        &ctx,
        "linestring",
        vec![p(0, 0), p(1, 1), p(1, 0), p(0, 0)],
    );
    let poly = eval(&engine, &ctx, "polygon", vec![ring]);
    assert_eq!(
        to_hex(&eval(&engine, &ctx, "st_aswkb", vec![poly])),
        POLYGON_TRIANGLE
    );

    let line = eval(&engine, &ctx, "linestring", vec![p(1, 2), p(3, 4)]);
    assert_eq!(to_hex(&eval(&engine, &ctx, "st_aswkb", vec![line.clone()])), LINE_1_2_3_4);

    assert!(matches!(
        try_eval(&engine, &ctx, "polygon", vec![line]),
        Err(EmberError::InvalidArgument { .. })
    ));
    assert!(matches!(
        try_eval(&engine, &ctx, "linestring", vec![p(1, 2)]),
        Err(EmberError::InvalidArgumentNumber { .. })
    ));
    assert!(matches!(
        try_eval(&engine, &ctx, "linestring", vec![p(1, 2), s("POINT(3 4)")]),
        Err(EmberError::IllegalArgumentType { .. })
    ));
    assert_eq!(
        eval(&engine, &ctx, "point", vec![AttributeValue::Null, int(1)]),
        AttributeValue::Null
    );
}

/// Reference: ST_AsGeoJSON(g [, max_dec_digits [, options]])
#[test]
fn geojson_rendering() {
    let engine = engine();
    let ctx = engine.open_session();
    let line = eval(&engine, &ctx, "st_geomfromwkb", vec![blob(LINE_1_2_3_4)]);

    assert_eq!(
        json_of(eval(&engine, &ctx, "st_asgeojson", vec![line.clone()])),
        json!({"type": "LineString", "coordinates": [[1.0, 2.0], [3.0, 4.0]]})
    );
    assert_eq!(
        json_of(eval(&engine, &ctx, "st_asgeojson", vec![line.clone(), int(2), int(1)])),
        json!({
            "type": "LineString",
            "coordinates": [[1.0, 2.0], [3.0, 4.0]],
            "bbox": [1.0, 2.0, 3.0, 4.0]
        })
    );

    let geo = eval(&engine, &ctx, "st_srid", vec![line.clone(), int(4326)]);
    assert_eq!(
        json_of(eval(&engine, &ctx, "st_asgeojson", vec![geo.clone(), int(0), int(2)]))["crs"],
        json!({"type": "name", "properties": {"name": "EPSG:4326"}})
    );
    assert_eq!(
        json_of(eval(&engine, &ctx, "st_asgeojson", vec![geo, int(0), int(4)]))["crs"]
            ["properties"]["name"],
        json!("urn:ogc:def:crs:EPSG::4326")
    );

    let negative = eval(&engine, &ctx, "st_geomfromwkb", vec![blob(POINT_NEGATIVE)]);
    assert_eq!(
        json_of(eval(&engine, &ctx, "st_asgeojson", vec![negative, int(0)]))["coordinates"],
        json!([-123.0, 679.0])
    );

    let huge = eval(&engine, &ctx, "point", vec![AttributeValue::Double(1e300), int(2)]);
    for precision in [0, 17] {
        let args = vec![huge.clone(), int(precision)];
        let rendered = json_of(eval(&engine, &ctx, "st_asgeojson", args));
        assert_eq!(rendered["coordinates"], json!([1e300, 2.0]));
    }

    assert!(matches!(
        try_eval(&engine, &ctx, "st_asgeojson", vec![line.clone(), int(-1)]),
        Err(EmberError::InvalidArgument { .. })
    ));
    assert!(matches!(
        try_eval(&engine, &ctx, "st_asgeojson", vec![line.clone(), int(3), int(9)]),
        Err(EmberError::InvalidArgument { .. })
    ));
    assert_eq!(
        eval(&engine, &ctx, "st_asgeojson", vec![line, AttributeValue::Null]),
        AttributeValue::Null
    );
}

/// Reference: ST_Dimension
#[test]
fn dimension_per_kind() {
    let engine = engine();
    let cases = [
        (POINT_1_2, AttributeValue::Int(0)),
        (MULTIPOINT_2, AttributeValue::Int(0)),
        (LINE_1_2_3_4, AttributeValue::Int(1)),
        (MULTILINE_1, AttributeValue::Int(1)),
        (POLYGON_TRIANGLE, AttributeValue::Int(2)),
        (MULTIPOLYGON_1, AttributeValue::Int(2)),
        (EMPTY_COLLECTION, AttributeValue::Null),
    ];
    for (fixture, expected) in cases {
        let g = eval_once(&engine, "st_geomfromwkb", vec![blob(fixture)]);
        assert_eq!(eval_once(&engine, "st_dimension", vec![g]), expected, "{fixture}");
    }
}

/// Reference: ST_SRID(g) and ST_SRID(g, srid)
#[test]
fn srid_get_and_set() {
    let engine = engine();
    let ctx = engine.open_session();
    let poly = eval(&engine, &ctx, "st_geomfromwkb", vec![blob(POLYGON_TRIANGLE)]);
    assert_eq!(eval(&engine, &ctx, "st_srid", vec![poly.clone()]), AttributeValue::UInt(0));

    let tagged = eval(&engine, &ctx, "st_srid", vec![poly.clone(), int(4326)]);
    assert_eq!(eval(&engine, &ctx, "st_srid", vec![tagged.clone()]), AttributeValue::UInt(4326));
    // the SRID travels outside the WKB body
    assert_eq!(to_hex(&eval(&engine, &ctx, "st_aswkb", vec![tagged])), POLYGON_TRIANGLE);

    assert!(matches!(
        try_eval(&engine, &ctx, "st_srid", vec![poly, int(2000)]),
        Err(EmberError::InvalidSrid { srid: 2000 })
    ));
}

/// Reference: ST_SwapXY
#[test]
fn swap_xy_is_an_involution() {
    let engine = engine();
    let ctx = engine.open_session();
    let mp = eval(&engine, &ctx, "st_geomfromwkb", vec![blob(MULTIPOINT_2)]);
    let swapped = eval(&engine, &ctx, "st_swapxy", vec![mp.clone()]);
    assert_eq!(eval(&engine, &ctx, "st_aswkt", vec![swapped.clone()]), s("MULTIPOINT(2 1,4 3)"));
    assert_eq!(eval(&engine, &ctx, "st_swapxy", vec![swapped]), mp);
}
