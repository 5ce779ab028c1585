// SPDX-License-Identifier: MIT OR Apache-2.0
//
// WKB Function Tests
// Reference: MySQL 8.0 manual, "Functions That Create Geometry Values from
//            WKB Values" and "Geometry Format Conversion Functions"

use embersql_rust::core::spatial::{Geometry, LineString, Point, Polygon};
use embersql_rust::{AttributeValue, EmberError};

use super::common::*;

fn geometry(value: AttributeValue) -> Geometry {
    match value {
        AttributeValue::Geometry(g) => g,
        other => panic!("expected a geometry, got {other:?}"),
    }
}

/// Reference: ST_AsWKB(POINT(1, 2))
#[test]
fn wkb_point_encoding_is_bit_exact() {
    let engine = engine();
    let p = eval_once(&engine, "point", vec![int(1), int(2)]);
    let wkb = eval_once(&engine, "st_aswkb", vec![p.clone()]);
    assert_eq!(to_hex(&wkb), POINT_1_2);
    assert_eq!(eval_once(&engine, "st_asbinary", vec![p]), wkb);

    let decoded = eval_once(&engine, "st_geomfromwkb", vec![blob(POINT_1_2)]);
    assert_eq!(geometry(decoded), Geometry::Point(Point::new(0, 1.0, 2.0)));
}

/// Big-endian input decodes to the same point and re-encodes little-endian.
#[test]
fn wkb_big_endian_decode() {
    let engine = engine();
    let decoded = eval_once(&engine, "ST_GeomFromWKB", vec![blob(POINT_1_2_BE)]);
    assert_eq!(geometry(decoded.clone()), Geometry::Point(Point::new(0, 1.0, 2.0)));
    assert_eq!(to_hex(&eval_once(&engine, "st_aswkb", vec![decoded])), POINT_1_2);
}

/// Big-endian line and polygon counts decode like their little-endian twins.
#[test]
fn wkb_big_endian_line_and_polygon() {
    let engine = engine();
    let cases = [
        ("st_linefromwkb", LINE_1_2_3_4_BE, LINE_1_2_3_4),
        ("st_polyfromwkb", POLYGON_TRIANGLE_BE, POLYGON_TRIANGLE),
        ("st_geomfromwkb", LINE_1_2_3_4_BE, LINE_1_2_3_4),
        ("st_geomfromwkb", POLYGON_TRIANGLE_BE, POLYGON_TRIANGLE),
    ];
    for (function, big, little) in cases {
        let from_big = eval_once(&engine, function, vec![blob(big)]);
        let from_little = eval_once(&engine, function, vec![blob(little)]);
        assert_eq!(from_big, from_little, "{function} {big}");
        assert_eq!(to_hex(&eval_once(&engine, "st_aswkb", vec![from_big])), little);
    }
}

/// Every fixture survives decode then encode unchanged.
#[test]
fn wkb_round_trip_all_kinds() {
    let engine = engine();
    for fixture in [
        POINT_1_2,
        POINT_NEGATIVE,
        LINE_1_2_3_4,
        POLYGON_TRIANGLE,
        MULTIPOINT_2,
        MULTILINE_1,
        MULTIPOLYGON_1,
        EMPTY_COLLECTION,
    ] {
        let decoded = eval_once(&engine, "st_geomfromwkb", vec![blob(fixture)]);
        let encoded = eval_once(&engine, "st_aswkb", vec![decoded]);
        assert_eq!(to_hex(&encoded), fixture);
    }
}

/// Type-specific decoders accept their own kind and its alias.
#[test]
fn wkb_type_specific_decoders() {
    let engine = engine();
    let cases = [
        ("st_pointfromwkb", POINT_NEGATIVE),
        ("st_linefromwkb", LINE_1_2_3_4),
        ("st_linestringfromwkb", LINE_1_2_3_4),
        ("st_polyfromwkb", POLYGON_TRIANGLE),
        ("st_polygonfromwkb", POLYGON_TRIANGLE),
        ("st_mpointfromwkb", MULTIPOINT_2),
        ("st_multipointfromwkb", MULTIPOINT_2),
        ("st_mlinefromwkb", MULTILINE_1),
        ("st_multilinestringfromwkb", MULTILINE_1),
        ("st_mpolyfromwkb", MULTIPOLYGON_1),
        ("st_multipolygonfromwkb", MULTIPOLYGON_1),
        ("st_geomcollfromwkb", EMPTY_COLLECTION),
        ("st_geometrycollectionfromwkb", EMPTY_COLLECTION),
        ("st_geometryfromwkb", POLYGON_TRIANGLE),
    ];
    for (function, fixture) in cases {
        let value = eval_once(&engine, function, vec![blob(fixture)]);
        assert!(
            matches!(value, AttributeValue::Geometry(_)),
            "{function} returned {value:?}"
        );
    }

    let negative = eval_once(&engine, "st_pointfromwkb", vec![blob(POINT_NEGATIVE)]);
    assert_eq!(geometry(negative), Geometry::Point(Point::new(0, -123.45, 678.9)));
}

/// Reference: ST_PointFromWKB on a LineString blob fails
#[test]
fn wkb_type_mismatch_is_rejected() {
    let engine = engine();
    let ctx = engine.open_session();
    let err = try_eval(&engine, &ctx, "st_pointfromwkb", vec![blob(LINE_1_2_3_4)]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid GIS data provided to function ST_PointFromWKB."
    );
    assert!(matches!(
        try_eval(&engine, &ctx, "st_mpolyfromwkb", vec![blob(MULTIPOINT_2)]),
        Err(EmberError::InvalidGisData { .. })
    ));
}

/// A polygon ring must be closed; the decoder does not repair it.
#[test]
fn wkb_polygon_ring_validation() {
    let engine = engine();
    let ctx = engine.open_session();
    let closed = eval(&engine, &ctx, "st_polyfromwkb", vec![blob(POLYGON_TRIANGLE)]);
    let ring = LineString::new(
        0,
        vec![
            Point::new(0, 0.0, 0.0),
            Point::new(0, 1.0, 1.0),
            Point::new(0, 1.0, 0.0),
            Point::new(0, 0.0, 0.0),
        ],
    );
    assert_eq!(
        geometry(closed),
        Geometry::Polygon(Polygon {
            srid: 0,
            lines: vec![ring],
        })
    );

    // last point moved off the first: (0 0, 1 1, 1 0, 0 1)
    let mut open = hex::decode(POLYGON_TRIANGLE).unwrap();
    let last_y = open.len() - 8;
    open[last_y..].copy_from_slice(&1.0f64.to_le_bytes());
    assert!(matches!(
        try_eval(&engine, &ctx, "st_polyfromwkb", vec![AttributeValue::Bytes(open)]),
        Err(EmberError::InvalidGisData { .. })
    ));
}

/// Short, truncated, trailing and forged-count blobs all fail cleanly.
#[test]
fn wkb_malformed_input() {
    let engine = engine();
    let ctx = engine.open_session();
    let line = hex::decode(LINE_1_2_3_4).unwrap();

    let mut trailing = hex::decode(POINT_1_2).unwrap();
    trailing.push(0);
    let mut forged = line.clone();
    forged[5..9].copy_from_slice(&u32::MAX.to_le_bytes());

    let bad_inputs = vec![
        vec![],
        vec![1, 1, 0, 0],
        line[..line.len() - 1].to_vec(),
        trailing,
        forged,
        hex::decode("0109000000").unwrap(),
    ];
    for input in bad_inputs {
        let args = vec![AttributeValue::Bytes(input.clone())];
        let result = try_eval(&engine, &ctx, "st_geomfromwkb", args);
        assert!(
            matches!(result, Err(EmberError::InvalidGisData { .. })),
            "{input:02X?} gave {result:?}"
        );
    }

    assert!(matches!(
        try_eval(&engine, &ctx, "st_aswkb", vec![s("POINT(1 2)")]),
        Err(EmberError::InvalidGisData { .. })
    ));
}

/// Deeply nested collections are rejected as invalid data instead of
/// exhausting the stack.
#[test]
fn wkb_nested_collections_are_bounded() {
    let engine = engine();
    let ctx = engine.open_session();
    let nested = |depth: usize| {
        let mut bytes = hex::decode("010700000001000000").unwrap().repeat(depth);
        bytes.truncate(bytes.len() - 4);
        bytes.extend_from_slice(&0u32.to_le_bytes());
        AttributeValue::Bytes(bytes)
    };

    let shallow = eval(&engine, &ctx, "st_geomfromwkb", vec![nested(3)]);
    assert_eq!(
        eval(&engine, &ctx, "st_astext", vec![shallow]),
        s("GEOMETRYCOLLECTION(GEOMETRYCOLLECTION(GEOMETRYCOLLECTION()))")
    );

    for depth in [65, 5_000, 50_000] {
        for function in ["st_geomfromwkb", "st_geomcollfromwkb"] {
            assert!(
                matches!(
                    try_eval(&engine, &ctx, function, vec![nested(depth)]),
                    Err(EmberError::InvalidGisData { .. })
                ),
                "{function} at depth {depth}"
            );
        }
    }
}

/// NULL in any position wins over malformed data in another.
#[test]
fn wkb_null_short_circuit() {
    let engine = engine();
    let garbage = AttributeValue::Bytes(vec![0xde, 0xad]);
    let cases = vec![
        vec![AttributeValue::Null],
        vec![AttributeValue::Null, int(1234)],
        vec![garbage.clone(), AttributeValue::Null],
        vec![garbage.clone(), int(1234), AttributeValue::Null],
        vec![blob(POINT_1_2), int(0), AttributeValue::Null],
    ];
    for args in cases {
        assert_eq!(eval_once(&engine, "st_geomfromwkb", args), AttributeValue::Null);
    }
    assert_eq!(eval_once(&engine, "st_aswkb", vec![AttributeValue::Null]), AttributeValue::Null);
}

/// Reference: ST_GeomFromWKB(wkb, 4326, 'axis-order=long-lat')
#[test]
fn wkb_srid_and_axis_order() {
    let engine = engine();
    let ctx = engine.open_session();

    let geo = eval(&engine, &ctx, "st_geomfromwkb", vec![blob(POINT_1_2), int(4326)]);
    assert_eq!(geometry(geo.clone()), Geometry::Point(Point::new(4326, 1.0, 2.0)));
    assert_eq!(eval(&engine, &ctx, "st_srid", vec![geo]), AttributeValue::UInt(4326));

    let swapped = eval(
        &engine,
        &ctx,
        "st_geomfromwkb",
        vec![blob(LINE_1_2_3_4), int(4326), s("axis-order=long-lat")],
    );
    assert_eq!(eval(&engine, &ctx, "st_aswkt", vec![swapped]), s("LINESTRING(2 1,4 3)"));

    for kept in ["axis-order=lat-long", "axis-order=srid-defined", " AXIS-ORDER = LAT-LONG "] {
        let p = eval(
            &engine,
            &ctx,
            "st_geomfromwkb",
            vec![blob(POINT_1_2), int(4326), s(kept)],
        );
        assert_eq!(geometry(p), Geometry::Point(Point::new(4326, 1.0, 2.0)), "{kept}");
    }

    assert!(matches!(
        try_eval(&engine, &ctx, "st_geomfromwkb", vec![blob(POINT_1_2), int(3857)]),
        Err(EmberError::InvalidSrid { srid: 3857 })
    ));
    assert!(matches!(
        try_eval(
            &engine,
            &ctx,
            "st_geomfromwkb",
            vec![blob(POINT_1_2), int(4326), s("axis-order=up-down")]
        ),
        Err(EmberError::InvalidArgument { .. })
    ));
}

/// One compiled executor evaluated over several rows, reading its arguments
/// from columns.
#[test]
fn wkb_decoder_over_rows() {
    use embersql_rust::core::executor::{ExpressionExecutor, VariableExpressionExecutor};
    use embersql_rust::query_api::definition::Type;

    let engine = engine();
    let ctx = engine.open_session();
    let args: Vec<Box<dyn ExpressionExecutor>> = vec![
        Box::new(VariableExpressionExecutor::new(0, Type::BLOB, "shape")),
        Box::new(VariableExpressionExecutor::new(1, Type::LONG, "srid")),
    ];
    let decoder = engine.build_function("st_geomfromwkb", args).unwrap();
    let wkt = engine.build_function("st_astext", vec![decoder]).unwrap();

    let rows = vec![
        (vec![blob(POINT_1_2), int(0)], s("POINT(1 2)")),
        (vec![blob(LINE_1_2_3_4), int(4326)], s("LINESTRING(1 2,3 4)")),
        (vec![AttributeValue::Null, int(0)], AttributeValue::Null),
    ];
    for (row, expected) in rows {
        assert_eq!(wkt.execute(&ctx, &row).unwrap(), expected);
    }

    assert!(matches!(
        wkt.execute(&ctx, &vec![blob(POINT_1_2)]),
        Err(EmberError::Runtime { .. })
    ));
}
