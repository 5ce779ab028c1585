// SPDX-License-Identifier: MIT OR Apache-2.0

//! GeoJSON rendering for `ST_ASGEOJSON`.

use serde_json::{json, Map, Value};

use super::geometry::{Geometry, LineString, Point, Polygon, CARTESIAN_SRID};

/// Highest number of decimal digits kept after rounding.
pub const MAX_PRECISION: u32 = 17;

pub const FLAG_BBOX: u8 = 1;
pub const FLAG_SHORT_CRS: u8 = 2;
pub const FLAG_LONG_CRS: u8 = 4;
pub const MAX_FLAGS: u8 = FLAG_BBOX | FLAG_SHORT_CRS | FLAG_LONG_CRS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GeoJsonOptions {
    /// Decimal digits to round coordinates to; `None` keeps them as stored.
    pub precision: Option<u32>,
    pub flags: u8,
}

impl GeoJsonOptions {
    pub fn with_precision(precision: u32) -> Self {
        Self {
            precision: Some(precision.min(MAX_PRECISION)),
            flags: 0,
        }
    }
}

const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

struct Rounder(Option<f64>);

impl Rounder {
    fn round(&self, v: f64) -> f64 {
        match self.0 {
            Some(scale) => {
                let scaled = v * scale;
                // past 2^53 every f64 is already an integer
                if !scaled.is_finite() || scaled.abs() >= MAX_EXACT_INTEGER {
                    v
                } else {
                    scaled.round() / scale
                }
            }
            None => v,
        }
    }

    fn coords(&self, p: &Point) -> Value {
        json!([self.round(p.x), self.round(p.y)])
    }

    fn points(&self, points: &[Point]) -> Value {
        Value::Array(points.iter().map(|p| self.coords(p)).collect())
    }

    fn lines(&self, lines: &[LineString]) -> Value {
        Value::Array(lines.iter().map(|l| self.points(&l.points)).collect())
    }

    fn polygons(&self, polygons: &[Polygon]) -> Value {
        Value::Array(polygons.iter().map(|p| self.lines(&p.lines)).collect())
    }
}

/// Builds the GeoJSON object for `geom`. Flags apply to the top-level object
/// only; collection members carry just `type` and `coordinates`.
pub fn to_geojson(geom: &Geometry, options: &GeoJsonOptions) -> Value {
    let rounder = Rounder(
        options
            .precision
            .map(|p| 10f64.powi(p.min(MAX_PRECISION) as i32)),
    );
    let mut obj = render(geom, &rounder);

    if options.flags & FLAG_BBOX != 0 {
        if let Some(bbox) = geom.bounding_box() {
            obj.insert(
                "bbox".to_string(),
                json!([
                    rounder.round(bbox.min_x),
                    rounder.round(bbox.min_y),
                    rounder.round(bbox.max_x),
                    rounder.round(bbox.max_y)
                ]),
            );
        }
    }

    let srid = geom.srid();
    if srid != CARTESIAN_SRID && options.flags & (FLAG_SHORT_CRS | FLAG_LONG_CRS) != 0 {
        let name = if options.flags & FLAG_LONG_CRS != 0 {
            format!("urn:ogc:def:crs:EPSG::{srid}")
        } else {
            format!("EPSG:{srid}")
        };
        obj.insert(
            "crs".to_string(),
            json!({ "type": "name", "properties": { "name": name } }),
        );
    }

    Value::Object(obj)
}

fn render(geom: &Geometry, rounder: &Rounder) -> Map<String, Value> {
    let mut obj = Map::new();
    obj.insert(
        "type".to_string(),
        Value::String(geom.kind().geojson_name().to_string()),
    );
    let body = match geom {
        Geometry::Point(p) => ("coordinates", rounder.coords(p)),
        Geometry::LineString(l) => ("coordinates", rounder.points(&l.points)),
        Geometry::Polygon(p) => ("coordinates", rounder.lines(&p.lines)),
        Geometry::MultiPoint(mp) => ("coordinates", rounder.points(&mp.points)),
        Geometry::MultiLineString(ml) => ("coordinates", rounder.lines(&ml.lines)),
        Geometry::MultiPolygon(mp) => ("coordinates", rounder.polygons(&mp.polygons)),
        Geometry::GeomColl(c) => (
            "geometries",
            Value::Array(
                c.geoms
                    .iter()
                    .map(|g| Value::Object(render(g, rounder)))
                    .collect(),
            ),
        ),
    };
    obj.insert(body.0.to_string(), body.1);
    obj
}
