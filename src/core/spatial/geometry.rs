// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory geometry model.
//!
//! Geometries are plain values: every nested member carries the SRID of its
//! container, and the recursive helpers on [`Geometry`] rebuild the whole
//! tree rather than mutating in place.

use crate::query_api::definition::attribute::Type as ApiAttributeType;

/// Flat Cartesian plane.
pub const CARTESIAN_SRID: u32 = 0;
/// WGS 84, coordinates stored as (lat, long).
pub const GEOSPATIAL_SRID: u32 = 4326;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub srid: u32,
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(srid: u32, x: f64, y: f64) -> Self {
        Self { srid, x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineString {
    pub srid: u32,
    pub points: Vec<Point>,
}

impl LineString {
    pub fn new(srid: u32, points: Vec<Point>) -> Self {
        Self { srid, points }
    }

    /// A closed line of at least four points, the only shape allowed as a
    /// polygon ring.
    pub fn is_linear_ring(&self) -> bool {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) if self.points.len() >= 4 => {
                first.x == last.x && first.y == last.y
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    pub srid: u32,
    pub lines: Vec<LineString>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MultiPoint {
    pub srid: u32,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MultiLineString {
    pub srid: u32,
    pub lines: Vec<LineString>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MultiPolygon {
    pub srid: u32,
    pub polygons: Vec<Polygon>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeomColl {
    pub srid: u32,
    pub geoms: Vec<Geometry>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Point),
    LineString(LineString),
    Polygon(Polygon),
    MultiPoint(MultiPoint),
    MultiLineString(MultiLineString),
    MultiPolygon(MultiPolygon),
    GeomColl(GeomColl),
}

/// Geometry kinds, numbered by their WKB type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point = 1,
    LineString = 2,
    Polygon = 3,
    MultiPoint = 4,
    MultiLineString = 5,
    MultiPolygon = 6,
    GeometryCollection = 7,
}

impl GeometryKind {
    pub fn from_wkb_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(GeometryKind::Point),
            2 => Some(GeometryKind::LineString),
            3 => Some(GeometryKind::Polygon),
            4 => Some(GeometryKind::MultiPoint),
            5 => Some(GeometryKind::MultiLineString),
            6 => Some(GeometryKind::MultiPolygon),
            7 => Some(GeometryKind::GeometryCollection),
            _ => None,
        }
    }

    #[inline]
    pub const fn wkb_code(self) -> u32 {
        self as u32
    }

    pub const fn wkt_name(self) -> &'static str {
        match self {
            GeometryKind::Point => "POINT",
            GeometryKind::LineString => "LINESTRING",
            GeometryKind::Polygon => "POLYGON",
            GeometryKind::MultiPoint => "MULTIPOINT",
            GeometryKind::MultiLineString => "MULTILINESTRING",
            GeometryKind::MultiPolygon => "MULTIPOLYGON",
            GeometryKind::GeometryCollection => "GEOMETRYCOLLECTION",
        }
    }

    pub const fn geojson_name(self) -> &'static str {
        match self {
            GeometryKind::Point => "Point",
            GeometryKind::LineString => "LineString",
            GeometryKind::Polygon => "Polygon",
            GeometryKind::MultiPoint => "MultiPoint",
            GeometryKind::MultiLineString => "MultiLineString",
            GeometryKind::MultiPolygon => "MultiPolygon",
            GeometryKind::GeometryCollection => "GeometryCollection",
        }
    }

    pub const fn attribute_type(self) -> ApiAttributeType {
        match self {
            GeometryKind::Point => ApiAttributeType::POINT,
            GeometryKind::LineString => ApiAttributeType::LINESTRING,
            GeometryKind::Polygon => ApiAttributeType::POLYGON,
            GeometryKind::MultiPoint => ApiAttributeType::MULTIPOINT,
            GeometryKind::MultiLineString => ApiAttributeType::MULTILINESTRING,
            GeometryKind::MultiPolygon => ApiAttributeType::MULTIPOLYGON,
            GeometryKind::GeometryCollection => ApiAttributeType::GEOMETRYCOLLECTION,
        }
    }
}

/// Axis-aligned extent of a geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    fn from_point(p: &Point) -> Self {
        Self {
            min_x: p.x,
            min_y: p.y,
            max_x: p.x,
            max_y: p.y,
        }
    }

    fn extend(&mut self, p: &Point) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point(_) => GeometryKind::Point,
            Geometry::LineString(_) => GeometryKind::LineString,
            Geometry::Polygon(_) => GeometryKind::Polygon,
            Geometry::MultiPoint(_) => GeometryKind::MultiPoint,
            Geometry::MultiLineString(_) => GeometryKind::MultiLineString,
            Geometry::MultiPolygon(_) => GeometryKind::MultiPolygon,
            Geometry::GeomColl(_) => GeometryKind::GeometryCollection,
        }
    }

    pub fn srid(&self) -> u32 {
        match self {
            Geometry::Point(g) => g.srid,
            Geometry::LineString(g) => g.srid,
            Geometry::Polygon(g) => g.srid,
            Geometry::MultiPoint(g) => g.srid,
            Geometry::MultiLineString(g) => g.srid,
            Geometry::MultiPolygon(g) => g.srid,
            Geometry::GeomColl(g) => g.srid,
        }
    }

    /// Copy of this geometry with `srid` stamped on every nested member.
    pub fn with_srid(&self, srid: u32) -> Geometry {
        self.rebuild(srid, &|p: Point| p)
    }

    /// Copy of this geometry with X and Y exchanged in every coordinate.
    pub fn swap_axes(&self) -> Geometry {
        self.rebuild(self.srid(), &|p: Point| Point::new(p.srid, p.y, p.x))
    }

    /// Topological dimension; `None` for a collection with no dimensional
    /// member.
    pub fn dimension(&self) -> Option<i32> {
        match self {
            Geometry::Point(_) | Geometry::MultiPoint(_) => Some(0),
            Geometry::LineString(_) | Geometry::MultiLineString(_) => Some(1),
            Geometry::Polygon(_) | Geometry::MultiPolygon(_) => Some(2),
            Geometry::GeomColl(c) => c.geoms.iter().filter_map(Geometry::dimension).max(),
        }
    }

    /// Extent over every coordinate; `None` when the geometry holds none.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let mut bbox: Option<BoundingBox> = None;
        self.for_each_point(&mut |p: &Point| match bbox.as_mut() {
            Some(b) => b.extend(p),
            None => bbox = Some(BoundingBox::from_point(p)),
        });
        bbox
    }

    pub fn for_each_point(&self, visit: &mut dyn FnMut(&Point)) {
        match self {
            Geometry::Point(p) => visit(p),
            Geometry::LineString(l) => l.points.iter().for_each(|p| visit(p)),
            Geometry::Polygon(poly) => poly
                .lines
                .iter()
                .flat_map(|l| l.points.iter())
                .for_each(|p| visit(p)),
            Geometry::MultiPoint(mp) => mp.points.iter().for_each(|p| visit(p)),
            Geometry::MultiLineString(ml) => ml
                .lines
                .iter()
                .flat_map(|l| l.points.iter())
                .for_each(|p| visit(p)),
            Geometry::MultiPolygon(mp) => mp
                .polygons
                .iter()
                .flat_map(|poly| poly.lines.iter())
                .flat_map(|l| l.points.iter())
                .for_each(|p| visit(p)),
            Geometry::GeomColl(c) => c.geoms.iter().for_each(|g| g.for_each_point(visit)),
        }
    }

    fn rebuild(&self, srid: u32, map: &dyn Fn(Point) -> Point) -> Geometry {
        let point = |p: &Point| Point { srid, ..map(*p) };
        let line = |l: &LineString| LineString::new(srid, l.points.iter().map(point).collect());
        let polygon = |poly: &Polygon| Polygon {
            srid,
            lines: poly.lines.iter().map(line).collect(),
        };
        match self {
            Geometry::Point(p) => Geometry::Point(point(p)),
            Geometry::LineString(l) => Geometry::LineString(line(l)),
            Geometry::Polygon(poly) => Geometry::Polygon(polygon(poly)),
            Geometry::MultiPoint(mp) => Geometry::MultiPoint(MultiPoint {
                srid,
                points: mp.points.iter().map(point).collect(),
            }),
            Geometry::MultiLineString(ml) => Geometry::MultiLineString(MultiLineString {
                srid,
                lines: ml.lines.iter().map(line).collect(),
            }),
            Geometry::MultiPolygon(mp) => Geometry::MultiPolygon(MultiPolygon {
                srid,
                polygons: mp.polygons.iter().map(polygon).collect(),
            }),
            Geometry::GeomColl(c) => Geometry::GeomColl(GeomColl {
                srid,
                geoms: c.geoms.iter().map(|g| g.rebuild(srid, map)).collect(),
            }),
        }
    }
}

impl From<Point> for Geometry {
    fn from(p: Point) -> Self {
        Geometry::Point(p)
    }
}

impl From<LineString> for Geometry {
    fn from(l: LineString) -> Self {
        Geometry::LineString(l)
    }
}

impl From<Polygon> for Geometry {
    fn from(p: Polygon) -> Self {
        Geometry::Polygon(p)
    }
}
