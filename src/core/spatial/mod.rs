// SPDX-License-Identifier: MIT OR Apache-2.0

//! Geometry values and their binary and text encodings.

pub mod geojson;
pub mod geometry;
pub mod srid;
pub mod wkb;
pub mod wkt;

pub use self::geometry::{
    BoundingBox, GeomColl, Geometry, GeometryKind, LineString, MultiLineString, MultiPoint,
    MultiPolygon, Point, Polygon, CARTESIAN_SRID, GEOSPATIAL_SRID,
};
pub use self::srid::{validate_srid, AxisOrder};
