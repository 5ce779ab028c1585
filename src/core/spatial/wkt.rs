// SPDX-License-Identifier: MIT OR Apache-2.0

//! Well-Known Text rendering, as produced by `ST_ASWKT`.

use std::fmt::{self, Write};

use super::geometry::{Geometry, LineString, Point, Polygon};

/// Renders `geom` as WKT, e.g. `POINT(1 2)` or `LINESTRING(1 2,3 4)`.
/// Coordinates use the shortest form that parses back to the same double.
pub fn to_wkt(geom: &Geometry) -> String {
    geom.to_string()
}

fn write_coords(f: &mut impl Write, p: &Point) -> fmt::Result {
    write!(f, "{} {}", p.x, p.y)
}

fn write_point_list(f: &mut impl Write, points: &[Point]) -> fmt::Result {
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            f.write_char(',')?;
        }
        write_coords(f, p)?;
    }
    Ok(())
}

fn write_line_list(f: &mut impl Write, lines: &[LineString]) -> fmt::Result {
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            f.write_char(',')?;
        }
        f.write_char('(')?;
        write_point_list(f, &line.points)?;
        f.write_char(')')?;
    }
    Ok(())
}

fn write_polygon_list(f: &mut impl Write, polygons: &[Polygon]) -> fmt::Result {
    for (i, poly) in polygons.iter().enumerate() {
        if i > 0 {
            f.write_char(',')?;
        }
        f.write_char('(')?;
        write_line_list(f, &poly.lines)?;
        f.write_char(')')?;
    }
    Ok(())
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind().wkt_name())?;
        f.write_char('(')?;
        match self {
            Geometry::Point(p) => write_coords(f, p)?,
            Geometry::LineString(l) => write_point_list(f, &l.points)?,
            Geometry::Polygon(p) => write_line_list(f, &p.lines)?,
            Geometry::MultiPoint(mp) => write_point_list(f, &mp.points)?,
            Geometry::MultiLineString(ml) => write_line_list(f, &ml.lines)?,
            Geometry::MultiPolygon(mp) => write_polygon_list(f, &mp.polygons)?,
            Geometry::GeomColl(c) => {
                for (i, g) in c.geoms.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }
                    write!(f, "{g}")?;
                }
            }
        }
        f.write_char(')')
    }
}
