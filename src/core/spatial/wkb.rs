// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Well-Known Binary codec
//!
//! Layout of every geometry:
//!
//! ```text
//! +------------+-------------------+------------------+
//! | order (u8) | type code (u32)   | payload          |
//! +------------+-------------------+------------------+
//! ```
//!
//! - order `0` is big-endian, anything else little-endian. The encoder
//!   always writes `1`.
//! - Point payload is X then Y as IEEE-754 doubles.
//! - LineString and Polygon payloads are a `u32` count followed by points
//!   or rings respectively. Rings carry no header.
//! - Multi-geometries and collections hold a `u32` count followed by
//!   complete WKB members, each with its own header.
//!
//! The SRID is not part of WKB. [`ewkb_encode`] and [`ewkb_decode`] handle the
//! storage layout, which prefixes the WKB with a little-endian `u32` SRID.

use crate::core::error::{EmberError, EmberResult};

use super::geometry::{
    GeomColl, Geometry, GeometryKind, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Point, Polygon,
};

pub const WKB_HEADER_SIZE: usize = 5;
pub const SRID_SIZE: usize = 4;
pub const EWKB_HEADER_SIZE: usize = SRID_SIZE + WKB_HEADER_SIZE;
pub const POINT_SIZE: usize = 16;
pub const COUNT_SIZE: usize = 4;
/// Deepest collection nesting the decoder accepts.
pub const MAX_NESTING_DEPTH: usize = 64;

const LITTLE_ENDIAN_FLAG: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    BigEndian,
    LittleEndian,
}

impl ByteOrder {
    #[inline]
    pub fn from_flag(flag: u8) -> Self {
        if flag == 0 {
            ByteOrder::BigEndian
        } else {
            ByteOrder::LittleEndian
        }
    }

    #[inline]
    fn u32_from(self, bytes: [u8; 4]) -> u32 {
        match self {
            ByteOrder::BigEndian => u32::from_be_bytes(bytes),
            ByteOrder::LittleEndian => u32::from_le_bytes(bytes),
        }
    }

    #[inline]
    fn f64_from(self, bytes: [u8; 8]) -> f64 {
        match self {
            ByteOrder::BigEndian => f64::from_be_bytes(bytes),
            ByteOrder::LittleEndian => f64::from_le_bytes(bytes),
        }
    }
}

/// Decoded 5-byte WKB header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WkbHeader {
    pub order: ByteOrder,
    pub type_code: u32,
}

impl WkbHeader {
    pub fn kind(&self) -> Option<GeometryKind> {
        GeometryKind::from_wkb_code(self.type_code)
    }
}

/// Reads the header at the start of `buf`. `function` names the SQL function
/// reported in the error.
pub fn parse_header(buf: &[u8], function: &str) -> EmberResult<WkbHeader> {
    let mut reader = WkbReader::new(buf, function);
    reader.read_header()
}

// ============================================================================
// ENCODING
// ============================================================================

/// Serializes `geom` as little-endian WKB.
pub fn serialize(geom: &Geometry) -> Vec<u8> {
    let mut buf = Vec::with_capacity(serialized_size(geom));
    write_geometry(&mut buf, geom);
    buf
}

/// Exact number of bytes [`serialize`] produces for `geom`.
pub fn serialized_size(geom: &Geometry) -> usize {
    WKB_HEADER_SIZE + payload_size(geom)
}

/// Storage layout: SRID prefix followed by the WKB.
pub fn ewkb_encode(geom: &Geometry) -> Vec<u8> {
    let mut buf = Vec::with_capacity(SRID_SIZE + serialized_size(geom));
    buf.extend_from_slice(&geom.srid().to_le_bytes());
    write_geometry(&mut buf, geom);
    buf
}

fn line_payload_size(line: &LineString) -> usize {
    COUNT_SIZE + POINT_SIZE * line.points.len()
}

fn polygon_payload_size(poly: &Polygon) -> usize {
    COUNT_SIZE + poly.lines.iter().map(line_payload_size).sum::<usize>()
}

fn payload_size(geom: &Geometry) -> usize {
    match geom {
        Geometry::Point(_) => POINT_SIZE,
        Geometry::LineString(l) => line_payload_size(l),
        Geometry::Polygon(p) => polygon_payload_size(p),
        Geometry::MultiPoint(mp) => COUNT_SIZE + mp.points.len() * (WKB_HEADER_SIZE + POINT_SIZE),
        Geometry::MultiLineString(ml) => {
            COUNT_SIZE
                + ml.lines
                    .iter()
                    .map(|l| WKB_HEADER_SIZE + line_payload_size(l))
                    .sum::<usize>()
        }
        Geometry::MultiPolygon(mp) => {
            COUNT_SIZE
                + mp.polygons
                    .iter()
                    .map(|p| WKB_HEADER_SIZE + polygon_payload_size(p))
                    .sum::<usize>()
        }
        Geometry::GeomColl(c) => {
            COUNT_SIZE + c.geoms.iter().map(serialized_size).sum::<usize>()
        }
    }
}

fn write_header(buf: &mut Vec<u8>, kind: GeometryKind) {
    buf.push(LITTLE_ENDIAN_FLAG);
    buf.extend_from_slice(&kind.wkb_code().to_le_bytes());
}

fn write_count(buf: &mut Vec<u8>, count: usize) {
    // Counts beyond u32 cannot come out of a decoded blob.
    buf.extend_from_slice(&(count as u32).to_le_bytes());
}

fn write_point(buf: &mut Vec<u8>, p: &Point) {
    buf.extend_from_slice(&p.x.to_le_bytes());
    buf.extend_from_slice(&p.y.to_le_bytes());
}

fn write_line(buf: &mut Vec<u8>, line: &LineString) {
    write_count(buf, line.points.len());
    for p in &line.points {
        write_point(buf, p);
    }
}

fn write_polygon(buf: &mut Vec<u8>, poly: &Polygon) {
    write_count(buf, poly.lines.len());
    for line in &poly.lines {
        write_line(buf, line);
    }
}

fn write_geometry(buf: &mut Vec<u8>, geom: &Geometry) {
    write_header(buf, geom.kind());
    match geom {
        Geometry::Point(p) => write_point(buf, p),
        Geometry::LineString(l) => write_line(buf, l),
        Geometry::Polygon(p) => write_polygon(buf, p),
        Geometry::MultiPoint(mp) => {
            write_count(buf, mp.points.len());
            for p in &mp.points {
                write_header(buf, GeometryKind::Point);
                write_point(buf, p);
            }
        }
        Geometry::MultiLineString(ml) => {
            write_count(buf, ml.lines.len());
            for l in &ml.lines {
                write_header(buf, GeometryKind::LineString);
                write_line(buf, l);
            }
        }
        Geometry::MultiPolygon(mp) => {
            write_count(buf, mp.polygons.len());
            for p in &mp.polygons {
                write_header(buf, GeometryKind::Polygon);
                write_polygon(buf, p);
            }
        }
        Geometry::GeomColl(c) => {
            write_count(buf, c.geoms.len());
            for g in &c.geoms {
                write_geometry(buf, g);
            }
        }
    }
}

// ============================================================================
// DECODING
// ============================================================================

/// Decodes a complete WKB blob of any kind, stamping `srid` on the result.
pub fn deserialize(buf: &[u8], srid: u32, function: &str) -> EmberResult<Geometry> {
    let mut reader = WkbReader::new(buf, function);
    let geom = reader.read_geometry(srid, 0)?;
    reader.finish()?;
    Ok(geom)
}

/// Like [`deserialize`], but the header must announce `expected`.
pub fn deserialize_as(
    buf: &[u8],
    expected: GeometryKind,
    srid: u32,
    function: &str,
) -> EmberResult<Geometry> {
    let mut reader = WkbReader::new(buf, function);
    let header = reader.read_header()?;
    if header.kind() != Some(expected) {
        return Err(EmberError::invalid_gis_data(function));
    }
    let geom = reader.read_body(expected, srid, 0)?;
    reader.finish()?;
    Ok(geom)
}

/// Reverse of [`ewkb_encode`]; the SRID comes from the prefix.
pub fn ewkb_decode(buf: &[u8], function: &str) -> EmberResult<Geometry> {
    if buf.len() < EWKB_HEADER_SIZE {
        return Err(EmberError::invalid_gis_data(function));
    }
    let (prefix, wkb) = buf.split_at(SRID_SIZE);
    let srid = u32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]);
    deserialize(wkb, srid, function)
}

/// Cursor over a WKB buffer. The byte order switches with every header read,
/// so members of a collection may mix endianness.
struct WkbReader<'a> {
    buf: &'a [u8],
    pos: usize,
    order: ByteOrder,
    function: &'a str,
}

impl<'a> WkbReader<'a> {
    fn new(buf: &'a [u8], function: &'a str) -> Self {
        Self {
            buf,
            pos: 0,
            order: ByteOrder::LittleEndian,
            function,
        }
    }

    #[inline]
    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn invalid(&self) -> EmberError {
        EmberError::invalid_gis_data(self.function)
    }

    fn take<const N: usize>(&mut self) -> EmberResult<[u8; N]> {
        if self.remaining() < N {
            return Err(self.invalid());
        }
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }

    fn read_u32(&mut self) -> EmberResult<u32> {
        let bytes = self.take::<4>()?;
        Ok(self.order.u32_from(bytes))
    }

    fn read_f64(&mut self) -> EmberResult<f64> {
        let bytes = self.take::<8>()?;
        Ok(self.order.f64_from(bytes))
    }

    /// Reads an element count and checks the rest of the buffer could hold
    /// that many elements of at least `min_element_size` bytes, so a forged
    /// count cannot force a huge allocation.
    fn read_count(&mut self, min_element_size: usize) -> EmberResult<usize> {
        let count = self.read_u32()? as usize;
        match count.checked_mul(min_element_size) {
            Some(needed) if needed <= self.remaining() => Ok(count),
            _ => Err(self.invalid()),
        }
    }

    fn read_header(&mut self) -> EmberResult<WkbHeader> {
        let [flag] = self.take::<1>()?;
        self.order = ByteOrder::from_flag(flag);
        let type_code = self.read_u32()?;
        Ok(WkbHeader {
            order: self.order,
            type_code,
        })
    }

    fn expect_header(&mut self, kind: GeometryKind) -> EmberResult<()> {
        let header = self.read_header()?;
        if header.kind() == Some(kind) {
            Ok(())
        } else {
            Err(self.invalid())
        }
    }

    fn finish(&self) -> EmberResult<()> {
        if self.remaining() == 0 {
            Ok(())
        } else {
            Err(self.invalid())
        }
    }

    fn read_geometry(&mut self, srid: u32, depth: usize) -> EmberResult<Geometry> {
        let header = self.read_header()?;
        let kind = header.kind().ok_or_else(|| self.invalid())?;
        self.read_body(kind, srid, depth)
    }

    /// `depth` counts the collections enclosing this geometry.
    fn read_body(
        &mut self,
        kind: GeometryKind,
        srid: u32,
        depth: usize,
    ) -> EmberResult<Geometry> {
        match kind {
            GeometryKind::Point => self.read_point(srid).map(Geometry::Point),
            GeometryKind::LineString => self.read_line(srid).map(Geometry::LineString),
            GeometryKind::Polygon => self.read_polygon(srid).map(Geometry::Polygon),
            GeometryKind::MultiPoint => {
                let count = self.read_count(WKB_HEADER_SIZE + POINT_SIZE)?;
                let mut points = Vec::with_capacity(count);
                for _ in 0..count {
                    self.expect_header(GeometryKind::Point)?;
                    points.push(self.read_point(srid)?);
                }
                Ok(Geometry::MultiPoint(MultiPoint { srid, points }))
            }
            GeometryKind::MultiLineString => {
                let count = self.read_count(WKB_HEADER_SIZE + COUNT_SIZE)?;
                let mut lines = Vec::with_capacity(count);
                for _ in 0..count {
                    self.expect_header(GeometryKind::LineString)?;
                    lines.push(self.read_line(srid)?);
                }
                Ok(Geometry::MultiLineString(MultiLineString { srid, lines }))
            }
            GeometryKind::MultiPolygon => {
                let count = self.read_count(WKB_HEADER_SIZE + COUNT_SIZE)?;
                let mut polygons = Vec::with_capacity(count);
                for _ in 0..count {
                    self.expect_header(GeometryKind::Polygon)?;
                    polygons.push(self.read_polygon(srid)?);
                }
                Ok(Geometry::MultiPolygon(MultiPolygon { srid, polygons }))
            }
            GeometryKind::GeometryCollection => {
                if depth >= MAX_NESTING_DEPTH {
                    return Err(self.invalid());
                }
                let count = self.read_count(WKB_HEADER_SIZE)?;
                let mut geoms = Vec::with_capacity(count);
                for _ in 0..count {
                    geoms.push(self.read_geometry(srid, depth + 1)?);
                }
                Ok(Geometry::GeomColl(GeomColl { srid, geoms }))
            }
        }
    }

    fn read_point(&mut self, srid: u32) -> EmberResult<Point> {
        let x = self.read_f64()?;
        let y = self.read_f64()?;
        Ok(Point::new(srid, x, y))
    }

    fn read_line(&mut self, srid: u32) -> EmberResult<LineString> {
        let count = self.read_count(POINT_SIZE)?;
        let mut points = Vec::with_capacity(count);
        for _ in 0..count {
            points.push(self.read_point(srid)?);
        }
        Ok(LineString::new(srid, points))
    }

    fn read_polygon(&mut self, srid: u32) -> EmberResult<Polygon> {
        let count = self.read_count(COUNT_SIZE)?;
        let mut lines = Vec::with_capacity(count);
        for _ in 0..count {
            let ring = self.read_line(srid)?;
            if !ring.is_linear_ring() {
                return Err(self.invalid());
            }
            lines.push(ring);
        }
        Ok(Polygon { srid, lines })
    }
}
