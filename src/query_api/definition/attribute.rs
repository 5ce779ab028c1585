// SPDX-License-Identifier: MIT OR Apache-2.0

//! Static result types reported by expression executors.

use std::fmt;

/// SQL-level type of an expression. `OBJECT` stands for "not known until
/// evaluation", which is what a NULL literal or a dynamically typed column
/// reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    STRING,
    INT,
    LONG,
    UINT,
    DOUBLE,
    BOOL,
    BLOB,
    JSON,
    GEOMETRY,
    POINT,
    LINESTRING,
    POLYGON,
    MULTIPOINT,
    MULTILINESTRING,
    MULTIPOLYGON,
    GEOMETRYCOLLECTION,
    OBJECT,
}

impl Type {
    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::INT | Type::LONG | Type::UINT | Type::DOUBLE)
    }

    pub fn is_geometry(&self) -> bool {
        matches!(
            self,
            Type::GEOMETRY
                | Type::POINT
                | Type::LINESTRING
                | Type::POLYGON
                | Type::MULTIPOINT
                | Type::MULTILINESTRING
                | Type::MULTIPOLYGON
                | Type::GEOMETRYCOLLECTION
        )
    }

    /// True when a value of this static type could still turn out to be
    /// acceptable where `expected` is required.
    pub fn may_be(&self, expected: Type) -> bool {
        *self == expected || *self == Type::OBJECT
    }

    pub const fn sql_name(&self) -> &'static str {
        match self {
            Type::STRING => "varchar",
            Type::INT => "int",
            Type::LONG => "bigint",
            Type::UINT => "int unsigned",
            Type::DOUBLE => "double",
            Type::BOOL => "tinyint(1)",
            Type::BLOB => "blob",
            Type::JSON => "json",
            Type::GEOMETRY => "geometry",
            Type::POINT => "point",
            Type::LINESTRING => "linestring",
            Type::POLYGON => "polygon",
            Type::MULTIPOINT => "multipoint",
            Type::MULTILINESTRING => "multilinestring",
            Type::MULTIPOLYGON => "multipolygon",
            Type::GEOMETRYCOLLECTION => "geomcollection",
            Type::OBJECT => "null",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}
