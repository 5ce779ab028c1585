// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;

use crate::core::spatial::Geometry;
use crate::query_api::definition::attribute::Type as ApiAttributeType;

/// A single SQL value as seen by the expression executors.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AttributeValue {
    #[default]
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    UInt(u32),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    Json(serde_json::Value),
    Geometry(Geometry),
}

/// One input row; executors address its columns by position.
pub type Row = Vec<AttributeValue>;

impl AttributeValue {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    pub fn get_type(&self) -> ApiAttributeType {
        match self {
            AttributeValue::Null => ApiAttributeType::OBJECT,
            AttributeValue::Bool(_) => ApiAttributeType::BOOL,
            AttributeValue::Int(_) => ApiAttributeType::INT,
            AttributeValue::Long(_) => ApiAttributeType::LONG,
            AttributeValue::UInt(_) => ApiAttributeType::UINT,
            AttributeValue::Double(_) => ApiAttributeType::DOUBLE,
            AttributeValue::String(_) => ApiAttributeType::STRING,
            AttributeValue::Bytes(_) => ApiAttributeType::BLOB,
            AttributeValue::Json(_) => ApiAttributeType::JSON,
            AttributeValue::Geometry(g) => g.kind().attribute_type(),
        }
    }

    /// Name used in "Illegal parameter data type" messages.
    pub fn type_name(&self) -> &'static str {
        self.get_type().sql_name()
    }

    /// Integer coercion the way MySQL applies it to numeric function
    /// arguments: doubles truncate toward zero and numeric strings parse.
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Bool(b) => Some(i64::from(*b)),
            AttributeValue::Int(v) => Some(i64::from(*v)),
            AttributeValue::Long(v) => Some(*v),
            AttributeValue::UInt(v) => Some(i64::from(*v)),
            AttributeValue::Double(v) if v.is_finite() => Some(v.trunc() as i64),
            AttributeValue::String(s) => {
                let s = s.trim();
                s.parse::<i64>().ok().or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|v| v.is_finite())
                        .map(|v| v.trunc() as i64)
                })
            }
            _ => None,
        }
    }

    pub fn to_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Int(v) => Some(f64::from(*v)),
            AttributeValue::Long(v) => Some(*v as f64),
            AttributeValue::UInt(v) => Some(f64::from(*v)),
            AttributeValue::Double(v) => Some(*v),
            AttributeValue::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    pub fn as_geometry(&self) -> Option<&Geometry> {
        match self {
            AttributeValue::Geometry(g) => Some(g),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Null => f.write_str("NULL"),
            AttributeValue::Bool(b) => write!(f, "{}", i32::from(*b)),
            AttributeValue::Int(v) => write!(f, "{v}"),
            AttributeValue::Long(v) => write!(f, "{v}"),
            AttributeValue::UInt(v) => write!(f, "{v}"),
            AttributeValue::Double(v) => write!(f, "{v}"),
            AttributeValue::String(s) => f.write_str(s),
            AttributeValue::Bytes(b) => write!(f, "0x{}", hex::encode_upper(b)),
            AttributeValue::Json(v) => write!(f, "{v}"),
            AttributeValue::Geometry(g) => write!(f, "{g}"),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::String(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::String(s)
    }
}

impl From<i32> for AttributeValue {
    fn from(v: i32) -> Self {
        AttributeValue::Int(v)
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Long(v)
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Double(v)
    }
}

impl From<Vec<u8>> for AttributeValue {
    fn from(v: Vec<u8>) -> Self {
        AttributeValue::Bytes(v)
    }
}

impl From<Geometry> for AttributeValue {
    fn from(g: Geometry) -> Self {
        AttributeValue::Geometry(g)
    }
}
