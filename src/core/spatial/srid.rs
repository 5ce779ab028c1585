// SPDX-License-Identifier: MIT OR Apache-2.0

//! SRID validation and the `axis-order=` option accepted by the WKB decoders.

use std::str::FromStr;

use crate::core::error::{EmberError, EmberResult};

use super::geometry::{CARTESIAN_SRID, GEOSPATIAL_SRID};

/// Accepts only the reference systems this engine knows about.
pub fn validate_srid(srid: i64) -> EmberResult<u32> {
    match u32::try_from(srid) {
        Ok(srid @ (CARTESIAN_SRID | GEOSPATIAL_SRID)) => Ok(srid),
        _ => Err(EmberError::InvalidSrid { srid }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisOrder {
    /// Keep whatever order the reference system defines.
    #[default]
    SridDefined,
    LatLong,
    LongLat,
}

impl AxisOrder {
    /// Whether decoded coordinates must have X and Y exchanged.
    #[inline]
    pub fn swaps(&self) -> bool {
        matches!(self, AxisOrder::LongLat)
    }
}

impl FromStr for AxisOrder {
    type Err = String;

    /// Parses an options string such as `axis-order=long-lat`. Whitespace and
    /// case are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        let value = normalized
            .strip_prefix("axis-order=")
            .ok_or_else(|| format!("invalid options string '{s}'"))?;
        match value {
            "srid-defined" => Ok(AxisOrder::SridDefined),
            "lat-long" => Ok(AxisOrder::LatLong),
            "long-lat" => Ok(AxisOrder::LongLat),
            other => Err(format!("invalid axis order '{other}'")),
        }
    }
}
