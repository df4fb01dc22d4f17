//! Distance units for DWITHIN/BEYOND
//!
//! Distances are carried in meters once translated.

use std::fmt;
use std::str::FromStr;

use crate::error::FilterParserError;

/// Length of one degree of arc on the WGS84 equator, in meters
pub const METERS_PER_DEGREE: f64 = 6_378_137.0 * std::f64::consts::PI / 180.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DistanceUnit {
    Meters,
    Kilometers,
    Feet,
    StatuteMiles,
    NauticalMiles,
    Degrees,
}

impl DistanceUnit {
    pub fn meters_per_unit(self) -> f64 {
        match self {
            DistanceUnit::Meters => 1.0,
            DistanceUnit::Kilometers => 1000.0,
            DistanceUnit::Feet => 0.3048,
            DistanceUnit::StatuteMiles => 1609.344,
            DistanceUnit::NauticalMiles => 1852.0,
            DistanceUnit::Degrees => METERS_PER_DEGREE,
        }
    }

    pub fn to_meters(self, value: f64) -> f64 {
        value * self.meters_per_unit()
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DistanceUnit::Meters => "meters",
            DistanceUnit::Kilometers => "kilometers",
            DistanceUnit::Feet => "feet",
            DistanceUnit::StatuteMiles => "statute miles",
            DistanceUnit::NauticalMiles => "nautical miles",
            DistanceUnit::Degrees => "degrees",
        };
        f.write_str(name)
    }
}

impl FromStr for DistanceUnit {
    type Err = FilterParserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_lowercase();

        let unit = match normalized.as_str() {
            "m" | "meter" | "meters" | "metre" | "metres" | "urn:ogc:def:uom:epsg::9001" => {
                DistanceUnit::Meters
            }
            "km" | "kilometer" | "kilometers" | "kilometre" | "kilometres"
            | "urn:ogc:def:uom:epsg::9036" => DistanceUnit::Kilometers,
            "ft" | "foot" | "feet" | "urn:ogc:def:uom:epsg::9002" => DistanceUnit::Feet,
            "mi" | "mile" | "miles" | "statute mile" | "statute miles" => {
                DistanceUnit::StatuteMiles
            }
            "nmi" | "nautical mile" | "nautical miles" | "urn:ogc:def:uom:epsg::9030" => {
                DistanceUnit::NauticalMiles
            }
            "deg" | "degree" | "degrees" | "urn:ogc:def:uom:epsg::9102" => DistanceUnit::Degrees,
            _ => {
                return Err(FilterParserError::invalid_constraint(format!(
                    "unknown distance unit '{}'",
                    s.trim()
                )))
            }
        };
        Ok(unit)
    }
}
