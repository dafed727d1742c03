//! Length units carried by instance placements.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unit system of a placement transform or a host document.
///
/// Serialized with the short wire names (`"mm"`, `"m"`, `"ft"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Units {
    /// Millimeters (common in CAD).
    #[serde(rename = "mm")]
    Millimeters,
    /// Centimeters.
    #[serde(rename = "cm")]
    Centimeters,
    /// Meters.
    #[default]
    #[serde(rename = "m")]
    Meters,
    /// Kilometers.
    #[serde(rename = "km")]
    Kilometers,
    /// Inches.
    #[serde(rename = "in")]
    Inches,
    /// Feet.
    #[serde(rename = "ft")]
    Feet,
    /// Yards.
    #[serde(rename = "yd")]
    Yards,
    /// Miles.
    #[serde(rename = "mi")]
    Miles,
    /// Unitless; never rescaled.
    #[serde(rename = "none")]
    None,
}

impl Units {
    /// Wire name of the unit.
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Millimeters => "mm",
            Units::Centimeters => "cm",
            Units::Meters => "m",
            Units::Kilometers => "km",
            Units::Inches => "in",
            Units::Feet => "ft",
            Units::Yards => "yd",
            Units::Miles => "mi",
            Units::None => "none",
        }
    }

    /// Get the scale factor to convert to meters.
    pub fn to_meters_scale(&self) -> f64 {
        match self {
            Units::Millimeters => 0.001,
            Units::Centimeters => 0.01,
            Units::Meters => 1.0,
            Units::Kilometers => 1000.0,
            Units::Inches => 0.0254,
            Units::Feet => 0.3048,
            Units::Yards => 0.9144,
            Units::Miles => 1609.344,
            Units::None => 1.0,
        }
    }

    /// Factor that converts a length in `self` into `target`.
    ///
    /// Unitless on either side yields 1.0.
    pub fn scale_to(&self, target: Units) -> f64 {
        if *self == Units::None || target == Units::None || *self == target {
            return 1.0;
        }
        self.to_meters_scale() / target.to_meters_scale()
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Units {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mm" | "millimeters" | "millimetres" => Ok(Units::Millimeters),
            "cm" | "centimeters" | "centimetres" => Ok(Units::Centimeters),
            "m" | "meters" | "metres" => Ok(Units::Meters),
            "km" | "kilometers" | "kilometres" => Ok(Units::Kilometers),
            "in" | "inches" => Ok(Units::Inches),
            "ft" | "feet" => Ok(Units::Feet),
            "yd" | "yards" => Ok(Units::Yards),
            "mi" | "miles" => Ok(Units::Miles),
            "none" | "" => Ok(Units::None),
            other => Err(format!("unknown units '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_between_units() {
        assert!((Units::Millimeters.scale_to(Units::Meters) - 0.001).abs() < 1e-12);
        assert!((Units::Feet.scale_to(Units::Inches) - 12.0).abs() < 1e-9);
        assert_eq!(Units::None.scale_to(Units::Millimeters), 1.0);
        assert_eq!(Units::Meters.scale_to(Units::Meters), 1.0);
    }

    #[test]
    fn test_parse_round_trip() {
        for units in [
            Units::Millimeters,
            Units::Centimeters,
            Units::Meters,
            Units::Kilometers,
            Units::Inches,
            Units::Feet,
            Units::Yards,
            Units::Miles,
            Units::None,
        ] {
            assert_eq!(units.as_str().parse::<Units>(), Ok(units));
        }
        assert!("furlong".parse::<Units>().is_err());
    }

    #[test]
    fn test_serde_wire_name() {
        let json = serde_json::to_string(&Units::Feet).unwrap();
        assert_eq!(json, "\"ft\"");
    }
}
