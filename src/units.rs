//! Unit-tagged lengths and angles.
//!
//! Survey data mixes lengths and angles that may be displayed in several units.
//! Values are kept as a magnitude plus the unit they were given in, and converted
//! on demand:
//!
//! ```
//! use compassformat::units::{Length, LengthUnit};
//!
//! let l = Length::meters(1.0);
//! assert!((l.get(LengthUnit::Feet) - 3.28084).abs() < 1e-5);
//! ```
use std::fmt::{Debug, Display};

/// A unit that can be converted to and from a base unit by a constant factor.
pub trait Unit: Copy + PartialEq + Debug {
    /// How many base units one of this unit equals.
    fn base_factor(self) -> f64;

    /// Short suffix used when displaying a quantity.
    fn symbol(self) -> &'static str;
}

/// Units of length. The base unit is the meter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LengthUnit {
    Feet,
    Inches,
    Yards,
    Meters,
    Centimeters,
}

impl Unit for LengthUnit {
    fn base_factor(self) -> f64 {
        match self {
            LengthUnit::Feet => 0.3048,
            LengthUnit::Inches => 0.0254,
            LengthUnit::Yards => 0.9144,
            LengthUnit::Meters => 1.0,
            LengthUnit::Centimeters => 0.01,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            LengthUnit::Feet => "ft",
            LengthUnit::Inches => "in",
            LengthUnit::Yards => "yd",
            LengthUnit::Meters => "m",
            LengthUnit::Centimeters => "cm",
        }
    }
}

/// Units of angle. The base unit is the degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AngleUnit {
    Degrees,
    Gradians,
    Radians,
    /// NATO mils, 6400 to the circle
    Mils,
}

impl Unit for AngleUnit {
    fn base_factor(self) -> f64 {
        match self {
            AngleUnit::Degrees => 1.0,
            AngleUnit::Gradians => 0.9,
            AngleUnit::Radians => 180.0 / std::f64::consts::PI,
            AngleUnit::Mils => 360.0 / 6400.0,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            AngleUnit::Degrees => "°",
            AngleUnit::Gradians => "grad",
            AngleUnit::Radians => "rad",
            AngleUnit::Mils => "mil",
        }
    }
}

/// A magnitude tagged with the unit it is expressed in.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitizedNumber<U: Unit> {
    value: f64,
    unit: U,
}

/// A length quantity
pub type Length = UnitizedNumber<LengthUnit>;

/// An angle quantity
pub type Angle = UnitizedNumber<AngleUnit>;

impl<U: Unit> UnitizedNumber<U> {
    /// Create a quantity of `value` in `unit`.
    pub fn of(value: f64, unit: U) -> Self {
        Self { value, unit }
    }

    /// The magnitude in the unit this quantity was created with.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// The unit this quantity was created with.
    pub fn unit(&self) -> U {
        self.unit
    }

    /// The magnitude of this quantity expressed in `unit`.
    pub fn get(&self, unit: U) -> f64 {
        if unit == self.unit {
            self.value
        } else {
            self.value * self.unit.base_factor() / unit.base_factor()
        }
    }

    /// Convert this quantity to `unit`.
    pub fn in_unit(&self, unit: U) -> Self {
        Self { value: self.get(unit), unit }
    }
}

impl Length {
    pub fn feet(value: f64) -> Self {
        Self::of(value, LengthUnit::Feet)
    }

    pub fn meters(value: f64) -> Self {
        Self::of(value, LengthUnit::Meters)
    }
}

impl Angle {
    pub fn degrees(value: f64) -> Self {
        Self::of(value, AngleUnit::Degrees)
    }

    pub fn gradians(value: f64) -> Self {
        Self::of(value, AngleUnit::Gradians)
    }
}

impl<U: Unit> Display for UnitizedNumber<U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.value, self.unit.symbol())
    }
}
