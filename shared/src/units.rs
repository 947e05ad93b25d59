//! Unit conversion for health quantities
//!
//! Health data services hand back quantities in whatever unit the sample was
//! recorded in. This module provides type-safe units and conversion so the
//! dashboard can always display kilograms, grams, kilocalories and millilitres.
//!
//! # Design Principles
//!
//! 1. **Type Safety**: Units are explicit in types, not just f64
//! 2. **Dimension Checking**: Mass never converts into volume or energy
//! 3. **Conversion at Boundaries**: Quantities are converted once, when a slot is assigned

use crate::errors::UnitError;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Dimensions
// ============================================================================

/// Physical dimension a unit measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Mass,
    Energy,
    Volume,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Mass => write!(f, "mass"),
            Dimension::Energy => write!(f, "energy"),
            Dimension::Volume => write!(f, "volume"),
        }
    }
}

// ============================================================================
// Health Units
// ============================================================================

/// Unit a health quantity can be expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthUnit {
    Gram,
    Kilogram,
    Pound,
    Kilocalorie,
    Kilojoule,
    Milliliter,
    Liter,
    FluidOunceUs,
}

impl HealthUnit {
    /// Dimension measured by this unit
    pub fn dimension(&self) -> Dimension {
        match self {
            HealthUnit::Gram | HealthUnit::Kilogram | HealthUnit::Pound => Dimension::Mass,
            HealthUnit::Kilocalorie | HealthUnit::Kilojoule => Dimension::Energy,
            HealthUnit::Milliliter | HealthUnit::Liter | HealthUnit::FluidOunceUs => {
                Dimension::Volume
            }
        }
    }

    /// Factor taking one of this unit to the dimension's base unit
    ///
    /// Base units: grams, kilocalories, millilitres.
    fn base_factor(&self) -> f64 {
        match self {
            HealthUnit::Gram => 1.0,
            HealthUnit::Kilogram => 1000.0,
            HealthUnit::Pound => 453.59237,
            HealthUnit::Kilocalorie => 1.0,
            HealthUnit::Kilojoule => 1.0 / 4.184,
            HealthUnit::Milliliter => 1.0,
            HealthUnit::Liter => 1000.0,
            HealthUnit::FluidOunceUs => 29.5735295625,
        }
    }

    /// Get the unit abbreviation
    pub fn abbreviation(&self) -> &'static str {
        match self {
            HealthUnit::Gram => "g",
            HealthUnit::Kilogram => "kg",
            HealthUnit::Pound => "lb",
            HealthUnit::Kilocalorie => "kcal",
            HealthUnit::Kilojoule => "kJ",
            HealthUnit::Milliliter => "ml",
            HealthUnit::Liter => "L",
            HealthUnit::FluidOunceUs => "fl oz",
        }
    }
}

impl fmt::Display for HealthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

impl std::str::FromStr for HealthUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "g" | "gram" | "grams" => Ok(HealthUnit::Gram),
            "kg" | "kilogram" | "kilograms" => Ok(HealthUnit::Kilogram),
            "lb" | "lbs" | "pound" | "pounds" => Ok(HealthUnit::Pound),
            "kcal" | "kilocalorie" | "kilocalories" => Ok(HealthUnit::Kilocalorie),
            "kj" | "kilojoule" | "kilojoules" => Ok(HealthUnit::Kilojoule),
            "ml" | "milliliter" | "milliliters" | "millilitre" => Ok(HealthUnit::Milliliter),
            "l" | "liter" | "liters" | "litre" => Ok(HealthUnit::Liter),
            "fl oz" | "fl_oz_us" | "fluid_ounce_us" => Ok(HealthUnit::FluidOunceUs),
            _ => Err(format!("Unknown health unit: {}", s)),
        }
    }
}

// ============================================================================
// Quantities
// ============================================================================

/// A numeric value tagged with its unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub value: f64,
    pub unit: HealthUnit,
}

impl Quantity {
    pub fn new(value: f64, unit: HealthUnit) -> Self {
        Self { value, unit }
    }

    /// Express this quantity in `target`
    ///
    /// Fails when `target` measures a different dimension.
    pub fn value_in(&self, target: HealthUnit) -> Result<f64, UnitError> {
        if self.unit.dimension() != target.dimension() {
            return Err(UnitError::IncompatibleUnits {
                from: self.unit,
                to: target,
            });
        }
        if self.unit == target {
            return Ok(self.value);
        }
        Ok(self.value * self.unit.base_factor() / target.base_factor())
    }

    /// Add two quantities, expressing the result in `self`'s unit
    pub fn checked_add(&self, other: &Quantity) -> Result<Quantity, UnitError> {
        let rhs = other.value_in(self.unit)?;
        Ok(Quantity::new(self.value + rhs, self.unit))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}
