use crate::analyzer::DimensionalAnalyzer;
use crate::error::{Error, Result};
use crate::factor::AlgebraicFactor;
use std::fmt;
use std::str::FromStr;

/// A magnitude paired with a units factor.
#[derive(Clone, Debug, PartialEq)]
pub struct Quantity {
    pub value: f64,
    pub unit: AlgebraicFactor,
}

impl Quantity {
    pub fn new(value: f64, unit: AlgebraicFactor) -> Self {
        Self { value, unit }
    }

    pub fn dimensionless(value: f64) -> Self {
        Self::new(value, AlgebraicFactor::dimensionless())
    }

    /// Re-expresses the quantity in `target` units.
    pub fn convert_to(&self, analyzer: &DimensionalAnalyzer, target: &AlgebraicFactor) -> Result<Quantity> {
        let value = analyzer.convert(self.value, &self.unit, target)?;
        Ok(Quantity::new(value, target.clone()))
    }

    /// Re-expresses the quantity over the default units of fundamental
    /// dimensions, e.g. `2 kPa` becomes `2000 kg/m*s^2`.
    pub fn normalize(&self, analyzer: &DimensionalAnalyzer) -> Result<Quantity> {
        let target = analyzer.fundamental_units_factor(&self.unit)?;
        let params = analyzer.conversion_parameters(&self.unit, &target)?;
        Ok(Quantity::new(params.apply(self.value), target))
    }

    pub fn is_compatible_with(&self, analyzer: &DimensionalAnalyzer, other: &Quantity) -> Result<bool> {
        analyzer.are_unit_factors_dimensionally_equivalent(&self.unit, &other.unit)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit.is_empty() {
            write!(f, "{}", self.value)
        } else {
            write!(f, "{} {}", self.value, self.unit)
        }
    }
}

/// Parses `"<number> <units factor>"`, e.g. `"9.81 m/s^2"`. A bare number is
/// dimensionless.
impl FromStr for Quantity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (number, unit) = match s.split_once(char::is_whitespace) {
            Some((number, unit)) => (number, unit.trim()),
            None => (s, ""),
        };
        let value = number.parse::<f64>().map_err(|_| Error::InvalidUnitExpression {
            pos: 0,
            message: "expected a numeric value",
        })?;
        let unit = if unit.is_empty() {
            AlgebraicFactor::dimensionless()
        } else {
            unit.parse()?
        };
        Ok(Quantity::new(value, unit))
    }
}
