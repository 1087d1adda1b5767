//! Measurement unit validation for literal units.

use mensura_units::DimensionalAnalyzer;
use std::collections::HashSet;

/// Decides whether a literal may carry a given measurement unit.
pub trait UnitValidator: Send + Sync {
    fn is_valid(&self, unit: &str) -> bool;
}

/// Accepts a fixed set of unit symbols.
///
/// The default set holds the metric length units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhitelistValidator {
    units: HashSet<String>,
}

pub const METRIC_LENGTH_UNITS: &[&str] = &["m", "cm", "mm", "km", "nm", "um", "pm", "fm"];

impl WhitelistValidator {
    pub fn new<I, S>(units: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            units: units.into_iter().map(Into::into).collect(),
        }
    }

    pub fn insert(&mut self, unit: impl Into<String>) -> bool {
        self.units.insert(unit.into())
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl Default for WhitelistValidator {
    fn default() -> Self {
        Self::new(METRIC_LENGTH_UNITS.iter().copied())
    }
}

impl UnitValidator for WhitelistValidator {
    fn is_valid(&self, unit: &str) -> bool {
        self.units.contains(unit)
    }
}

/// Any unit registered with the analyzer.
impl UnitValidator for DimensionalAnalyzer {
    fn is_valid(&self, unit: &str) -> bool {
        self.is_unit_registered(unit)
    }
}
