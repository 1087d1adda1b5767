//! Declarative registry description.
//!
//! ```json
//! {
//!   "fundamental": [{ "name": "length", "unit": "m" }],
//!   "composed": [{ "name": "area", "unit": "m2", "reference": "m^2", "factor": 1.0 }],
//!   "multiples": [{ "unit": "km", "base": "m", "factor": 1000.0 }]
//! }
//! ```
//!
//! Sections are applied in the order fundamental, composed, multiples.

use crate::analyzer::DimensionalAnalyzer;
use crate::conversion::ConversionParameters;
use crate::error::Result;
use crate::factor::AlgebraicFactor;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub fundamental: Vec<FundamentalEntry>,
    pub composed: Vec<ComposedEntry>,
    pub multiples: Vec<MultipleEntry>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FundamentalEntry {
    pub name: String,
    pub unit: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComposedEntry {
    pub name: String,
    pub unit: String,
    pub reference: AlgebraicFactor,
    pub factor: f64,
    #[serde(default)]
    pub offset: f64,
}

impl ComposedEntry {
    pub fn conversion(&self) -> ConversionParameters {
        ConversionParameters::new(self.factor, self.offset)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MultipleEntry {
    pub unit: String,
    pub base: String,
    pub factor: f64,
    #[serde(default)]
    pub offset: f64,
}

impl MultipleEntry {
    pub fn conversion(&self) -> ConversionParameters {
        ConversionParameters::new(self.factor, self.offset)
    }
}

impl RegistryConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl DimensionalAnalyzer {
    pub fn from_config(config: &RegistryConfig) -> Result<Self> {
        let mut analyzer = Self::new();
        analyzer.apply_config(config)?;
        Ok(analyzer)
    }

    /// Registers every entry of `config`, stopping at the first rejected one.
    /// Entries registered before the failure stay in place.
    pub fn apply_config(&mut self, config: &RegistryConfig) -> Result<()> {
        for entry in &config.fundamental {
            self.add_fundamental_dimension(entry.name.as_str(), entry.unit.as_str())?;
        }
        for entry in &config.composed {
            self.add_composed_dimension(
                entry.name.as_str(),
                entry.unit.as_str(),
                entry.reference.clone(),
                entry.conversion(),
            )?;
        }
        for entry in &config.multiples {
            self.add_multiplier_measurement_unit(entry.unit.as_str(), &entry.base, entry.conversion())?;
        }
        Ok(())
    }
}

#[cfg(feature = "si-preset")]
mod preset {
    use super::*;
    use once_cell::sync::Lazy;

    static SI_REGISTRY: Lazy<RegistryConfig> = Lazy::new(|| {
        RegistryConfig::from_json_str(include_str!("../registry/si.json"))
            .expect("failed to load embedded registry/si.json")
    });

    impl RegistryConfig {
        /// SI base dimensions with common derived dimensions and multiples.
        pub fn si() -> &'static RegistryConfig {
            &SI_REGISTRY
        }
    }

    impl DimensionalAnalyzer {
        /// Analyzer populated from [`RegistryConfig::si`].
        pub fn si() -> Self {
            Self::from_config(RegistryConfig::si())
                .expect("embedded registry/si.json must register cleanly")
        }
    }
}
