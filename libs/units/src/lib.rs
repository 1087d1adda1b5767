#![forbid(unsafe_code)]
//! Algebraic unit factors and a registry-driven dimensional analyzer.
//!
//! ```
//! use mensura_units::{ConversionParameters, DimensionalAnalyzer};
//!
//! let mut analyzer = DimensionalAnalyzer::new();
//! analyzer.add_fundamental_dimension("length", "m").unwrap();
//! analyzer
//!     .add_multiplier_measurement_unit("km", "m", ConversionParameters::scale(1000.0))
//!     .unwrap();
//!
//! let km = "km".parse().unwrap();
//! let m = "m".parse().unwrap();
//! assert_eq!(analyzer.convert(2.5, &km, &m).unwrap(), 2500.0);
//! ```

mod analyzer;
mod config;
mod conversion;
mod dimension;
mod error;
mod factor;
mod quantity;

pub use analyzer::DimensionalAnalyzer;
pub use config::{ComposedEntry, FundamentalEntry, MultipleEntry, RegistryConfig};
pub use conversion::ConversionParameters;
pub use dimension::{ComposedDefinition, DimensionId, DimensionKind, PhysicalDimension};
pub use error::{Error, ErrorKind, Result};
pub use factor::{AlgebraicFactor, Terms, MAX_EXPONENT};
pub use quantity::Quantity;
