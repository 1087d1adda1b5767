use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Affine conversion `y = x * factor + offset`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversionParameters {
    pub factor: f64,
    #[serde(default)]
    pub offset: f64,
}

impl ConversionParameters {
    pub const IDENTITY: ConversionParameters = ConversionParameters {
        factor: 1.0,
        offset: 0.0,
    };

    pub const fn new(factor: f64, offset: f64) -> Self {
        Self { factor, offset }
    }

    /// Pure scaling, no offset.
    pub const fn scale(factor: f64) -> Self {
        Self::new(factor, 0.0)
    }

    /// Applies `self` first, then `next`.
    pub fn compose(&self, next: &ConversionParameters) -> ConversionParameters {
        ConversionParameters {
            factor: self.factor * next.factor,
            offset: self.offset * next.factor + next.offset,
        }
    }

    pub fn invert(&self) -> Result<ConversionParameters> {
        if self.factor == 0.0 {
            return Err(Error::ZeroConversionFactor);
        }
        Ok(ConversionParameters {
            factor: 1.0 / self.factor,
            offset: -self.offset / self.factor,
        })
    }

    /// Composes the transform with itself `n` times; `n == 0` is the identity.
    pub fn powi(&self, n: u32) -> ConversionParameters {
        let mut result = Self::IDENTITY;
        let mut base = *self;
        let mut n = n;
        while n > 0 {
            if n & 1 == 1 {
                result = result.compose(&base);
            }
            base = base.compose(&base);
            n >>= 1;
        }
        result
    }

    pub fn apply(&self, quantity: f64) -> f64 {
        quantity * self.factor + self.offset
    }

    pub fn approx_eq(&self, other: &ConversionParameters, epsilon: f64) -> bool {
        (self.factor - other.factor).abs() <= epsilon && (self.offset - other.offset).abs() <= epsilon
    }
}

impl Default for ConversionParameters {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl fmt::Display for ConversionParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x * {} + {}", self.factor, self.offset)
    }
}
