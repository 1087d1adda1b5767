//! Dimensional analysis over a registry of physical dimensions.
//!
//! The analyzer distinguishes two readings of an [`AlgebraicFactor`]:
//! a *units factor* such as `kg*m/s^2` and a *dimensional factor* such as
//! `mass*length/time^2`. Fundamental dimensions are irreducible; composed
//! dimensions are defined over fundamental units and therefore expand into
//! fundamental dimension names.
//!
//! The registry is filled through `add_*` calls (`&mut self`) and then
//! queried through `&self`, so a populated analyzer can be shared across
//! threads.

use crate::conversion::ConversionParameters;
use crate::dimension::{ComposedDefinition, DimensionId, DimensionKind, PhysicalDimension};
use crate::error::{Error, Result};
use crate::factor::AlgebraicFactor;
use std::collections::{HashMap, HashSet};
use tracing::debug;

#[derive(Clone, Debug, Default)]
pub struct DimensionalAnalyzer {
    dimensions: Vec<PhysicalDimension>,
    fundamental_by_name: HashMap<String, DimensionId>,
    composed_by_name: HashMap<String, DimensionId>,
    dimension_by_unit: HashMap<String, DimensionId>,
    fundamental_units: HashSet<String>,
}

impl DimensionalAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    // ============================================
    // Registration
    // ============================================

    pub fn add_fundamental_dimension(
        &mut self,
        name: impl Into<String>,
        unit: impl Into<String>,
    ) -> Result<DimensionId> {
        let (name, unit) = (name.into(), unit.into());
        self.check_new_dimension(&name)?;
        self.check_new_unit(&unit)?;

        let id = self.push(PhysicalDimension::fundamental(name.clone(), unit.clone()));
        self.fundamental_by_name.insert(name.clone(), id);
        self.dimension_by_unit.insert(unit.clone(), id);
        self.fundamental_units.insert(unit.clone());

        debug!(dimension = %name, unit = %unit, "registered fundamental dimension");
        Ok(id)
    }

    /// Registers a dimension defined over already registered fundamental
    /// units, e.g. `pressure` with default unit `psi` and reference factor
    /// `N/m2`. `conversion` maps one `unit` onto the reference factor units.
    pub fn add_composed_dimension(
        &mut self,
        name: impl Into<String>,
        unit: impl Into<String>,
        reference_factor: AlgebraicFactor,
        conversion: ConversionParameters,
    ) -> Result<DimensionId> {
        let (name, unit) = (name.into(), unit.into());
        self.check_new_dimension(&name)?;
        self.check_new_unit(&unit)?;
        if let Some(symbol) = reference_factor
            .symbols()
            .find(|s| !self.fundamental_units.contains(*s))
        {
            return Err(Error::NotFundamentalUnit(symbol.to_string()));
        }

        let dimensional_definition =
            self.fundamental_dimensional_factor_from_units_factor(&reference_factor)?;
        debug!(
            dimension = %name,
            unit = %unit,
            definition = %dimensional_definition,
            "registered composed dimension"
        );

        let definition = ComposedDefinition {
            dimensional_definition,
            reference_factor,
            conversion,
        };
        let id = self.push(PhysicalDimension::composed(name.clone(), unit.clone(), definition));
        self.composed_by_name.insert(name, id);
        self.dimension_by_unit.insert(unit, id);
        Ok(id)
    }

    /// Adds `new_unit` to the dimension that owns `basic_unit`.
    ///
    /// `conversion` maps one `new_unit` onto the dimension's default unit.
    pub fn add_multiplier_measurement_unit(
        &mut self,
        new_unit: impl Into<String>,
        basic_unit: &str,
        conversion: ConversionParameters,
    ) -> Result<DimensionId> {
        let new_unit = new_unit.into();
        self.check_new_unit(&new_unit)?;
        let id = *self
            .dimension_by_unit
            .get(basic_unit)
            .ok_or_else(|| Error::UnknownBasicUnit(basic_unit.to_string()))?;

        let dimension = &mut self.dimensions[id.0];
        dimension.add_multiple(new_unit.clone(), conversion);
        debug!(
            dimension = %dimension.name(),
            unit = %new_unit,
            %conversion,
            "registered multiplier unit"
        );
        self.dimension_by_unit.insert(new_unit, id);
        Ok(id)
    }

    fn push(&mut self, dimension: PhysicalDimension) -> DimensionId {
        let id = DimensionId(self.dimensions.len());
        self.dimensions.push(dimension);
        id
    }

    fn check_new_dimension(&self, name: &str) -> Result<()> {
        if self.fundamental_by_name.contains_key(name) || self.composed_by_name.contains_key(name) {
            return Err(Error::DuplicateDimension(name.to_string()));
        }
        Ok(())
    }

    fn check_new_unit(&self, unit: &str) -> Result<()> {
        if self.dimension_by_unit.contains_key(unit) {
            return Err(Error::DuplicateUnit(unit.to_string()));
        }
        Ok(())
    }

    // ============================================
    // Lookups
    // ============================================

    pub fn dimension(&self, id: DimensionId) -> Option<&PhysicalDimension> {
        self.dimensions.get(id.0)
    }

    pub fn fundamental_dimension(&self, name: &str) -> Result<&PhysicalDimension> {
        self.fundamental_by_name
            .get(name)
            .map(|id| &self.dimensions[id.0])
            .ok_or_else(|| Error::UnknownDimension(name.to_string()))
    }

    pub fn composed_dimension(&self, name: &str) -> Result<&PhysicalDimension> {
        self.composed_by_name
            .get(name)
            .map(|id| &self.dimensions[id.0])
            .ok_or_else(|| Error::UnknownDimension(name.to_string()))
    }

    /// Fundamental or composed dimension by name.
    pub fn dimension_by_name(&self, name: &str) -> Result<&PhysicalDimension> {
        self.composed_dimension(name)
            .or_else(|_| self.fundamental_dimension(name))
    }

    pub fn dimension_for_unit(&self, unit: &str) -> Result<&PhysicalDimension> {
        self.dimension_by_unit
            .get(unit)
            .map(|id| &self.dimensions[id.0])
            .ok_or_else(|| Error::UnknownUnit(unit.to_string()))
    }

    pub fn is_unit_registered(&self, unit: &str) -> bool {
        self.dimension_by_unit.contains_key(unit)
    }

    /// Fundamental dimension names in registration order.
    pub fn fundamental_dimensions(&self) -> impl Iterator<Item = &str> {
        self.dimensions
            .iter()
            .filter(|d| !d.is_composed())
            .map(PhysicalDimension::name)
    }

    /// Composed dimension names in registration order.
    pub fn composed_dimensions(&self) -> impl Iterator<Item = &str> {
        self.dimensions
            .iter()
            .filter(|d| d.is_composed())
            .map(PhysicalDimension::name)
    }

    // ============================================
    // Canonicalization and equivalence
    // ============================================

    /// Rewrites a units factor over fundamental dimension names.
    pub fn fundamental_dimensional_factor_from_units_factor(
        &self,
        units_factor: &AlgebraicFactor,
    ) -> Result<AlgebraicFactor> {
        self.canonicalize(units_factor, |unit| self.dimension_for_unit(unit))
    }

    /// Expands composed dimension names of a dimensional factor into
    /// fundamental dimension names.
    pub fn fundamental_dimensional_factor_from_dimensional_factor(
        &self,
        dimensional_factor: &AlgebraicFactor,
    ) -> Result<AlgebraicFactor> {
        self.canonicalize(dimensional_factor, |name| self.dimension_by_name(name))
    }

    fn canonicalize<'a, F>(&'a self, factor: &AlgebraicFactor, resolve: F) -> Result<AlgebraicFactor>
    where
        F: Fn(&str) -> Result<&'a PhysicalDimension>,
    {
        let mut result = AlgebraicFactor::dimensionless();
        for (symbol, power) in factor.numerator() {
            let term = expand(resolve(symbol)?, *power)?;
            result = result.checked_multiply(&term)?;
        }
        for (symbol, power) in factor.denominator() {
            let term = expand(resolve(symbol)?, *power)?;
            result = result.checked_divide(&term)?;
        }
        Ok(result)
    }

    /// Rewrites a units factor over the default units of fundamental
    /// dimensions: multiples collapse onto their default unit and composed
    /// units expand into their reference factor.
    pub fn fundamental_units_factor(&self, units_factor: &AlgebraicFactor) -> Result<AlgebraicFactor> {
        let base = |unit: &str, power: u32| -> Result<AlgebraicFactor> {
            let dimension = self.dimension_for_unit(unit)?;
            match dimension.kind() {
                DimensionKind::Composed(definition) => definition.reference_factor.checked_pow(power),
                DimensionKind::Fundamental => {
                    Ok(AlgebraicFactor::from_term(dimension.default_unit(), power))
                }
            }
        };

        let mut result = AlgebraicFactor::dimensionless();
        for (unit, power) in units_factor.numerator() {
            result = result.checked_multiply(&base(unit, *power)?)?;
        }
        for (unit, power) in units_factor.denominator() {
            result = result.checked_divide(&base(unit, *power)?)?;
        }
        Ok(result)
    }

    pub fn are_unit_factors_dimensionally_equivalent(
        &self,
        first: &AlgebraicFactor,
        second: &AlgebraicFactor,
    ) -> Result<bool> {
        let first = self.fundamental_dimensional_factor_from_units_factor(first)?;
        let second = self.fundamental_dimensional_factor_from_units_factor(second)?;
        Ok(first == second)
    }

    pub fn are_dimensional_factors_dimensionally_equivalent(
        &self,
        first: &AlgebraicFactor,
        second: &AlgebraicFactor,
    ) -> Result<bool> {
        let first = self.fundamental_dimensional_factor_from_dimensional_factor(first)?;
        let second = self.fundamental_dimensional_factor_from_dimensional_factor(second)?;
        Ok(first == second)
    }

    // ============================================
    // Conversion
    // ============================================

    /// Parameters converting a quantity expressed in `current` units into
    /// `target` units. Dimensional compatibility is not checked here; see
    /// [`convert`](Self::convert).
    ///
    /// A composed unit raised to power `n` applies its conversion step `n`
    /// times, so an offset in a composed unit's definition is applied once per
    /// exponent unit rather than once per term.
    pub fn conversion_parameters(
        &self,
        current: &AlgebraicFactor,
        target: &AlgebraicFactor,
    ) -> Result<ConversionParameters> {
        let current_to_fundamental = self.to_fundamental_units(current)?;
        let target_to_fundamental = self.to_fundamental_units(target)?;
        Ok(current_to_fundamental.compose(&target_to_fundamental.invert()?))
    }

    pub fn apply_conversion(&self, quantity: f64, params: &ConversionParameters) -> f64 {
        params.apply(quantity)
    }

    /// Converts `quantity` after checking that both factors share dimensions.
    pub fn convert(
        &self,
        quantity: f64,
        current: &AlgebraicFactor,
        target: &AlgebraicFactor,
    ) -> Result<f64> {
        if !self.are_unit_factors_dimensionally_equivalent(current, target)? {
            return Err(Error::IncompatibleUnits {
                from: current.to_string(),
                to: target.to_string(),
            });
        }
        let params = self.conversion_parameters(current, target)?;
        Ok(self.apply_conversion(quantity, &params))
    }

    fn to_fundamental_units(&self, units_factor: &AlgebraicFactor) -> Result<ConversionParameters> {
        let mut params = ConversionParameters::IDENTITY;
        for (unit, power) in units_factor.numerator() {
            let step = self.unit_to_fundamental(unit)?;
            params = params.compose(&step.powi(*power));
        }
        for (unit, power) in units_factor.denominator() {
            let step = self.unit_to_fundamental(unit)?.invert()?;
            params = params.compose(&step.powi(*power));
        }
        Ok(params)
    }

    fn unit_to_fundamental(&self, unit: &str) -> Result<ConversionParameters> {
        let dimension = self.dimension_for_unit(unit)?;
        let multiple = dimension
            .multiple(unit)
            .ok_or_else(|| Error::UnknownUnit(unit.to_string()))?;
        Ok(match dimension.kind() {
            DimensionKind::Composed(definition) => multiple.compose(&definition.conversion),
            DimensionKind::Fundamental => multiple,
        })
    }
}

/// One symbol of a factor raised to `power`, expressed over fundamental
/// dimension names.
fn expand(dimension: &PhysicalDimension, power: u32) -> Result<AlgebraicFactor> {
    match dimension.kind() {
        DimensionKind::Composed(definition) => definition.dimensional_definition.checked_pow(power),
        DimensionKind::Fundamental => Ok(AlgebraicFactor::from_term(dimension.name(), power)),
    }
}
