//! Physical dimension records held by the [`DimensionalAnalyzer`](crate::DimensionalAnalyzer).

use crate::conversion::ConversionParameters;
use crate::factor::AlgebraicFactor;

/// Handle into the analyzer's dimension table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DimensionId(pub(crate) usize);

impl DimensionId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Definition carried by a composed dimension.
#[derive(Clone, Debug, PartialEq)]
pub struct ComposedDefinition {
    /// The dimension over fundamental dimension names, e.g. `force/area`.
    pub dimensional_definition: AlgebraicFactor,
    /// The dimension over fundamental units, e.g. `N/m2`.
    pub reference_factor: AlgebraicFactor,
    /// Maps the default unit onto the units of `reference_factor`.
    pub conversion: ConversionParameters,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DimensionKind {
    Fundamental,
    Composed(ComposedDefinition),
}

/// A fundamental or composed physical dimension and its measurement units.
///
/// `multiples` is append-only and keeps registration order; the default unit
/// is always first with the identity conversion.
#[derive(Clone, Debug, PartialEq)]
pub struct PhysicalDimension {
    name: String,
    default_unit: String,
    multiples: Vec<(String, ConversionParameters)>,
    kind: DimensionKind,
}

impl PhysicalDimension {
    pub(crate) fn fundamental(name: String, default_unit: String) -> Self {
        Self::with_kind(name, default_unit, DimensionKind::Fundamental)
    }

    pub(crate) fn composed(name: String, default_unit: String, definition: ComposedDefinition) -> Self {
        Self::with_kind(name, default_unit, DimensionKind::Composed(definition))
    }

    fn with_kind(name: String, default_unit: String, kind: DimensionKind) -> Self {
        let multiples = vec![(default_unit.clone(), ConversionParameters::IDENTITY)];
        Self {
            name,
            default_unit,
            multiples,
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_unit(&self) -> &str {
        &self.default_unit
    }

    pub fn kind(&self) -> &DimensionKind {
        &self.kind
    }

    pub fn is_composed(&self) -> bool {
        matches!(self.kind, DimensionKind::Composed(_))
    }

    pub fn composed_definition(&self) -> Option<&ComposedDefinition> {
        match &self.kind {
            DimensionKind::Composed(definition) => Some(definition),
            DimensionKind::Fundamental => None,
        }
    }

    /// Conversion from `unit` to the default unit.
    pub fn multiple(&self, unit: &str) -> Option<ConversionParameters> {
        self.multiples
            .iter()
            .find(|(u, _)| u == unit)
            .map(|(_, params)| *params)
    }

    pub fn multiples(&self) -> impl Iterator<Item = (&str, &ConversionParameters)> {
        self.multiples.iter().map(|(u, p)| (u.as_str(), p))
    }

    pub fn measurement_units(&self) -> impl Iterator<Item = &str> {
        self.multiples.iter().map(|(u, _)| u.as_str())
    }

    pub fn unit_count(&self) -> usize {
        self.multiples.len()
    }

    pub(crate) fn add_multiple(&mut self, unit: String, params: ConversionParameters) {
        self.multiples.push((unit, params));
    }
}
