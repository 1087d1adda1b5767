//! Execution context for unit resolution
//!
//! The context supplies the measurement units of fields and the unit rules
//! of methods an expression may invoke. It is passed explicitly to each
//! resolution pass.

use crate::error::Result;
use crate::methods;
use mensura_units::AlgebraicFactor;
use std::collections::HashMap;
use std::fmt;

/// Computes the unit of a method invocation from its argument units.
pub trait MethodUnitRule: Send + Sync {
    fn resulting_unit(&self, args: &[AlgebraicFactor]) -> Result<AlgebraicFactor>;
}

impl<F> MethodUnitRule for F
where
    F: Fn(&[AlgebraicFactor]) -> Result<AlgebraicFactor> + Send + Sync,
{
    fn resulting_unit(&self, args: &[AlgebraicFactor]) -> Result<AlgebraicFactor> {
        self(args)
    }
}

/// Source of field units and method rules.
pub trait ExecutionContext: Send + Sync {
    fn field_unit(&self, name: &str) -> Option<&AlgebraicFactor>;

    fn method(&self, name: &str) -> Option<&dyn MethodUnitRule>;
}

/// Map-backed [`ExecutionContext`].
///
/// Method lookups fall back to the [standard methods](crate::methods)
/// unless they were disabled with [`without_standard_methods`](Self::without_standard_methods).
pub struct UnitContext {
    fields: HashMap<String, AlgebraicFactor>,
    methods: HashMap<String, Box<dyn MethodUnitRule>>,
    standard_methods: bool,
}

impl UnitContext {
    pub fn new() -> Self {
        Self {
            fields: HashMap::new(),
            methods: HashMap::new(),
            standard_methods: true,
        }
    }

    pub fn without_standard_methods(mut self) -> Self {
        self.standard_methods = false;
        self
    }

    /// Builder-style [`set_field`](Self::set_field)
    pub fn with_field(mut self, name: impl Into<String>, unit: AlgebraicFactor) -> Self {
        self.set_field(name, unit);
        self
    }

    /// Builder-style [`set_method`](Self::set_method)
    pub fn with_method(mut self, name: impl Into<String>, rule: impl MethodUnitRule + 'static) -> Self {
        self.set_method(name, rule);
        self
    }

    pub fn set_field(&mut self, name: impl Into<String>, unit: AlgebraicFactor) {
        self.fields.insert(name.into(), unit);
    }

    /// Registers a method; it shadows a standard method of the same name.
    pub fn set_method(&mut self, name: impl Into<String>, rule: impl MethodUnitRule + 'static) {
        self.methods.insert(name.into(), Box::new(rule));
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &AlgebraicFactor)> {
        self.fields.iter().map(|(name, unit)| (name.as_str(), unit))
    }
}

impl Default for UnitContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UnitContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        methods.sort_unstable();
        f.debug_struct("UnitContext")
            .field("fields", &self.fields)
            .field("methods", &methods)
            .field("standard_methods", &self.standard_methods)
            .finish()
    }
}

impl ExecutionContext for UnitContext {
    fn field_unit(&self, name: &str) -> Option<&AlgebraicFactor> {
        self.fields.get(name)
    }

    fn method(&self, name: &str) -> Option<&dyn MethodUnitRule> {
        if let Some(rule) = self.methods.get(name) {
            return Some(rule.as_ref());
        }
        if self.standard_methods {
            return methods::standard_method(name).map(|m| m as &dyn MethodUnitRule);
        }
        None
    }
}
