//! Unit rules of the standard methods
//!
//! Uses a compile-time perfect hash map (phf) for method name lookups.

use crate::context::MethodUnitRule;
use crate::error::{Error, Result};
use mensura_units::AlgebraicFactor;
use phf::phf_map;

/// How a method's resulting unit follows from its argument units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitRule {
    /// Unit of the first argument: `abs(x)`
    SameAsArgument,
    /// All arguments share one unit, which is the result: `min(a, b)`
    CommonUnit,
    /// Argument unit multiplied by itself: `sqr(x)`
    Squared,
    /// Always dimensionless: `count(...)`
    Dimensionless,
}

/// Method metadata
#[derive(Debug, Clone, Copy)]
pub struct MethodMetadata {
    pub name: &'static str,
    pub min_args: usize,
    pub max_args: Option<usize>, // None = unbounded
    pub rule: UnitRule,
}

static STANDARD_METHODS: phf::Map<&'static str, MethodMetadata> = phf_map! {
    "abs" => MethodMetadata { name: "abs", min_args: 1, max_args: Some(1), rule: UnitRule::SameAsArgument },
    "round" => MethodMetadata { name: "round", min_args: 1, max_args: Some(2), rule: UnitRule::SameAsArgument },
    "floor" => MethodMetadata { name: "floor", min_args: 1, max_args: Some(1), rule: UnitRule::SameAsArgument },
    "ceiling" => MethodMetadata { name: "ceiling", min_args: 1, max_args: Some(1), rule: UnitRule::SameAsArgument },
    "truncate" => MethodMetadata { name: "truncate", min_args: 1, max_args: Some(1), rule: UnitRule::SameAsArgument },
    "min" => MethodMetadata { name: "min", min_args: 1, max_args: None, rule: UnitRule::CommonUnit },
    "max" => MethodMetadata { name: "max", min_args: 1, max_args: None, rule: UnitRule::CommonUnit },
    "sqr" => MethodMetadata { name: "sqr", min_args: 1, max_args: Some(1), rule: UnitRule::Squared },
    "count" => MethodMetadata { name: "count", min_args: 0, max_args: None, rule: UnitRule::Dimensionless },
    "len" => MethodMetadata { name: "len", min_args: 1, max_args: Some(1), rule: UnitRule::Dimensionless },
};

/// Looks up a standard method by name.
pub fn standard_method(name: &str) -> Option<&'static MethodMetadata> {
    STANDARD_METHODS.get(name)
}

/// Names of all standard methods.
pub fn standard_method_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = STANDARD_METHODS.keys().copied().collect();
    names.sort_unstable();
    names
}

impl MethodMetadata {
    /// Validate argument count
    pub fn validate_args(&self, arg_count: usize) -> Result<()> {
        if arg_count < self.min_args {
            return Err(Error::method_rule(
                self.name,
                format!("requires at least {} arguments, got {}", self.min_args, arg_count),
            ));
        }

        if let Some(max) = self.max_args {
            if arg_count > max {
                return Err(Error::method_rule(
                    self.name,
                    format!("takes at most {} arguments, got {}", max, arg_count),
                ));
            }
        }

        Ok(())
    }
}

impl MethodUnitRule for MethodMetadata {
    fn resulting_unit(&self, args: &[AlgebraicFactor]) -> Result<AlgebraicFactor> {
        self.validate_args(args.len())?;

        match self.rule {
            UnitRule::Dimensionless => Ok(AlgebraicFactor::dimensionless()),
            UnitRule::SameAsArgument => Ok(args[0].clone()),
            UnitRule::Squared => Ok(args[0].checked_multiply(&args[0])?),
            UnitRule::CommonUnit => {
                let first = &args[0];
                if let Some(other) = args.iter().find(|unit| *unit != first) {
                    return Err(Error::method_rule(
                        self.name,
                        format!("arguments have different units: '{}' and '{}'", first, other),
                    ));
                }
                Ok(first.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(s: &str) -> AlgebraicFactor {
        s.parse().unwrap()
    }

    #[test]
    fn test_all_methods_registered() {
        for name in ["abs", "round", "floor", "ceiling", "truncate", "min", "max", "sqr", "count", "len"] {
            assert!(standard_method(name).is_some(), "Method '{}' is not registered", name);
        }
        assert_eq!(standard_method_names().len(), 10);
        assert!(standard_method("Abs").is_none());
    }

    #[test]
    fn test_argument_validation() {
        let abs = standard_method("abs").unwrap();
        assert!(abs.validate_args(1).is_ok());
        assert!(abs.validate_args(0).is_err());
        assert!(abs.validate_args(2).is_err());

        let round = standard_method("round").unwrap();
        assert!(round.validate_args(2).is_ok());

        let count = standard_method("count").unwrap();
        assert!(count.validate_args(0).is_ok());
        assert!(count.validate_args(7).is_ok());
    }

    #[test]
    fn test_unit_rules() {
        let sqr = standard_method("sqr").unwrap();
        assert_eq!(sqr.resulting_unit(&[unit("m")]).unwrap(), unit("m^2"));

        let max = standard_method("max").unwrap();
        assert_eq!(max.resulting_unit(&[unit("s"), unit("s")]).unwrap(), unit("s"));
        let err = max.resulting_unit(&[unit("s"), unit("h")]).unwrap_err();
        assert!(matches!(err, Error::MethodRule { ref method, .. } if method == "max"));

        let len = standard_method("len").unwrap();
        assert!(len.resulting_unit(&[unit("m")]).unwrap().is_empty());
    }
}
