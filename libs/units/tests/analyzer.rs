use mensura_units::{
    AlgebraicFactor, ConversionParameters, DimensionalAnalyzer, Error, ErrorKind,
};

fn factor(s: &str) -> AlgebraicFactor {
    s.parse().unwrap()
}

fn assert_params(actual: ConversionParameters, factor: f64, offset: f64) {
    assert!(
        actual.approx_eq(&ConversionParameters::new(factor, offset), 1e-9),
        "expected x * {} + {}, got {}",
        factor,
        offset,
        actual
    );
}

fn length() -> DimensionalAnalyzer {
    let mut dim = DimensionalAnalyzer::new();
    dim.add_fundamental_dimension("length", "m").unwrap();
    dim.add_multiplier_measurement_unit("km", "m", ConversionParameters::scale(1000.0))
        .unwrap();
    dim
}

/// `force`/`N` and `area`/`m2` as fundamental, `pressure`/`psi` composed over them.
fn pressure() -> DimensionalAnalyzer {
    let mut dim = DimensionalAnalyzer::new();
    dim.add_fundamental_dimension("force", "N").unwrap();
    dim.add_fundamental_dimension("area", "m2").unwrap();
    let reference = AlgebraicFactor::from_symbol("N").divide(&AlgebraicFactor::from_symbol("m2"));
    dim.add_composed_dimension("pressure", "psi", reference, ConversionParameters::scale(6894.76))
        .unwrap();
    dim
}

// ============================================
// AlgebraicFactor
// ============================================

#[test]
fn multiply_sums_exponents() {
    let s = AlgebraicFactor::from_symbol("s");
    let ss = s.multiply(&s);
    assert_eq!(ss.numerator().get("s"), Some(&2));
    assert!(ss.denominator().is_empty());
}

#[test]
fn divide_keeps_distinct_symbols() {
    let f = AlgebraicFactor::from_symbol("m").divide(&AlgebraicFactor::from_symbol("km"));
    assert_eq!(f.numerator().get("m"), Some(&1));
    assert_eq!(f.denominator().get("km"), Some(&1));
    assert_eq!(f.numerator().len(), 1);
    assert_eq!(f.denominator().len(), 1);
}

#[test]
fn divide_by_self_does_not_cancel() {
    let s = AlgebraicFactor::from_symbol("s");
    let f = s.divide(&s);
    assert_eq!(f.numerator(), f.denominator());
    assert_eq!(f.numerator().get("s"), Some(&1));
    assert!(f.is_dimensionless());
    assert!(!f.is_empty());
    assert_ne!(f, AlgebraicFactor::dimensionless());
}

#[test]
fn equality_ignores_construction_order() {
    let a = AlgebraicFactor::new([("kg", 1), ("m", 1)], [("s", 2)]).unwrap();
    let b = AlgebraicFactor::new([("m", 1), ("kg", 1)], [("s", 1), ("s", 1)]).unwrap();
    assert_eq!(a, b);
    assert_eq!(b, a);
    assert_eq!(a, a.clone());
}

#[test]
fn operators_match_methods() {
    let m = AlgebraicFactor::from_symbol("m");
    let s = AlgebraicFactor::from_symbol("s");
    assert_eq!(&m / &s, m.divide(&s));
    assert_eq!(m.clone() * s.clone(), m.multiply(&s));
    assert_eq!((&m / &s).inverse(), s.divide(&m));
}

// ============================================
// Registration
// ============================================

#[test]
fn registers_fundamental_dimension() {
    let dim = length();
    let record = dim.fundamental_dimension("length").unwrap();
    assert_eq!(record.default_unit(), "m");
    assert!(!record.is_composed());
    assert_eq!(record.measurement_units().collect::<Vec<_>>(), vec!["m", "km"]);
    assert_eq!(record.multiple("m"), Some(ConversionParameters::IDENTITY));
    assert_eq!(dim.dimension_for_unit("km").unwrap().name(), "length");
}

#[test]
fn duplicate_registrations_leave_registry_usable() {
    let mut dim = length();

    let err = dim.add_fundamental_dimension("length", "ft").unwrap_err();
    assert_eq!(err, Error::DuplicateDimension("length".into()));
    assert_eq!(err.kind(), ErrorKind::Registration);

    let err = dim.add_fundamental_dimension("distance", "km").unwrap_err();
    assert_eq!(err, Error::DuplicateUnit("km".into()));

    let err = dim
        .add_multiplier_measurement_unit("km", "m", ConversionParameters::scale(1000.0))
        .unwrap_err();
    assert_eq!(err, Error::DuplicateUnit("km".into()));

    let err = dim
        .add_multiplier_measurement_unit("ft", "yd", ConversionParameters::scale(0.3048))
        .unwrap_err();
    assert_eq!(err, Error::UnknownBasicUnit("yd".into()));

    assert!(!dim.is_unit_registered("ft"));
    assert_eq!(dim.fundamental_dimensions().collect::<Vec<_>>(), vec!["length"]);
    dim.add_fundamental_dimension("time", "s").unwrap();
    assert_eq!(dim.convert(2.0, &factor("km"), &factor("m")).unwrap(), 2000.0);
}

#[test]
fn composed_reference_must_use_fundamental_units() {
    let mut dim = length();
    let err = dim
        .add_composed_dimension("area", "ha", factor("km^2"), ConversionParameters::IDENTITY)
        .unwrap_err();
    assert_eq!(err, Error::NotFundamentalUnit("km".into()));

    let err = dim
        .add_composed_dimension("speed", "kn", factor("m/s"), ConversionParameters::IDENTITY)
        .unwrap_err();
    assert_eq!(err, Error::NotFundamentalUnit("s".into()));
    assert!(dim.composed_dimension("speed").is_err());
}

#[test]
fn composed_dimension_and_fundamental_name_collide() {
    let mut dim = length();
    let err = dim
        .add_composed_dimension("length", "m2", factor("m^2"), ConversionParameters::IDENTITY)
        .unwrap_err();
    assert_eq!(err, Error::DuplicateDimension("length".into()));
}

#[test]
fn multiples_are_visible_through_every_alias() {
    let mut dim = length();
    dim.add_multiplier_measurement_unit("cm", "km", ConversionParameters::scale(0.01))
        .unwrap();
    dim.add_multiplier_measurement_unit("mm", "cm", ConversionParameters::scale(0.001))
        .unwrap();

    for unit in ["m", "km", "cm", "mm"] {
        let record = dim.dimension_for_unit(unit).unwrap();
        assert_eq!(record.unit_count(), 4, "via {}", unit);
        assert_eq!(record.multiple("mm"), Some(ConversionParameters::scale(0.001)));
    }
}

// ============================================
// Conversion
// ============================================

#[test]
fn converts_between_metre_and_kilometre() {
    let dim = length();
    assert_params(dim.conversion_parameters(&factor("m"), &factor("km")).unwrap(), 0.001, 0.0);
    assert_params(dim.conversion_parameters(&factor("km"), &factor("m")).unwrap(), 1000.0, 0.0);
}

#[test]
fn converts_affine_temperatures() {
    let mut dim = DimensionalAnalyzer::new();
    dim.add_fundamental_dimension("temperature", "C").unwrap();
    dim.add_multiplier_measurement_unit("F", "C", ConversionParameters::new(5.0 / 9.0, -160.0 / 9.0))
        .unwrap();

    assert_params(
        dim.conversion_parameters(&factor("F"), &factor("C")).unwrap(),
        5.0 / 9.0,
        -160.0 / 9.0,
    );
    assert_params(dim.conversion_parameters(&factor("C"), &factor("F")).unwrap(), 9.0 / 5.0, 32.0);
    assert!((dim.convert(100.0, &factor("C"), &factor("F")).unwrap() - 212.0).abs() < 1e-9);
}

#[test]
fn converts_area_with_squared_multiples() {
    let dim = length();
    let params = dim.conversion_parameters(&factor("km^2"), &factor("m^2")).unwrap();
    assert_params(params, 1_000_000.0, 0.0);
}

#[test]
fn converts_speed_with_denominator_units() {
    let mut dim = length();
    dim.add_fundamental_dimension("time", "s").unwrap();
    dim.add_multiplier_measurement_unit("h", "s", ConversionParameters::scale(3600.0))
        .unwrap();
    let v = dim.convert(90.0, &factor("km/h"), &factor("m/s")).unwrap();
    assert!((v - 25.0).abs() < 1e-9);
}

#[test]
fn converts_through_composed_dimension() {
    let mut dim = pressure();
    dim.add_multiplier_measurement_unit("atm", "psi", ConversionParameters::scale(14.6959))
        .unwrap();
    let pa = dim.convert(1.0, &factor("atm"), &factor("N/m2")).unwrap();
    assert!((pa - 14.6959 * 6894.76).abs() < 1e-6);
    let psi = dim.convert(pa, &factor("N/m2"), &factor("psi")).unwrap();
    assert!((psi - 14.6959).abs() < 1e-9);
}

#[test]
fn conversion_of_unknown_unit_fails() {
    let dim = length();
    let err = dim.conversion_parameters(&factor("m"), &factor("yd")).unwrap_err();
    assert_eq!(err, Error::UnknownUnit("yd".into()));
    assert_eq!(err.kind(), ErrorKind::Lookup);
}

#[test]
fn zero_factor_cannot_be_inverted() {
    let mut dim = length();
    dim.add_multiplier_measurement_unit("void", "m", ConversionParameters::scale(0.0))
        .unwrap();
    let err = dim.conversion_parameters(&factor("m"), &factor("void")).unwrap_err();
    assert_eq!(err, Error::ZeroConversionFactor);
}

// ============================================
// Equivalence
// ============================================

#[test]
fn composed_definition_uses_dimension_names() {
    let dim = pressure();
    let record = dim.composed_dimension("pressure").unwrap();
    let definition = &record.composed_definition().unwrap().dimensional_definition;
    assert_eq!(definition, &factor("force/area"));
    assert_eq!(dim.dimension_for_unit("psi").unwrap().name(), "pressure");
    assert_eq!(dim.composed_dimensions().collect::<Vec<_>>(), vec!["pressure"]);
}

#[test]
fn multiplier_of_composed_unit_is_equivalent_to_reference() {
    let mut dim = pressure();
    dim.add_multiplier_measurement_unit("atm", "psi", ConversionParameters::scale(14.6959))
        .unwrap();
    assert!(dim
        .are_unit_factors_dimensionally_equivalent(&factor("atm"), &factor("N/m2"))
        .unwrap());
    assert!(!dim
        .are_unit_factors_dimensionally_equivalent(&factor("atm"), &factor("N"))
        .unwrap());
}

#[test]
fn dimensional_factor_equivalence() {
    let mut dim = DimensionalAnalyzer::new();
    dim.add_fundamental_dimension("distance", "m").unwrap();
    dim.add_fundamental_dimension("time", "h").unwrap();
    dim.add_composed_dimension("acceleration", "mh2", factor("m/h^2"), ConversionParameters::IDENTITY)
        .unwrap();

    assert!(dim
        .are_dimensional_factors_dimensionally_equivalent(
            &factor("acceleration"),
            &factor("distance/time^2"),
        )
        .unwrap());
    assert!(!dim
        .are_dimensional_factors_dimensionally_equivalent(&factor("time"), &factor("distance/time"))
        .unwrap());

    let err = dim
        .are_dimensional_factors_dimensionally_equivalent(&factor("speed"), &factor("distance"))
        .unwrap_err();
    assert_eq!(err, Error::UnknownDimension("speed".into()));
}

#[test]
fn composed_exponents_repeat_the_definition() {
    let mut dim = DimensionalAnalyzer::new();
    dim.add_fundamental_dimension("length", "m").unwrap();
    dim.add_composed_dimension("area", "m2", factor("m^2"), ConversionParameters::IDENTITY)
        .unwrap();
    let canonical = dim
        .fundamental_dimensional_factor_from_units_factor(&factor("m2^2"))
        .unwrap();
    assert_eq!(canonical, factor("length^4"));
}

#[test]
fn composed_offset_applies_once_per_exponent_unit() {
    let mut dim = DimensionalAnalyzer::new();
    dim.add_fundamental_dimension("temperature", "K").unwrap();
    dim.add_composed_dimension("shifted", "W", factor("K"), ConversionParameters::new(1.0, 10.0))
        .unwrap();

    let once = dim.conversion_parameters(&factor("W"), &factor("K")).unwrap();
    assert_params(once, 1.0, 10.0);

    let squared = dim.conversion_parameters(&factor("W^2"), &factor("K^2")).unwrap();
    assert_params(squared, 1.0, 20.0);
}

#[test]
fn composed_exponent_overflow_is_an_error() {
    let mut dim = DimensionalAnalyzer::new();
    dim.add_fundamental_dimension("length", "m").unwrap();
    dim.add_composed_dimension("area", "m2", factor("m^2"), ConversionParameters::IDENTITY)
        .unwrap();

    let huge = factor("m2^1073741824");
    let err = dim
        .fundamental_dimensional_factor_from_units_factor(&huge)
        .unwrap_err();
    assert_eq!(err, Error::ExponentOverflow("length".into()));
    assert_eq!(err.kind(), ErrorKind::Arithmetic);
    assert!(dim.fundamental_units_factor(&huge).is_err());

    let large = factor("m2^1000000");
    let canonical = dim
        .fundamental_dimensional_factor_from_units_factor(&large)
        .unwrap();
    assert_eq!(canonical.numerator().get("length"), Some(&2_000_000));
}
