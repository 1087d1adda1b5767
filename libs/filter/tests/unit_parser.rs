//! Unit tests for the filter expression parser

use mensura_filter::ast::{CastType, Expr, ExprKind, LiteralValue, NodeId, UnaryOperator, ValueType};
use mensura_filter::parser::Parser;
use mensura_filter::{parse_with_validator, Error, WhitelistValidator};
use rust_decimal::Decimal;

/// Helper to parse expression and return AST
fn parse(expr: &str) -> Result<Expr, Error> {
    let mut parser = Parser::new(expr.to_string());
    parser.parse()
}

/// Helper to parse and render back with full parenthesization
fn render(expr: &str) -> String {
    parse(expr)
        .unwrap_or_else(|e| panic!("failed to parse '{}': {}", expr, e))
        .to_string()
}

fn literal(expr: &Expr) -> (&LiteralValue, Option<&str>) {
    match &expr.kind {
        ExprKind::Literal { value, unit } => (value, unit.as_deref()),
        other => panic!("expected literal, got {:?}", other),
    }
}

#[test]
fn test_parse_field_sum() {
    assert_eq!(render("a + b"), "(a + b)");

    let expr = parse("a + b").unwrap();
    assert_eq!(expr.id, NodeId(2));
    assert_eq!(expr.node_count(), 3);
}

#[test]
fn test_parse_method_call_with_arguments() {
    assert_eq!(
        render("(a + b) * f(c + d, 12 + 23)"),
        "((a + b) * f((c + d), (12 + 23)))"
    );
    assert_eq!(render("count()"), "count()");
    assert_eq!(render("Math.max(1, 2)"), "Math.max(1, 2)");
}

#[test]
fn test_parse_qualified_field() {
    let expr = parse("order.line.length").unwrap();
    assert_eq!(expr.kind, ExprKind::FieldReference("order.line.length".into()));
}

#[test]
fn test_parse_literals_with_units() {
    assert_eq!(render("2 cm + 14 mm"), "(2 cm + 14 mm)");

    let expr = parse("5km").unwrap();
    assert_eq!(literal(&expr), (&LiteralValue::Int(5), Some("km")));

    // a separate `m` is a unit, an attached one is the decimal suffix
    let expr = parse("5 m").unwrap();
    assert_eq!(literal(&expr), (&LiteralValue::Int(5), Some("m")));
    let expr = parse("5m").unwrap();
    assert_eq!(literal(&expr), (&LiteralValue::Decimal(Decimal::from(5)), None));

    let expr = parse("2.5e3 km").unwrap();
    assert_eq!(literal(&expr), (&LiteralValue::Double(2500.0), Some("km")));
}

#[test]
fn test_parse_literal_types() {
    let cases = [
        ("42", ValueType::Int),
        ("42u", ValueType::UInt),
        ("42L", ValueType::Long),
        ("42UL", ValueType::ULong),
        ("4.2", ValueType::Double),
        ("4.2d", ValueType::Double),
        ("4.2f", ValueType::Float),
        ("4.2m", ValueType::Decimal),
        ("'c'", ValueType::Char),
        ("\"text\"", ValueType::String),
        ("true", ValueType::Bool),
    ];
    for (input, expected) in cases {
        let expr = parse(input).unwrap();
        let (value, unit) = literal(&expr);
        assert_eq!(value.value_type(), Some(expected), "{}", input);
        assert_eq!(unit, None);
    }

    let expr = parse("null").unwrap();
    assert_eq!(literal(&expr).0.value_type(), None);
}

#[test]
fn test_integer_out_of_range() {
    assert!(matches!(parse("3000000000"), Err(Error::Parse(_))));
    let expr = parse("3000000000u").unwrap();
    assert_eq!(literal(&expr).0, &LiteralValue::UInt(3_000_000_000));
}

#[test]
fn test_only_numbers_take_units() {
    assert!(parse("\"text\" cm").is_err());
    assert!(parse("true cm").is_err());
}

#[test]
fn test_parse_cast() {
    assert_eq!(render("(double)(2 cm + 14 mm)"), "(double)(2 cm + 14 mm)");

    let expr = parse("(int?)x").unwrap();
    match &expr.kind {
        ExprKind::Cast { target, expr } => {
            assert_eq!(*target, CastType::nullable(ValueType::Int));
            assert_eq!(expr.kind, ExprKind::FieldReference("x".into()));
        }
        other => panic!("expected cast, got {:?}", other),
    }

    assert_eq!(render("(DateTime)stamp"), "(DateTime)stamp");
}

#[test]
fn test_reference_types_are_not_nullable() {
    assert!(parse("(string?)x").is_err());
    assert!(parse("(object?)x").is_err());
    assert!(parse("(string)x").is_ok());
}

#[test]
fn test_cast_applies_to_a_terminal() {
    assert_eq!(render("(int)a + b"), "((int)a + b)");
    assert!(parse("(int)-a").is_err());
}

#[test]
fn test_parse_logical_chain() {
    assert_eq!(
        render("b = c Or d <> e And p Xor j And b > c And b < c And c >= b And b <= d"),
        "((b = c) Or (((((((d <> e) And p) Xor j) And (b > c)) And (b < c)) And (c >= b)) And (b <= d)))"
    );
}

#[test]
fn test_parse_precedence() {
    // Multiplication binds tighter than addition
    assert_eq!(render("1 + 2 * 3"), "(1 + (2 * 3))");
    // Parentheses override precedence
    assert_eq!(render("(1 + 2) * 3"), "((1 + 2) * 3)");
    // Comparisons bind tighter than arithmetic
    assert_eq!(render("a * b = c"), "(a * (b = c))");
    assert_eq!(render("a = b < c"), "(a = (b < c))");
    // Left associativity
    assert_eq!(render("a - b - c"), "((a - b) - c)");
    assert_eq!(render("a / b % c"), "((a / b) % c)");
}

#[test]
fn test_parse_unary() {
    assert_eq!(render("-a + b"), "((-a) + b)");
    assert_eq!(render("Not a And b"), "((Not a) And b)");

    let expr = parse("-3 km").unwrap();
    match &expr.kind {
        ExprKind::Unary { op, operand } => {
            assert_eq!(*op, UnaryOperator::Negate);
            assert_eq!(literal(operand), (&LiteralValue::Int(3), Some("km")));
        }
        other => panic!("expected unary, got {:?}", other),
    }

    // a single operator per terminal
    assert!(parse("--a").is_err());
}

#[test]
fn test_display_reparses_to_same_shape() {
    for input in [
        "(a + b) * f(c + d, 12 + 23)",
        "(double?)(2 cm + 14 mm) > 3 m",
        "Not flag Or -x < 2.5f",
        "name = \"say \\\"hi\\\"\"",
    ] {
        let once = render(input);
        assert_eq!(render(&once), once, "{}", input);
    }
}

#[test]
fn test_parse_errors() {
    for input in ["", "a +", "(a", "f(1,", "a b", "1 +* 2", ")", "a.", "(int"] {
        assert!(
            matches!(parse(input), Err(Error::Parse(_))),
            "'{}' should not parse",
            input
        );
    }
}

#[test]
fn test_lexer_errors_are_reported() {
    let err = parse("a + \"open").unwrap_err();
    assert!(err.to_string().contains("Unterminated string"), "{}", err);

    let err = parse("a # b").unwrap_err();
    assert!(err.to_string().contains("line 1, column 3"), "{}", err);
}

#[test]
fn test_validator_rejects_unknown_units() {
    let validator = WhitelistValidator::default();
    assert!(parse_with_validator("2 cm + 14 mm", &validator).is_ok());

    let err = parse_with_validator("2 cm + 3 mi", &validator).unwrap_err();
    assert_eq!(
        err,
        Error::InvalidMeasurementUnit {
            unit: "mi".into(),
            line: 1,
            column: 10,
        }
    );

    // Field names are not subject to unit validation
    assert!(parse_with_validator("mi + 3 km", &validator).is_ok());
}

#[test]
fn test_recursion_depth_limit() {
    let shallow = format!("{}1{}", "(".repeat(50), ")".repeat(50));
    assert!(parse(&shallow).is_ok());

    let deep = format!("{}1{}", "(".repeat(300), ")".repeat(300));
    let err = parse(&deep).unwrap_err();
    assert!(err.to_string().contains("too deeply nested"), "{}", err);
}

#[test]
fn test_long_operator_chain_is_limited() {
    let sum = vec!["1 m"; 150].join(" + ");
    let expr = parse(&sum).unwrap();
    assert_eq!(expr.node_count(), 299);

    let huge = vec!["1 m"; 20_000].join(" + ");
    let err = parse(&huge).unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
    assert!(err.to_string().contains("too deeply nested"), "{}", err);
}

#[test]
fn test_chain_depth_is_released_after_each_group() {
    let group = format!("({})", vec!["a"; 100].join(" * "));
    let expr = parse(&vec![group.as_str(); 3].join(" + ")).unwrap();
    assert_eq!(expr.node_count(), 3 * 199 + 2);
}
