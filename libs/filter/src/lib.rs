//! Filter expressions with measurement-unit resolution
//!
//! ```text
//! Expression String
//!      |
//!   Lexer -> Tokens
//!      |
//!   Parser -> AST (Expr, one NodeId per node)
//!      |
//! Unit Resolution -> UnitMap (NodeId -> AlgebraicFactor)
//! ```
//!
//! ```
//! use mensura_filter::{parse, resolve_units, UnitContext};
//!
//! let ctx = UnitContext::new()
//!     .with_field("distance", "km".parse().unwrap())
//!     .with_field("duration", "h".parse().unwrap());
//! let expr = parse("round(distance / duration) + 5 km / 1 h").unwrap();
//! let units = resolve_units(&expr, &ctx).unwrap();
//! assert_eq!(units[&expr.id].to_string(), "km/h");
//! ```

pub mod ast;
pub mod context;
pub mod error;
pub mod lexer;
pub mod methods;
pub mod parser;
pub mod resolver;
pub mod token;
pub mod validator;

// Re-export main types
pub use ast::{
    walk, walk_post_order, BinaryOperator, CastType, Expr, ExprBuilder, ExprKind, LiteralValue,
    NodeId, UnaryOperator, ValueType,
};
pub use context::{ExecutionContext, MethodUnitRule, UnitContext};
pub use error::{Error, Result};
pub use parser::{parse, parse_with_validator, Parser};
pub use resolver::{resolve_units, UnitMap, UnitResolver};
pub use validator::{UnitValidator, WhitelistValidator};
