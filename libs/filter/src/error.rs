//! Error types for filter expression parsing and unit resolution

use crate::ast::{BinaryOperator, NodeId};
use mensura_units::AlgebraicFactor;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid measurement unit '{unit}' at line {line}, column {column}")]
    InvalidMeasurementUnit {
        unit: String,
        line: usize,
        column: usize,
    },

    #[error("Field not found in execution context: {0}")]
    UnresolvedField(String),

    #[error("Method not found in execution context: {0}")]
    UnknownMethod(String),

    #[error("Measurement unit mismatch at node {node}: '{left}' {op} '{right}'")]
    UnitMismatch {
        node: NodeId,
        op: BinaryOperator,
        left: AlgebraicFactor,
        right: AlgebraicFactor,
    },

    #[error("Node id {0} appears more than once in the expression tree")]
    DuplicateNodeId(NodeId),

    #[error("Method {method}: {message}")]
    MethodRule { method: String, message: String },

    #[error(transparent)]
    Units(#[from] mensura_units::Error),
}

impl Error {
    pub(crate) fn method_rule(method: &str, message: impl Into<String>) -> Self {
        Error::MethodRule {
            method: method.to_string(),
            message: message.into(),
        }
    }
}
