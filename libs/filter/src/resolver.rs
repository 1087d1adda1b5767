//! Measurement unit resolution
//!
//! Assigns a units factor to every node of an expression tree in a single
//! post-order pass:
//!
//! - literals take their unit symbol, or are dimensionless;
//! - field references and method calls consult the [`ExecutionContext`];
//! - casts and unary operators keep their operand's unit;
//! - `Or`, `And`, `Xor`, `+` and `-` require syntactically equal operand
//!   units (`cm` and `mm` do not match) and keep the left unit;
//! - `*` and `/` combine units algebraically;
//! - `%` keeps the left unit without looking at the right one;
//! - comparisons are dimensionless and do not check their operands.

use crate::ast::{walk_post_order, BinaryOperator, Expr, ExprKind, NodeId};
use crate::context::ExecutionContext;
use crate::error::{Error, Result};
use mensura_units::AlgebraicFactor;
use std::collections::HashMap;
use tracing::{debug, trace};

/// Units factor of every node, keyed by node id.
pub type UnitMap = HashMap<NodeId, AlgebraicFactor>;

/// Resolve the unit of every node under `root`.
///
/// The pass stops at the first failing node in post-order. Node ids must be
/// unique within the tree; a repeated id fails with [`Error::DuplicateNodeId`].
pub fn resolve_units<C>(root: &Expr, ctx: &C) -> Result<UnitMap>
where
    C: ExecutionContext + ?Sized,
{
    debug!(root = %root.id, "resolving measurement units");

    let mut units = UnitMap::new();
    walk_post_order(root, &mut |node: &Expr| {
        let unit = resolve_node(node, &units, ctx)?;
        trace!(node = %node.id, label = %node.label(), unit = %unit, "resolved node unit");
        if units.insert(node.id, unit).is_some() {
            return Err(Error::DuplicateNodeId(node.id));
        }
        Ok(())
    })?;

    debug!(
        root = %root.id,
        nodes = units.len(),
        unit = %units.get(&root.id).map(ToString::to_string).unwrap_or_default(),
        "resolved measurement units"
    );
    Ok(units)
}

/// Unit of an already resolved child.
fn child_unit<'m>(units: &'m UnitMap, child: &Expr) -> &'m AlgebraicFactor {
    // post-order: children are resolved before their parent
    &units[&child.id]
}

fn resolve_node<C>(node: &Expr, units: &UnitMap, ctx: &C) -> Result<AlgebraicFactor>
where
    C: ExecutionContext + ?Sized,
{
    match &node.kind {
        ExprKind::Literal { unit, .. } => Ok(match unit {
            Some(symbol) => AlgebraicFactor::from_symbol(symbol.as_str()),
            None => AlgebraicFactor::dimensionless(),
        }),

        ExprKind::FieldReference(name) => ctx
            .field_unit(name)
            .cloned()
            .ok_or_else(|| Error::UnresolvedField(name.clone())),

        ExprKind::Cast { expr, .. } => Ok(child_unit(units, expr).clone()),

        ExprKind::Unary { operand, .. } => Ok(child_unit(units, operand).clone()),

        ExprKind::MethodCall { name, args } => {
            let rule = ctx
                .method(name)
                .ok_or_else(|| Error::UnknownMethod(name.clone()))?;
            let arg_units: Vec<AlgebraicFactor> =
                args.iter().map(|arg| child_unit(units, arg).clone()).collect();
            rule.resulting_unit(&arg_units)
        }

        ExprKind::Binary { op, left, right } => {
            let left_unit = child_unit(units, left);
            let right_unit = child_unit(units, right);
            resolve_binary(node.id, *op, left_unit, right_unit)
        }
    }
}

fn resolve_binary(
    node: NodeId,
    op: BinaryOperator,
    left: &AlgebraicFactor,
    right: &AlgebraicFactor,
) -> Result<AlgebraicFactor> {
    match op {
        BinaryOperator::Or
        | BinaryOperator::And
        | BinaryOperator::Xor
        | BinaryOperator::Add
        | BinaryOperator::Subtract => {
            if left != right {
                return Err(Error::UnitMismatch {
                    node,
                    op,
                    left: left.clone(),
                    right: right.clone(),
                });
            }
            Ok(left.clone())
        }
        BinaryOperator::Multiply => Ok(left.checked_multiply(right)?),
        BinaryOperator::Divide => Ok(left.checked_divide(right)?),
        BinaryOperator::Remainder => Ok(left.clone()),
        BinaryOperator::Equals
        | BinaryOperator::NotEquals
        | BinaryOperator::LessThan
        | BinaryOperator::GreaterThan
        | BinaryOperator::LessOrEqual
        | BinaryOperator::GreaterOrEqual => Ok(AlgebraicFactor::dimensionless()),
    }
}

/// Resolves expressions against one execution context.
pub struct UnitResolver<'c, C: ?Sized> {
    ctx: &'c C,
}

impl<C: ?Sized> Clone for UnitResolver<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: ?Sized> Copy for UnitResolver<'_, C> {}

impl<'c, C> UnitResolver<'c, C>
where
    C: ExecutionContext + ?Sized,
{
    pub fn new(ctx: &'c C) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &'c C {
        self.ctx
    }

    /// Units of every node under `root`.
    pub fn resolve(&self, root: &Expr) -> Result<UnitMap> {
        resolve_units(root, self.ctx)
    }

    /// Unit of `root` alone.
    pub fn resolve_root(&self, root: &Expr) -> Result<AlgebraicFactor> {
        let mut units = self.resolve(root)?;
        Ok(units.remove(&root.id).unwrap_or_default())
    }

    /// Parse `input` and resolve the unit of the whole expression.
    pub fn resolve_str(&self, input: &str) -> Result<AlgebraicFactor> {
        let expr = crate::parser::parse(input)?;
        self.resolve_root(&expr)
    }
}
