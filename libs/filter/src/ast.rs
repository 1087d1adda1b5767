//! Abstract Syntax Tree (AST) representation
//!
//! Every node carries a [`NodeId`] that is unique within the tree it was
//! built in. Analyses such as unit resolution key their results by id, so
//! the tree itself stays immutable.
//!
//! # Grammar
//!
//! ```text
//! expression := or
//! or         := and ('Or' and)*
//! and        := sum (('And' | 'Xor') sum)*
//! sum        := mult (('+' | '-') mult)*
//! mult       := equ (('*' | '/' | '%') equ)*
//! equ        := rel (('=' | '<>') rel)*
//! rel        := unary (('<' | '>' | '<=' | '>=') unary)*
//! unary      := ('-' | 'Not')? terminal
//! terminal   := literal
//!             | name ('.' name)* ('(' (expression (',' expression)*)? ')')?
//!             | '(' type ')' terminal
//!             | '(' expression ')'
//! literal    := (int | real) unit? | char | string | 'true' | 'false' | 'null'
//! ```

use crate::error::Result;
use phf::phf_map;
use rust_decimal::Decimal;
use std::fmt;

/// Identity of a node within one expression tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// AST node of a filter expression
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Qualified field name: `a.b.c`
    FieldReference(String),

    /// Literal value with an optional measurement unit: `2 cm`
    Literal {
        value: LiteralValue,
        unit: Option<String>,
    },

    /// Cast: `(type) terminal`
    Cast { target: CastType, expr: Box<Expr> },

    /// Method invocation: `name(args...)`
    MethodCall { name: String, args: Vec<Expr> },

    Binary {
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    Unary {
        op: UnaryOperator,
        operand: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Or,
    And,
    Xor,
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    Equals,
    NotEquals,
    LessThan,
    GreaterThan,
    LessOrEqual,
    GreaterOrEqual,
}

impl BinaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Or => "Or",
            BinaryOperator::And => "And",
            BinaryOperator::Xor => "Xor",
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Remainder => "%",
            BinaryOperator::Equals => "=",
            BinaryOperator::NotEquals => "<>",
            BinaryOperator::LessThan => "<",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::LessOrEqual => "<=",
            BinaryOperator::GreaterOrEqual => ">=",
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOperator::Equals
                | BinaryOperator::NotEquals
                | BinaryOperator::LessThan
                | BinaryOperator::GreaterThan
                | BinaryOperator::LessOrEqual
                | BinaryOperator::GreaterOrEqual
        )
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    /// Arithmetic negation: `-x`
    Negate,
    /// Logical complement: `Not x`
    Not,
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOperator::Negate => f.write_str("-"),
            UnaryOperator::Not => f.write_str("Not "),
        }
    }
}

/// Value types known to literals and casts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Bool,
    Byte,
    Char,
    Decimal,
    Double,
    Float,
    Int,
    Long,
    SByte,
    Short,
    UInt,
    ULong,
    UShort,
    DateTime,
    DateTimeOffset,
    TimeSpan,
    String,
    Object,
}

static CAST_NAMES: phf::Map<&'static str, ValueType> = phf_map! {
    "bool" => ValueType::Bool,
    "byte" => ValueType::Byte,
    "char" => ValueType::Char,
    "decimal" => ValueType::Decimal,
    "double" => ValueType::Double,
    "float" => ValueType::Float,
    "int" => ValueType::Int,
    "long" => ValueType::Long,
    "sbyte" => ValueType::SByte,
    "short" => ValueType::Short,
    "uint" => ValueType::UInt,
    "ulong" => ValueType::ULong,
    "ushort" => ValueType::UShort,
    "DateTime" => ValueType::DateTime,
    "DateTimeOffset" => ValueType::DateTimeOffset,
    "TimeSpan" => ValueType::TimeSpan,
    "string" => ValueType::String,
    "object" => ValueType::Object,
};

impl ValueType {
    /// Looks up a cast type keyword.
    pub fn from_cast_name(name: &str) -> Option<ValueType> {
        CAST_NAMES.get(name).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            ValueType::Bool => "bool",
            ValueType::Byte => "byte",
            ValueType::Char => "char",
            ValueType::Decimal => "decimal",
            ValueType::Double => "double",
            ValueType::Float => "float",
            ValueType::Int => "int",
            ValueType::Long => "long",
            ValueType::SByte => "sbyte",
            ValueType::Short => "short",
            ValueType::UInt => "uint",
            ValueType::ULong => "ulong",
            ValueType::UShort => "ushort",
            ValueType::DateTime => "DateTime",
            ValueType::DateTimeOffset => "DateTimeOffset",
            ValueType::TimeSpan => "TimeSpan",
            ValueType::String => "string",
            ValueType::Object => "object",
        }
    }

    /// Reference types cannot be wrapped as nullable.
    pub fn is_nullable_capable(self) -> bool {
        !matches!(self, ValueType::String | ValueType::Object)
    }
}

/// Target of a cast expression: `(int)`, `(double?)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CastType {
    pub ty: ValueType,
    pub nullable: bool,
}

impl CastType {
    pub fn new(ty: ValueType) -> Self {
        Self { ty, nullable: false }
    }

    pub fn nullable(ty: ValueType) -> Self {
        Self { ty, nullable: true }
    }
}

impl fmt::Display for CastType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ty.name())?;
        if self.nullable {
            f.write_str("?")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Int(i32),
    UInt(u32),
    Long(i64),
    ULong(u64),
    Double(f64),
    Float(f32),
    Decimal(Decimal),
    Char(char),
    String(String),
    Bool(bool),
    Null,
}

impl LiteralValue {
    /// Static type of the literal; `null` has none.
    pub fn value_type(&self) -> Option<ValueType> {
        Some(match self {
            LiteralValue::Int(_) => ValueType::Int,
            LiteralValue::UInt(_) => ValueType::UInt,
            LiteralValue::Long(_) => ValueType::Long,
            LiteralValue::ULong(_) => ValueType::ULong,
            LiteralValue::Double(_) => ValueType::Double,
            LiteralValue::Float(_) => ValueType::Float,
            LiteralValue::Decimal(_) => ValueType::Decimal,
            LiteralValue::Char(_) => ValueType::Char,
            LiteralValue::String(_) => ValueType::String,
            LiteralValue::Bool(_) => ValueType::Bool,
            LiteralValue::Null => return None,
        })
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            LiteralValue::Int(_)
                | LiteralValue::UInt(_)
                | LiteralValue::Long(_)
                | LiteralValue::ULong(_)
                | LiteralValue::Double(_)
                | LiteralValue::Float(_)
                | LiteralValue::Decimal(_)
        )
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Int(v) => write!(f, "{}", v),
            LiteralValue::UInt(v) => write!(f, "{}u", v),
            LiteralValue::Long(v) => write!(f, "{}L", v),
            LiteralValue::ULong(v) => write!(f, "{}UL", v),
            LiteralValue::Double(v) => write!(f, "{:?}", v),
            LiteralValue::Float(v) => write!(f, "{:?}f", v),
            LiteralValue::Decimal(v) => write!(f, "{}m", v),
            LiteralValue::Char(c) => write!(f, "'{}'", c.escape_default()),
            LiteralValue::String(s) => write!(f, "\"{}\"", s.escape_default()),
            LiteralValue::Bool(b) => write!(f, "{}", b),
            LiteralValue::Null => f.write_str("null"),
        }
    }
}

impl Expr {
    /// Direct children, left to right.
    pub fn children(&self) -> Vec<&Expr> {
        match &self.kind {
            ExprKind::FieldReference(_) | ExprKind::Literal { .. } => Vec::new(),
            ExprKind::Cast { expr, .. } => vec![&**expr],
            ExprKind::MethodCall { args, .. } => args.iter().collect(),
            ExprKind::Binary { left, right, .. } => vec![&**left, &**right],
            ExprKind::Unary { operand, .. } => vec![&**operand],
        }
    }

    /// Number of nodes in the tree rooted here.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            count += 1;
            pending.extend(node.children());
        }
        count
    }

    /// Short label for diagnostics, without children.
    pub fn label(&self) -> String {
        match &self.kind {
            ExprKind::FieldReference(name) => name.clone(),
            ExprKind::Literal { value, unit: Some(unit) } => format!("{} {}", value, unit),
            ExprKind::Literal { value, unit: None } => value.to_string(),
            ExprKind::Cast { target, .. } => format!("({})", target),
            ExprKind::MethodCall { name, .. } => format!("{}()", name),
            ExprKind::Binary { op, .. } => op.to_string(),
            ExprKind::Unary { op, .. } => op.to_string().trim_end().to_string(),
        }
    }
}

/// Renders the expression back to source form, fully parenthesizing binary
/// and unary nodes.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::FieldReference(_) | ExprKind::Literal { .. } => f.write_str(&self.label()),
            ExprKind::Cast { target, expr } => write!(f, "({}){}", target, expr),
            ExprKind::MethodCall { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
            ExprKind::Binary { op, left, right } => write!(f, "({} {} {})", left, op, right),
            ExprKind::Unary { op, operand } => write!(f, "({}{})", op, operand),
        }
    }
}

/// Depth-first traversal of `expr`.
///
/// `enter` runs before a node's children and `exit` after them; children
/// are visited left to right. The first error returned by either callback
/// stops the walk and is returned. The walk keeps its own stack, so tree
/// depth is not limited by the thread's stack size.
pub fn walk<E, X>(expr: &Expr, enter: &mut E, exit: &mut X) -> Result<()>
where
    E: FnMut(&Expr) -> Result<()>,
    X: FnMut(&Expr) -> Result<()>,
{
    enum Step<'a> {
        Enter(&'a Expr),
        Exit(&'a Expr),
    }

    let mut stack = vec![Step::Enter(expr)];
    while let Some(step) = stack.pop() {
        match step {
            Step::Enter(node) => {
                enter(node)?;
                stack.push(Step::Exit(node));
                stack.extend(node.children().into_iter().rev().map(Step::Enter));
            }
            Step::Exit(node) => exit(node)?,
        }
    }
    Ok(())
}

/// Post-order walk; `visit` sees every child before its parent.
pub fn walk_post_order<X>(expr: &Expr, visit: &mut X) -> Result<()>
where
    X: FnMut(&Expr) -> Result<()>,
{
    walk(expr, &mut |_: &Expr| Ok(()), visit)
}

/// Builds expression trees with fresh node ids.
///
/// Ids are handed out in construction order, so children built before
/// their parent always carry smaller ids.
#[derive(Debug, Default)]
pub struct ExprBuilder {
    next_id: u32,
}

impl ExprBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&mut self, kind: ExprKind) -> Expr {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        Expr { id, kind }
    }

    /// Number of nodes built so far.
    pub fn count(&self) -> u32 {
        self.next_id
    }

    pub fn field(&mut self, name: impl Into<String>) -> Expr {
        self.node(ExprKind::FieldReference(name.into()))
    }

    pub fn literal(&mut self, value: LiteralValue) -> Expr {
        self.node(ExprKind::Literal { value, unit: None })
    }

    pub fn quantity(&mut self, value: LiteralValue, unit: impl Into<String>) -> Expr {
        self.node(ExprKind::Literal {
            value,
            unit: Some(unit.into()),
        })
    }

    pub(crate) fn literal_with_unit(&mut self, value: LiteralValue, unit: Option<String>) -> Expr {
        self.node(ExprKind::Literal { value, unit })
    }

    pub fn cast(&mut self, target: CastType, expr: Expr) -> Expr {
        self.node(ExprKind::Cast {
            target,
            expr: Box::new(expr),
        })
    }

    pub fn method_call(&mut self, name: impl Into<String>, args: Vec<Expr>) -> Expr {
        self.node(ExprKind::MethodCall {
            name: name.into(),
            args,
        })
    }

    pub fn binary(&mut self, op: BinaryOperator, left: Expr, right: Expr) -> Expr {
        self.node(ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn unary(&mut self, op: UnaryOperator, operand: Expr) -> Expr {
        self.node(ExprKind::Unary {
            op,
            operand: Box::new(operand),
        })
    }
}
