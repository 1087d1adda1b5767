//! Filter expression parser - converts string expressions to AST
//!
//! Recursive descent parser. Precedence (lowest to highest):
//! 1. `Or`
//! 2. `And`, `Xor`
//! 3. additive (`+`, `-`)
//! 4. multiplicative (`*`, `/`, `%`)
//! 5. equality (`=`, `<>`)
//! 6. relational (`<`, `>`, `<=`, `>=`)
//! 7. unary (`-`, `Not`)
//! 8. terminal (literal, field reference, method call, cast, parenthesized)
//!
//! Equality and relational operators bind tighter than arithmetic, so
//! `a * b = c` groups as `a * (b = c)`.

use crate::ast::*;
use crate::error::{Error, Result};
use crate::lexer::{integer_suffix, real_suffix, Lexer};
use crate::token::{Token, TokenType};
use crate::validator::UnitValidator;
use rust_decimal::Decimal;
use std::str::FromStr;

const MAX_RECURSION_DEPTH: usize = 200;

/// Parser for filter expressions
pub struct Parser<'v> {
    lexer: Lexer,
    current_token: Token,
    recursion_depth: usize,
    builder: ExprBuilder,
    validator: Option<&'v dyn UnitValidator>,
}

impl<'v> Parser<'v> {
    /// Create a new parser for the given input string
    pub fn new(input: String) -> Self {
        let mut lexer = Lexer::new(input);
        let current_token = lexer.next_token();
        Self {
            lexer,
            current_token,
            recursion_depth: 0,
            builder: ExprBuilder::new(),
            validator: None,
        }
    }

    /// Reject literal measurement units that `validator` does not accept
    pub fn with_validator(mut self, validator: &'v dyn UnitValidator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Advance to the next token
    fn advance(&mut self) {
        self.current_token = self.lexer.next_token();
    }

    fn current_token_is(&self, token_type: TokenType) -> bool {
        self.current_token.token_type == token_type
    }

    fn current_token_is_one_of(&self, types: &[TokenType]) -> bool {
        types.contains(&self.current_token.token_type)
    }

    /// Expect a specific token type and advance
    fn expect(&mut self, token_type: TokenType) -> Result<Token> {
        if self.current_token_is(token_type) {
            let token = self.current_token.clone();
            self.advance();
            Ok(token)
        } else {
            Err(self.unexpected(&format!("{:?}", token_type)))
        }
    }

    /// Error for the current token, reporting lexer errors verbatim
    fn unexpected(&self, expected: &str) -> Error {
        let token = &self.current_token;
        if token.token_type == TokenType::Error {
            return Error::Parse(format!(
                "{} at line {}, column {}",
                token.value, token.line, token.column
            ));
        }
        Error::Parse(format!(
            "Expected {}, got {:?} '{}' at line {}, column {}",
            expected, token.token_type, token.value, token.line, token.column
        ))
    }

    /// Parse the entire expression (top-level entry point)
    pub fn parse(&mut self) -> Result<Expr> {
        let expr = self.parse_expression()?;

        // Ensure we've consumed all input
        if !self.current_token_is(TokenType::Eof) {
            return Err(self.unexpected("end of input"));
        }

        Ok(expr)
    }

    /// Check recursion depth and increment
    fn check_recursion_depth(&mut self) -> Result<()> {
        self.recursion_depth += 1;
        if self.recursion_depth > MAX_RECURSION_DEPTH {
            return Err(Error::Parse(format!(
                "Expression too deeply nested (max depth: {})",
                MAX_RECURSION_DEPTH
            )));
        }
        Ok(())
    }

    fn decrement_recursion_depth(&mut self) {
        self.recursion_depth -= 1;
    }

    /// Parse an expression (lowest precedence)
    fn parse_expression(&mut self) -> Result<Expr> {
        self.check_recursion_depth()?;
        let expr = self.parse_or_expression()?;
        self.decrement_recursion_depth();
        Ok(expr)
    }

    /// Left-associative chain of `operand (op operand)*`
    ///
    /// Every link deepens the resulting tree by one level, so links count
    /// toward the nesting limit until the chain ends.
    fn parse_left_assoc(
        &mut self,
        operators: &[(TokenType, BinaryOperator)],
        operand: fn(&mut Self) -> Result<Expr>,
    ) -> Result<Expr> {
        let mut left = operand(self)?;
        let mut links = 0;

        while let Some(op) = operators
            .iter()
            .find(|(token_type, _)| self.current_token_is(*token_type))
            .map(|(_, op)| *op)
        {
            self.advance();
            self.check_recursion_depth()?;
            links += 1;
            let right = operand(self)?;
            left = self.builder.binary(op, left, right);
        }

        self.recursion_depth -= links;
        Ok(left)
    }

    /// Parse or expression: expression 'Or' expression
    fn parse_or_expression(&mut self) -> Result<Expr> {
        self.parse_left_assoc(&[(TokenType::Or, BinaryOperator::Or)], Self::parse_and_expression)
    }

    /// Parse and/xor expression: expression ('And' | 'Xor') expression
    fn parse_and_expression(&mut self) -> Result<Expr> {
        self.parse_left_assoc(
            &[
                (TokenType::And, BinaryOperator::And),
                (TokenType::Xor, BinaryOperator::Xor),
            ],
            Self::parse_additive_expression,
        )
    }

    /// Parse additive expression: expression ('+' | '-') expression
    fn parse_additive_expression(&mut self) -> Result<Expr> {
        self.parse_left_assoc(
            &[
                (TokenType::Plus, BinaryOperator::Add),
                (TokenType::Minus, BinaryOperator::Subtract),
            ],
            Self::parse_multiplicative_expression,
        )
    }

    /// Parse multiplicative expression: expression ('*' | '/' | '%') expression
    fn parse_multiplicative_expression(&mut self) -> Result<Expr> {
        self.parse_left_assoc(
            &[
                (TokenType::Multiply, BinaryOperator::Multiply),
                (TokenType::Divide, BinaryOperator::Divide),
                (TokenType::Percent, BinaryOperator::Remainder),
            ],
            Self::parse_equality_expression,
        )
    }

    /// Parse equality expression: expression ('=' | '<>') expression
    fn parse_equality_expression(&mut self) -> Result<Expr> {
        self.parse_left_assoc(
            &[
                (TokenType::Equal, BinaryOperator::Equals),
                (TokenType::NotEqual, BinaryOperator::NotEquals),
            ],
            Self::parse_relational_expression,
        )
    }

    /// Parse relational expression: expression ('<' | '>' | '<=' | '>=') expression
    fn parse_relational_expression(&mut self) -> Result<Expr> {
        self.parse_left_assoc(
            &[
                (TokenType::LessThan, BinaryOperator::LessThan),
                (TokenType::GreaterThan, BinaryOperator::GreaterThan),
                (TokenType::LessThanOrEqual, BinaryOperator::LessOrEqual),
                (TokenType::GreaterThanOrEqual, BinaryOperator::GreaterOrEqual),
            ],
            Self::parse_unary_expression,
        )
    }

    /// Parse unary expression: ('-' | 'Not')? terminal
    fn parse_unary_expression(&mut self) -> Result<Expr> {
        let op = match self.current_token.token_type {
            TokenType::Minus => Some(UnaryOperator::Negate),
            TokenType::Not => Some(UnaryOperator::Not),
            _ => None,
        };

        match op {
            Some(op) => {
                self.advance();
                let operand = self.parse_terminal()?;
                Ok(self.builder.unary(op, operand))
            }
            None => self.parse_terminal(),
        }
    }

    /// Parse a terminal
    fn parse_terminal(&mut self) -> Result<Expr> {
        self.check_recursion_depth()?;
        let expr = self.parse_terminal_inner()?;
        self.decrement_recursion_depth();
        Ok(expr)
    }

    fn parse_terminal_inner(&mut self) -> Result<Expr> {
        if self.is_literal_start() {
            return self.parse_literal();
        }

        match self.current_token.token_type {
            TokenType::Identifier => self.parse_field_or_method_call(),
            TokenType::OpenParen => {
                self.advance(); // Skip '('
                if self.current_token_is(TokenType::TypeName) {
                    self.parse_cast()
                } else {
                    let expr = self.parse_expression()?;
                    self.expect(TokenType::CloseParen)?;
                    Ok(expr)
                }
            }
            _ => Err(self.unexpected("literal, identifier or '('")),
        }
    }

    /// Check if current token starts a literal
    fn is_literal_start(&self) -> bool {
        self.current_token_is_one_of(&[
            TokenType::IntLiteral,
            TokenType::RealLiteral,
            TokenType::CharLiteral,
            TokenType::StringLiteral,
            TokenType::True,
            TokenType::False,
            TokenType::Null,
        ])
    }

    /// Parse a literal
    fn parse_literal(&mut self) -> Result<Expr> {
        let token = self.current_token.clone();
        self.advance();

        let value = match token.token_type {
            TokenType::IntLiteral => parse_integer(&token.value)?,
            TokenType::RealLiteral => parse_real(&token.value)?,
            TokenType::CharLiteral => {
                let c = token
                    .value
                    .chars()
                    .next()
                    .ok_or_else(|| Error::Parse("Empty character literal".into()))?;
                LiteralValue::Char(c)
            }
            TokenType::StringLiteral => LiteralValue::String(token.value),
            TokenType::True => LiteralValue::Bool(true),
            TokenType::False => LiteralValue::Bool(false),
            TokenType::Null => LiteralValue::Null,
            _ => return Err(Error::Parse(format!("Expected literal, got {:?}", token.token_type))),
        };

        // Numeric literal directly followed by a name: measurement unit
        let unit = if value.is_numeric() && self.current_token_is(TokenType::Identifier) {
            Some(self.parse_measurement_unit()?)
        } else {
            None
        };

        Ok(self.builder.literal_with_unit(value, unit))
    }

    fn parse_measurement_unit(&mut self) -> Result<String> {
        let token = self.expect(TokenType::Identifier)?;
        if let Some(validator) = self.validator {
            if !validator.is_valid(&token.value) {
                return Err(Error::InvalidMeasurementUnit {
                    unit: token.value,
                    line: token.line,
                    column: token.column,
                });
            }
        }
        Ok(token.value)
    }

    /// Parse a qualified name, then an argument list if one follows
    fn parse_field_or_method_call(&mut self) -> Result<Expr> {
        let mut name = self.expect(TokenType::Identifier)?.value;
        while self.current_token_is(TokenType::Dot) {
            self.advance(); // Skip '.'
            let part = self.expect(TokenType::Identifier)?;
            name.push('.');
            name.push_str(&part.value);
        }

        if !self.current_token_is(TokenType::OpenParen) {
            return Ok(self.builder.field(name));
        }

        self.advance(); // Skip '('
        let mut args = Vec::new();
        if !self.current_token_is(TokenType::CloseParen) {
            loop {
                args.push(self.parse_expression()?);
                if self.current_token_is(TokenType::Comma) {
                    self.advance(); // Skip ','
                } else {
                    break;
                }
            }
        }
        self.expect(TokenType::CloseParen)?;

        Ok(self.builder.method_call(name, args))
    }

    /// Parse a cast after its opening parenthesis: type ')' terminal
    fn parse_cast(&mut self) -> Result<Expr> {
        let type_token = self.expect(TokenType::TypeName)?;
        let ty = ValueType::from_cast_name(&type_token.value)
            .ok_or_else(|| Error::Parse(format!("Unknown type '{}'", type_token.value)))?;

        let target = if ty.is_nullable_capable() && self.current_token_is(TokenType::Question) {
            self.advance(); // Skip '?'
            CastType::nullable(ty)
        } else {
            CastType::new(ty)
        };

        self.expect(TokenType::CloseParen)?;
        let expr = self.parse_terminal()?;
        Ok(self.builder.cast(target, expr))
    }
}

/// Split a numeric literal into digits and its alphabetic suffix
fn split_suffix(text: &str) -> (&str, &str) {
    let end = text
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_alphabetic() && !matches!(c, 'e' | 'E'))
        .last()
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    text.split_at(end)
}

fn parse_integer(text: &str) -> Result<LiteralValue> {
    let (digits, suffix) = split_suffix(text);
    let invalid = |e: std::num::ParseIntError| Error::Parse(format!("Invalid integer '{}': {}", text, e));

    if suffix.is_empty() {
        return digits.parse::<i32>().map(LiteralValue::Int).map_err(invalid);
    }
    match integer_suffix(suffix) {
        Some(ValueType::UInt) => digits.parse::<u32>().map(LiteralValue::UInt).map_err(invalid),
        Some(ValueType::Long) => digits.parse::<i64>().map(LiteralValue::Long).map_err(invalid),
        Some(ValueType::ULong) => digits.parse::<u64>().map(LiteralValue::ULong).map_err(invalid),
        _ => Err(Error::Parse(format!("Invalid integer suffix in '{}'", text))),
    }
}

fn parse_real(text: &str) -> Result<LiteralValue> {
    let (digits, suffix) = split_suffix(text);
    let invalid = || Error::Parse(format!("Invalid real number '{}'", text));

    let ty = if suffix.is_empty() {
        ValueType::Double
    } else {
        real_suffix(suffix).ok_or_else(invalid)?
    };
    match ty {
        ValueType::Float => digits.parse::<f32>().map(LiteralValue::Float).map_err(|_| invalid()),
        ValueType::Decimal => Decimal::from_str(digits)
            .or_else(|_| Decimal::from_scientific(digits))
            .map(LiteralValue::Decimal)
            .map_err(|_| invalid()),
        _ => digits.parse::<f64>().map(LiteralValue::Double).map_err(|_| invalid()),
    }
}

/// Parse `input` into an expression tree
pub fn parse(input: &str) -> Result<Expr> {
    Parser::new(input.to_string()).parse()
}

/// Parse `input`, rejecting literal units that `validator` does not accept
pub fn parse_with_validator(input: &str, validator: &dyn UnitValidator) -> Result<Expr> {
    Parser::new(input.to_string()).with_validator(validator).parse()
}
