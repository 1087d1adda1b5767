//! Token types for the filter expression lexer

/// Token types for the filter expression lexer
#[derive(Debug, PartialEq, Clone, Copy, Eq)]
pub enum TokenType {
    // Literals
    IntLiteral,
    RealLiteral,
    CharLiteral,
    StringLiteral,

    Identifier,

    // Keywords
    Or,
    And,
    Xor,
    Not,
    True,
    False,
    Null,
    TypeName, // bool, int, DateTime, ...

    // Operators
    Plus,               // +
    Minus,              // -
    Multiply,           // *
    Divide,             // /
    Percent,            // %
    Equal,              // =
    NotEqual,           // <>
    LessThan,           // <
    GreaterThan,        // >
    LessThanOrEqual,    // <=
    GreaterThanOrEqual, // >=

    // Delimiters
    OpenParen,  // (
    CloseParen, // )
    Comma,      // ,
    Dot,        // .
    Question,   // ?

    // End of input
    Eof,

    // Error
    Error,
}

/// A token in the filter expression
#[derive(Debug, Clone)]
pub struct Token {
    pub token_type: TokenType,
    pub value: String,
    pub position: usize,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(
        token_type: TokenType,
        value: String,
        position: usize,
        line: usize,
        column: usize,
    ) -> Self {
        Self {
            token_type,
            value,
            position,
            line,
            column,
        }
    }

    pub fn eof(position: usize, line: usize, column: usize) -> Self {
        Self::new(TokenType::Eof, String::new(), position, line, column)
    }

    pub fn error(message: String, position: usize, line: usize, column: usize) -> Self {
        Self::new(TokenType::Error, message, position, line, column)
    }
}
