//! Filter expression lexer - tokenizes input strings
//!
//! Keywords are case-sensitive: `Or`, `And`, `Xor` and `Not` are
//! capitalized while `true`, `false` and `null` are lower case. Cast type
//! names (`int`, `double`, `DateTime`, ...) are reserved.
//!
//! Numeric literals may carry a type suffix (`u`, `l`, `ul`, `lu` for
//! integers; `d`, `f`, `m` for reals, case-insensitive). A suffix is only
//! taken when no other identifier character follows it, so `5km` lexes as
//! the integer `5` followed by the identifier `km`, while `5m` is a decimal.

use crate::ast::ValueType;
use crate::error::{Error, Result};
use crate::token::{Token, TokenType};
use phf::phf_map;

static KEYWORDS: phf::Map<&'static str, TokenType> = phf_map! {
    "Or" => TokenType::Or,
    "And" => TokenType::And,
    "Xor" => TokenType::Xor,
    "Not" => TokenType::Not,
    "true" => TokenType::True,
    "false" => TokenType::False,
    "null" => TokenType::Null,
};

static INTEGER_SUFFIXES: phf::Map<&'static str, ValueType> = phf_map! {
    "u" => ValueType::UInt,
    "l" => ValueType::Long,
    "ul" => ValueType::ULong,
    "lu" => ValueType::ULong,
};

static REAL_SUFFIXES: phf::Map<&'static str, ValueType> = phf_map! {
    "d" => ValueType::Double,
    "f" => ValueType::Float,
    "m" => ValueType::Decimal,
};

/// Type selected by the suffix of an integer literal, if any.
pub(crate) fn integer_suffix(suffix: &str) -> Option<ValueType> {
    INTEGER_SUFFIXES.get(suffix.to_ascii_lowercase().as_str()).copied()
}

/// Type selected by the suffix of a real literal, if any.
pub(crate) fn real_suffix(suffix: &str) -> Option<ValueType> {
    REAL_SUFFIXES.get(suffix.to_ascii_lowercase().as_str()).copied()
}

/// The filter expression lexer
pub struct Lexer {
    position: usize,
    line: usize,
    column: usize,
    chars: Vec<char>,
    current_char: Option<char>,
}

impl Lexer {
    /// Create a new lexer for the given input
    pub fn new(input: String) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let current_char = chars.first().copied();

        Self {
            position: 0,
            line: 1,
            column: 1,
            chars,
            current_char,
        }
    }

    /// Advance to the next character
    fn advance(&mut self) {
        if let Some(c) = self.current_char {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.position += 1;
        self.current_char = self.chars.get(self.position).copied();
    }

    /// Peek `offset` characters ahead without advancing
    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.position + offset).copied()
    }

    fn peek(&self) -> Option<char> {
        self.peek_at(1)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.current_char {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn is_identifier_char(c: char) -> bool {
        c.is_alphanumeric() || c == '_'
    }

    /// Read an identifier
    fn read_identifier(&mut self) -> String {
        let start_pos = self.position;

        while let Some(c) = self.current_char {
            if Self::is_identifier_char(c) {
                self.advance();
            } else {
                break;
            }
        }

        self.chars[start_pos..self.position].iter().collect()
    }

    /// Length of the identifier-character run starting `offset` characters ahead
    fn identifier_run_len(&self, offset: usize) -> usize {
        self.chars[(self.position + offset).min(self.chars.len())..]
            .iter()
            .take_while(|c| Self::is_identifier_char(**c))
            .count()
    }

    /// Read a number; returns the literal text and whether it is a real
    fn read_number(&mut self) -> (String, bool) {
        let start_pos = self.position;
        let mut is_real = false;

        self.read_digits();

        // Fraction only if followed by digits, so `2.foo` stays a qualified name error
        if self.current_char == Some('.') && self.peek().is_some_and(|c| c.is_ascii_digit()) {
            is_real = true;
            self.advance(); // Skip '.'
            self.read_digits();
        }

        // Exponent: e10, E-3, e+7
        if matches!(self.current_char, Some('e') | Some('E')) {
            let digits_at = match self.peek() {
                Some('+') | Some('-') => 2,
                _ => 1,
            };
            if self.peek_at(digits_at).is_some_and(|c| c.is_ascii_digit()) {
                is_real = true;
                for _ in 0..digits_at {
                    self.advance();
                }
                self.read_digits();
            }
        }

        // Type suffix, only when it is the whole identifier run
        let run = self.identifier_run_len(0);
        if run > 0 && run <= 2 {
            let suffix: String = self.chars[self.position..self.position + run].iter().collect();
            let accepted = if is_real {
                real_suffix(&suffix).is_some()
            } else {
                integer_suffix(&suffix).is_some() || real_suffix(&suffix).is_some()
            };
            if accepted {
                is_real = is_real || real_suffix(&suffix).is_some();
                for _ in 0..run {
                    self.advance();
                }
            }
        }

        let value: String = self.chars[start_pos..self.position].iter().collect();
        (value, is_real)
    }

    fn read_digits(&mut self) {
        while let Some(c) = self.current_char {
            if c.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Read the body of a quoted literal up to the closing `quote`, resolving escapes
    fn read_quoted(&mut self, quote: char) -> Result<String> {
        self.advance(); // Skip opening quote

        let mut value = String::new();

        while let Some(c) = self.current_char {
            if c == quote {
                self.advance(); // Skip closing quote
                return Ok(value);
            } else if c == '\\' {
                self.advance(); // Skip backslash
                let Some(escaped) = self.current_char else {
                    break;
                };
                match escaped {
                    'n' => value.push('\n'),
                    'r' => value.push('\r'),
                    't' => value.push('\t'),
                    '\\' => value.push('\\'),
                    '"' => value.push('"'),
                    '\'' => value.push('\''),
                    // Unrecognized escapes are kept verbatim
                    other => {
                        value.push('\\');
                        value.push(other);
                    }
                }
                self.advance();
            } else {
                value.push(c);
                self.advance();
            }
        }

        Err(Error::Parse(if quote == '"' {
            "Unterminated string literal".into()
        } else {
            "Unterminated character literal".into()
        }))
    }

    /// Read a character literal: 'c'
    fn read_char(&mut self) -> Result<String> {
        let value = self.read_quoted('\'')?;
        if value.chars().count() != 1 {
            return Err(Error::Parse(format!(
                "Character literal must hold exactly one character, got '{}'",
                value
            )));
        }
        Ok(value)
    }

    fn single(&mut self, token_type: TokenType, text: &str, line: usize, column: usize) -> Token {
        let position = self.position;
        for _ in text.chars() {
            self.advance();
        }
        Token::new(token_type, text.into(), position, line, column)
    }

    /// Get the next token from the input
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let position = self.position;
        let line = self.line;
        let column = self.column;

        let Some(c) = self.current_char else {
            return Token::eof(position, line, column);
        };

        match c {
            '(' => self.single(TokenType::OpenParen, "(", line, column),
            ')' => self.single(TokenType::CloseParen, ")", line, column),
            ',' => self.single(TokenType::Comma, ",", line, column),
            '.' => self.single(TokenType::Dot, ".", line, column),
            '?' => self.single(TokenType::Question, "?", line, column),
            '+' => self.single(TokenType::Plus, "+", line, column),
            '-' => self.single(TokenType::Minus, "-", line, column),
            '*' => self.single(TokenType::Multiply, "*", line, column),
            '/' => self.single(TokenType::Divide, "/", line, column),
            '%' => self.single(TokenType::Percent, "%", line, column),
            '=' => self.single(TokenType::Equal, "=", line, column),
            '<' => match self.peek() {
                Some('=') => self.single(TokenType::LessThanOrEqual, "<=", line, column),
                Some('>') => self.single(TokenType::NotEqual, "<>", line, column),
                _ => self.single(TokenType::LessThan, "<", line, column),
            },
            '>' => match self.peek() {
                Some('=') => self.single(TokenType::GreaterThanOrEqual, ">=", line, column),
                _ => self.single(TokenType::GreaterThan, ">", line, column),
            },
            '"' => match self.read_quoted('"') {
                Ok(value) => Token::new(TokenType::StringLiteral, value, position, line, column),
                Err(e) => Token::error(format!("String error: {}", e), position, line, column),
            },
            '\'' => match self.read_char() {
                Ok(value) => Token::new(TokenType::CharLiteral, value, position, line, column),
                Err(e) => Token::error(format!("Character error: {}", e), position, line, column),
            },
            _ if c.is_ascii_digit() => {
                let (value, is_real) = self.read_number();
                let token_type = if is_real {
                    TokenType::RealLiteral
                } else {
                    TokenType::IntLiteral
                };
                Token::new(token_type, value, position, line, column)
            }
            _ if c.is_alphabetic() || c == '_' => {
                let ident = self.read_identifier();
                let token_type = match KEYWORDS.get(ident.as_str()) {
                    Some(keyword) => *keyword,
                    None if ValueType::from_cast_name(&ident).is_some() => TokenType::TypeName,
                    None => TokenType::Identifier,
                };
                Token::new(token_type, ident, position, line, column)
            }
            _ => {
                self.advance();
                Token::error(format!("Unexpected character: {}", c), position, line, column)
            }
        }
    }
}
