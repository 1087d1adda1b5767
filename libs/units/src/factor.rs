//! Symbolic multiplicative factors.
//!
//! An [`AlgebraicFactor`] is a product of symbols raised to positive integer
//! powers, split into a numerator and a denominator. The same type carries
//! either measurement units (`kg*m/s^2`, a *units factor*) or physical
//! dimension names (`mass*length/time^2`, a *dimensional factor*).
//!
//! The algebra never cancels terms across the fraction bar: `s / s` keeps
//! `s` on both sides. Such a factor is [dimensionless](AlgebraicFactor::is_dimensionless)
//! but is not equal to the empty factor.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Div, Mul};
use std::str::FromStr;

/// Symbol → exponent map for one side of a factor.
pub type Terms = BTreeMap<String, u32>;

/// Largest exponent a single term may carry.
pub const MAX_EXPONENT: u32 = i32::MAX as u32;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct AlgebraicFactor {
    numerator: Terms,
    denominator: Terms,
}

impl AlgebraicFactor {
    /// The empty factor.
    pub fn dimensionless() -> Self {
        Self::default()
    }

    /// Builds a factor from `(symbol, exponent)` pairs.
    ///
    /// Repeated symbols on the same side are merged by adding exponents.
    /// Exponents must be strictly positive.
    pub fn new<N, D, S>(numerator: N, denominator: D) -> Result<Self>
    where
        N: IntoIterator<Item = (S, i32)>,
        D: IntoIterator<Item = (S, i32)>,
        S: Into<String>,
    {
        Ok(Self {
            numerator: collect_terms(numerator)?,
            denominator: collect_terms(denominator)?,
        })
    }

    /// Single symbol in the numerator with exponent 1.
    pub fn from_symbol(symbol: impl Into<String>) -> Self {
        let mut numerator = Terms::new();
        numerator.insert(symbol.into(), 1);
        Self {
            numerator,
            denominator: Terms::new(),
        }
    }

    /// Single symbol in the numerator raised to `power`.
    pub fn from_symbol_pow(symbol: impl Into<String>, power: i32) -> Result<Self> {
        Self::new([(symbol.into(), power)], std::iter::empty::<(String, i32)>())
    }

    pub(crate) fn from_term(symbol: &str, power: u32) -> Self {
        let mut numerator = Terms::new();
        numerator.insert(symbol.to_string(), power);
        Self {
            numerator,
            denominator: Terms::new(),
        }
    }

    pub fn numerator(&self) -> &Terms {
        &self.numerator
    }

    pub fn denominator(&self) -> &Terms {
        &self.denominator
    }

    /// Exponents are added per side; nothing cancels across the fraction bar.
    ///
    /// Exponents saturate at [`MAX_EXPONENT`]; use
    /// [`checked_multiply`](Self::checked_multiply) to reject that case.
    pub fn multiply(&self, other: &AlgebraicFactor) -> AlgebraicFactor {
        let mut numerator = self.numerator.clone();
        merge_terms(&mut numerator, &other.numerator);
        let mut denominator = self.denominator.clone();
        merge_terms(&mut denominator, &other.denominator);
        AlgebraicFactor {
            numerator,
            denominator,
        }
    }

    /// Multiplies by the reciprocal of `other`, structurally.
    pub fn divide(&self, other: &AlgebraicFactor) -> AlgebraicFactor {
        let mut numerator = self.numerator.clone();
        merge_terms(&mut numerator, &other.denominator);
        let mut denominator = self.denominator.clone();
        merge_terms(&mut denominator, &other.numerator);
        AlgebraicFactor {
            numerator,
            denominator,
        }
    }

    /// Like [`multiply`](Self::multiply), but fails with
    /// [`Error::ExponentOverflow`] when a summed exponent exceeds [`MAX_EXPONENT`].
    pub fn checked_multiply(&self, other: &AlgebraicFactor) -> Result<AlgebraicFactor> {
        let mut numerator = self.numerator.clone();
        checked_merge_terms(&mut numerator, &other.numerator)?;
        let mut denominator = self.denominator.clone();
        checked_merge_terms(&mut denominator, &other.denominator)?;
        Ok(AlgebraicFactor {
            numerator,
            denominator,
        })
    }

    pub fn checked_divide(&self, other: &AlgebraicFactor) -> Result<AlgebraicFactor> {
        self.checked_multiply(&other.inverse())
    }

    /// Raises every term to `power`; `power == 0` gives the empty factor.
    pub fn checked_pow(&self, power: u32) -> Result<AlgebraicFactor> {
        if power == 0 {
            return Ok(AlgebraicFactor::dimensionless());
        }
        Ok(AlgebraicFactor {
            numerator: scale_terms(&self.numerator, power)?,
            denominator: scale_terms(&self.denominator, power)?,
        })
    }

    pub fn inverse(&self) -> AlgebraicFactor {
        AlgebraicFactor {
            numerator: self.denominator.clone(),
            denominator: self.numerator.clone(),
        }
    }

    /// True when the numerator and denominator hold the same terms.
    ///
    /// This is a structural check: `s/s` is dimensionless, and so is the
    /// empty factor, although the two are not equal.
    pub fn is_dimensionless(&self) -> bool {
        self.numerator == self.denominator
    }

    /// True for the factor with no terms at all.
    pub fn is_empty(&self) -> bool {
        self.numerator.is_empty() && self.denominator.is_empty()
    }

    /// Every symbol on either side, numerator first.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.numerator
            .keys()
            .chain(self.denominator.keys())
            .map(String::as_str)
    }
}

fn collect_terms<I, S>(terms: I) -> Result<Terms>
where
    I: IntoIterator<Item = (S, i32)>,
    S: Into<String>,
{
    let mut out = Terms::new();
    for (symbol, power) in terms {
        let symbol = symbol.into();
        if power <= 0 {
            return Err(Error::InvalidExponent { symbol, power });
        }
        add_exponent(&mut out, symbol, power as u32)?;
    }
    Ok(out)
}

fn add_exponent(terms: &mut Terms, symbol: String, power: u32) -> Result<()> {
    let current = terms.get(&symbol).copied().unwrap_or(0);
    match current.checked_add(power).filter(|sum| *sum <= MAX_EXPONENT) {
        Some(sum) => {
            terms.insert(symbol, sum);
            Ok(())
        }
        None => Err(Error::ExponentOverflow(symbol)),
    }
}

fn checked_merge_terms(into: &mut Terms, from: &Terms) -> Result<()> {
    for (symbol, power) in from {
        add_exponent(into, symbol.clone(), *power)?;
    }
    Ok(())
}

fn merge_terms(into: &mut Terms, from: &Terms) {
    for (symbol, power) in from {
        let slot = into.entry(symbol.clone()).or_insert(0);
        *slot = slot.saturating_add(*power).min(MAX_EXPONENT);
    }
}

fn scale_terms(terms: &Terms, power: u32) -> Result<Terms> {
    terms
        .iter()
        .map(|(symbol, exponent)| {
            exponent
                .checked_mul(power)
                .filter(|scaled| *scaled <= MAX_EXPONENT)
                .map(|scaled| (symbol.clone(), scaled))
                .ok_or_else(|| Error::ExponentOverflow(symbol.clone()))
        })
        .collect()
}

impl Mul for AlgebraicFactor {
    type Output = AlgebraicFactor;

    fn mul(self, rhs: AlgebraicFactor) -> AlgebraicFactor {
        self.multiply(&rhs)
    }
}

impl<'a> Mul<&'a AlgebraicFactor> for &'a AlgebraicFactor {
    type Output = AlgebraicFactor;

    fn mul(self, rhs: &'a AlgebraicFactor) -> AlgebraicFactor {
        self.multiply(rhs)
    }
}

impl Div for AlgebraicFactor {
    type Output = AlgebraicFactor;

    fn div(self, rhs: AlgebraicFactor) -> AlgebraicFactor {
        self.divide(&rhs)
    }
}

impl<'a> Div<&'a AlgebraicFactor> for &'a AlgebraicFactor {
    type Output = AlgebraicFactor;

    fn div(self, rhs: &'a AlgebraicFactor) -> AlgebraicFactor {
        self.divide(rhs)
    }
}

impl fmt::Display for AlgebraicFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.numerator.is_empty() {
            f.write_str("1")?;
        } else {
            write_terms(f, &self.numerator)?;
        }
        if !self.denominator.is_empty() {
            f.write_str("/")?;
            write_terms(f, &self.denominator)?;
        }
        Ok(())
    }
}

fn write_terms(f: &mut fmt::Formatter<'_>, terms: &Terms) -> fmt::Result {
    for (i, (symbol, power)) in terms.iter().enumerate() {
        if i > 0 {
            f.write_str("*")?;
        }
        f.write_str(symbol)?;
        if *power != 1 {
            write!(f, "^{}", power)?;
        }
    }
    Ok(())
}

impl FromStr for AlgebraicFactor {
    type Err = Error;

    /// Parses `kg*m/s^2`, `N/m^2`, `1/s` and the like. `.` is accepted as an
    /// alternative product separator. Everything after the single `/` is
    /// in the denominator.
    fn from_str(s: &str) -> Result<Self> {
        FactorParser { input: s, pos: 0 }.parse()
    }
}

struct FactorParser<'a> {
    input: &'a str,
    pos: usize,
}

impl FactorParser<'_> {
    fn parse(&mut self) -> Result<AlgebraicFactor> {
        self.skip_whitespace();
        if self.peek().is_none() {
            return Err(self.error("empty unit expression"));
        }

        let mut numerator = Terms::new();
        if self.peek() == Some('1') {
            self.bump();
        } else {
            self.parse_side(&mut numerator)?;
        }

        self.skip_whitespace();
        let mut denominator = Terms::new();
        if self.peek() == Some('/') {
            self.bump();
            self.parse_side(&mut denominator)?;
        }

        self.skip_whitespace();
        if self.peek().is_some() {
            return Err(self.error("unexpected character"));
        }

        Ok(AlgebraicFactor {
            numerator,
            denominator,
        })
    }

    fn parse_side(&mut self, side: &mut Terms) -> Result<()> {
        loop {
            self.skip_whitespace();
            let (symbol, power) = self.parse_term()?;
            add_exponent(side, symbol, power)?;
            self.skip_whitespace();
            match self.peek() {
                Some('*') | Some('.') => self.bump(),
                _ => return Ok(()),
            }
        }
    }

    fn parse_term(&mut self) -> Result<(String, u32)> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if is_symbol_char(c) {
                self.bump();
            } else {
                break;
            }
        }
        if self.pos == start {
            return Err(self.error("expected a unit symbol"));
        }
        let symbol = &self.input[start..self.pos];
        if symbol.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(Error::InvalidUnitExpression {
                pos: start,
                message: "unit symbol must not start with a digit",
            });
        }

        let mut power = 1;
        if self.peek() == Some('^') {
            self.bump();
            let digits = self.pos;
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.bump();
            }
            if digits == self.pos {
                return Err(self.error("expected exponent digits"));
            }
            power = self.input[digits..self.pos]
                .parse::<u32>()
                .map_err(|_| Error::InvalidUnitExpression {
                    pos: digits,
                    message: "exponent out of range",
                })?;
            if power == 0 {
                return Err(Error::InvalidUnitExpression {
                    pos: digits,
                    message: "exponent must be positive",
                });
            }
            if power > MAX_EXPONENT {
                return Err(Error::InvalidUnitExpression {
                    pos: digits,
                    message: "exponent out of range",
                });
            }
        }

        Ok((symbol.to_string(), power))
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn error(&self, message: &'static str) -> Error {
        Error::InvalidUnitExpression {
            pos: self.pos,
            message,
        }
    }
}

fn is_symbol_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '*' | '.' | '/' | '^' | '(' | ')')
}

impl Serialize for AlgebraicFactor {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AlgebraicFactor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_renders_fraction() {
        let f: AlgebraicFactor = "kg*m/s^2".parse().unwrap();
        assert_eq!(f.to_string(), "kg*m/s^2");
        assert_eq!(AlgebraicFactor::dimensionless().to_string(), "1");
        assert_eq!("1/s".parse::<AlgebraicFactor>().unwrap().to_string(), "1/s");
    }

    #[test]
    fn parse_accepts_dot_separator_and_whitespace() {
        let dotted: AlgebraicFactor = "kg.m / s^2".parse().unwrap();
        let starred: AlgebraicFactor = "m*kg/s^2".parse().unwrap();
        assert_eq!(dotted, starred);
    }

    #[test]
    fn parse_merges_repeated_symbols() {
        let f: AlgebraicFactor = "s*s/m".parse().unwrap();
        assert_eq!(f.numerator().get("s"), Some(&2));
    }

    #[test]
    fn parse_rejects_malformed_input() {
        assert!("".parse::<AlgebraicFactor>().is_err());
        assert!("m/".parse::<AlgebraicFactor>().is_err());
        assert!("m^".parse::<AlgebraicFactor>().is_err());
        assert!("m^0".parse::<AlgebraicFactor>().is_err());
        assert!("2m".parse::<AlgebraicFactor>().is_err());
        assert!("m/s/h".parse::<AlgebraicFactor>().is_err());
    }

    #[test]
    fn new_rejects_non_positive_exponents() {
        let err = AlgebraicFactor::new([("m", 0)], Vec::<(&str, i32)>::new()).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidExponent {
                symbol: "m".into(),
                power: 0
            }
        );
        assert!(AlgebraicFactor::from_symbol_pow("s", -2).is_err());
    }

    #[test]
    fn parse_rejects_exponents_above_cap() {
        assert!("m^4294967295".parse::<AlgebraicFactor>().is_err());
        assert!("m^2147483648".parse::<AlgebraicFactor>().is_err());
        assert!("m^2147483647".parse::<AlgebraicFactor>().is_ok());

        let err = "m^2147483647*m".parse::<AlgebraicFactor>().unwrap_err();
        assert_eq!(err, Error::ExponentOverflow("m".into()));
    }

    #[test]
    fn new_rejects_merged_exponent_overflow() {
        let err = AlgebraicFactor::new([("s", i32::MAX), ("s", 1)], Vec::<(&str, i32)>::new())
            .unwrap_err();
        assert_eq!(err, Error::ExponentOverflow("s".into()));
    }

    #[test]
    fn repeated_multiply_near_cap_does_not_panic() {
        let big = AlgebraicFactor::from_symbol_pow("m", i32::MAX).unwrap();

        let err = big.checked_multiply(&big).unwrap_err();
        assert_eq!(err, Error::ExponentOverflow("m".into()));
        assert!(big.checked_divide(&big.inverse()).is_err());

        let mut acc = big.clone();
        for _ in 0..4 {
            acc = acc.multiply(&big);
        }
        assert_eq!(acc.numerator().get("m"), Some(&MAX_EXPONENT));
    }

    #[test]
    fn checked_pow_scales_every_term() {
        let f: AlgebraicFactor = "kg*m/s^2".parse().unwrap();
        assert_eq!(f.checked_pow(3).unwrap(), "kg^3*m^3/s^6".parse().unwrap());
        assert_eq!(f.checked_pow(0).unwrap(), AlgebraicFactor::dimensionless());
        assert!(f.checked_pow(MAX_EXPONENT).is_err());
    }
}
