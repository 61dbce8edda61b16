//! Physical units in normalized OSIRIS notation.
//!
//! OSIRIS expresses every quantity as a product of powers of five base
//! symbols: the electron mass `m_e`, the speed of light `c`, the plasma
//! frequency `\omega_p`, the elementary charge `e`, and the reference
//! density `n_0`. A units expression such as `c / \omega_p` or
//! `m_e c \omega_p^{-1}` parses into a vector of rational exponents and
//! formats back to an equivalent expression.

use std::fmt;
use std::ops::{Div, Mul};
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// OSIRIS base unit symbols, in exponent-vector order.
const BASE_SYMBOLS: [&str; 5] = ["m_e", "c", "\\omega_p", "e", "n_0"];

/// A normalized rational exponent (denominator always positive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
struct Ratio {
    num: i64,
    den: i64,
}

impl Ratio {
    const ZERO: Self = Self { num: 0, den: 1 };
    const ONE: Self = Self { num: 1, den: 1 };

    #[allow(clippy::cast_possible_wrap)]
    fn new(num: i64, den: i64) -> Self {
        debug_assert!(den != 0, "zero denominator");
        let sign = if den < 0 { -1 } else { 1 };
        let (num, den) = (num * sign, den * sign);
        let g = gcd(num.unsigned_abs(), den.unsigned_abs()) as i64;
        Self {
            num: num / g,
            den: den / g,
        }
    }

    fn is_zero(self) -> bool {
        self.num == 0
    }

    fn add(self, other: Self) -> Self {
        Self::new(self.num * other.den + other.num * self.den, self.den * other.den)
    }

    fn neg(self) -> Self {
        Self {
            num: -self.num,
            den: self.den,
        }
    }

    fn scale(self, factor: i64) -> Self {
        Self::new(self.num * factor, self.den)
    }
}

impl Default for Ratio {
    fn default() -> Self {
        Self::ZERO
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a.max(1)
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

/// A parsed physical-units value.
///
/// Dimensionless units (all exponents zero) display as `a.u.`.
/// `parse -> format -> parse` is a fixed point: the formatted text may
/// differ from the input (`c / \omega_p` becomes `c \omega_p^{-1}`),
/// but it always parses back to an equal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Units {
    power: [Ratio; 5],
}

impl Units {
    /// The dimensionless unit.
    #[must_use]
    pub fn dimensionless() -> Self {
        Self::default()
    }

    /// Returns true if all exponents are zero.
    #[must_use]
    pub fn is_dimensionless(&self) -> bool {
        self.power.iter().all(|p| p.is_zero())
    }

    /// Raises the units to an integer power.
    #[must_use]
    pub fn powi(mut self, exp: i64) -> Self {
        for p in &mut self.power {
            *p = p.scale(exp);
        }
        self
    }
}

impl Mul for Units {
    type Output = Self;

    fn mul(mut self, rhs: Self) -> Self {
        for (p, q) in self.power.iter_mut().zip(rhs.power) {
            *p = p.add(q);
        }
        self
    }
}

impl Div for Units {
    type Output = Self;

    fn div(mut self, rhs: Self) -> Self {
        for (p, q) in self.power.iter_mut().zip(rhs.power) {
            *p = p.add(q.neg());
        }
        self
    }
}

enum Token<'a> {
    Slash,
    Factor(&'a str),
}

/// Splits an expression on whitespace and top-level `/`, keeping braced
/// exponents (which may themselves contain `/`) intact.
fn tokenize(expr: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut depth = 0_usize;
    let mut start = None;
    for (i, ch) in expr.char_indices() {
        match ch {
            '{' => {
                depth += 1;
                start.get_or_insert(i);
            }
            '}' => depth = depth.saturating_sub(1),
            c if depth == 0 && (c.is_whitespace() || c == '/') => {
                if let Some(s) = start.take() {
                    tokens.push(Token::Factor(&expr[s..i]));
                }
                if c == '/' {
                    tokens.push(Token::Slash);
                }
            }
            _ => {
                start.get_or_insert(i);
            }
        }
    }
    if let Some(s) = start {
        tokens.push(Token::Factor(&expr[s..]));
    }
    tokens
}

fn parse_exponent(raw: &str, expr: &str) -> Result<Ratio> {
    let raw = raw
        .strip_prefix('{')
        .and_then(|r| r.strip_suffix('}'))
        .unwrap_or(raw);
    let err = || Error::UnitsParse(expr.to_string());
    match raw.split_once('/') {
        Some((num, den)) => {
            let num = num.trim().parse().map_err(|_| err())?;
            let den: i64 = den.trim().parse().map_err(|_| err())?;
            if den == 0 {
                return Err(err());
            }
            Ok(Ratio::new(num, den))
        }
        None => Ok(Ratio::new(raw.trim().parse().map_err(|_| err())?, 1)),
    }
}

fn parse_factor(factor: &str, expr: &str) -> Result<(usize, Ratio)> {
    let (symbol, exp) = match factor.find('^') {
        Some(pos) => (&factor[..pos], parse_exponent(&factor[pos + 1..], expr)?),
        None => (factor, Ratio::ONE),
    };
    let index = BASE_SYMBOLS
        .iter()
        .position(|&b| b == symbol)
        .ok_or_else(|| Error::UnitsParse(expr.to_string()))?;
    Ok((index, exp))
}

impl FromStr for Units {
    type Err = Error;

    fn from_str(expr: &str) -> Result<Self> {
        let mut power = [Ratio::ZERO; 5];
        let mut denominator = false;
        for token in tokenize(expr) {
            match token {
                Token::Slash => denominator = true,
                // `1` is a neutral numerator, as in `1 / \omega_p`
                Token::Factor("1") => {}
                Token::Factor(factor) => {
                    let (index, exp) = parse_factor(factor, expr)?;
                    power[index] = power[index].add(if denominator { exp.neg() } else { exp });
                }
            }
        }
        Ok(Self { power })
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, p) in BASE_SYMBOLS.iter().zip(&self.power) {
            if p.is_zero() {
                continue;
            }
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            if *p == Ratio::ONE {
                f.write_str(name)?;
            } else {
                write!(f, "{name}^{{{p}}}")?;
            }
        }
        if first {
            f.write_str("a.u.")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units(expr: &str) -> Units {
        expr.parse().unwrap()
    }

    #[test]
    fn test_parse_single_symbol() {
        assert_eq!(units("n_0").to_string(), "n_0");
        assert_eq!(units("\\omega_p").to_string(), "\\omega_p");
    }

    #[test]
    fn test_parse_quotient() {
        let u = units("c / \\omega_p");
        assert_eq!(u.to_string(), "c \\omega_p^{-1}");
        assert_eq!(units(&u.to_string()), u);
    }

    #[test]
    fn test_parse_unit_numerator() {
        let u = units("1 / \\omega_p");
        assert_eq!(u, units("\\omega_p^{-1}"));
    }

    #[test]
    fn test_parse_attached_slash() {
        assert_eq!(units("c/\\omega_p"), units("c / \\omega_p"));
    }

    #[test]
    fn test_parse_fractional_exponent() {
        let u = units("m_e^{3/2} c");
        assert_eq!(u.to_string(), "m_e^{3/2} c");
        assert_eq!(units(&u.to_string()), u);
    }

    #[test]
    fn test_parse_unbraced_exponent() {
        assert_eq!(units("c^2"), units("c^{2}"));
    }

    #[test]
    fn test_parse_unknown_symbol() {
        assert!("a.u.".parse::<Units>().is_err());
        assert!("volts".parse::<Units>().is_err());
    }

    #[test]
    fn test_dimensionless() {
        let u = units("");
        assert!(u.is_dimensionless());
        assert_eq!(u.to_string(), "a.u.");
        assert_eq!(u, Units::dimensionless());
    }

    #[test]
    fn test_mul_div() {
        let e_field = units("m_e c \\omega_p / e");
        let length = units("c / \\omega_p");
        let product = e_field * length;
        assert_eq!(product, units("m_e c^{2} / e"));
        assert_eq!(product / length, e_field);
    }

    #[test]
    fn test_powi() {
        let density = units("n_0");
        assert_eq!(density.powi(3), units("n_0^{3}"));
        assert_eq!(units("c^{1/2}").powi(2), units("c"));
        assert_eq!(density.powi(0), Units::dimensionless());
    }

    #[test]
    fn test_exponent_cancellation() {
        // c * c^{-1} drops out of the formatted expression entirely
        assert_eq!(units("c c^{-1} n_0").to_string(), "n_0");
    }

    #[test]
    fn test_format_parse_fixed_point() {
        for expr in ["n_0", "c / \\omega_p", "m_e c^{2}", "e^{-1} n_0^{1/2}", ""] {
            let u = units(expr);
            let formatted = u.to_string();
            assert_eq!(units(&formatted).to_string(), formatted);
        }
    }
}
