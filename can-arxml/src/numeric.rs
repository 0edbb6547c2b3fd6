//! Numeric text handling for ARXML values
//!
//! ARXML carries every number as element text. Integers follow the
//! "auto-base" convention (a leading `0` followed by a digit means octal,
//! `0x`/`0o`/`0b` prefixes select the radix), and linear scaling
//! coefficients are kept as exact fractions so that decimal coefficients such
//! as `0.1` survive without binary rounding.

use crate::types::{ArxmlError, Result};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, ToPrimitive, Zero};
use serde::{Serialize, Serializer};
use std::fmt;

/// Parse an integer using the auto-base rules
///
/// * empty text is `0`
/// * `0` followed by a digit is octal (`017` == 15)
/// * `0x`, `0o`, `0b` select hexadecimal, octal and binary
/// * otherwise decimal; an optional sign and `_` digit separators are allowed
pub fn parse_int(text: &str) -> Result<i64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }

    let invalid = || ArxmlError::InvalidNumber(trimmed.to_string());

    let (negative, unsigned) = match trimmed.as_bytes()[0] {
        b'-' => (true, &trimmed[1..]),
        b'+' => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let bytes = unsigned.as_bytes();
    let (radix, digits) = if bytes.len() > 1 && bytes[0] == b'0' && bytes[1].is_ascii_digit() {
        (8, &unsigned[1..])
    } else if let Some(rest) = strip_radix_prefix(unsigned, 'x') {
        (16, rest)
    } else if let Some(rest) = strip_radix_prefix(unsigned, 'o') {
        (8, rest)
    } else if let Some(rest) = strip_radix_prefix(unsigned, 'b') {
        (2, rest)
    } else {
        (10, unsigned)
    };

    if digits.is_empty()
        || digits.starts_with('_')
        || digits.ends_with('_')
        || digits.contains("__")
        || digits.starts_with(['+', '-'])
    {
        return Err(invalid());
    }

    let cleaned: String = digits.chars().filter(|c| *c != '_').collect();
    let magnitude = i128::from_str_radix(&cleaned, radix).map_err(|_| invalid())?;
    let value = if negative { -magnitude } else { magnitude };

    i64::try_from(value).map_err(|_| invalid())
}

fn strip_radix_prefix(text: &str, marker: char) -> Option<&str> {
    let mut chars = text.chars();
    if chars.next() != Some('0') {
        return None;
    }
    match chars.next() {
        Some(c) if c.to_ascii_lowercase() == marker => Some(&text[2..]),
        _ => None,
    }
}

/// Parse a non-negative integer that must fit 32 bits (lengths, positions,
/// frame identifiers)
pub fn parse_u32(text: &str) -> Result<u32> {
    let value = parse_int(text)?;
    u32::try_from(value).map_err(|_| ArxmlError::InvalidNumber(text.trim().to_string()))
}

/// Parse a floating point value (`INF`, exponents and surrounding whitespace
/// are accepted)
pub fn parse_float(text: &str) -> Result<f64> {
    let trimmed = text.trim();
    trimmed
        .parse::<f64>()
        .map_err(|_| ArxmlError::InvalidNumber(trimmed.to_string()))
}

/// Parse text that is usually an integer but may also be a float
pub fn parse_number(text: &str) -> Result<f64> {
    match parse_int(text) {
        Ok(value) => Ok(value as f64),
        Err(_) => parse_float(text),
    }
}

/// Decimal exponents beyond this are read through `f64` instead of exactly
const MAX_EXACT_EXPONENT: i64 = 4096;

/// Exact fraction of arbitrary precision, kept in lowest terms
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rational(BigRational);

impl Rational {
    /// Create a fraction; `None` for a zero denominator
    pub fn new(numer: i64, denom: i64) -> Option<Self> {
        if denom == 0 {
            return None;
        }
        Some(Self(BigRational::new(BigInt::from(numer), BigInt::from(denom))))
    }

    pub fn from_integer(value: i64) -> Self {
        Self(BigRational::from_integer(BigInt::from(value)))
    }

    pub fn zero() -> Self {
        Self(BigRational::zero())
    }

    pub fn one() -> Self {
        Self(BigRational::one())
    }

    /// Parse decimal text such as `10`, `-0.25` or `1.5e-3` without rounding
    ///
    /// Any number of digits is kept exactly. Exponents too large to expand
    /// are read as the nearest `f64`; text outside the `f64` range is invalid.
    pub fn parse_decimal(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let invalid = || ArxmlError::InvalidNumber(trimmed.to_string());

        let (negative, unsigned) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            Some(_) => (false, trimmed),
            None => return Err(invalid()),
        };

        let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
            Some(pos) => {
                let exponent = unsigned[pos + 1..].parse::<i32>().map_err(|_| invalid())?;
                (&unsigned[..pos], exponent)
            }
            None => (unsigned, 0),
        };

        let (int_part, frac_part) = match mantissa.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (mantissa, ""),
        };

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let digits = format!("{}{}", int_part, frac_part);
        let digits = digits.trim_start_matches('0');
        if digits.is_empty() {
            return Ok(Self::zero());
        }

        let scale = frac_part.len() as i64 - exponent as i64;
        if scale.abs() > MAX_EXACT_EXPONENT {
            return trimmed
                .parse::<f64>()
                .ok()
                .and_then(BigRational::from_float)
                .map(Self)
                .ok_or_else(invalid);
        }

        let mut numer: BigInt = digits.parse().map_err(|_| invalid())?;
        if negative {
            numer = -numer;
        }
        let power = num_traits::pow(BigInt::from(10u8), scale.unsigned_abs() as usize);

        Ok(if scale >= 0 {
            Self(BigRational::new(numer, power))
        } else {
            Self(BigRational::from_integer(numer * power))
        })
    }

    pub fn numer(&self) -> &BigInt {
        self.0.numer()
    }

    pub fn denom(&self) -> &BigInt {
        self.0.denom()
    }

    pub fn is_integer(&self) -> bool {
        self.0.is_integer()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_one(&self) -> bool {
        self.0.is_one()
    }

    /// Exact division; `None` on division by zero
    pub fn checked_div(&self, other: &Rational) -> Option<Rational> {
        if other.0.is_zero() {
            return None;
        }
        Some(Self(&self.0 / &other.0))
    }

    /// Nearest `f64`
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(f64::NAN)
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_integer() {
            write!(f, "{}", self.0.numer())
        } else {
            write!(f, "{}/{}", self.0.numer(), self.0.denom())
        }
    }
}

impl Serialize for Rational {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
