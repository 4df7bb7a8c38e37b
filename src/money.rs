//! Exact money arithmetic in integer minor units.
//!
//! Balances on the platform are presented as decimal strings ("12.50") but
//! every stored and computed value is an `i64` count of minor units. No
//! floating point is involved at any stage.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use thiserror::Error;

/// Number of minor units per major unit.
const MINOR_PER_MAJOR: i64 = 100;

/// A monetary amount in minor units (hundredths of the platform currency).
///
/// `Money` is ordered and copyable; arithmetic is exposed only through
/// checked operations so balance updates cannot silently wrap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

/// Errors produced when parsing a decimal money string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyParseError {
    /// The input was empty or contained only a sign.
    #[error("empty amount")]
    Empty,
    /// A character outside `0-9`, `.` or a leading `-` was found.
    #[error("invalid character in amount")]
    InvalidCharacter,
    /// More than two digits followed the decimal point.
    #[error("more than two decimal places")]
    TooManyDecimals,
    /// The amount does not fit in the internal representation.
    #[error("amount out of range")]
    OutOfRange,
}

impl Money {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Wrap a raw count of minor units.
    #[must_use]
    pub const fn from_minor(minor: i64) -> Self { Self(minor) }

    /// The raw count of minor units.
    #[must_use]
    pub const fn minor_units(self) -> i64 { self.0 }

    /// Whether the amount is strictly below zero.
    #[must_use]
    pub const fn is_negative(self) -> bool { self.0 < 0 }

    /// Whether the amount is strictly above zero.
    #[must_use]
    pub const fn is_positive(self) -> bool { self.0 > 0 }

    /// Checked addition; `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked subtraction; `None` on overflow.
    #[must_use]
    pub const fn checked_sub(self, other: Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// The additive inverse; `None` for `i64::MIN` minor units.
    #[must_use]
    pub const fn checked_neg(self) -> Option<Self> {
        match self.0.checked_neg() {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }
}

impl fmt::Display for Money {
    #[expect(
        clippy::integer_division,
        clippy::integer_division_remainder_used,
        reason = "splitting minor units into major.minor for display"
    )]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let minor = self.0.unsigned_abs();
        let major = minor / 100;
        let cents = minor % 100;
        write!(f, "{sign}{major}.{cents:02}")
    }
}

impl FromStr for Money {
    type Err = MoneyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (integral, frac) = match digits.split_once('.') {
            Some((i, f)) => (i, f),
            None => (digits, ""),
        };
        if integral.is_empty() {
            return Err(MoneyParseError::Empty);
        }
        if frac.len() > 2 {
            return Err(MoneyParseError::TooManyDecimals);
        }
        let major = parse_digits(integral)?;
        let mut minor = parse_digits(frac)?;
        // "5.5" means fifty minor units, not five.
        if frac.len() == 1 {
            minor = minor.checked_mul(10).ok_or(MoneyParseError::OutOfRange)?;
        }
        let magnitude = major
            .checked_mul(MINOR_PER_MAJOR)
            .and_then(|m| m.checked_add(minor))
            .ok_or(MoneyParseError::OutOfRange)?;
        let value = if negative {
            magnitude.checked_neg().ok_or(MoneyParseError::OutOfRange)?
        } else {
            magnitude
        };
        Ok(Self(value))
    }
}

/// Parse an all-digit substring into a non-negative value.
///
/// An empty string parses to zero so the fractional part may be omitted.
fn parse_digits(s: &str) -> Result<i64, MoneyParseError> {
    let mut value: i64 = 0;
    for c in s.chars() {
        let digit = c.to_digit(10).ok_or(MoneyParseError::InvalidCharacter)?;
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(i64::from(digit)))
            .ok_or(MoneyParseError::OutOfRange)?;
    }
    Ok(value)
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("0", 0)]
    #[case("0.00", 0)]
    #[case("12.50", 1250)]
    #[case("12.5", 1250)]
    #[case("12", 1200)]
    #[case("0.07", 7)]
    #[case("-3.25", -325)]
    #[case("92233720368547758.07", i64::MAX)]
    fn parses_decimal_strings(#[case] input: &str, #[case] minor: i64) {
        let money: Money = input.parse().expect("parse");
        assert_eq!(money.minor_units(), minor);
    }

    #[rstest]
    #[case("")]
    #[case("-")]
    #[case(".5")]
    #[case("1.234")]
    #[case("1,50")]
    #[case("12a")]
    #[case("99999999999999999999")]
    fn rejects_malformed_strings(#[case] input: &str) {
        assert!(input.parse::<Money>().is_err());
    }

    #[rstest]
    #[case(0, "0.00")]
    #[case(1250, "12.50")]
    #[case(7, "0.07")]
    #[case(-325, "-3.25")]
    fn formats_minor_units(#[case] minor: i64, #[case] expected: &str) {
        assert_eq!(Money::from_minor(minor).to_string(), expected);
    }

    #[test]
    fn serde_round_trips_as_string() {
        let money = Money::from_minor(1299);
        let json = serde_json::to_string(&money).expect("serialize");
        assert_eq!(json, "\"12.99\"");
        let back: Money = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, money);
    }

    #[test]
    fn checked_add_detects_overflow() {
        let max = Money::from_minor(i64::MAX);
        assert!(max.checked_add(Money::from_minor(1)).is_none());
        assert_eq!(
            Money::from_minor(1).checked_add(Money::from_minor(2)),
            Some(Money::from_minor(3))
        );
    }

    proptest! {
        #[test]
        fn display_parse_round_trip(minor in -1_000_000_000_000i64..=1_000_000_000_000i64) {
            let money = Money::from_minor(minor);
            let parsed: Money = money.to_string().parse().expect("round trip");
            prop_assert_eq!(parsed, money);
        }

        #[test]
        fn addition_matches_minor_units(
            a in -1_000_000_000i64..=1_000_000_000i64,
            b in -1_000_000_000i64..=1_000_000_000i64,
        ) {
            let sum = Money::from_minor(a).checked_add(Money::from_minor(b)).expect("no overflow");
            prop_assert_eq!(sum.minor_units(), a + b);
        }
    }
}
