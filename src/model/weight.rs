//! Fixed-point vote weights.
//!
//! Weights are stored as raw units of `1 / SCALE` of a vote in a `u128`, so whole
//! ballot counts are exact and surplus scaling truncates the same way on every
//! machine. Nothing in the tabulator touches floating point.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

/// Number of fractional decimal digits carried by a [`Weight`].
pub const DECIMAL_PLACES: u32 = 9;

/// A non-negative vote weight with nine fractional digits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Weight(u128);

impl Weight {
    /// Raw units per whole vote.
    pub const SCALE: u128 = 1_000_000_000;
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(Self::SCALE);

    pub fn from_votes(votes: u64) -> Self {
        Self(u128::from(votes) * Self::SCALE)
    }

    pub fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Whole votes, rounded down.
    pub fn whole_votes(&self) -> u128 {
        self.0 / Self::SCALE
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// `self * numerator / denominator`, truncated to the last raw unit.
    ///
    /// Splits `self` around the denominator so the intermediate product stays
    /// well inside `u128` for any realistic electorate.
    pub fn mul_div(self, numerator: Self, denominator: Self) -> Self {
        debug_assert!(!denominator.is_zero(), "mul_div by a zero weight");
        if denominator.is_zero() {
            return Self::ZERO;
        }
        let (n, d) = (numerator.0, denominator.0);
        let quotient = self.0 / d;
        let remainder = self.0 % d;
        Self(quotient * n + remainder * n / d)
    }

    /// Exact fixed-point division by a whole number, truncated.
    pub fn div_whole(self, divisor: u64) -> Self {
        Self(self.0 / u128::from(divisor.max(1)))
    }

    /// Lossy conversion for display percentages only.
    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / Self::SCALE as f64
    }
}

impl Add for Weight {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Weight {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Weight {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Sum for Weight {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Weight> for Weight {
    fn sum<I: Iterator<Item = &'a Weight>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / Self::SCALE;
        let fraction = self.0 % Self::SCALE;
        if fraction == 0 {
            return write!(f, "{}", whole);
        }
        let digits = format!("{:09}", fraction);
        write!(f, "{}.{}", whole, digits.trim_end_matches('0'))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid weight {0:?}: expected a decimal with at most 9 fractional digits")]
pub struct ParseWeightError(String);

impl FromStr for Weight {
    type Err = ParseWeightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseWeightError(s.to_string());
        let (whole, fraction) = match s.trim().split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (s.trim(), ""),
        };
        if whole.is_empty() || fraction.len() > DECIMAL_PLACES as usize {
            return Err(invalid());
        }
        if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let whole: u128 = whole.parse().map_err(|_| invalid())?;
        let fraction: u128 = if fraction.is_empty() {
            0
        } else {
            let padded = format!("{:0<9}", fraction);
            padded.parse().map_err(|_| invalid())?
        };
        whole
            .checked_mul(Self::SCALE)
            .and_then(|raw| raw.checked_add(fraction))
            .map(Self)
            .ok_or_else(invalid)
    }
}

impl Serialize for Weight {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Weight {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Votes(u64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Votes(votes) => Ok(Weight::from_votes(votes)),
            Repr::Text(text) => text.parse().map_err(de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_trimmed_decimals() {
        assert_eq!(Weight::from_votes(4).to_string(), "4");
        assert_eq!(Weight::from_raw(400_000_000).to_string(), "0.4");
        assert_eq!(Weight::from_raw(1_000_000_001).to_string(), "1.000000001");
    }

    #[test]
    fn parses_decimal_text() {
        assert_eq!("2.5".parse::<Weight>().unwrap(), Weight::from_raw(2_500_000_000));
        assert_eq!("7".parse::<Weight>().unwrap(), Weight::from_votes(7));
        assert!("1.0000000001".parse::<Weight>().is_err());
        assert!("-1".parse::<Weight>().is_err());
        assert!(".5".parse::<Weight>().is_err());
    }

    #[test]
    fn mul_div_truncates_toward_zero() {
        let one = Weight::ONE;
        let third = one.mul_div(Weight::from_votes(1), Weight::from_votes(3));
        assert_eq!(third.raw(), 333_333_333);

        let scaled = one.mul_div(Weight::from_votes(4), Weight::from_votes(10));
        assert_eq!(scaled, "0.4".parse().unwrap());
    }

    #[test]
    fn deserializes_counts_and_text() {
        let from_count: Weight = serde_json::from_str("3").unwrap();
        let from_text: Weight = serde_json::from_str("\"0.25\"").unwrap();
        assert_eq!(from_count, Weight::from_votes(3));
        assert_eq!(from_text, Weight::from_raw(250_000_000));
        assert_eq!(serde_json::to_string(&from_text).unwrap(), "\"0.25\"");
    }
}
