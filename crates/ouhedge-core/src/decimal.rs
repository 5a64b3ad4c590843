//! Precision-safe decimal types for betting arithmetic.
//!
//! Uses `rust_decimal` for exact decimal arithmetic, avoiding
//! floating-point rounding errors in stake and payout calculations.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};
use std::str::FromStr;

/// Decimal odds with exact precision.
///
/// Wraps `Decimal` to provide type safety and prevent mixing
/// odds with stakes in calculations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Odds(pub Decimal);

impl Odds {
    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Overround of a back/lay pair: `lay / back * 100`.
    ///
    /// Returns `None` when the back price is zero.
    #[inline]
    pub fn overround(back: Odds, lay: Odds) -> Option<Decimal> {
        if back.0.is_zero() {
            return None;
        }
        Some(lay.0 / back.0 * Decimal::ONE_HUNDRED)
    }
}

impl fmt::Display for Odds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Odds {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Odds {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

/// Stake with exact decimal precision.
///
/// Wraps `Decimal` to provide type safety and prevent mixing
/// stakes with odds in calculations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stake(pub Decimal);

impl Stake {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Round to two decimal places (currency precision).
    #[inline]
    pub fn round2(&self) -> Self {
        Self(self.0.round_dp(2))
    }

    /// Gross payout of this stake at the given odds: `stake * odds`.
    #[inline]
    pub fn payout(&self, odds: Odds) -> Decimal {
        self.0 * odds.inner()
    }
}

impl fmt::Display for Stake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Stake {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Stake {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

impl Add for Stake {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Stake {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul<Decimal> for Stake {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_stake_payout() {
        let stake = Stake::new(dec!(2.0));
        let odds = Odds::new(dec!(2.6));
        assert_eq!(stake.payout(odds), dec!(5.2));
    }

    #[test]
    fn test_stake_round2() {
        let stake = Stake::new(dec!(2.3456));
        assert_eq!(stake.round2().inner(), dec!(2.35));
    }

    #[test]
    fn test_overround() {
        let back = Odds::new(dec!(2.0));
        let lay = Odds::new(dec!(2.08));
        assert_eq!(Odds::overround(back, lay).unwrap(), dec!(104));
    }

    #[test]
    fn test_overround_zero_back() {
        let back = Odds::new(dec!(0));
        let lay = Odds::new(dec!(2.0));
        assert!(Odds::overround(back, lay).is_none());
    }

    #[test]
    fn test_stake_arithmetic() {
        let a = Stake::new(dec!(2.0));
        let b = Stake::new(dec!(0.32));
        assert_eq!((a + b).inner(), dec!(2.32));
        assert_eq!((a - b).inner(), dec!(1.68));
        assert_eq!((a * dec!(1.15)).inner(), dec!(2.30));
    }
}
