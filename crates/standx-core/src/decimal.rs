//! Precision-safe decimal types for trading.
//!
//! Uses `rust_decimal` for exact decimal arithmetic, avoiding
//! floating-point rounding errors in price and quantity math.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};
use std::str::FromStr;

/// Price with exact decimal precision.
///
/// Wraps `Decimal` to provide type safety and prevent mixing
/// prices with quantities in calculations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(pub Decimal);

impl Price {
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

    /// Relative deviation from another price: `|a - b| / min(a, b)`.
    ///
    /// Symmetric in its arguments, so the measure does not depend on
    /// which of the two quotes came first. Returns None when either
    /// price is non-positive.
    #[inline]
    pub fn deviation_from(&self, other: Price) -> Option<Decimal> {
        if !self.is_positive() || !other.is_positive() {
            return None;
        }
        let base = self.0.min(other.0);
        Some((self.0 - other.0).abs() / base)
    }

    /// Offset this price by a signed fraction: `price * (1 + fraction)`.
    #[inline]
    pub fn offset_by(&self, fraction: Decimal) -> Self {
        Self(self.0 * (Decimal::ONE + fraction))
    }

    /// Wire representation: fixed two decimal places, as the exchange expects.
    pub fn to_wire(&self) -> String {
        let mut rounded = self.0.round_dp(2);
        rounded.rescale(2);
        rounded.to_string()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Price {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Price {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul<Decimal> for Price {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Div<Decimal> for Price {
    type Output = Self;

    fn div(self, rhs: Decimal) -> Self::Output {
        Self(self.0 / rhs)
    }
}

/// Quantity with exact decimal precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Size(pub Decimal);

impl Size {
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

    /// Quantity that spends `notional` at `price`: `notional / price`.
    ///
    /// Returns None when price is non-positive.
    pub fn from_notional(notional: Decimal, price: Price) -> Option<Self> {
        if !price.is_positive() {
            return None;
        }
        Some(Self(notional / price.0))
    }

    /// Notional value: size * price.
    #[inline]
    pub fn notional(&self, price: Price) -> Decimal {
        self.0 * price.0
    }

    /// Wire representation: fixed four decimal places, as the exchange expects.
    pub fn to_wire(&self) -> String {
        let mut rounded = self.0.round_dp(4);
        rounded.rescale(4);
        rounded.to_string()
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Size {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Size {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

impl Add for Size {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Size {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_deviation_basic() {
        let last = Price::new(dec!(100));
        let current = Price::new(dec!(100.3));

        let dev = current.deviation_from(last).unwrap();
        assert_eq!(dev, dec!(0.003));
    }

    #[test]
    fn test_deviation_symmetric() {
        let a = Price::new(dec!(100));
        let b = Price::new(dec!(100.3));

        assert_eq!(a.deviation_from(b), b.deviation_from(a));
    }

    #[test]
    fn test_deviation_zero_price() {
        let a = Price::new(dec!(0));
        let b = Price::new(dec!(100));
        assert!(a.deviation_from(b).is_none());
        assert!(b.deviation_from(a).is_none());
    }

    #[test]
    fn test_offset_by() {
        let price = Price::new(dec!(50000));

        // Long leg sits below the mark, short leg above.
        assert_eq!(price.offset_by(dec!(-0.0009)).inner(), dec!(49955));
        assert_eq!(price.offset_by(dec!(0.0009)).inner(), dec!(50045));
    }

    #[test]
    fn test_size_from_notional() {
        let price = Price::new(dec!(49955));
        let qty = Size::from_notional(dec!(2000), price).unwrap();
        assert_eq!(qty.inner(), dec!(2000) / dec!(49955));
    }

    #[test]
    fn test_size_from_notional_zero_price() {
        assert!(Size::from_notional(dec!(2000), Price::ZERO).is_none());
    }

    #[test]
    fn test_wire_rounding() {
        let price = Price::new(dec!(49955.6789));
        assert_eq!(price.to_wire(), "49955.68");

        let qty = Size::new(dec!(0.040036032));
        assert_eq!(qty.to_wire(), "0.0400");
    }

    #[test]
    fn test_wire_pads_to_fixed_scale() {
        assert_eq!(Price::new(dec!(49955)).to_wire(), "49955.00");
        assert_eq!(Price::new(dec!(100.5)).to_wire(), "100.50");
        assert_eq!(Size::new(dec!(1)).to_wire(), "1.0000");
        assert_eq!(Size::new(dec!(0.04)).to_wire(), "0.0400");
    }

    #[test]
    fn test_notional_roundtrip() {
        let price = Price::new(dec!(50000));
        let qty = Size::from_notional(dec!(2000), price).unwrap();
        assert_eq!(qty.notional(price), dec!(2000));
    }
}
