//! Position snapshot from the exchange.

use crate::{OrderSide, Price, Size};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An open position on the configured instrument.
///
/// Quantity is signed: positive is long, negative is short. A snapshot
/// with zero quantity or zero entry price is not a position; use
/// [`Position::from_raw`] to normalize.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Signed quantity (positive = long, negative = short).
    pub qty: Decimal,
    /// Average entry price.
    pub entry_price: Price,
}

impl Position {
    /// Normalize raw exchange fields into a position.
    ///
    /// Returns None for the "no position" cases: zero quantity or zero
    /// entry price.
    pub fn from_raw(qty: Decimal, entry_price: Decimal) -> Option<Self> {
        if qty.is_zero() || entry_price.is_zero() {
            return None;
        }
        Some(Self {
            qty,
            entry_price: Price::new(entry_price),
        })
    }

    /// Position direction, derived from the sign of the quantity.
    pub fn side(&self) -> OrderSide {
        if self.qty.is_sign_positive() {
            OrderSide::Buy
        } else {
            OrderSide::Sell
        }
    }

    /// Order side that closes this position in full.
    pub fn closing_side(&self) -> OrderSide {
        self.side().opposite()
    }

    /// Unsigned quantity to submit on a full close.
    pub fn close_qty(&self) -> Size {
        Size::new(self.qty.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_from_raw_rejects_empty() {
        assert!(Position::from_raw(dec!(0), dec!(50000)).is_none());
        assert!(Position::from_raw(dec!(0.5), dec!(0)).is_none());
        assert!(Position::from_raw(dec!(0), dec!(0)).is_none());
    }

    #[test]
    fn test_side_from_sign() {
        let long = Position::from_raw(dec!(0.5), dec!(50000)).unwrap();
        assert_eq!(long.side(), OrderSide::Buy);
        assert_eq!(long.closing_side(), OrderSide::Sell);

        let short = Position::from_raw(dec!(-0.5), dec!(50000)).unwrap();
        assert_eq!(short.side(), OrderSide::Sell);
        assert_eq!(short.closing_side(), OrderSide::Buy);
    }

    #[test]
    fn test_close_qty_abs() {
        let short = Position::from_raw(dec!(-0.25), dec!(50000)).unwrap();
        assert_eq!(short.close_qty(), Size::new(dec!(0.25)));
    }
}
