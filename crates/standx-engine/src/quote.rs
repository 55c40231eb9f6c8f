//! Quote leg computation.
//!
//! Pure placement math: resolve the configured entry side into concrete
//! legs, price each leg at the configured offset from the mark, and size
//! it to spend the configured notional.

use rand::Rng;
use rust_decimal::Decimal;
use standx_core::{EntrySide, OrderSide, Price, Size};

/// One limit order leg ready for submission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuoteLeg {
    pub side: OrderSide,
    pub price: Price,
    pub qty: Size,
}

/// Resolve the configured side into concrete order sides.
///
/// `Random` is resolved once per placement event, not once per run.
pub fn resolve_sides<R: Rng>(side: EntrySide, rng: &mut R) -> Vec<OrderSide> {
    match side {
        EntrySide::Long => vec![OrderSide::Buy],
        EntrySide::Short => vec![OrderSide::Sell],
        EntrySide::Both => vec![OrderSide::Buy, OrderSide::Sell],
        EntrySide::Random => {
            if rng.gen_bool(0.5) {
                vec![OrderSide::Buy]
            } else {
                vec![OrderSide::Sell]
            }
        }
    }
}

/// Compute one leg at `offset` from the mark price.
///
/// Buy legs sit below the mark (`price * (1 - offset)`), sell legs above
/// (`price * (1 + offset)`). Quantity spends `notional` at the leg price.
/// Returns None when the mark price is non-positive.
pub fn compute_leg(
    side: OrderSide,
    mark_price: Price,
    offset: Decimal,
    notional: Decimal,
) -> Option<QuoteLeg> {
    let fraction = match side {
        OrderSide::Buy => -offset,
        OrderSide::Sell => offset,
    };
    let price = mark_price.offset_by(fraction);
    let qty = Size::from_notional(notional, price)?;

    Some(QuoteLeg { side, price, qty })
}
