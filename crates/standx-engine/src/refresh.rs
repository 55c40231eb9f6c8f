//! Order refresh policy.
//!
//! Pure decision logic, evaluated only while open orders are resting.
//! Strict priority: hard deviation breach, then safety breach, then
//! scheduled refresh, then hold. A scheduled refresh must never fire in
//! a tick where a deviation rule already holds.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why resting orders are being cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefreshReason {
    /// Deviation exceeded `max_price_deviation`: quotes are nowhere near
    /// the market anymore.
    HardDeviation,
    /// Deviation exceeded `price_offset - safety_margin`: the market is
    /// close enough to risk an unwanted fill.
    SafetyBreach,
    /// The randomized refresh deadline elapsed.
    Scheduled,
}

impl fmt::Display for RefreshReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HardDeviation => write!(f, "hard_deviation"),
            Self::SafetyBreach => write!(f, "safety_breach"),
            Self::Scheduled => write!(f, "scheduled"),
        }
    }
}

/// Policy verdict for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshDecision {
    /// Cancel the resting orders.
    Refresh(RefreshReason),
    /// Leave orders resting; report status only.
    Hold,
}

/// Thresholds consulted by the policy.
#[derive(Debug, Clone, Copy)]
pub struct RefreshThresholds {
    pub max_price_deviation: Decimal,
    pub price_offset: Decimal,
    pub safety_margin: Decimal,
}

impl RefreshThresholds {
    /// Deviation above which the safety rule cancels.
    pub fn safety_threshold(&self) -> Decimal {
        self.price_offset - self.safety_margin
    }
}

/// Evaluate the refresh policy.
///
/// `deviation` is the relative price movement since the last quote
/// (zero when no quote has been placed yet). `next_deadline_ms` is the
/// absolute scheduled-refresh deadline, if one is set.
pub fn evaluate(
    deviation: Decimal,
    now_ms: i64,
    next_deadline_ms: Option<i64>,
    thresholds: &RefreshThresholds,
) -> RefreshDecision {
    if deviation > thresholds.max_price_deviation {
        return RefreshDecision::Refresh(RefreshReason::HardDeviation);
    }

    if deviation > thresholds.safety_threshold() {
        return RefreshDecision::Refresh(RefreshReason::SafetyBreach);
    }

    if let Some(deadline) = next_deadline_ms {
        if now_ms > deadline {
            return RefreshDecision::Refresh(RefreshReason::Scheduled);
        }
    }

    RefreshDecision::Hold
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn thresholds() -> RefreshThresholds {
        RefreshThresholds {
            max_price_deviation: dec!(0.002),
            price_offset: dec!(0.0009),
            safety_margin: dec!(0.0005),
        }
    }

    #[test]
    fn test_hard_breach_fires() {
        // last=100, price=100.3 -> deviation 0.003 > 0.002
        let decision = evaluate(dec!(0.003), 0, None, &thresholds());
        assert_eq!(
            decision,
            RefreshDecision::Refresh(RefreshReason::HardDeviation)
        );
    }

    #[test]
    fn test_safety_breach_fires_below_hard() {
        // safety threshold = 0.0009 - 0.0005 = 0.0004
        let decision = evaluate(dec!(0.00045), 0, None, &thresholds());
        assert_eq!(
            decision,
            RefreshDecision::Refresh(RefreshReason::SafetyBreach)
        );
    }

    #[test]
    fn test_hard_takes_priority_over_safety() {
        // Both rules hold; hard wins.
        let decision = evaluate(dec!(0.01), 0, None, &thresholds());
        assert_eq!(
            decision,
            RefreshDecision::Refresh(RefreshReason::HardDeviation)
        );
    }

    #[test]
    fn test_scheduled_fires_when_deadline_elapsed() {
        let decision = evaluate(dec!(0), 10_001, Some(10_000), &thresholds());
        assert_eq!(decision, RefreshDecision::Refresh(RefreshReason::Scheduled));
    }

    #[test]
    fn test_scheduled_does_not_fire_at_deadline() {
        let decision = evaluate(dec!(0), 10_000, Some(10_000), &thresholds());
        assert_eq!(decision, RefreshDecision::Hold);
    }

    #[test]
    fn test_safety_takes_priority_over_scheduled() {
        // Deadline elapsed AND safety breached: safety wins.
        let decision = evaluate(dec!(0.00045), 10_001, Some(10_000), &thresholds());
        assert_eq!(
            decision,
            RefreshDecision::Refresh(RefreshReason::SafetyBreach)
        );
    }

    #[test]
    fn test_hold_when_nothing_fires() {
        let decision = evaluate(dec!(0.0001), 5_000, Some(10_000), &thresholds());
        assert_eq!(decision, RefreshDecision::Hold);
    }

    #[test]
    fn test_hold_with_no_deadline() {
        let decision = evaluate(dec!(0), 5_000, None, &thresholds());
        assert_eq!(decision, RefreshDecision::Hold);
    }

    #[test]
    fn test_threshold_boundaries_are_strict() {
        // Exactly at a threshold does not fire; strictly above does.
        let t = thresholds();
        assert_eq!(evaluate(dec!(0.002), 0, None, &t), RefreshDecision::Hold);
        assert_eq!(
            evaluate(dec!(0.0004), 0, None, &t),
            RefreshDecision::Hold
        );
        assert_eq!(
            evaluate(dec!(0.0021), 0, None, &t),
            RefreshDecision::Refresh(RefreshReason::HardDeviation)
        );
    }
}
