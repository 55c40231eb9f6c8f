//! Prometheus metrics for the maker control loop.
//!
//! Tracks the life of the trading loop: ticks run and skipped, orders
//! placed and cancelled, positions flattened, and exchange errors split
//! by kind.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. A registration
//! failure means a duplicate metric name, which is a fatal programming
//! error best caught at startup. These panics only occur during static
//! initialization, never at runtime.

use once_cell::sync::Lazy;
use prometheus::{
    register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec,
};

/// Total trading ticks executed.
pub static TICKS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("maker_ticks_total", "Total trading ticks executed").unwrap()
});

/// Ticks skipped because the previous tick was still running.
pub static TICKS_SKIPPED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "maker_ticks_skipped_total",
        "Ticks skipped because the previous tick was still in flight"
    )
    .unwrap()
});

/// Orders placed, labelled by side.
pub static ORDERS_PLACED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "maker_orders_placed_total",
        "Limit orders successfully placed",
        &["side"]
    )
    .unwrap()
});

/// Orders cancelled, labelled by the refresh reason that triggered it.
pub static ORDERS_CANCELLED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "maker_orders_cancelled_total",
        "Open orders cancelled",
        &["reason"]
    )
    .unwrap()
});

/// Positions flattened by the reduce-only market close.
pub static POSITIONS_FLATTENED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "maker_positions_flattened_total",
        "Positions closed by the auto-flatten step"
    )
    .unwrap()
});

/// Exchange errors, labelled by kind (api/network/parse).
pub static EXCHANGE_ERRORS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "maker_exchange_errors_total",
        "Exchange request failures",
        &["kind"]
    )
    .unwrap()
});

/// Helper for common metric operations.
pub struct Metrics;

impl Metrics {
    /// Record a tick starting.
    pub fn tick() {
        TICKS_TOTAL.inc();
    }

    /// Record a tick skipped by the busy guard.
    pub fn tick_skipped() {
        TICKS_SKIPPED_TOTAL.inc();
    }

    /// Record a successfully placed order.
    pub fn order_placed(side: &str) {
        ORDERS_PLACED_TOTAL.with_label_values(&[side]).inc();
    }

    /// Record cancelled orders.
    pub fn orders_cancelled(reason: &str, count: u64) {
        ORDERS_CANCELLED_TOTAL
            .with_label_values(&[reason])
            .inc_by(count);
    }

    /// Record a position flattened.
    pub fn position_flattened() {
        POSITIONS_FLATTENED_TOTAL.inc();
    }

    /// Record an exchange error by kind.
    pub fn exchange_error(kind: &str) {
        EXCHANGE_ERRORS_TOTAL.with_label_values(&[kind]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_increment() {
        let before = TICKS_TOTAL.get();
        Metrics::tick();
        assert_eq!(TICKS_TOTAL.get(), before + 1);
    }

    #[test]
    fn labelled_counters_increment() {
        let before = ORDERS_PLACED_TOTAL.with_label_values(&["buy"]).get();
        Metrics::order_placed("buy");
        assert_eq!(ORDERS_PLACED_TOTAL.with_label_values(&["buy"]).get(), before + 1);
    }

    #[test]
    fn cancelled_counter_adds_count() {
        let before = ORDERS_CANCELLED_TOTAL.with_label_values(&["scheduled"]).get();
        Metrics::orders_cancelled("scheduled", 2);
        assert_eq!(
            ORDERS_CANCELLED_TOTAL.with_label_values(&["scheduled"]).get(),
            before + 2
        );
    }
}
