//! Maker engine configuration.

use crate::error::{EngineError, EngineResult};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use standx_core::EntrySide;

/// Maker engine configuration.
///
/// All thresholds are operator-supplied constants; nothing here is
/// computed at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MakerConfig {
    /// Instrument to quote (fixed per run).
    #[serde(default = "default_symbol")]
    pub symbol: String,

    /// Leverage set once at startup.
    #[serde(default = "default_leverage")]
    pub leverage: u32,

    /// Notional value per quote leg in USD.
    #[serde(default = "default_order_notional")]
    pub order_notional: Decimal,

    /// Which side(s) to quote.
    #[serde(default)]
    pub side: EntrySide,

    /// Entry price offset fraction from the mark price.
    #[serde(default = "default_price_offset")]
    pub price_offset: Decimal,

    /// Deviation beyond which resting quotes are hard-refreshed.
    #[serde(default = "default_max_price_deviation")]
    pub max_price_deviation: Decimal,

    /// Safety margin fraction; quotes are cancelled once deviation
    /// exceeds `price_offset - safety_margin`.
    #[serde(default = "default_safety_margin")]
    pub safety_margin: Decimal,

    /// Poll interval driving ticks, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Lower bound of the randomized refresh window (ms).
    #[serde(default = "default_refresh_min_ms")]
    pub refresh_min_ms: u64,

    /// Upper bound of the randomized refresh window (ms).
    #[serde(default = "default_refresh_max_ms")]
    pub refresh_max_ms: u64,

    /// Auto-flatten any detected position. When false, a position ends
    /// the tick with no action.
    #[serde(default = "default_true")]
    pub auto_close_position: bool,
}

fn default_symbol() -> String {
    "BTC-USD".to_string()
}

fn default_leverage() -> u32 {
    5
}

fn default_order_notional() -> Decimal {
    dec!(2000)
}

fn default_price_offset() -> Decimal {
    dec!(0.0009)
}

fn default_max_price_deviation() -> Decimal {
    dec!(0.003)
}

fn default_safety_margin() -> Decimal {
    dec!(0.0005)
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_refresh_min_ms() -> u64 {
    120_000
}

fn default_refresh_max_ms() -> u64 {
    180_000
}

fn default_true() -> bool {
    true
}

impl Default for MakerConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            leverage: default_leverage(),
            order_notional: default_order_notional(),
            side: EntrySide::default(),
            price_offset: default_price_offset(),
            max_price_deviation: default_max_price_deviation(),
            safety_margin: default_safety_margin(),
            poll_interval_ms: default_poll_interval_ms(),
            refresh_min_ms: default_refresh_min_ms(),
            refresh_max_ms: default_refresh_max_ms(),
            auto_close_position: default_true(),
        }
    }
}

impl MakerConfig {
    /// Validate operator-supplied values before the loop starts.
    pub fn validate(&self) -> EngineResult<()> {
        if self.symbol.is_empty() {
            return Err(EngineError::InvalidConfig("symbol is empty".to_string()));
        }
        if self.leverage < 1 {
            return Err(EngineError::InvalidConfig(
                "leverage must be at least 1".to_string(),
            ));
        }
        if self.order_notional <= Decimal::ZERO {
            return Err(EngineError::InvalidConfig(
                "order_notional must be positive".to_string(),
            ));
        }
        if self.price_offset <= Decimal::ZERO {
            return Err(EngineError::InvalidConfig(
                "price_offset must be positive".to_string(),
            ));
        }
        if self.safety_margin >= self.price_offset {
            return Err(EngineError::InvalidConfig(
                "safety_margin must be below price_offset".to_string(),
            ));
        }
        if self.refresh_min_ms > self.refresh_max_ms {
            return Err(EngineError::InvalidConfig(
                "refresh_min_ms exceeds refresh_max_ms".to_string(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(EngineError::InvalidConfig(
                "poll_interval_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
