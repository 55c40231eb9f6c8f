//! Trading state machine and order refresh policy.
//!
//! The engine runs one decision cycle ("tick") per poll interval:
//! fetch position, mark price, and open orders concurrently; flatten any
//! position first; otherwise either maintain resting quotes (refresh
//! policy) or place fresh ones. Ticks are serialized by a non-blocking
//! busy flag; an overlapping tick is dropped and counted, never queued.

pub mod api;
pub mod config;
pub mod error;
pub mod quote;
pub mod refresh;
pub mod scheduler;
pub mod tick;

pub use api::{BoxFuture, ExchangeApi, ExchangeCall, MockExchange};
pub use config::MakerConfig;
pub use error::{EngineError, EngineResult};
pub use quote::{compute_leg, resolve_sides, QuoteLeg};
pub use refresh::{RefreshDecision, RefreshReason, RefreshThresholds};
pub use scheduler::{RefreshScheduler, REFRESH_COOLDOWN_MS};
pub use tick::{TickOutcome, TradingEngine};
