//! The trading tick.
//!
//! One tick per poll interval: read position, mark price, and open
//! orders concurrently, then act on the first rule that applies.
//! Flattening a detected position always wins; only a flat book with a
//! usable price proceeds to the refresh policy or to fresh placement.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use rand::Rng;
use rust_decimal::Decimal;
use standx_client::ClientError;
use standx_core::{OpenOrder, Position, Price};
use standx_telemetry::Metrics;
use tracing::{debug, info, warn};

use crate::api::ExchangeApi;
use crate::config::MakerConfig;
use crate::error::EngineResult;
use crate::quote::{compute_leg, resolve_sides};
use crate::refresh::{self, RefreshDecision, RefreshReason, RefreshThresholds};
use crate::scheduler::RefreshScheduler;

/// Pause after submitting a close, letting the fill settle before the
/// next tick re-reads the position.
const FLATTEN_SETTLE: Duration = Duration::from_millis(1_000);

/// Pause between the legs of a two-sided placement.
const INTER_LEG_DELAY: Duration = Duration::from_millis(100);

/// What a tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A position was detected and a reduce-only close submitted.
    Flattened,
    /// A position was detected but auto-close is off; no action taken.
    AutoCloseDisabled,
    /// The close order was rejected; the position remains.
    FlattenFailed,
    /// A read failed; the tick decided nothing.
    ReadFailed,
    /// The exchange reported no usable mark price.
    NoPrice,
    /// Resting orders were cancelled.
    Refreshed(RefreshReason),
    /// Resting orders were left alone.
    Held,
    /// Fresh quotes were placed; `legs` counts the accepted ones.
    Placed { legs: usize },
    /// Every leg of a placement was rejected.
    PlacementFailed,
}

/// Mutable quoting state carried across ticks.
#[derive(Debug, Default, Clone, Copy)]
struct QuoteState {
    /// Mark price at the last successful placement.
    last_quoted_price: Option<Price>,
    /// Absolute deadline of the next scheduled refresh.
    next_deadline_ms: Option<i64>,
}

/// Drives one instrument's quoting loop against an [`ExchangeApi`].
pub struct TradingEngine<A, R> {
    api: A,
    config: MakerConfig,
    thresholds: RefreshThresholds,
    scheduler: RefreshScheduler,
    state: Mutex<QuoteState>,
    busy: AtomicBool,
    rng: Mutex<R>,
}

impl<A: ExchangeApi, R: Rng + Send> TradingEngine<A, R> {
    pub fn new(api: A, config: MakerConfig, rng: R) -> EngineResult<Self> {
        config.validate()?;
        let thresholds = RefreshThresholds {
            max_price_deviation: config.max_price_deviation,
            price_offset: config.price_offset,
            safety_margin: config.safety_margin,
        };
        let scheduler = RefreshScheduler::new(config.refresh_min_ms, config.refresh_max_ms);
        Ok(Self {
            api,
            config,
            thresholds,
            scheduler,
            state: Mutex::new(QuoteState::default()),
            busy: AtomicBool::new(false),
            rng: Mutex::new(rng),
        })
    }

    pub fn config(&self) -> &MakerConfig {
        &self.config
    }

    /// One-time startup work before the poll loop: flatten any carried
    /// position, then set leverage. Neither failure is fatal.
    pub async fn startup(&self) {
        if self.config.auto_close_position {
            match self.api.position().await {
                Ok(Some(position)) => {
                    let _ = self.flatten(position).await;
                }
                Ok(None) => {}
                Err(error) => self.log_exchange_error("startup position read", &error),
            }
        }

        if let Err(error) = self.api.set_leverage(self.config.leverage).await {
            warn!(
                leverage = self.config.leverage,
                error = %error,
                "Failed to set leverage, continuing with account default"
            );
        } else {
            info!(leverage = self.config.leverage, "Leverage set");
        }
    }

    /// Run a tick unless the previous one is still in flight.
    ///
    /// Returns `None` when the busy guard dropped the tick. The guard is
    /// a compare-and-swap, never a lock: an overlapping tick is counted
    /// and discarded, not queued.
    pub async fn try_tick(&self, now_ms: i64) -> Option<TickOutcome> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Previous tick still running, skipping");
            Metrics::tick_skipped();
            return None;
        }

        Metrics::tick();
        let outcome = self.tick(now_ms).await;
        self.busy.store(false, Ordering::SeqCst);
        Some(outcome)
    }

    async fn tick(&self, now_ms: i64) -> TickOutcome {
        let (position, mark_price, open_orders) = tokio::join!(
            self.api.position(),
            self.api.mark_price(),
            self.api.open_orders()
        );

        let position = match position {
            Ok(position) => position,
            Err(error) => {
                self.log_exchange_error("position read", &error);
                return TickOutcome::ReadFailed;
            }
        };

        // A position always takes precedence, even when other reads failed.
        if let Some(position) = position {
            return self.handle_position(position).await;
        }

        let mark_price = match mark_price {
            Ok(Some(price)) => price,
            Ok(None) => {
                debug!("No mark price reported, skipping tick");
                return TickOutcome::NoPrice;
            }
            Err(error) => {
                self.log_exchange_error("price read", &error);
                return TickOutcome::ReadFailed;
            }
        };

        let open_orders = match open_orders {
            Ok(orders) => orders,
            Err(error) => {
                self.log_exchange_error("open orders read", &error);
                return TickOutcome::ReadFailed;
            }
        };

        let deviation = self.deviation_from_last_quote(mark_price);

        if !open_orders.is_empty() {
            return self
                .maintain_orders(now_ms, mark_price, deviation, &open_orders)
                .await;
        }

        self.place_quotes(now_ms, mark_price).await
    }

    async fn handle_position(&self, position: Position) -> TickOutcome {
        if !self.config.auto_close_position {
            warn!(
                qty = %position.qty,
                "Position detected but auto-close is disabled, holding"
            );
            return TickOutcome::AutoCloseDisabled;
        }
        self.flatten(position).await
    }

    async fn flatten(&self, position: Position) -> TickOutcome {
        info!(
            side = %position.side(),
            qty = %position.close_qty(),
            entry_price = %position.entry_price,
            "Position detected, closing"
        );

        match self
            .api
            .close_position(position.closing_side(), position.close_qty())
            .await
        {
            Ok(()) => {
                Metrics::position_flattened();
                tokio::time::sleep(FLATTEN_SETTLE).await;
                TickOutcome::Flattened
            }
            Err(error) => {
                self.log_exchange_error("close position", &error);
                TickOutcome::FlattenFailed
            }
        }
    }

    /// Deviation of the current mark from the last quoted price. Zero
    /// until the first placement of the run.
    fn deviation_from_last_quote(&self, mark_price: Price) -> Decimal {
        self.state
            .lock()
            .last_quoted_price
            .and_then(|last| mark_price.deviation_from(last))
            .unwrap_or(Decimal::ZERO)
    }

    async fn maintain_orders(
        &self,
        now_ms: i64,
        mark_price: Price,
        deviation: Decimal,
        open_orders: &[OpenOrder],
    ) -> TickOutcome {
        let next_deadline_ms = self.state.lock().next_deadline_ms;
        let decision = refresh::evaluate(deviation, now_ms, next_deadline_ms, &self.thresholds);

        match decision {
            RefreshDecision::Hold => {
                info!(
                    price = %mark_price,
                    deviation = %deviation,
                    orders = open_orders.len(),
                    "Monitoring"
                );
                TickOutcome::Held
            }
            RefreshDecision::Refresh(reason) => {
                info!(
                    reason = %reason,
                    deviation = %deviation,
                    orders = open_orders.len(),
                    "Refreshing orders"
                );
                self.cancel_resting(reason, open_orders).await;
                if reason == RefreshReason::Scheduled {
                    // Push the deadline out so the rule cannot re-fire
                    // before replacement quotes are resting.
                    self.state.lock().next_deadline_ms =
                        Some(self.scheduler.cooldown_deadline(now_ms));
                }
                TickOutcome::Refreshed(reason)
            }
        }
    }

    /// Cancel resting orders: batch first, then one-by-one, then the
    /// cancel-all sweep when no ids are known. Individual failures are
    /// logged and tolerated; the next tick re-reads the book.
    async fn cancel_resting(&self, reason: RefreshReason, open_orders: &[OpenOrder]) {
        let ids: Vec<String> = open_orders.iter().map(|order| order.id.clone()).collect();

        if ids.is_empty() {
            if let Err(error) = self.api.cancel_all().await {
                self.log_exchange_error("cancel all", &error);
            }
            return;
        }

        match self.api.cancel_batch(ids.clone()).await {
            Ok(()) => Metrics::orders_cancelled(&reason.to_string(), ids.len() as u64),
            Err(error) => {
                warn!(error = %error, "Batch cancel failed, retrying individually");
                for id in ids {
                    match self.api.cancel_one(id.clone()).await {
                        Ok(()) => Metrics::orders_cancelled(&reason.to_string(), 1),
                        Err(error) => {
                            warn!(order_id = %id, error = %error, "Cancel failed")
                        }
                    }
                }
            }
        }
    }

    async fn place_quotes(&self, now_ms: i64, mark_price: Price) -> TickOutcome {
        let sides = {
            let mut rng = self.rng.lock();
            resolve_sides(self.config.side, &mut *rng)
        };

        let mut placed = 0usize;
        for (index, side) in sides.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(INTER_LEG_DELAY).await;
            }

            let Some(leg) = compute_leg(
                *side,
                mark_price,
                self.config.price_offset,
                self.config.order_notional,
            ) else {
                debug!("Mark price unusable for sizing, skipping placement");
                return TickOutcome::NoPrice;
            };

            info!(
                side = %leg.side,
                price = %leg.price,
                qty = %leg.qty,
                "Placing order"
            );

            match self.api.place_limit(leg.side, leg.price, leg.qty).await {
                Ok(()) => {
                    placed += 1;
                    Metrics::order_placed(&leg.side.to_string());
                }
                Err(error) => self.log_exchange_error("place order", &error),
            }
        }

        if placed == 0 {
            return TickOutcome::PlacementFailed;
        }

        let deadline = {
            let mut rng = self.rng.lock();
            self.scheduler.draw_deadline(&mut *rng, now_ms)
        };
        {
            let mut state = self.state.lock();
            state.last_quoted_price = Some(mark_price);
            state.next_deadline_ms = Some(deadline);
        }

        info!(legs = placed, "Quotes placed");
        TickOutcome::Placed { legs: placed }
    }

    fn log_exchange_error(&self, context: &str, error: &ClientError) {
        match error {
            ClientError::Api { code, message } => {
                warn!(context, code, message = %message, "Exchange rejected request");
                Metrics::exchange_error("api");
            }
            ClientError::Network(message) => {
                warn!(context, message = %message, "Network failure");
                Metrics::exchange_error("network");
            }
            ClientError::Parse(message) => {
                warn!(context, message = %message, "Malformed exchange response");
                Metrics::exchange_error("parse");
            }
            ClientError::Build(message) => {
                warn!(context, message = %message, "Request build failure");
                Metrics::exchange_error("build");
            }
        }
    }
}
