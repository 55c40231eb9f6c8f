//! Application wiring and the poll loop.
//!
//! Startup order mirrors the exchange's expectations: import the
//! signing key, estimate the server clock offset, build the signed
//! client, flatten any carried position, set leverage, then poll.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use standx_auth::{ClockSync, RequestSigner, SigningCredential};
use standx_client::ExchangeClient;
use standx_engine::{ExchangeApi, TradingEngine};
use tokio::task::JoinSet;
use tracing::info;

use crate::config::{AppConfig, Secrets};
use crate::error::AppResult;

/// The running application.
pub struct Application {
    config: AppConfig,
    engine: Arc<TradingEngine<ExchangeClient, StdRng>>,
}

impl Application {
    /// Build the full stack from configuration and credentials.
    ///
    /// Performs one network round-trip for the clock offset; everything
    /// else is local.
    pub async fn new(config: AppConfig, secrets: Secrets) -> AppResult<Self> {
        let credential = SigningCredential::import(&secrets.signing_key)?;

        let clock = ClockSync::new(
            &config.geo_url,
            &config.base_url,
            &secrets.api_token,
            &config.maker.symbol,
        )?;
        let offset = clock.sync().await;
        info!(offset_ms = offset.millis(), "Clock synchronized");

        let signer = RequestSigner::new(credential, offset);
        let client = ExchangeClient::new(
            &config.base_url,
            &secrets.api_token,
            &config.maker.symbol,
            signer,
        )?;

        let engine = TradingEngine::new(client, config.maker.clone(), StdRng::from_entropy())?;

        Ok(Self {
            config,
            engine: Arc::new(engine),
        })
    }

    /// Run until a shutdown signal arrives.
    pub async fn run(&self) -> AppResult<()> {
        self.engine.startup().await;

        let interval_ms = self.config.maker.poll_interval_ms;
        info!(
            symbol = %self.config.maker.symbol,
            interval_ms,
            side = %self.config.maker.side,
            "Entering trading loop"
        );

        poll_loop(
            self.engine.clone(),
            Duration::from_millis(interval_ms),
            async {
                let _ = tokio::signal::ctrl_c().await;
                info!("Shutdown signal received");
            },
        )
        .await;

        info!("Stopped");
        Ok(())
    }
}

/// Fire ticks on schedule until `shutdown` resolves.
///
/// Every spawned tick is held in a join set and drained before this
/// returns, so an in-flight exchange call runs to completion instead of
/// being aborted when the runtime shuts down.
async fn poll_loop<A, R>(
    engine: Arc<TradingEngine<A, R>>,
    interval: Duration,
    shutdown: impl Future<Output = ()>,
) where
    A: ExchangeApi + 'static,
    R: Rng + Send + 'static,
{
    let mut poll = tokio::time::interval(interval);
    poll.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let mut ticks = JoinSet::new();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = poll.tick() => {
                // Ticks are fired on schedule regardless of how long
                // the previous one takes; the engine's busy guard
                // drops the overlap. Reap finished ticks so the set
                // only holds live ones.
                while ticks.try_join_next().is_some() {}
                let engine = engine.clone();
                ticks.spawn(async move {
                    let now_ms = Utc::now().timestamp_millis();
                    engine.try_tick(now_ms).await;
                });
            }

            _ = &mut shutdown => break,
        }
    }

    while ticks.join_next().await.is_some() {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    use rust_decimal_macros::dec;
    use standx_client::ClientResult;
    use standx_core::{OpenOrder, OrderSide, Position, Price, Size};
    use standx_engine::{BoxFuture, MakerConfig, MockExchange};

    /// Exchange whose position close takes a while, like a real
    /// network round-trip.
    struct SlowCloseExchange {
        inner: MockExchange,
        closed: Arc<AtomicBool>,
    }

    impl ExchangeApi for SlowCloseExchange {
        fn position(&self) -> BoxFuture<'_, ClientResult<Option<Position>>> {
            self.inner.position()
        }

        fn mark_price(&self) -> BoxFuture<'_, ClientResult<Option<Price>>> {
            self.inner.mark_price()
        }

        fn open_orders(&self) -> BoxFuture<'_, ClientResult<Vec<OpenOrder>>> {
            self.inner.open_orders()
        }

        fn place_limit(
            &self,
            side: OrderSide,
            price: Price,
            qty: Size,
        ) -> BoxFuture<'_, ClientResult<()>> {
            self.inner.place_limit(side, price, qty)
        }

        fn close_position(&self, side: OrderSide, qty: Size) -> BoxFuture<'_, ClientResult<()>> {
            Box::pin(async move {
                tokio::time::sleep(Duration::from_millis(400)).await;
                self.inner.close_position(side, qty).await?;
                self.closed.store(true, Ordering::SeqCst);
                Ok(())
            })
        }

        fn cancel_all(&self) -> BoxFuture<'_, ClientResult<()>> {
            self.inner.cancel_all()
        }

        fn cancel_batch(&self, order_ids: Vec<String>) -> BoxFuture<'_, ClientResult<()>> {
            self.inner.cancel_batch(order_ids)
        }

        fn cancel_one(&self, order_id: String) -> BoxFuture<'_, ClientResult<()>> {
            self.inner.cancel_one(order_id)
        }

        fn set_leverage(&self, leverage: u32) -> BoxFuture<'_, ClientResult<()>> {
            self.inner.set_leverage(leverage)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_waits_for_working_tick() {
        let closed = Arc::new(AtomicBool::new(false));
        let exchange = SlowCloseExchange {
            inner: MockExchange::new(),
            closed: closed.clone(),
        };
        exchange.inner.set_position(Some(Position {
            qty: dec!(1),
            entry_price: Price::new(dec!(100)),
        }));
        exchange.inner.set_mark_price(Some(Price::new(dec!(100))));

        let engine = Arc::new(
            TradingEngine::new(exchange, MakerConfig::default(), StdRng::seed_from_u64(7))
                .unwrap(),
        );

        // The first poll fires immediately and its flatten is still on
        // the wire when shutdown arrives 10ms later.
        poll_loop(engine, Duration::from_millis(500), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
        })
        .await;

        assert!(closed.load(Ordering::SeqCst));
    }
}
