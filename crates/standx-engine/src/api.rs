//! Exchange API trait for the trading engine.
//!
//! Abstracts the REST client behind a trait so the tick loop can be
//! driven against a mock in tests and against [`ExchangeClient`] in
//! production.

use std::pin::Pin;

use standx_client::{ClientError, ClientResult, ExchangeClient, NewOrderRequest};
use standx_core::{OpenOrder, OrderSide, Position, Price, Size};

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Exchange operations the trading loop depends on.
pub trait ExchangeApi: Send + Sync {
    /// Current net position, if any.
    fn position(&self) -> BoxFuture<'_, ClientResult<Option<Position>>>;

    /// Current mark price, if the exchange reports one.
    fn mark_price(&self) -> BoxFuture<'_, ClientResult<Option<Price>>>;

    /// Open orders for the configured instrument.
    fn open_orders(&self) -> BoxFuture<'_, ClientResult<Vec<OpenOrder>>>;

    /// Place a post-only style GTC limit order.
    fn place_limit(&self, side: OrderSide, price: Price, qty: Size)
        -> BoxFuture<'_, ClientResult<()>>;

    /// Close a position with a reduce-only IOC market order.
    fn close_position(&self, side: OrderSide, qty: Size) -> BoxFuture<'_, ClientResult<()>>;

    /// Cancel every open order on the instrument.
    fn cancel_all(&self) -> BoxFuture<'_, ClientResult<()>>;

    /// Cancel a batch of orders by id.
    fn cancel_batch(&self, order_ids: Vec<String>) -> BoxFuture<'_, ClientResult<()>>;

    /// Cancel a single order by id.
    fn cancel_one(&self, order_id: String) -> BoxFuture<'_, ClientResult<()>>;

    /// Set account leverage for the instrument.
    fn set_leverage(&self, leverage: u32) -> BoxFuture<'_, ClientResult<()>>;
}

impl ExchangeApi for ExchangeClient {
    fn position(&self) -> BoxFuture<'_, ClientResult<Option<Position>>> {
        Box::pin(async move { Ok(self.position_snapshot().await?.position) })
    }

    fn mark_price(&self) -> BoxFuture<'_, ClientResult<Option<Price>>> {
        Box::pin(async move { Ok(self.position_snapshot().await?.mark_price) })
    }

    fn open_orders(&self) -> BoxFuture<'_, ClientResult<Vec<OpenOrder>>> {
        Box::pin(ExchangeClient::open_orders(self))
    }

    fn place_limit(
        &self,
        side: OrderSide,
        price: Price,
        qty: Size,
    ) -> BoxFuture<'_, ClientResult<()>> {
        let request = NewOrderRequest::limit(self.symbol(), side, price, qty);
        Box::pin(async move { self.place_order(&request).await })
    }

    fn close_position(&self, side: OrderSide, qty: Size) -> BoxFuture<'_, ClientResult<()>> {
        let request = NewOrderRequest::market_close(self.symbol(), side, qty);
        Box::pin(async move { self.place_order(&request).await })
    }

    fn cancel_all(&self) -> BoxFuture<'_, ClientResult<()>> {
        Box::pin(self.cancel_all_orders())
    }

    fn cancel_batch(&self, order_ids: Vec<String>) -> BoxFuture<'_, ClientResult<()>> {
        Box::pin(async move { self.cancel_orders(&order_ids).await })
    }

    fn cancel_one(&self, order_id: String) -> BoxFuture<'_, ClientResult<()>> {
        Box::pin(async move { self.cancel_order(&order_id).await })
    }

    fn set_leverage(&self, leverage: u32) -> BoxFuture<'_, ClientResult<()>> {
        Box::pin(self.change_leverage(leverage))
    }
}

/// Mutating call recorded by [`MockExchange`].
#[derive(Debug, Clone, PartialEq)]
pub enum ExchangeCall {
    PlaceLimit {
        side: OrderSide,
        price: Price,
        qty: Size,
    },
    ClosePosition {
        side: OrderSide,
        qty: Size,
    },
    CancelAll,
    CancelBatch(Vec<String>),
    CancelOne(String),
    SetLeverage(u32),
}

/// Mock exchange for testing the tick loop.
///
/// Reads return scripted values; mutating calls are recorded for
/// verification. Individual operations can be made to fail.
#[derive(Debug, Default)]
pub struct MockExchange {
    position: parking_lot::Mutex<Option<Position>>,
    mark_price: parking_lot::Mutex<Option<Price>>,
    orders: parking_lot::Mutex<Vec<OpenOrder>>,
    fail_reads: std::sync::atomic::AtomicBool,
    fail_place: std::sync::atomic::AtomicBool,
    fail_close: std::sync::atomic::AtomicBool,
    fail_cancel_batch: std::sync::atomic::AtomicBool,
    fail_cancel_one: std::sync::atomic::AtomicBool,
    calls: parking_lot::Mutex<Vec<ExchangeCall>>,
}

impl MockExchange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_position(&self, position: Option<Position>) {
        *self.position.lock() = position;
    }

    pub fn set_mark_price(&self, price: Option<Price>) {
        *self.mark_price.lock() = price;
    }

    pub fn set_orders(&self, orders: Vec<OpenOrder>) {
        *self.orders.lock() = orders;
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads
            .store(fail, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn fail_place(&self, fail: bool) {
        self.fail_place
            .store(fail, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn fail_close(&self, fail: bool) {
        self.fail_close
            .store(fail, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn fail_cancel_batch(&self, fail: bool) {
        self.fail_cancel_batch
            .store(fail, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn fail_cancel_one(&self, fail: bool) {
        self.fail_cancel_one
            .store(fail, std::sync::atomic::Ordering::SeqCst);
    }

    /// Recorded mutating calls, in order.
    pub fn calls(&self) -> Vec<ExchangeCall> {
        self.calls.lock().clone()
    }

    fn failing(flag: &std::sync::atomic::AtomicBool) -> bool {
        flag.load(std::sync::atomic::Ordering::SeqCst)
    }

    fn mock_error() -> ClientError {
        ClientError::Api {
            code: 500,
            message: "mock failure".to_string(),
        }
    }
}

impl ExchangeApi for MockExchange {
    fn position(&self) -> BoxFuture<'_, ClientResult<Option<Position>>> {
        Box::pin(async move {
            if Self::failing(&self.fail_reads) {
                return Err(Self::mock_error());
            }
            Ok(*self.position.lock())
        })
    }

    fn mark_price(&self) -> BoxFuture<'_, ClientResult<Option<Price>>> {
        Box::pin(async move {
            if Self::failing(&self.fail_reads) {
                return Err(Self::mock_error());
            }
            Ok(*self.mark_price.lock())
        })
    }

    fn open_orders(&self) -> BoxFuture<'_, ClientResult<Vec<OpenOrder>>> {
        Box::pin(async move {
            if Self::failing(&self.fail_reads) {
                return Err(Self::mock_error());
            }
            Ok(self.orders.lock().clone())
        })
    }

    fn place_limit(
        &self,
        side: OrderSide,
        price: Price,
        qty: Size,
    ) -> BoxFuture<'_, ClientResult<()>> {
        Box::pin(async move {
            self.calls
                .lock()
                .push(ExchangeCall::PlaceLimit { side, price, qty });
            if Self::failing(&self.fail_place) {
                return Err(Self::mock_error());
            }
            Ok(())
        })
    }

    fn close_position(&self, side: OrderSide, qty: Size) -> BoxFuture<'_, ClientResult<()>> {
        Box::pin(async move {
            self.calls
                .lock()
                .push(ExchangeCall::ClosePosition { side, qty });
            if Self::failing(&self.fail_close) {
                return Err(Self::mock_error());
            }
            Ok(())
        })
    }

    fn cancel_all(&self) -> BoxFuture<'_, ClientResult<()>> {
        Box::pin(async move {
            self.calls.lock().push(ExchangeCall::CancelAll);
            Ok(())
        })
    }

    fn cancel_batch(&self, order_ids: Vec<String>) -> BoxFuture<'_, ClientResult<()>> {
        Box::pin(async move {
            self.calls.lock().push(ExchangeCall::CancelBatch(order_ids));
            if Self::failing(&self.fail_cancel_batch) {
                return Err(Self::mock_error());
            }
            Ok(())
        })
    }

    fn cancel_one(&self, order_id: String) -> BoxFuture<'_, ClientResult<()>> {
        Box::pin(async move {
            self.calls.lock().push(ExchangeCall::CancelOne(order_id));
            if Self::failing(&self.fail_cancel_one) {
                return Err(Self::mock_error());
            }
            Ok(())
        })
    }

    fn set_leverage(&self, leverage: u32) -> BoxFuture<'_, ClientResult<()>> {
        Box::pin(async move {
            self.calls.lock().push(ExchangeCall::SetLeverage(leverage));
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn mock_records_mutating_calls() {
        let exchange = MockExchange::new();
        exchange
            .place_limit(OrderSide::Buy, Price::new(dec!(100)), Size::new(dec!(1)))
            .await
            .unwrap();
        exchange.cancel_all().await.unwrap();

        let calls = exchange.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1], ExchangeCall::CancelAll);
    }

    #[tokio::test]
    async fn mock_returns_scripted_reads() {
        let exchange = MockExchange::new();
        exchange.set_mark_price(Some(Price::new(dec!(50000))));

        assert_eq!(
            exchange.mark_price().await.unwrap(),
            Some(Price::new(dec!(50000)))
        );
        assert_eq!(exchange.position().await.unwrap(), None);
    }

    #[tokio::test]
    async fn mock_read_failures_are_scriptable() {
        let exchange = MockExchange::new();
        exchange.fail_reads(true);

        assert!(exchange.open_orders().await.is_err());
    }
}
