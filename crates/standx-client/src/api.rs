//! Typed endpoint wrappers and wire types.
//!
//! Response parsing is tolerant of the API's two list shapes
//! (`{"result": [...]}` and a bare array) and of numeric fields arriving
//! as either JSON strings or numbers.

use crate::client::ExchangeClient;
use crate::error::ClientResult;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use standx_core::{OpenOrder, OrderSide, OrderType, Position, Price, Size, TimeInForce};
use tracing::debug;

/// New order submission body.
#[derive(Debug, Clone, Serialize)]
pub struct NewOrderRequest {
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    pub qty: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_in_force: Option<TimeInForce>,
    pub reduce_only: bool,
}

impl NewOrderRequest {
    /// Resting GTC maker quote.
    pub fn limit(symbol: &str, side: OrderSide, price: Price, qty: Size) -> Self {
        Self {
            symbol: symbol.to_string(),
            side,
            order_type: OrderType::Limit,
            price: Some(price.to_wire()),
            qty: qty.to_wire(),
            time_in_force: Some(TimeInForce::Gtc),
            reduce_only: false,
        }
    }

    /// Reduce-only market order closing a position in full.
    pub fn market_close(symbol: &str, side: OrderSide, qty: Size) -> Self {
        Self {
            symbol: symbol.to_string(),
            side,
            order_type: OrderType::Market,
            price: None,
            qty: qty.to_wire(),
            time_in_force: None,
            reduce_only: true,
        }
    }
}

#[derive(Debug, Serialize)]
struct SymbolBody<'a> {
    symbol: &'a str,
}

#[derive(Debug, Serialize)]
struct CancelBatchBody<'a> {
    symbol: &'a str,
    order_id_list: &'a [String],
}

#[derive(Debug, Serialize)]
struct CancelSingleBody<'a> {
    symbol: &'a str,
    order_id: &'a str,
}

#[derive(Debug, Serialize)]
struct LeverageBody<'a> {
    symbol: &'a str,
    leverage: u32,
}

/// One read of the positions endpoint: open position (if any) plus the
/// instrument mark price, which the same route reports.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionSnapshot {
    pub position: Option<Position>,
    pub mark_price: Option<Price>,
}

impl ExchangeClient {
    /// `GET /api/query_positions` — position and mark price.
    pub async fn position_snapshot(&self) -> ClientResult<PositionSnapshot> {
        let path = format!("/api/query_positions?symbol={}", self.symbol());
        let body = self.get(&path).await?;
        Ok(parse_position_snapshot(&body))
    }

    /// `GET /api/query_open_orders` — resting orders for the instrument.
    pub async fn open_orders(&self) -> ClientResult<Vec<OpenOrder>> {
        let path = format!("/api/query_open_orders?symbol={}", self.symbol());
        let body = self.get(&path).await?;
        Ok(parse_open_orders(&body))
    }

    /// `POST /api/new_order`.
    pub async fn place_order(&self, request: &NewOrderRequest) -> ClientResult<()> {
        debug!(side = %request.side, order_type = %request.order_type, qty = %request.qty, "Submitting order");
        self.post("/api/new_order", request).await?;
        Ok(())
    }

    /// `POST /api/cancel_all_orders`. Idempotent: a 404 from an empty
    /// order book is success.
    pub async fn cancel_all_orders(&self) -> ClientResult<()> {
        let body = SymbolBody {
            symbol: self.symbol(),
        };
        self.post("/api/cancel_all_orders", &body).await?;
        Ok(())
    }

    /// `POST /api/cancel_orders` — batch cancel by id.
    pub async fn cancel_orders(&self, order_ids: &[String]) -> ClientResult<()> {
        let body = CancelBatchBody {
            symbol: self.symbol(),
            order_id_list: order_ids,
        };
        self.post("/api/cancel_orders", &body).await?;
        Ok(())
    }

    /// `POST /api/cancel_order` — single cancel by id.
    pub async fn cancel_order(&self, order_id: &str) -> ClientResult<()> {
        let body = CancelSingleBody {
            symbol: self.symbol(),
            order_id,
        };
        self.post("/api/cancel_order", &body).await?;
        Ok(())
    }

    /// `POST /api/change_leverage`.
    pub async fn change_leverage(&self, leverage: u32) -> ClientResult<()> {
        let body = LeverageBody {
            symbol: self.symbol(),
            leverage,
        };
        self.post("/api/change_leverage", &body).await?;
        Ok(())
    }
}

/// Decimal from a JSON string or number field.
fn value_to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.to_string().parse().ok(),
        _ => None,
    }
}

fn parse_position_snapshot(body: &Value) -> PositionSnapshot {
    // Array-or-object: some deployments wrap the single position in a list.
    let entry = match body {
        Value::Array(items) => items.first(),
        other => Some(other),
    };

    let Some(entry) = entry else {
        return PositionSnapshot {
            position: None,
            mark_price: None,
        };
    };

    let field = |name: &str| entry.get(name).and_then(value_to_decimal);

    let qty = field("qty").unwrap_or(Decimal::ZERO);
    let entry_price = field("entry_price").unwrap_or(Decimal::ZERO);
    let mark_price = field("mark_price")
        .filter(|p| !p.is_zero())
        .map(Price::new);

    PositionSnapshot {
        position: Position::from_raw(qty, entry_price),
        mark_price,
    }
}

fn parse_open_orders(body: &Value) -> Vec<OpenOrder> {
    let list = match body {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => match map.get("result") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        },
        _ => &[],
    };

    list.iter().filter_map(parse_open_order).collect()
}

fn parse_open_order(entry: &Value) -> Option<OpenOrder> {
    let id = entry
        .get("order_id")
        .or_else(|| entry.get("id"))
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })?;

    let side = entry
        .get("side")
        .and_then(Value::as_str)
        .and_then(|s| match s {
            "buy" => Some(OrderSide::Buy),
            "sell" => Some(OrderSide::Sell),
            _ => None,
        });

    Some(OpenOrder {
        id,
        side,
        price: entry.get("price").and_then(value_to_decimal).map(Price::new),
        qty: entry.get("qty").and_then(value_to_decimal).map(Size::new),
    })
}
