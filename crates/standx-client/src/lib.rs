//! Typed HTTP client for the StandX perps REST API.
//!
//! Attaches bearer auth to every call and the four signature headers to
//! mutating calls. Normalizes transport failures and API-level failures
//! into distinct error variants so the trading loop can treat them
//! differently.

pub mod api;
pub mod client;
pub mod error;

pub use api::{NewOrderRequest, PositionSnapshot};
pub use client::ExchangeClient;
pub use error::{ClientError, ClientResult};
