//! Core domain types for the StandX maker bot.
//!
//! This crate provides fundamental types used throughout the trading system:
//! - `Price`, `Size`: precision-safe numeric types
//! - `OrderSide`, `OrderType`, `TimeInForce`, `EntrySide`: trading enums
//! - `Position`, `OpenOrder`: exchange state snapshots

pub mod decimal;
pub mod error;
pub mod order;
pub mod position;

pub use decimal::{Price, Size};
pub use error::{CoreError, Result};
pub use order::{EntrySide, OpenOrder, OrderSide, OrderType, TimeInForce};
pub use position::Position;
