//! Order-related types.
//!
//! Provides order side, type, time-in-force, and the configured entry
//! side vocabulary used by the quoting engine.

use crate::{Price, Size};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order side: buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Returns the opposite side.
    pub fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// Order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    /// Resting limit order (the maker quotes).
    Limit,
    /// Market order (used only for reduce-only closes).
    Market,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Limit => write!(f, "limit"),
            Self::Market => write!(f, "market"),
        }
    }
}

/// Time-in-force for orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeInForce {
    /// Good-til-cancelled (our primary TIF for resting quotes).
    #[default]
    Gtc,
    /// Immediate-or-cancel.
    Ioc,
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gtc => write!(f, "gtc"),
            Self::Ioc => write!(f, "ioc"),
        }
    }
}

/// Configured entry side for quote placement.
///
/// `Long` and `Short` quote a single leg. `Both` quotes one buy and one
/// sell leg. `Random` resolves to long or short once per placement event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrySide {
    #[default]
    Long,
    Short,
    Both,
    Random,
}

impl fmt::Display for EntrySide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long => write!(f, "long"),
            Self::Short => write!(f, "short"),
            Self::Both => write!(f, "both"),
            Self::Random => write!(f, "random"),
        }
    }
}

impl FromStr for EntrySide {
    type Err = crate::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "long" => Ok(Self::Long),
            "short" => Ok(Self::Short),
            "both" => Ok(Self::Both),
            "random" => Ok(Self::Random),
            other => Err(crate::CoreError::InvalidSide(other.to_string())),
        }
    }
}

/// An open order resting on the exchange.
///
/// The exchange owns these; the bot only observes and cancels them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenOrder {
    /// Exchange-assigned order id.
    pub id: String,
    /// Order side, when the exchange reports it.
    pub side: Option<OrderSide>,
    /// Resting price, when reported.
    pub price: Option<Price>,
    /// Resting quantity, when reported.
    pub qty: Option<Size>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_side_opposite() {
        assert_eq!(OrderSide::Buy.opposite(), OrderSide::Sell);
        assert_eq!(OrderSide::Sell.opposite(), OrderSide::Buy);
    }

    #[test]
    fn test_side_serde_lowercase() {
        assert_eq!(serde_json::to_string(&OrderSide::Buy).unwrap(), r#""buy""#);
        assert_eq!(
            serde_json::to_string(&TimeInForce::Gtc).unwrap(),
            r#""gtc""#
        );
        assert_eq!(
            serde_json::to_string(&OrderType::Market).unwrap(),
            r#""market""#
        );
    }

    #[test]
    fn test_entry_side_parse() {
        assert_eq!("long".parse::<EntrySide>().unwrap(), EntrySide::Long);
        assert_eq!(" BOTH ".parse::<EntrySide>().unwrap(), EntrySide::Both);
        assert!("sideways".parse::<EntrySide>().is_err());
    }
}
