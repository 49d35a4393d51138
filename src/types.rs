//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module defines the core data types used throughout the matching engine:
// orders with their fill-progress state, trades, and the side/type/status enums.
//
// | Section            | Description                                                      |
// |--------------------|------------------------------------------------------------------|
// | ENUMS              | Discrete value sets (Side, OrderType, OrderStatus).              |
// | STRUCTS            | Order and Trade.                                                 |
// | TESTS              | Unit tests for fill accounting and status derivation.            |
//--------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents the side of an order (Buy or Sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// A buy order; rests on the bid side of the book.
    Buy,
    /// A sell order; rests on the ask side of the book.
    Sell,
}

impl Side {
    /// Returns the opposite side, i.e. the side an incoming order matches against.
    pub fn contra(&self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Represents the type of an order as decoded from the session layer.
///
/// The engine executes `Limit` orders only; the other variants exist so a
/// rejection can name exactly what was submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    /// An order that executes at a specific price or better.
    Limit,
    /// An order that executes immediately at the best available price.
    Market,
    /// A conditional order triggered at a stop price.
    Stop,
    /// A conditional order that becomes a limit order at its trigger price.
    StopLimit,
}

/// Represents the lifecycle status of an order.
///
/// Status is derived from fill quantities (see [`Order::status`]) rather than
/// stored, so it can never disagree with the quantity fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Accepted, nothing filled yet.
    New,
    /// Some quantity filled, some still open.
    PartiallyFilled,
    /// Completely filled; terminal.
    Filled,
}

/// A client order and its fill progress.
///
/// Created on submission, mutated in place by every match it participates in
/// (as aggressor or as a resting counter-order) and retained in the engine's
/// registry for later status queries. Once filled it is never mutated again.
///
/// Invariant: `leaves_qty + cum_qty == quantity` after every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Caller-assigned identifier, unique across the engine.
    pub client_order_id: String,
    /// Engine-assigned identifier (decimal string, monotonically increasing).
    pub order_id: String,
    /// Account identifier passed through unchanged from the inbound request.
    pub account: Option<String>,
    /// Instrument symbol this order trades.
    pub symbol: String,
    /// Side of the order.
    pub side: Side,
    /// Type of the order. Only `Limit` reaches the book.
    pub order_type: OrderType,
    /// Limit price.
    pub limit_price: Decimal,
    /// Original order quantity.
    pub quantity: Decimal,
    /// Remaining open quantity.
    pub leaves_qty: Decimal,
    /// Quantity filled so far.
    pub cum_qty: Decimal,
    /// Total matched value (sum of price * qty over all fills); drives the
    /// volume-weighted average price.
    pub filled_notional: Decimal,
    /// Price of the most recent fill, zero if never filled.
    pub last_px: Decimal,
    /// Quantity of the most recent fill, zero if never filled.
    pub last_qty: Decimal,
    /// Timestamp of order creation.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last fill applied to this order.
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Creates a new order with no fills.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        client_order_id: impl Into<String>,
        order_id: impl Into<String>,
        account: Option<String>,
        symbol: impl Into<String>,
        side: Side,
        order_type: OrderType,
        limit_price: Decimal,
        quantity: Decimal,
    ) -> Self {
        let now = Utc::now();
        Self {
            client_order_id: client_order_id.into(),
            order_id: order_id.into(),
            account,
            symbol: symbol.into(),
            side,
            order_type,
            limit_price,
            quantity,
            leaves_qty: quantity,
            cum_qty: Decimal::ZERO,
            filled_notional: Decimal::ZERO,
            last_px: Decimal::ZERO,
            last_qty: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies one fill to this order.
    ///
    /// The same call is made for the aggressor and for the resting
    /// counter-order of a match, so both sides account the fill identically.
    ///
    /// # Arguments
    /// * `px` - Trade price (the resting order's price)
    /// * `qty` - Trade quantity
    pub fn apply_fill(&mut self, px: Decimal, qty: Decimal) {
        self.leaves_qty -= qty;
        self.cum_qty += qty;
        self.filled_notional += px * qty;
        self.last_px = px;
        self.last_qty = qty;
        self.updated_at = Utc::now();
    }

    /// Volume-weighted average price over all fills, zero when nothing filled.
    pub fn avg_px(&self) -> Decimal {
        if self.cum_qty.is_zero() {
            Decimal::ZERO
        } else {
            self.filled_notional / self.cum_qty
        }
    }

    /// Derives the order status from the fill quantities.
    pub fn status(&self) -> OrderStatus {
        if self.cum_qty.is_zero() {
            OrderStatus::New
        } else if self.cum_qty == self.quantity {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        }
    }

    /// Returns true once the order has no open quantity left.
    pub fn is_filled(&self) -> bool {
        self.leaves_qty.is_zero()
    }
}

/// A completed trade between a resting order (maker) and an aggressor (taker).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Unique identifier for the trade.
    pub id: Uuid,
    /// Instrument symbol.
    pub symbol: String,
    /// Price at which the trade occurred (always the maker's price).
    pub price: Decimal,
    /// Quantity traded.
    pub quantity: Decimal,
    /// Client order id of the resting order.
    pub maker_client_order_id: String,
    /// Client order id of the aggressor.
    pub taker_client_order_id: String,
    /// Timestamp when the trade occurred.
    pub executed_at: DateTime<Utc>,
}

impl Trade {
    /// Creates a trade record for one match.
    pub fn new(
        symbol: impl Into<String>,
        price: Decimal,
        quantity: Decimal,
        maker_client_order_id: impl Into<String>,
        taker_client_order_id: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol: symbol.into(),
            price,
            quantity,
            maker_client_order_id: maker_client_order_id.into(),
            taker_client_order_id: taker_client_order_id.into(),
            executed_at: Utc::now(),
        }
    }
}
