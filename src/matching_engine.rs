//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module implements the engine that owns every order book and the order
// registry. It is the single entry point the session layer calls: submit an
// order, query an order's status, take a market-data snapshot.
//
// | Component        | Description                                                    |
// |------------------|----------------------------------------------------------------|
// | MatchingEngine   | Books keyed by symbol, order registry, id generation, events   |
// | ExecutionReport  | Outbound result of a submission                                |
// | EngineError      | Typed rejections (never a crash)                               |
//
//--------------------------------------------------------------------------------------------------
// FUNCTIONS
//--------------------------------------------------------------------------------------------------
// | Name             | Description                                 | Return Type               |
// |------------------|---------------------------------------------|---------------------------|
// | submit           | Validate, match, register a new order       | Result<ExecutionReport>   |
// | status_of        | Current state of a submitted order          | Result<Order>             |
// | snapshot         | Top-of-book market data for a symbol        | MarketDataSnapshot        |
// | handle           | Dispatch one typed inbound request          | Result<Response>          |
//--------------------------------------------------------------------------------------------------

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::events::{EngineEvent, EventBus};
use crate::market_data::{EntryType, MarketDataSnapshot};
use crate::orderbook::{LastTrade, OrderBook};
use crate::quote::{QuoteSource, SeedQuote};
use crate::request::{OrderRequest, Request, Response};
use crate::types::{Order, OrderStatus, OrderType, Side};

/// Typed rejections the engine returns to its caller.
///
/// Every variant is detected before any book or registry mutation; a failed
/// operation leaves the engine in its previous state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A non-limit order type was submitted; maps to a value-incorrect
    /// rejection at the session boundary.
    #[error("unsupported order type {0:?}, only limit orders are accepted")]
    UnsupportedOrderType(OrderType),

    /// A required numeric field could not be parsed or is out of range.
    #[error("malformed field {field}: {value:?}")]
    MalformedField { field: &'static str, value: String },

    /// Status query for an id that was never submitted.
    #[error("order with client order id {0} not found")]
    OrderNotFound(String),
}

/// The outbound result of one submission, point-in-time at return.
///
/// The session layer re-encodes this as an execution report message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionReport {
    /// Engine-assigned order id.
    pub order_id: String,
    /// Engine-assigned execution id, unique per report.
    pub exec_id: String,
    /// Caller's order id, echoed back.
    pub client_order_id: String,
    /// Account identifier, passed through unchanged when present.
    pub account: Option<String>,
    pub symbol: String,
    pub side: Side,
    pub status: OrderStatus,
    /// Original order quantity.
    pub order_qty: Decimal,
    pub leaves_qty: Decimal,
    pub cum_qty: Decimal,
    /// Volume-weighted average fill price, zero when nothing filled.
    pub avg_px: Decimal,
    pub last_px: Decimal,
    pub last_qty: Decimal,
    pub transact_time: DateTime<Utc>,
}

impl ExecutionReport {
    fn for_order(order: &Order, exec_id: String) -> Self {
        Self {
            order_id: order.order_id.clone(),
            exec_id,
            client_order_id: order.client_order_id.clone(),
            account: order.account.clone(),
            symbol: order.symbol.clone(),
            side: order.side,
            status: order.status(),
            order_qty: order.quantity,
            leaves_qty: order.leaves_qty,
            cum_qty: order.cum_qty,
            avg_px: order.avg_px(),
            last_px: order.last_px,
            last_qty: order.last_qty,
            transact_time: Utc::now(),
        }
    }
}

/// The matching engine: one order book per symbol, one registry of every
/// order ever submitted, and the id counters.
///
/// All mutation goes through this type. Each book sits behind its own mutex,
/// held for the full duration of a submit or snapshot on that symbol, so
/// operations on different symbols never block each other and no lock ever
/// spans two books.
pub struct MatchingEngine {
    books: RwLock<HashMap<String, Arc<Mutex<OrderBook>>>>,
    orders: RwLock<HashMap<String, Order>>,
    next_order_id: AtomicU64,
    next_exec_id: AtomicU64,
    quotes: Arc<dyn QuoteSource>,
    events: EventBus,
}

impl MatchingEngine {
    /// Creates an engine with a default event bus.
    pub fn new(quotes: Arc<dyn QuoteSource>) -> Self {
        Self::with_event_bus(quotes, EventBus::default())
    }

    /// Creates an engine publishing on the given event bus.
    pub fn with_event_bus(quotes: Arc<dyn QuoteSource>, events: EventBus) -> Self {
        Self {
            books: RwLock::new(HashMap::new()),
            orders: RwLock::new(HashMap::new()),
            next_order_id: AtomicU64::new(1),
            next_exec_id: AtomicU64::new(1),
            quotes,
            events,
        }
    }

    /// The event bus this engine publishes on.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Creates and seeds the books for the given symbols up front, so the
    /// first inbound request for a configured instrument pays no seeding
    /// latency.
    pub fn warm_up(&self, symbols: &[String]) {
        for symbol in symbols {
            let _ = self.book(symbol);
        }
    }

    /// Submits a new order: validate, match against the book, register.
    ///
    /// Runs the price-time priority matching loop against the opposite side;
    /// any unfilled remainder rests in the book. The order is registered
    /// under its client order id before the report is returned, so a status
    /// query issued right after sees it.
    ///
    /// # Arguments
    /// * `request` - The decoded order fields; quantity and price are parsed
    ///   here so malformed values are rejected before any mutation
    ///
    /// # Returns
    /// The execution report for the aggressor's state at return time.
    pub fn submit(&self, request: OrderRequest) -> Result<ExecutionReport, EngineError> {
        let (quantity, limit_price) = match validate(&request) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(
                    client_order_id = %request.client_order_id,
                    symbol = %request.symbol,
                    error = %err,
                    "order rejected"
                );
                self.events.publish(EngineEvent::OrderRejected {
                    client_order_id: request.client_order_id,
                    symbol: request.symbol,
                    reason: err.to_string(),
                });
                return Err(err);
            }
        };

        let mut order = Order::new(
            request.client_order_id,
            self.next_order_id(),
            request.account,
            request.symbol,
            request.side,
            request.order_type,
            limit_price,
            quantity,
        );

        let book = self.book(&order.symbol);
        let result = {
            let mut book = book.lock();
            let result = book.execute(&mut order);

            // Registry update happens under the book lock so a concurrent
            // submit on the same symbol cannot interleave stale maker state.
            let mut orders = self.orders.write();
            for maker in &result.affected_orders {
                orders.insert(maker.client_order_id.clone(), maker.clone());
            }
            orders.insert(order.client_order_id.clone(), order.clone());
            result
        };

        for trade in &result.trades {
            debug!(
                symbol = %trade.symbol,
                price = %trade.price,
                quantity = %trade.quantity,
                maker = %trade.maker_client_order_id,
                taker = %trade.taker_client_order_id,
                "trade executed"
            );
            self.events.publish(EngineEvent::TradeExecuted {
                trade: trade.clone(),
            });
        }

        let report = ExecutionReport::for_order(&order, self.next_exec_id());
        info!(
            client_order_id = %report.client_order_id,
            order_id = %report.order_id,
            symbol = %report.symbol,
            status = ?report.status,
            cum_qty = %report.cum_qty,
            leaves_qty = %report.leaves_qty,
            "order processed"
        );
        self.events.publish(EngineEvent::OrderAccepted {
            report: report.clone(),
        });
        Ok(report)
    }

    /// Returns the current state of a previously submitted order, unmodified.
    ///
    /// Fills applied to the order while it rested in a book are visible here.
    pub fn status_of(&self, client_order_id: &str) -> Result<Order, EngineError> {
        self.orders
            .read()
            .get(client_order_id)
            .cloned()
            .ok_or_else(|| EngineError::OrderNotFound(client_order_id.to_string()))
    }

    /// Serves a top-of-book snapshot for a symbol.
    ///
    /// The book is created and seeded on first reference; a failing quote
    /// source degrades to zero-valued levels rather than failing the request.
    pub fn snapshot(&self, symbol: &str, entry_types: &[EntryType]) -> MarketDataSnapshot {
        let book = self.book(symbol);
        let book = book.lock();
        debug!(symbol, entries = entry_types.len(), "serving market data snapshot");
        MarketDataSnapshot::from_book(&book, entry_types)
    }

    /// Dispatches one typed inbound request.
    pub fn handle(&self, request: Request) -> Result<Response, EngineError> {
        match request {
            Request::Submit(order) => self.submit(order).map(Response::Execution),
            Request::Status(status) => self
                .status_of(&status.client_order_id)
                .map(Response::Status),
            Request::Snapshot(md) => Ok(Response::Snapshot(
                self.snapshot(&md.symbol, &md.entry_types),
            )),
        }
    }

    /// Resolves the book for a symbol, creating and seeding it on first use.
    fn book(&self, symbol: &str) -> Arc<Mutex<OrderBook>> {
        if let Some(book) = self.books.read().get(symbol) {
            return Arc::clone(book);
        }

        // Build the seeded book before taking the write lock: a slow quote
        // source must not stall requests for unrelated symbols.
        let seeded = self.build_seeded_book(symbol);
        let mut books = self.books.write();
        Arc::clone(
            books
                .entry(symbol.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(seeded))),
        )
    }

    fn build_seeded_book(&self, symbol: &str) -> OrderBook {
        let quote = match self.quotes.quote(symbol) {
            Ok(quote) => quote,
            Err(err) => {
                warn!(symbol, error = %err, "quote source unavailable, seeding empty book");
                SeedQuote::zero()
            }
        };

        let bid = (quote.bid_price > Decimal::ZERO && quote.bid_size > Decimal::ZERO).then(|| {
            Order::new(
                format!("SEED-{symbol}-BID"),
                self.next_order_id(),
                None,
                symbol,
                Side::Buy,
                OrderType::Limit,
                quote.bid_price,
                quote.bid_size,
            )
        });
        let ask = (quote.ask_price > Decimal::ZERO && quote.ask_size > Decimal::ZERO).then(|| {
            Order::new(
                format!("SEED-{symbol}-ASK"),
                self.next_order_id(),
                None,
                symbol,
                Side::Sell,
                OrderType::Limit,
                quote.ask_price,
                quote.ask_size,
            )
        });

        let mut book = OrderBook::new(symbol);
        book.seed(
            bid,
            ask,
            LastTrade {
                price: quote.trade_price,
                quantity: quote.trade_size,
            },
        );

        info!(symbol, "order book created and seeded");
        self.events.publish(EngineEvent::BookSeeded {
            symbol: symbol.to_string(),
            quote,
        });
        book
    }

    fn next_order_id(&self) -> String {
        self.next_order_id.fetch_add(1, Ordering::SeqCst).to_string()
    }

    fn next_exec_id(&self) -> String {
        self.next_exec_id.fetch_add(1, Ordering::SeqCst).to_string()
    }
}

fn validate(request: &OrderRequest) -> Result<(Decimal, Decimal), EngineError> {
    if request.order_type != OrderType::Limit {
        return Err(EngineError::UnsupportedOrderType(request.order_type));
    }

    let quantity = parse_field("OrderQty", &request.quantity)?;
    if quantity <= Decimal::ZERO {
        return Err(EngineError::MalformedField {
            field: "OrderQty",
            value: request.quantity.clone(),
        });
    }

    let limit_price = parse_field("Price", &request.limit_price)?;
    if limit_price < Decimal::ZERO {
        return Err(EngineError::MalformedField {
            field: "Price",
            value: request.limit_price.clone(),
        });
    }

    Ok((quantity, limit_price))
}

fn parse_field(field: &'static str, value: &str) -> Result<Decimal, EngineError> {
    Decimal::from_str(value.trim()).map_err(|_| EngineError::MalformedField {
        field,
        value: value.to_string(),
    })
}
