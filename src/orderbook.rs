//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module implements the limit order book for a single symbol.
// It maintains bid and ask orders in price-time priority (FIFO within a price)
// and runs the matching loop for incoming orders.
//
// | Component     | Description                                                               |
// |---------------|---------------------------------------------------------------------------|
// | PriceLevel    | FIFO queue of resting orders sharing one price                            |
// | BookSide      | Price-ordered collection of levels for one side (bids or asks)            |
// | LastTrade     | Price/quantity of the most recent trade on the book                       |
// | MatchResult   | Trades and affected resting orders produced by one execution              |
// | OrderBook     | Both sides plus last-trade; owns matching and seeding                     |
//
//--------------------------------------------------------------------------------------------------
// FUNCTIONS
//--------------------------------------------------------------------------------------------------
// | Name                  | Description                                | Return Type             |
// |-----------------------|--------------------------------------------|------------------------|
// | BookSide::insert      | Adds a resting order in price-time order   | ()                     |
// | BookSide::best_price  | Best price on this side                    | Option<Decimal>        |
// | BookSide::best_entry  | Best price and its total volume            | Option<(Dec, Dec)>     |
// | OrderBook::execute    | Matches an incoming order against the book | MatchResult            |
// | OrderBook::seed       | Installs synthetic starting levels         | ()                     |
//--------------------------------------------------------------------------------------------------

use std::collections::{BTreeMap, VecDeque};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Order, Side, Trade};

/// A price level: one price and a time-ordered queue of resting orders.
///
/// All orders in the queue share the level's price; queue order is strict
/// arrival order.
#[derive(Debug, Clone)]
pub struct PriceLevel {
    /// The price for this level.
    pub price: Decimal,
    /// FIFO queue of resting orders at this price.
    orders: VecDeque<Order>,
    /// Cached sum of the open quantity of all orders at this level.
    total_volume: Decimal,
}

impl PriceLevel {
    fn new(price: Decimal) -> Self {
        Self {
            price,
            orders: VecDeque::new(),
            total_volume: Decimal::ZERO,
        }
    }

    fn push_back(&mut self, order: Order) {
        self.total_volume += order.leaves_qty;
        self.orders.push_back(order);
    }

    fn front_mut(&mut self) -> Option<&mut Order> {
        self.orders.front_mut()
    }

    fn pop_front(&mut self) -> Option<Order> {
        self.orders.pop_front()
    }

    fn reduce_volume(&mut self, qty: Decimal) {
        self.total_volume -= qty;
    }

    /// Returns the next order to be matched without removing it.
    pub fn peek_next_order(&self) -> Option<&Order> {
        self.orders.front()
    }

    /// Returns true if this level has no orders.
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Returns the number of orders at this level.
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Total open quantity across all orders at this level.
    pub fn total_volume(&self) -> Decimal {
        self.total_volume
    }
}

/// One side of the book: price levels ordered under the side's priority rule.
///
/// The bid side's best price is its highest, the ask side's best its lowest.
/// An order with zero remaining quantity is never stored.
#[derive(Debug, Clone)]
pub struct BookSide {
    side: Side,
    levels: BTreeMap<Decimal, PriceLevel>,
}

impl BookSide {
    fn new(side: Side) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
        }
    }

    /// Returns the best price on this side, if any.
    ///
    /// Bids (buy orders) are best-high, asks (sell orders) best-low.
    pub fn best_price(&self) -> Option<Decimal> {
        match self.side {
            Side::Buy => self.levels.keys().next_back().copied(),
            Side::Sell => self.levels.keys().next().copied(),
        }
    }

    /// Returns the best price together with the total volume resting there.
    pub fn best_entry(&self) -> Option<(Decimal, Decimal)> {
        self.best_price().and_then(|price| {
            self.levels
                .get(&price)
                .map(|level| (price, level.total_volume()))
        })
    }

    /// Returns true when this side has no resting orders.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Returns the level at the given price, if present.
    pub fn level(&self, price: &Decimal) -> Option<&PriceLevel> {
        self.levels.get(price)
    }

    /// Number of price levels on this side.
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// All prices on this side, ordered from best to worst.
    pub fn prices(&self) -> Vec<Decimal> {
        let mut prices: Vec<Decimal> = self.levels.keys().copied().collect();
        if self.side == Side::Buy {
            prices.reverse();
        }
        prices
    }

    /// Appends a resting order at the tail of its price's queue, creating the
    /// level in sorted position if none exists. Orders with nothing left open
    /// are ignored; the book never holds a zero-quantity order.
    pub fn insert(&mut self, order: Order) {
        if order.leaves_qty.is_zero() {
            return;
        }
        self.levels
            .entry(order.limit_price)
            .or_insert_with(|| PriceLevel::new(order.limit_price))
            .push_back(order);
    }

    /// Returns true when the best price on this side is marketable against an
    /// aggressor limit on the opposite side: an ask side crosses a buy limit
    /// when `best_ask <= limit`, a bid side crosses a sell limit when
    /// `best_bid >= limit`.
    pub fn marketable_against(&self, limit: Decimal) -> bool {
        match self.best_price() {
            Some(best) => match self.side {
                Side::Sell => best <= limit,
                Side::Buy => best >= limit,
            },
            None => false,
        }
    }

    fn level_mut(&mut self, price: &Decimal) -> Option<&mut PriceLevel> {
        self.levels.get_mut(price)
    }

    fn drop_level_if_empty(&mut self, price: &Decimal) {
        if self.levels.get(price).is_some_and(|level| level.is_empty()) {
            self.levels.remove(price);
        }
    }
}

/// Price and quantity of the most recent trade on a book.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LastTrade {
    pub price: Decimal,
    pub quantity: Decimal,
}

/// The outcome of executing one incoming order against the book.
#[derive(Debug, Clone, Default)]
pub struct MatchResult {
    /// Trades generated, in execution order.
    pub trades: Vec<Trade>,
    /// Point-in-time snapshots of every resting order this execution filled,
    /// taken after the fill was applied. Used to keep the engine's order
    /// registry in sync with the book.
    pub affected_orders: Vec<Order>,
}

/// The order book for one symbol: both sides plus the last-trade record.
///
/// A crossed state (best bid >= best ask) exists only transiently inside
/// [`OrderBook::execute`]; after every operation either the sides do not
/// cross or one of them is empty.
#[derive(Debug, Clone)]
pub struct OrderBook {
    symbol: String,
    bids: BookSide,
    asks: BookSide,
    last_trade: LastTrade,
}

impl OrderBook {
    /// Creates an empty book for a symbol.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bids: BookSide::new(Side::Buy),
            asks: BookSide::new(Side::Sell),
            last_trade: LastTrade::default(),
        }
    }

    /// The symbol this book trades.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// The bid side (buy orders, best-high).
    pub fn bids(&self) -> &BookSide {
        &self.bids
    }

    /// The ask side (sell orders, best-low).
    pub fn asks(&self) -> &BookSide {
        &self.asks
    }

    /// Price/quantity of the most recent trade (the seed value until a trade
    /// occurs, zero on an unseeded book).
    pub fn last_trade(&self) -> LastTrade {
        self.last_trade
    }

    /// Best bid price, if the bid side is non-empty.
    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.best_price()
    }

    /// Best ask price, if the ask side is non-empty.
    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.best_price()
    }

    /// Installs synthetic starting state for a freshly created book: at most
    /// one resting order per side plus the initial last-trade record.
    ///
    /// `BookSide::insert` drops zero-quantity orders, so a degraded
    /// (all-zero) seed leaves the book empty rather than planting orders the
    /// matching loop could never consume.
    pub fn seed(&mut self, bid: Option<Order>, ask: Option<Order>, last_trade: LastTrade) {
        if let Some(order) = bid {
            self.bids.insert(order);
        }
        if let Some(order) = ask {
            self.asks.insert(order);
        }
        self.last_trade = last_trade;
    }

    /// Matches an incoming order against the book under price-time priority.
    ///
    /// While the order has open quantity and the opposite side's best price is
    /// marketable against its limit, it fills against the oldest order at the
    /// best contra price. The trade price is always the resting order's price,
    /// so the aggressor receives any price improvement. Fills are applied
    /// symmetrically to both orders, the book's last-trade is updated per
    /// fill, and exhausted resting orders are dequeued (their level dropped
    /// when empty). Any unfilled remainder is inserted at the tail of the
    /// aggressor's own side at its limit price.
    ///
    /// # Arguments
    /// * `taker` - The incoming order; its fill state is mutated in place
    ///
    /// # Returns
    /// The trades generated plus snapshots of every resting order touched.
    pub fn execute(&mut self, taker: &mut Order) -> MatchResult {
        let mut result = MatchResult::default();

        while !taker.leaves_qty.is_zero() {
            let contra = match taker.side {
                Side::Buy => &mut self.asks,
                Side::Sell => &mut self.bids,
            };

            if !contra.marketable_against(taker.limit_price) {
                break;
            }
            let best_price = match contra.best_price() {
                Some(price) => price,
                None => break,
            };

            let maker = {
                let level = match contra.level_mut(&best_price) {
                    Some(level) => level,
                    None => break,
                };
                let resting = match level.front_mut() {
                    Some(order) => order,
                    None => break,
                };

                let trade_price = resting.limit_price;
                let trade_qty = Decimal::min(taker.leaves_qty, resting.leaves_qty);

                taker.apply_fill(trade_price, trade_qty);
                resting.apply_fill(trade_price, trade_qty);

                let snapshot = resting.clone();
                level.reduce_volume(trade_qty);
                if snapshot.is_filled() {
                    level.pop_front();
                }
                snapshot
            };
            contra.drop_level_if_empty(&best_price);

            self.last_trade = LastTrade {
                price: maker.last_px,
                quantity: maker.last_qty,
            };
            result.trades.push(Trade::new(
                self.symbol.as_str(),
                maker.last_px,
                maker.last_qty,
                maker.client_order_id.as_str(),
                taker.client_order_id.as_str(),
            ));
            result.affected_orders.push(maker);
        }

        if !taker.leaves_qty.is_zero() {
            let own = match taker.side {
                Side::Buy => &mut self.bids,
                Side::Sell => &mut self.asks,
            };
            own.insert(taker.clone());
        }

        result
    }
}
