//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module implements the market-data view of an order book: a read-only,
// point-in-time snapshot of best bid / best offer / last trade, built on
// demand for the session layer to re-encode.
//
// | Component          | Description                                                |
// |--------------------|------------------------------------------------------------|
// | EntryType          | Kind of market-data entry a caller can request             |
// | MarketDataEntry    | One (type, price, size) line of a snapshot                 |
// | MarketDataSnapshot | Immutable snapshot with entries in request order           |
//--------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::orderbook::{BookSide, OrderBook};

/// Kind of market-data entry a snapshot can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryType {
    /// Best bid price level.
    Bid,
    /// Best ask price level.
    Offer,
    /// Most recent trade.
    Trade,
}

impl EntryType {
    /// Decodes a FIX MDEntryType code.
    ///
    /// Returns `None` for codes this simulator does not serve; the request
    /// decoder drops those silently instead of rejecting the whole request.
    #[inline]
    pub fn from_fix_code(code: char) -> Option<Self> {
        match code {
            '0' => Some(EntryType::Bid),
            '1' => Some(EntryType::Offer),
            '2' => Some(EntryType::Trade),
            _ => None,
        }
    }
}

/// One line of a market-data snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketDataEntry {
    pub entry_type: EntryType,
    pub price: Decimal,
    pub size: Decimal,
}

impl MarketDataEntry {
    /// A zero-valued entry, reported when the requested side has no orders.
    #[inline]
    pub fn empty(entry_type: EntryType) -> Self {
        Self {
            entry_type,
            price: Decimal::ZERO,
            size: Decimal::ZERO,
        }
    }
}

/// An immutable top-of-book snapshot for one symbol.
///
/// Entries appear in the same order the caller requested them; requesting a
/// type twice yields it twice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketDataSnapshot {
    /// Symbol this snapshot describes.
    pub symbol: String,
    /// Requested entries, in request order.
    pub entries: Vec<MarketDataEntry>,
    /// Timestamp when this snapshot was taken.
    pub generated_at: DateTime<Utc>,
}

impl MarketDataSnapshot {
    /// Derives a snapshot from the current book state.
    ///
    /// # Arguments
    /// * `book` - The book to read
    /// * `requested` - Entry types to include, in the order to include them
    pub fn from_book(book: &OrderBook, requested: &[EntryType]) -> Self {
        let entries = requested
            .iter()
            .map(|entry_type| match entry_type {
                EntryType::Bid => side_entry(EntryType::Bid, book.bids()),
                EntryType::Offer => side_entry(EntryType::Offer, book.asks()),
                EntryType::Trade => MarketDataEntry {
                    entry_type: EntryType::Trade,
                    price: book.last_trade().price,
                    size: book.last_trade().quantity,
                },
            })
            .collect();

        Self {
            symbol: book.symbol().to_string(),
            entries,
            generated_at: Utc::now(),
        }
    }

    /// Returns the first entry of the given type, if one was requested.
    pub fn entry(&self, entry_type: EntryType) -> Option<&MarketDataEntry> {
        self.entries.iter().find(|e| e.entry_type == entry_type)
    }
}

fn side_entry(entry_type: EntryType, side: &BookSide) -> MarketDataEntry {
    match side.best_entry() {
        Some((price, size)) => MarketDataEntry {
            entry_type,
            price,
            size,
        },
        None => MarketDataEntry::empty(entry_type),
    }
}
