use std::collections::HashMap;

use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Initial top-of-book state supplied by the quote collaborator when a symbol
/// is first referenced: one synthetic trade plus one level per side.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SeedQuote {
    pub trade_price: Decimal,
    pub trade_size: Decimal,
    pub bid_price: Decimal,
    pub bid_size: Decimal,
    pub ask_price: Decimal,
    pub ask_size: Decimal,
}

impl SeedQuote {
    /// The all-zero quote the engine substitutes when no source is available.
    pub fn zero() -> Self {
        Self::default()
    }
}

/// Errors from the quote collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuoteError {
    /// The source has no quote for this symbol.
    #[error("no quote available for symbol {0}")]
    Unavailable(String),
}

/// The quote-seeding collaborator.
///
/// Implementations are queried once per symbol, on first reference. A failure
/// is not fatal: the engine logs it and seeds an empty book instead.
pub trait QuoteSource: Send + Sync {
    fn quote(&self, symbol: &str) -> Result<SeedQuote, QuoteError>;
}

/// In-memory quote table; what the demo binary and tests stand in for the
/// external price feed.
#[derive(Default)]
pub struct StaticQuoteSource {
    quotes: RwLock<HashMap<String, SeedQuote>>,
}

impl StaticQuoteSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or replaces the quote served for a symbol.
    pub fn insert(&self, symbol: impl Into<String>, quote: SeedQuote) {
        self.quotes.write().insert(symbol.into(), quote);
    }
}

impl QuoteSource for StaticQuoteSource {
    fn quote(&self, symbol: &str) -> Result<SeedQuote, QuoteError> {
        self.quotes
            .read()
            .get(symbol)
            .copied()
            .ok_or_else(|| QuoteError::Unavailable(symbol.to_string()))
    }
}

/// A source with no quotes at all; every lookup takes the degraded path.
pub struct NoQuoteSource;

impl QuoteSource for NoQuoteSource {
    fn quote(&self, symbol: &str) -> Result<SeedQuote, QuoteError> {
        Err(QuoteError::Unavailable(symbol.to_string()))
    }
}
