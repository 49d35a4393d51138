// Expose the modules
pub mod config;
pub mod events;
pub mod market_data;
pub mod matching_engine;
pub mod orderbook;
pub mod quote;
pub mod request;
pub mod types;

// Re-export key types for easier usage
pub use config::Config;
pub use events::{EngineEvent, EventBus, EventMetadata, Subscription};
pub use market_data::{EntryType, MarketDataEntry, MarketDataSnapshot};
pub use matching_engine::{EngineError, ExecutionReport, MatchingEngine};
pub use orderbook::{BookSide, LastTrade, MatchResult, OrderBook, PriceLevel};
pub use quote::{NoQuoteSource, QuoteError, QuoteSource, SeedQuote, StaticQuoteSource};
pub use request::{MarketDataRequest, OrderRequest, Request, Response, StatusRequest};
pub use types::{Order, OrderStatus, OrderType, Side, Trade};
