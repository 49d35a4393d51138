//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Typed inbound request surface. The session layer decodes a wire message
// into one of these variants and hands it to `MatchingEngine::handle`, which
// dispatches by pattern matching; nothing here knows about wire encodings.
//
// | Name              | Description                                              |
// |-------------------|----------------------------------------------------------|
// | OrderRequest      | New single order (quantity/price as decoded text)        |
// | StatusRequest     | Status query for a previously submitted order            |
// | MarketDataRequest | Snapshot request for a subset of entry types             |
// | Request           | Sum of the three inbound kinds                           |
// | Response          | Sum of the corresponding results                         |
//--------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::market_data::{EntryType, MarketDataSnapshot};
use crate::matching_engine::ExecutionReport;
use crate::types::{Order, OrderType, Side};

/// A new single order as decoded from the session layer.
///
/// `quantity` and `limit_price` stay textual here: the engine parses them so
/// malformed numerics are rejected inside the engine, before any book
/// mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub client_order_id: String,
    pub account: Option<String>,
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub quantity: String,
    pub limit_price: String,
}

/// Status query for a previously submitted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRequest {
    pub client_order_id: String,
}

/// Market-data snapshot request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketDataRequest {
    pub symbol: String,
    /// Entry types to report, in request order.
    pub entry_types: Vec<EntryType>,
}

impl MarketDataRequest {
    /// Builds a request from raw FIX MDEntryType codes, silently dropping
    /// codes the simulator does not serve.
    pub fn from_fix_codes(symbol: impl Into<String>, codes: &str) -> Self {
        Self {
            symbol: symbol.into(),
            entry_types: codes.chars().filter_map(EntryType::from_fix_code).collect(),
        }
    }
}

/// The inbound request kinds the engine understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Request {
    Submit(OrderRequest),
    Status(StatusRequest),
    Snapshot(MarketDataRequest),
}

/// The result of handling a [`Request`], for the session layer to encode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Response {
    Execution(ExecutionReport),
    Status(Order),
    Snapshot(MarketDataSnapshot),
}
