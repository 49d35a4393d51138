use std::sync::Arc;

use anyhow::Result;
use rust_decimal_macros::dec;

use ordermatch::{
    Config, EngineEvent, EntryType, EventBus, MarketDataRequest, MatchingEngine, OrderRequest,
    OrderType, Request, Response, SeedQuote, Side, StaticQuoteSource,
};

fn order_request(
    client_order_id: &str,
    symbol: &str,
    side: Side,
    quantity: &str,
    price: &str,
) -> Request {
    Request::Submit(OrderRequest {
        client_order_id: client_order_id.to_string(),
        account: Some("DEMO".to_string()),
        symbol: symbol.to_string(),
        side,
        order_type: OrderType::Limit,
        quantity: quantity.to_string(),
        limit_price: price.to_string(),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (for logging)
    tracing_subscriber::fmt::init();

    let mut config = Config::from_env();
    if config.symbols.is_empty() {
        config = Config::default();
    }
    println!("Starting matching engine demo, symbols: {:?}", config.symbols);

    // Stand-in for the external price feed: one starting quote per symbol
    let quotes = StaticQuoteSource::new();
    for symbol in &config.symbols {
        quotes.insert(
            symbol.clone(),
            SeedQuote {
                trade_price: dec!(10.02),
                trade_size: dec!(25),
                bid_price: dec!(10.00),
                bid_size: dec!(100),
                ask_price: dec!(10.05),
                ask_size: dec!(100),
            },
        );
    }

    let engine = Arc::new(MatchingEngine::with_event_bus(
        Arc::new(quotes),
        EventBus::new(config.app_id.clone()),
    ));
    let subscription = engine.events().subscribe();
    engine.warm_up(&config.symbols);

    let symbol = config.symbols[0].clone();

    // Two concurrent sessions hitting the same book
    let buyer = {
        let engine = Arc::clone(&engine);
        let symbol = symbol.clone();
        tokio::spawn(async move {
            for (id, qty, px) in [("buy-1", "50", "10.05"), ("buy-2", "100", "10.05")] {
                match engine.handle(order_request(id, &symbol, Side::Buy, qty, px)) {
                    Ok(Response::Execution(report)) => println!(
                        "[buyer] {} -> {:?}, executed {} @ avg {}, remaining {}",
                        report.client_order_id,
                        report.status,
                        report.cum_qty,
                        report.avg_px,
                        report.leaves_qty
                    ),
                    Ok(other) => println!("[buyer] unexpected response: {other:?}"),
                    Err(err) => println!("[buyer] rejected: {err}"),
                }
            }
        })
    };
    let seller = {
        let engine = Arc::clone(&engine);
        let symbol = symbol.clone();
        tokio::spawn(async move {
            for (id, qty, px) in [("sell-1", "30", "9.50"), ("sell-2", "200", "20.00")] {
                match engine.handle(order_request(id, &symbol, Side::Sell, qty, px)) {
                    Ok(Response::Execution(report)) => println!(
                        "[seller] {} -> {:?}, executed {} @ avg {}, remaining {}",
                        report.client_order_id,
                        report.status,
                        report.cum_qty,
                        report.avg_px,
                        report.leaves_qty
                    ),
                    Ok(other) => println!("[seller] unexpected response: {other:?}"),
                    Err(err) => println!("[seller] rejected: {err}"),
                }
            }
        })
    };
    buyer.await?;
    seller.await?;

    // Status query, the way a session would poll an open order
    match engine.status_of("sell-2") {
        Ok(order) => println!(
            "status sell-2: {:?}, executed {}, remaining {}",
            order.status(),
            order.cum_qty,
            order.leaves_qty
        ),
        Err(err) => println!("status sell-2 failed: {err}"),
    }

    // Full top-of-book snapshot
    if let Ok(Response::Snapshot(snapshot)) = engine.handle(Request::Snapshot(MarketDataRequest {
        symbol: symbol.clone(),
        entry_types: vec![EntryType::Bid, EntryType::Offer, EntryType::Trade],
    })) {
        println!("snapshot: {}", serde_json::to_string_pretty(&snapshot)?);
    }

    // Everything the session layer would have re-encoded as outbound messages
    let mut trades = 0;
    let mut reports = 0;
    while let Some((event, _metadata)) = subscription.try_receive() {
        match event {
            EngineEvent::TradeExecuted { trade } => {
                trades += 1;
                println!("trade: {} {} @ {}", trade.symbol, trade.quantity, trade.price);
            }
            EngineEvent::OrderAccepted { .. } => reports += 1,
            EngineEvent::OrderRejected { client_order_id, reason, .. } => {
                println!("rejected {client_order_id}: {reason}");
            }
            EngineEvent::BookSeeded { symbol, .. } => println!("seeded book for {symbol}"),
        }
    }
    println!("done: {reports} execution reports, {trades} trades");

    Ok(())
}
