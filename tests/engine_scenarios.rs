//--------------------------------------------------------------------------------------------------
// TEST MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// End-to-end scenarios against the engine's public surface: seed a book,
// submit orders, query status, take snapshots. Exercises the same call
// sequence the session layer performs, including concurrent submissions.
//--------------------------------------------------------------------------------------------------

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use ordermatch::{
    EngineError, EntryType, MatchingEngine, NoQuoteSource, OrderRequest, OrderStatus, OrderType,
    SeedQuote, Side, StaticQuoteSource,
};

/// Engine whose "X" book seeds with best bid 10.00x100 and best ask 10.05x100.
fn seeded_engine() -> MatchingEngine {
    let quotes = StaticQuoteSource::new();
    quotes.insert(
        "X",
        SeedQuote {
            trade_price: dec!(10.02),
            trade_size: dec!(25),
            bid_price: dec!(10.00),
            bid_size: dec!(100),
            ask_price: dec!(10.05),
            ask_size: dec!(100),
        },
    );
    MatchingEngine::new(Arc::new(quotes))
}

/// Engine with no quote source at all; every book starts empty.
fn bare_engine() -> MatchingEngine {
    MatchingEngine::new(Arc::new(NoQuoteSource))
}

fn limit(
    client_order_id: &str,
    symbol: &str,
    side: Side,
    quantity: &str,
    price: &str,
) -> OrderRequest {
    OrderRequest {
        client_order_id: client_order_id.to_string(),
        account: None,
        symbol: symbol.to_string(),
        side,
        order_type: OrderType::Limit,
        quantity: quantity.to_string(),
        limit_price: price.to_string(),
    }
}

#[test]
fn full_fill_against_seeded_ask() {
    let engine = seeded_engine();

    let report = engine
        .submit(limit("buy-1", "X", Side::Buy, "50", "10.05"))
        .expect("valid order");

    assert_eq!(report.status, OrderStatus::Filled);
    assert_eq!(report.cum_qty, dec!(50));
    assert_eq!(report.leaves_qty, Decimal::ZERO);
    assert_eq!(report.avg_px, dec!(10.05));
    assert_eq!(report.last_px, dec!(10.05));

    // The seeded ask was reduced to 50 remaining at 10.05
    let snapshot = engine.snapshot("X", &[EntryType::Offer]);
    let offer = snapshot.entry(EntryType::Offer).expect("offer requested");
    assert_eq!(offer.price, dec!(10.05));
    assert_eq!(offer.size, dec!(50));
}

#[test]
fn partial_fill_rests_remainder_as_new_best_bid() {
    let engine = seeded_engine();
    engine
        .submit(limit("buy-1", "X", Side::Buy, "50", "10.05"))
        .expect("valid order");

    // Takes the remaining 50 on the ask, then rests the other 50 as a bid
    let report = engine
        .submit(limit("buy-2", "X", Side::Buy, "100", "10.05"))
        .expect("valid order");

    assert_eq!(report.status, OrderStatus::PartiallyFilled);
    assert_eq!(report.cum_qty, dec!(50));
    assert_eq!(report.leaves_qty, dec!(50));

    let snapshot = engine.snapshot("X", &[EntryType::Bid, EntryType::Offer, EntryType::Trade]);
    let bid = snapshot.entry(EntryType::Bid).expect("bid requested");
    assert_eq!(bid.price, dec!(10.05));
    assert_eq!(bid.size, dec!(50));
    // Ask side was fully consumed
    let offer = snapshot.entry(EntryType::Offer).expect("offer requested");
    assert_eq!(offer.price, Decimal::ZERO);
    assert_eq!(offer.size, Decimal::ZERO);
    // Last trade was the second buy's 50 at 10.05
    let trade = snapshot.entry(EntryType::Trade).expect("trade requested");
    assert_eq!(trade.price, dec!(10.05));
    assert_eq!(trade.size, dec!(50));
}

#[test]
fn seller_receives_price_improvement() {
    let engine = seeded_engine();

    let report = engine
        .submit(limit("sell-1", "X", Side::Sell, "30", "9.50"))
        .expect("valid order");

    // Trades at the standing bid of 10.00, not at the 9.50 limit
    assert_eq!(report.status, OrderStatus::Filled);
    assert_eq!(report.avg_px, dec!(10.00));
    assert_eq!(report.last_px, dec!(10.00));
    assert_eq!(report.cum_qty, dec!(30));
}

#[test]
fn non_marketable_order_rests_on_empty_book() {
    let engine = bare_engine();

    let report = engine
        .submit(limit("sell-1", "EMPTY", Side::Sell, "200", "20.00"))
        .expect("valid order");

    assert_eq!(report.status, OrderStatus::New);
    assert_eq!(report.leaves_qty, dec!(200));
    assert_eq!(report.cum_qty, Decimal::ZERO);

    let snapshot = engine.snapshot("EMPTY", &[EntryType::Offer]);
    let offer = snapshot.entry(EntryType::Offer).expect("offer requested");
    assert_eq!(offer.price, dec!(20.00));
    assert_eq!(offer.size, dec!(200));
}

#[test]
fn status_of_unknown_id_is_not_found() {
    let engine = seeded_engine();
    assert_eq!(
        engine.status_of("nope"),
        Err(EngineError::OrderNotFound("nope".to_string()))
    );
}

#[test]
fn status_query_is_idempotent_and_sees_resting_fills() {
    let engine = bare_engine();
    engine
        .submit(limit("resting", "Y", Side::Sell, "100", "15.00"))
        .expect("valid order");
    engine
        .submit(limit("taker", "Y", Side::Buy, "60", "15.25"))
        .expect("valid order");

    let first = engine.status_of("resting").expect("known order");
    let second = engine.status_of("resting").expect("known order");
    assert_eq!(first, second);

    assert_eq!(first.status(), OrderStatus::PartiallyFilled);
    assert_eq!(first.cum_qty, dec!(60));
    assert_eq!(first.leaves_qty, dec!(40));
    // Maker trades at its own standing price
    assert_eq!(first.last_px, dec!(15.00));
}

#[test]
fn fifo_within_a_price_level() {
    let engine = bare_engine();
    engine
        .submit(limit("first", "F", Side::Sell, "60", "10.00"))
        .expect("valid order");
    engine
        .submit(limit("second", "F", Side::Sell, "60", "10.00"))
        .expect("valid order");

    engine
        .submit(limit("taker", "F", Side::Buy, "80", "10.00"))
        .expect("valid order");

    // The older resting order fills completely before the newer one starts
    let first = engine.status_of("first").expect("known order");
    assert_eq!(first.status(), OrderStatus::Filled);
    let second = engine.status_of("second").expect("known order");
    assert_eq!(second.status(), OrderStatus::PartiallyFilled);
    assert_eq!(second.cum_qty, dec!(20));
    assert_eq!(second.leaves_qty, dec!(40));
}

#[test]
fn quantity_invariant_holds_for_every_order() {
    let engine = seeded_engine();
    let ids = ["a", "b", "c", "d", "e"];
    engine.submit(limit("a", "X", Side::Buy, "37", "10.05")).expect("valid");
    engine.submit(limit("b", "X", Side::Sell, "81", "10.00")).expect("valid");
    engine.submit(limit("c", "X", Side::Buy, "144", "10.10")).expect("valid");
    engine.submit(limit("d", "X", Side::Sell, "29", "9.90")).expect("valid");
    engine.submit(limit("e", "X", Side::Buy, "55", "9.95")).expect("valid");

    for id in ids {
        let order = engine.status_of(id).expect("known order");
        assert_eq!(
            order.leaves_qty + order.cum_qty,
            order.quantity,
            "invariant violated for {id}"
        );
    }
}

#[test]
fn sides_never_stay_crossed() {
    let engine = bare_engine();
    engine.submit(limit("b1", "Z", Side::Buy, "50", "10.00")).expect("valid");
    engine.submit(limit("s1", "Z", Side::Sell, "20", "9.00")).expect("valid");
    engine.submit(limit("b2", "Z", Side::Buy, "10", "11.00")).expect("valid");
    engine.submit(limit("s2", "Z", Side::Sell, "100", "10.00")).expect("valid");

    let snapshot = engine.snapshot("Z", &[EntryType::Bid, EntryType::Offer]);
    let bid = snapshot.entry(EntryType::Bid).expect("bid requested");
    let offer = snapshot.entry(EntryType::Offer).expect("offer requested");
    if bid.size > Decimal::ZERO && offer.size > Decimal::ZERO {
        assert!(bid.price < offer.price);
    }
}

#[test]
fn concurrent_submissions_on_one_symbol_conserve_quantity() {
    let engine = Arc::new(bare_engine());
    engine
        .submit(limit("resting", "C", Side::Sell, "100", "10.00"))
        .expect("valid order");

    std::thread::scope(|scope| {
        for worker in 0..4 {
            let engine = Arc::clone(&engine);
            scope.spawn(move || {
                for i in 0..25 {
                    let id = format!("buy-{worker}-{i}");
                    engine
                        .submit(limit(&id, "C", Side::Buy, "1", "10.00"))
                        .expect("valid order");
                }
            });
        }
    });

    // Every one of the 100 unit buys crossed the resting 100-lot
    let resting = engine.status_of("resting").expect("known order");
    assert_eq!(resting.status(), OrderStatus::Filled);
    assert_eq!(resting.cum_qty, dec!(100));

    let mut filled = 0u32;
    for worker in 0..4 {
        for i in 0..25 {
            let order = engine
                .status_of(&format!("buy-{worker}-{i}"))
                .expect("known order");
            assert_eq!(order.leaves_qty + order.cum_qty, order.quantity);
            if order.status() == OrderStatus::Filled {
                filled += 1;
            }
        }
    }
    assert_eq!(filled, 100);
}

#[test]
fn books_for_different_symbols_are_independent() {
    let engine = Arc::new(bare_engine());

    std::thread::scope(|scope| {
        for symbol in ["AAA", "BBB", "CCC"] {
            let engine = Arc::clone(&engine);
            scope.spawn(move || {
                for i in 0..20 {
                    let id = format!("{symbol}-{i}");
                    engine
                        .submit(limit(&id, symbol, Side::Sell, "10", "5.00"))
                        .expect("valid order");
                }
            });
        }
    });

    for symbol in ["AAA", "BBB", "CCC"] {
        let snapshot = engine.snapshot(symbol, &[EntryType::Offer]);
        let offer = snapshot.entry(EntryType::Offer).expect("offer requested");
        assert_eq!(offer.price, dec!(5.00));
        assert_eq!(offer.size, dec!(200));
    }
}

#[test]
fn snapshot_of_unknown_symbol_degrades_to_zero_levels() {
    let engine = bare_engine();
    let snapshot = engine.snapshot("UNKNOWN", &[EntryType::Bid, EntryType::Offer, EntryType::Trade]);

    assert_eq!(snapshot.entries.len(), 3);
    for entry in &snapshot.entries {
        assert_eq!(entry.price, Decimal::ZERO);
        assert_eq!(entry.size, Decimal::ZERO);
    }
}

#[test]
fn trade_snapshot_serves_seed_value_before_any_trade() {
    let engine = seeded_engine();
    let snapshot = engine.snapshot("X", &[EntryType::Trade]);
    let trade = snapshot.entry(EntryType::Trade).expect("trade requested");
    assert_eq!(trade.price, dec!(10.02));
    assert_eq!(trade.size, dec!(25));
}
