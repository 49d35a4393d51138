use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

use ordermatch::{
    EntryType, MatchingEngine, NoQuoteSource, OrderBook, OrderRequest, OrderType, Side,
    types::Order,
};

fn create_test_order(client_order_id: &str, side: Side, price: Decimal, quantity: Decimal) -> Order {
    Order::new(
        client_order_id,
        "0",
        None,
        "BENCH",
        side,
        OrderType::Limit,
        price,
        quantity,
    )
}

fn limit_request(client_order_id: &str, side: Side, quantity: &str, price: &str) -> OrderRequest {
    OrderRequest {
        client_order_id: client_order_id.to_string(),
        account: None,
        symbol: "BENCH".to_string(),
        side,
        order_type: OrderType::Limit,
        quantity: quantity.to_string(),
        limit_price: price.to_string(),
    }
}

fn orderbook_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("orderbook_operations");

    // Non-crossing insert: pure book maintenance
    group.bench_function("rest_order", |b| {
        let mut book = OrderBook::new("BENCH");
        let order = create_test_order("rest", Side::Buy, dec!(100.0), dec!(1.0));

        b.iter(|| {
            let mut order = black_box(order.clone());
            book.execute(&mut order);
        });
    });

    // Crossing execute against a deep contra side
    group.bench_function("execute_crossing", |b| {
        b.iter_with_setup(
            || {
                let mut book = OrderBook::new("BENCH");
                for i in 0..100 {
                    let price = Decimal::from(100 + i);
                    let mut ask = create_test_order("ask", Side::Sell, price, dec!(1.0));
                    book.execute(&mut ask);
                }
                book
            },
            |mut book| {
                let mut taker = create_test_order("taker", Side::Buy, dec!(150.0), dec!(50.0));
                book.execute(black_box(&mut taker));
            },
        );
    });

    group.finish();
}

fn engine_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_operations");

    group.bench_function("submit_resting", |b| {
        let engine = MatchingEngine::new(Arc::new(NoQuoteSource));
        let mut i = 0u64;
        b.iter(|| {
            i += 1;
            let request = limit_request(&format!("bench-{i}"), Side::Buy, "1", "100.0");
            engine.submit(black_box(request)).expect("valid order");
        });
    });

    group.bench_function("snapshot", |b| {
        let engine = MatchingEngine::new(Arc::new(NoQuoteSource));
        engine
            .submit(limit_request("bid", Side::Buy, "100", "99.0"))
            .expect("valid order");
        engine
            .submit(limit_request("ask", Side::Sell, "100", "101.0"))
            .expect("valid order");
        let requested = [EntryType::Bid, EntryType::Offer, EntryType::Trade];

        b.iter(|| {
            black_box(engine.snapshot("BENCH", &requested));
        });
    });

    group.finish();
}

criterion_group!(benches, orderbook_benchmark, engine_benchmark);
criterion_main!(benches);
