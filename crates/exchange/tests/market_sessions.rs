use std::sync::Arc;
use std::thread;

use exchange::{Exchange, ExchangeError, Scoring};

#[test]
fn closed_market_rejects_orders() {
    let exchange = Exchange::new();
    assert!(!exchange.is_open());

    let err = exchange.bid("alice", 5, 1).unwrap_err();
    assert!(matches!(err, ExchangeError::MarketClosed { user } if user == "alice"));
    let err = exchange.ask("bob", 5, 1).unwrap_err();
    assert!(matches!(err, ExchangeError::MarketClosed { .. }));

    assert!(exchange.trades().is_empty());
    assert!(exchange.depth().bids.is_empty());
}

#[test]
fn orders_match_while_open_and_stop_after_close() {
    let exchange = Exchange::new();
    exchange.open(10);
    assert!(exchange.is_open());

    assert!(exchange.bid("alice", 5, 2).unwrap().is_empty());
    let trades = exchange.ask("bob", 5, 2).unwrap();
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].price(), 5);
    assert_eq!(trades[0].volume(), 2);

    assert_eq!(exchange.trades(), trades);
    assert!(exchange.depth().bids.is_empty());
    assert!(exchange.depth().asks.is_empty());

    exchange.close_at(5, Scoring::Binary);
    assert!(!exchange.is_open());
    assert!(exchange.bid("alice", 5, 1).is_err());
}

#[test]
fn user_ids_are_dense_and_permanent() {
    let exchange = Exchange::new();
    exchange.open(10);

    exchange.bid("alice", 5, 1).unwrap();
    let trades = exchange.ask("bob", 5, 1).unwrap();
    assert_eq!(trades[0].buyer(), 0);
    assert_eq!(trades[0].seller(), 1);

    // A second session keeps the registry.
    exchange.close_at(5, Scoring::Binary);
    exchange.open(10);
    exchange.bid("bob", 4, 1).unwrap();
    let trades = exchange.ask("carol", 4, 1).unwrap();
    assert_eq!(trades[0].buyer(), 1);
    assert_eq!(trades[0].seller(), 2);
}

#[test]
fn binary_scoring_settles_buyer_against_seller() {
    let exchange = Exchange::new();
    exchange.open(10);

    exchange.bid("alice", 5, 2).unwrap();
    exchange.ask("bob", 5, 2).unwrap();
    // Settlement above the trade price: the buyer was right.
    exchange.close_at(7, Scoring::Binary);

    assert_eq!(exchange.score("alice"), 2);
    assert_eq!(exchange.score("bob"), -2);
    assert_eq!(exchange.score("nobody"), 0);
    assert_eq!(
        exchange.scores(),
        vec![("alice".to_string(), 2), ("bob".to_string(), -2)]
    );
}

#[test]
fn proportional_scoring_scales_with_price_distance() {
    let exchange = Exchange::new();
    exchange.open(10);

    exchange.bid("alice", 5, 2).unwrap();
    exchange.ask("bob", 5, 2).unwrap();
    exchange.close_at(8, Scoring::Proportional);

    assert_eq!(exchange.score("alice"), 6);
    assert_eq!(exchange.score("bob"), -6);
}

#[test]
fn scores_accumulate_across_sessions() {
    let exchange = Exchange::new();

    exchange.open(10);
    exchange.bid("alice", 5, 1).unwrap();
    exchange.ask("bob", 5, 1).unwrap();
    exchange.close_at(6, Scoring::Binary);
    assert_eq!(exchange.score("alice"), 1);

    // Opening again clears the trade log but not the scores.
    exchange.open(10);
    assert!(exchange.trades().is_empty());
    exchange.bid("alice", 5, 1).unwrap();
    exchange.ask("bob", 5, 1).unwrap();
    exchange.close_at(3, Scoring::Binary);

    assert_eq!(exchange.score("alice"), 0);
    assert_eq!(exchange.score("bob"), 0);
}

#[test]
fn position_limit_applies_through_the_facade() {
    let exchange = Exchange::new();
    exchange.open(10);

    exchange.bid("alice", 5, 2).unwrap();
    exchange.bid("alice", 6, 7).unwrap();
    exchange.bid("alice", 5, 5).unwrap();

    let view = exchange.participant("alice").unwrap();
    assert_eq!(view.bid_volume, 10);
    assert_eq!(exchange.depth().bids, vec![(6, 5), (5, 5)]);
}

#[test]
fn concurrent_submissions_are_serialized() {
    let exchange = Arc::new(Exchange::new());
    exchange.open(1_000_000);

    let handles: Vec<_> = (0..4i64)
        .map(|worker| {
            let exchange = Arc::clone(&exchange);
            thread::spawn(move || {
                let name = format!("user-{worker}");
                for i in 0..50i64 {
                    // Distinct prices per worker keep everything resting.
                    exchange.bid(&name, 10 + worker * 100 + i, 1).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let depth = exchange.depth();
    let total: i64 = depth.bids.iter().map(|&(_, v)| v).sum();
    assert_eq!(total, 200);
    assert!(exchange.trades().is_empty());
}
