use exchange_core::{Orderbook, Side};
use proptest::prelude::*;

proptest! {
    /// Random submission streams never break the book's accounting:
    /// fills consume exactly as much opposing resting volume as they
    /// print, level sums match the side aggregates, risk limits hold for
    /// every participant, and positions net out to zero.
    #[test]
    fn book_invariants_hold_for_arbitrary_submissions(
        ops in prop::collection::vec(
            (any::<bool>(), 0u32..4, 0i64..10, 1i64..8),
            1..80,
        )
    ) {
        let mut book = Orderbook::new(10);
        let mut last_trade_id = None;

        for (is_bid, issuer, price, volume) in ops {
            let side = if is_bid { Side::Bid } else { Side::Ask };
            let opposite_before = book.resting_volume(side.opposite());

            let trades = book.submit(side, issuer, price, volume).unwrap();
            let matched: i64 = trades.iter().map(|t| t.volume()).sum();
            prop_assert!(matched <= volume);
            prop_assert_eq!(
                book.resting_volume(side.opposite()),
                opposite_before - matched
            );

            for trade in &trades {
                prop_assert!(trade.volume() > 0);
                // Maker price rule: no trade prints at a price worse than
                // the taker asked for.
                match side {
                    Side::Bid => prop_assert!(trade.price() <= price),
                    Side::Ask => prop_assert!(trade.price() >= price),
                }
                if let Some(last) = last_trade_id {
                    prop_assert!(trade.id() > last);
                }
                last_trade_id = Some(trade.id());
            }
            // Best price first: fills walk away from the top of the book.
            for pair in trades.windows(2) {
                match side {
                    Side::Bid => prop_assert!(pair[0].price() <= pair[1].price()),
                    Side::Ask => prop_assert!(pair[0].price() >= pair[1].price()),
                }
            }

            let snapshot = book.snapshot();
            prop_assert_eq!(&book.snapshot(), &snapshot);
            let bid_sum: i64 = snapshot.bids.iter().map(|&(_, v)| v).sum();
            let ask_sum: i64 = snapshot.asks.iter().map(|&(_, v)| v).sum();
            prop_assert_eq!(bid_sum, book.resting_volume(Side::Bid));
            prop_assert_eq!(ask_sum, book.resting_volume(Side::Ask));

            let mut net_position = 0;
            for id in 0..4 {
                if let Some(view) = book.participant(id) {
                    prop_assert!(view.bid_volume <= view.bid_capacity.max(0));
                    prop_assert!(view.ask_volume <= view.ask_capacity.max(0));
                    prop_assert!(view.bid_volume >= 0);
                    prop_assert!(view.ask_volume >= 0);
                    net_position += view.position;
                }
            }
            prop_assert_eq!(net_position, 0);
        }
    }
}
