//! Single-instrument order book with price-time priority.
//!
//! - Bids: best = highest price. Asks: best = lowest price.
//! - FIFO (time priority) within each price level.
//! - Trade price is always the resting (maker) order's price.
//!
//! Every order lives once in an arena and is referenced by handle from its
//! price-level queue and from its issuer's resting list. Price levels are
//! never compacted eagerly: a level whose orders have all been matched or
//! trimmed away stays in the price heap until [`Orderbook::best`] walks
//! past it and pops the stale entry.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, VecDeque};

use tracing::{debug, trace};

use crate::depth::DepthSnapshot;
use crate::error::BookError;
use crate::order::{Order, OrderId};
use crate::participant::{Participant, ParticipantView};
use crate::sequence::Sequence;
use crate::side::Side;
use crate::trade::Trade;

/// Position limit applied when the book owner does not supply one.
pub const DEFAULT_POSITION_LIMIT: i64 = 10;

/// Single-instrument order book.
///
/// Designed for a single logical writer; the caller serializes all
/// mutating access (the `exchange` façade holds one mutex per market).
#[derive(Debug)]
pub struct Orderbook {
    /// Arena of every order submitted to this book. Queues hold handles
    /// into it; dead orders stay in place and are skipped lazily.
    orders: Vec<Order>,

    /// Bid prices, max-heap so the best bid is the highest price.
    /// Duplicate and stale entries are allowed and drained in `best`.
    bid_prices: BinaryHeap<i64>,
    /// Ask prices, min-heap via `Reverse` so the best ask is the lowest.
    ask_prices: BinaryHeap<Reverse<i64>>,

    /// Bid price -> FIFO queue of resting orders at that price.
    bids: HashMap<i64, VecDeque<OrderId>>,
    /// Ask price -> FIFO queue of resting orders at that price.
    asks: HashMap<i64, VecDeque<OrderId>>,

    total_bid_volume: i64,
    total_ask_volume: i64,

    participants: HashMap<u32, Participant>,
    position_limit: i64,

    order_updates: Sequence,
    trade_ids: Sequence,
}

impl Default for Orderbook {
    fn default() -> Self {
        Orderbook::new(DEFAULT_POSITION_LIMIT)
    }
}

impl Orderbook {
    /// Create an empty book enforcing `position_limit` per participant.
    pub fn new(position_limit: i64) -> Self {
        Orderbook {
            orders: Vec::new(),
            bid_prices: BinaryHeap::new(),
            ask_prices: BinaryHeap::new(),
            bids: HashMap::new(),
            asks: HashMap::new(),
            total_bid_volume: 0,
            total_ask_volume: 0,
            participants: HashMap::new(),
            position_limit,
            order_updates: Sequence::new(),
            trade_ids: Sequence::new(),
        }
    }

    pub fn position_limit(&self) -> i64 {
        self.position_limit
    }

    /// Aggregate live resting volume on one side.
    pub fn resting_volume(&self, side: Side) -> i64 {
        match side {
            Side::Bid => self.total_bid_volume,
            Side::Ask => self.total_ask_volume,
        }
    }

    /// Submit a bid, returning the trades it produced (possibly none).
    pub fn insert_bid(&mut self, buyer: u32, price: i64, volume: i64) -> Result<Vec<Trade>, BookError> {
        self.submit(Side::Bid, buyer, price, volume)
    }

    /// Submit an ask, returning the trades it produced (possibly none).
    pub fn insert_ask(&mut self, seller: u32, price: i64, volume: i64) -> Result<Vec<Trade>, BookError> {
        self.submit(Side::Ask, seller, price, volume)
    }

    /// Submit an order: cross it against the opposite side best-price-first,
    /// then rest any remainder and enforce the issuer's risk limit.
    ///
    /// Rejects non-positive volume and negative price with
    /// [`BookError::InvalidOrder`] before touching any state.
    pub fn submit(
        &mut self,
        side: Side,
        issuer: u32,
        price: i64,
        volume: i64,
    ) -> Result<Vec<Trade>, BookError> {
        if price < 0 || volume <= 0 {
            return Err(BookError::InvalidOrder {
                issuer,
                price,
                volume,
            });
        }

        let taker = OrderId(self.orders.len());
        self.orders
            .push(Order::new(side, issuer, price, volume, &mut self.order_updates));

        // A level already populated on the incoming side at this exact
        // price rests the order at once with no matching attempt, even
        // when it would cross the opposite book. Deliberate; see
        // DESIGN.md before touching this, since removing it changes
        // which trades are produced for identical input sequences.
        if self.has_resting_at(side, price) {
            self.rest(taker)?;
            return Ok(Vec::new());
        }

        let mut trades = Vec::new();
        // A fill shrinks the buyer's bid capacity and the seller's ask
        // capacity; both parties' pre-existing resting volume must be
        // re-checked against the limit once matching settles.
        let mut limit_checks: Vec<(u32, Side)> = Vec::new();
        while self.orders[taker.0].volume() > 0 && self.resting_volume(side.opposite()) > 0 {
            let Some(maker) = self.best_handle(side.opposite()) else {
                return Err(BookError::InvariantViolation(
                    "side volume is positive but no live order was found",
                ));
            };
            let maker_price = self.orders[maker.0].price();
            let maker_issuer = self.orders[maker.0].issuer();
            let crosses = match side {
                Side::Bid => maker_price <= price,
                Side::Ask => maker_price >= price,
            };
            if !crosses {
                break;
            }

            let trade_volume = self.orders[taker.0]
                .volume()
                .min(self.orders[maker.0].volume());
            let (buyer, seller) = match side {
                Side::Bid => (issuer, maker_issuer),
                Side::Ask => (maker_issuer, issuer),
            };
            let trade = Trade::new(buyer, seller, maker_price, trade_volume, &mut self.trade_ids)?;

            self.orders[taker.0].reduce_volume(trade_volume, &mut self.order_updates)?;
            self.orders[maker.0].reduce_volume(trade_volume, &mut self.order_updates)?;
            match side.opposite() {
                Side::Bid => self.total_bid_volume -= trade_volume,
                Side::Ask => self.total_ask_volume -= trade_volume,
            }

            // Position moves for both parties; the maker's tracked
            // resting aggregate shrinks along with its order.
            self.participant_entry(buyer).register_trade(&trade);
            self.participant_entry(seller).register_trade(&trade);
            self.participant_entry(maker_issuer)
                .reduce_resting(side.opposite(), trade_volume);
            limit_checks.push((buyer, Side::Bid));
            limit_checks.push((seller, Side::Ask));

            if self.orders[maker.0].is_dead() {
                // The maker came from `best_handle`, so it is the front
                // of its level queue.
                let levels = match side.opposite() {
                    Side::Bid => &mut self.bids,
                    Side::Ask => &mut self.asks,
                };
                if let Some(level) = levels.get_mut(&maker_price) {
                    level.pop_front();
                }
            }

            debug!(
                id = trade.id(),
                buyer,
                seller,
                price = maker_price,
                volume = trade_volume,
                "trade"
            );
            trades.push(trade);
        }

        for (party, exposed_side) in limit_checks {
            self.enforce_participant_limit(party, exposed_side)?;
        }
        if self.orders[taker.0].volume() > 0 {
            self.rest(taker)?;
        }
        Ok(trades)
    }

    /// The best live resting order on `side`, or `None`.
    ///
    /// Pops stale price-heap entries and dead queue fronts permanently as
    /// it encounters them; this is the only place dead levels are evicted.
    pub fn best(&mut self, side: Side) -> Option<&Order> {
        let id = self.best_handle(side)?;
        Some(&self.orders[id.0])
    }

    /// Read-only aggregate of live volume per price, per side.
    pub fn snapshot(&self) -> DepthSnapshot {
        let mut bids = Self::depth_levels(&self.bids, &self.orders);
        bids.sort_by(|a, b| b.0.cmp(&a.0));
        let mut asks = Self::depth_levels(&self.asks, &self.orders);
        asks.sort_by_key(|&(price, _)| price);
        DepthSnapshot { bids, asks }
    }

    /// Read-only view of one participant's exposure, if the issuer has
    /// ever rested or traded here.
    pub fn participant(&self, issuer: u32) -> Option<ParticipantView> {
        self.participants.get(&issuer).map(Participant::view)
    }

    // -------------------------------------------------------------------
    // Internal helpers
    // -------------------------------------------------------------------

    fn best_handle(&mut self, side: Side) -> Option<OrderId> {
        match side {
            Side::Bid => loop {
                let price = *self.bid_prices.peek()?;
                if let Some(front) = Self::live_front(&mut self.bids, &self.orders, price) {
                    return Some(front);
                }
                // Stale or duplicate heap entry for a drained level.
                self.bid_prices.pop();
            },
            Side::Ask => loop {
                let Reverse(price) = *self.ask_prices.peek()?;
                if let Some(front) = Self::live_front(&mut self.asks, &self.orders, price) {
                    return Some(front);
                }
                self.ask_prices.pop();
            },
        }
    }

    /// Pop dead orders off the front of the level at `price` and return
    /// the first live one, if any.
    fn live_front(
        levels: &mut HashMap<i64, VecDeque<OrderId>>,
        orders: &[Order],
        price: i64,
    ) -> Option<OrderId> {
        let level = levels.get_mut(&price)?;
        while matches!(level.front(), Some(&id) if orders[id.0].is_dead()) {
            level.pop_front();
        }
        level.front().copied()
    }

    fn has_resting_at(&self, side: Side, price: i64) -> bool {
        let levels = match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        };
        levels.get(&price).is_some_and(|level| !level.is_empty())
    }

    fn participant_entry(&mut self, issuer: u32) -> &mut Participant {
        let limit = self.position_limit;
        self.participants
            .entry(issuer)
            .or_insert_with(|| Participant::new(issuer, limit))
    }

    /// Rest an unmatched (remainder of an) order: enqueue it at its price
    /// level, register it with its issuer, then enforce the issuer's risk
    /// limit on that side.
    fn rest(&mut self, id: OrderId) -> Result<(), BookError> {
        let (side, issuer, price, volume) = {
            let order = &self.orders[id.0];
            (order.side(), order.issuer(), order.price(), order.volume())
        };
        match side {
            Side::Bid => {
                self.bids.entry(price).or_default().push_back(id);
                self.bid_prices.push(price);
                self.total_bid_volume += volume;
            }
            Side::Ask => {
                self.asks.entry(price).or_default().push_back(id);
                self.ask_prices.push(Reverse(price));
                self.total_ask_volume += volume;
            }
        }
        trace!(issuer, ?side, price, volume, "order rested");

        self.participant_entry(issuer).track_resting(side, id, volume);
        self.enforce_participant_limit(issuer, side)
    }

    /// Trim the issuer's oldest resting volume on `side` until it fits the
    /// side's capacity. A no-op when the limit is already respected.
    fn enforce_participant_limit(&mut self, issuer: u32, side: Side) -> Result<(), BookError> {
        let Some(participant) = self.participants.get_mut(&issuer) else {
            return Ok(());
        };
        let (levels, side_total) = match side {
            Side::Bid => (&mut self.bids, &mut self.total_bid_volume),
            Side::Ask => (&mut self.asks, &mut self.total_ask_volume),
        };
        participant.enforce_limit(side, &mut self.orders, levels, side_total, &mut self.order_updates)
    }

    fn depth_levels(
        levels: &HashMap<i64, VecDeque<OrderId>>,
        orders: &[Order],
    ) -> Vec<(i64, i64)> {
        levels
            .iter()
            .map(|(&price, level)| {
                let live: i64 = level.iter().map(|&id| orders[id.0].volume()).sum();
                (price, live)
            })
            .filter(|&(_, volume)| volume > 0)
            .collect()
    }
}
