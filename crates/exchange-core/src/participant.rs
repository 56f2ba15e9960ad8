//! Per-issuer bookkeeping: resting volume, net position, risk limits.
//!
//! Each participant keeps FIFO lists of its own resting orders per side
//! (handles into the book's arena, shared with the price-level queues).
//! Capacity is asymmetric around the net position: resting bids can only
//! add long exposure and resting asks short exposure, so
//! `bid_capacity = limit - position` and `ask_capacity = limit + position`.

use std::collections::{HashMap, VecDeque};

use tracing::debug;

use crate::error::BookError;
use crate::order::{Order, OrderId};
use crate::sequence::Sequence;
use crate::side::Side;
use crate::trade::Trade;

/// Mutable per-issuer state owned by the book.
#[derive(Debug)]
pub(crate) struct Participant {
    id: u32,
    bids: VecDeque<OrderId>,
    asks: VecDeque<OrderId>,
    bid_volume: i64,
    ask_volume: i64,
    position: i64,
    position_limit: i64,
}

/// Read-only copy of a participant's exposure, for callers and tests.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ParticipantView {
    pub position: i64,
    pub bid_capacity: i64,
    pub ask_capacity: i64,
    pub bid_volume: i64,
    pub ask_volume: i64,
}

impl Participant {
    pub(crate) fn new(id: u32, position_limit: i64) -> Self {
        Participant {
            id,
            bids: VecDeque::new(),
            asks: VecDeque::new(),
            bid_volume: 0,
            ask_volume: 0,
            position: 0,
            position_limit,
        }
    }

    pub(crate) fn view(&self) -> ParticipantView {
        ParticipantView {
            position: self.position,
            bid_capacity: self.position_limit - self.position,
            ask_capacity: self.position_limit + self.position,
            bid_volume: self.bid_volume,
            ask_volume: self.ask_volume,
        }
    }

    /// Track a newly rested order on `side`.
    pub(crate) fn track_resting(&mut self, side: Side, id: OrderId, volume: i64) {
        match side {
            Side::Bid => {
                self.bids.push_back(id);
                self.bid_volume += volume;
            }
            Side::Ask => {
                self.asks.push_back(id);
                self.ask_volume += volume;
            }
        }
    }

    /// Apply a fill to this participant's net position. Buyer position
    /// rises by the traded volume, seller position falls.
    pub(crate) fn register_trade(&mut self, trade: &Trade) {
        if trade.buyer() == self.id {
            self.position += trade.volume();
        }
        if trade.seller() == self.id {
            self.position -= trade.volume();
        }
    }

    /// Shrink the tracked resting aggregate after a fill against one of
    /// this participant's resting (maker) orders.
    pub(crate) fn reduce_resting(&mut self, side: Side, volume: i64) {
        match side {
            Side::Bid => self.bid_volume -= volume,
            Side::Ask => self.ask_volume -= volume,
        }
    }

    /// Trim this participant's own oldest resting volume on `side` until
    /// the side's capacity is respected.
    ///
    /// Invoked after every insertion that adds resting volume on `side`
    /// and after fills that shrink the side's capacity; a no-op when the
    /// limit already holds. This is a forced self-cancellation: no trade
    /// is produced and no counterparty is involved. A capacity already
    /// negative (position beyond the limit through taker fills) trims the
    /// side to zero.
    pub(crate) fn enforce_limit(
        &mut self,
        side: Side,
        orders: &mut [Order],
        levels: &mut HashMap<i64, VecDeque<OrderId>>,
        side_total: &mut i64,
        updates: &mut Sequence,
    ) -> Result<(), BookError> {
        let capacity = match side {
            Side::Bid => self.position_limit - self.position,
            Side::Ask => self.position_limit + self.position,
        };
        // Resting volume cannot go below zero, so a negative capacity
        // drains the side completely and stops there.
        let target = capacity.max(0);

        loop {
            let resting = match side {
                Side::Bid => self.bid_volume,
                Side::Ask => self.ask_volume,
            };
            if resting <= target {
                return Ok(());
            }

            let queue = match side {
                Side::Bid => &mut self.bids,
                Side::Ask => &mut self.asks,
            };
            // Orders fully matched away stay in the issuer list as dead
            // handles until read here.
            while matches!(queue.front(), Some(&id) if orders[id.0].is_dead()) {
                queue.pop_front();
            }
            let Some(&oldest) = queue.front() else {
                return Err(BookError::InvariantViolation(
                    "resting volume exceeds capacity with no orders left to trim",
                ));
            };

            let excess = resting - target;
            let trimmed = excess.min(orders[oldest.0].volume());
            orders[oldest.0].reduce_volume(trimmed, updates)?;
            match side {
                Side::Bid => self.bid_volume -= trimmed,
                Side::Ask => self.ask_volume -= trimmed,
            }
            *side_total -= trimmed;
            debug!(
                issuer = self.id,
                side = ?side,
                trimmed,
                price = orders[oldest.0].price(),
                "risk limit trim"
            );

            if orders[oldest.0].is_dead() {
                let queue = match side {
                    Side::Bid => &mut self.bids,
                    Side::Ask => &mut self.asks,
                };
                queue.pop_front();
                // Drop the handle from its price level too so the level
                // never dangles a trimmed-away entry.
                if let Some(level) = levels.get_mut(&orders[oldest.0].price()) {
                    level.retain(|&id| id != oldest);
                }
            }
        }
    }
}
