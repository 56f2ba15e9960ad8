//! Resting order representation used inside the order book.
//!
//! Orders live in an arena owned by the book and are referenced by
//! [`OrderId`] handles from two places at once: the FIFO queue of their
//! price level and their issuer's own resting-order list. Volume only ever
//! decreases; an order whose volume reaches 0 is logically dead and is
//! evicted lazily from whichever queue reads it next.

use crate::error::BookError;
use crate::sequence::Sequence;
use crate::side::Side;

/// Stable handle into the book's order arena.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct OrderId(pub(crate) usize);

/// A single order in the book.
#[derive(Debug, Clone)]
pub struct Order {
    side: Side,
    issuer: u32,
    price: i64,
    volume: i64,
    /// Stamp from the book's update counter, refreshed on every volume
    /// change (including creation). Establishes program order for FIFO
    /// tie-breaks.
    updated_at: u64,
}

impl Order {
    /// Construct a new order and stamp it with the next update sequence.
    ///
    /// Price/volume preconditions are checked by the book before this is
    /// reached.
    pub(crate) fn new(
        side: Side,
        issuer: u32,
        price: i64,
        volume: i64,
        updates: &mut Sequence,
    ) -> Self {
        Order {
            side,
            issuer,
            price,
            volume,
            updated_at: updates.next(),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn issuer(&self) -> u32 {
        self.issuer
    }

    pub fn price(&self) -> i64 {
        self.price
    }

    pub fn volume(&self) -> i64 {
        self.volume
    }

    /// Update-sequence stamp of the most recent volume change.
    pub fn updated_at(&self) -> u64 {
        self.updated_at
    }

    /// `true` once the order has been fully matched or trimmed away.
    pub fn is_dead(&self) -> bool {
        self.volume == 0
    }

    /// Reduce the volume by `delta`, where `0 < delta <= volume`.
    pub(crate) fn reduce_volume(
        &mut self,
        delta: i64,
        updates: &mut Sequence,
    ) -> Result<(), BookError> {
        if delta <= 0 || delta > self.volume {
            return Err(BookError::InvariantViolation(
                "volume reduction must be positive and at most the resting volume",
            ));
        }
        self.volume -= delta;
        self.updated_at = updates.next();
        Ok(())
    }
}
