//! Immutable record of a completed match.

use std::fmt;

use crate::error::BookError;
use crate::sequence::Sequence;

/// A completed match between a buyer and a seller.
///
/// The execution price is always the resting (maker) order's price; price
/// improvement accrues to the maker. Trades are never mutated after
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trade {
    id: u64,
    buyer: u32,
    seller: u32,
    price: i64,
    volume: i64,
}

impl Trade {
    /// Build a trade with the next id from the book's trade counter.
    /// Volume must be strictly positive.
    pub fn new(
        buyer: u32,
        seller: u32,
        price: i64,
        volume: i64,
        ids: &mut Sequence,
    ) -> Result<Self, BookError> {
        if volume <= 0 {
            return Err(BookError::InvariantViolation(
                "trade volume must be positive",
            ));
        }
        Ok(Trade {
            id: ids.next(),
            buyer,
            seller,
            price,
            volume,
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn buyer(&self) -> u32 {
        self.buyer
    }

    pub fn seller(&self) -> u32 {
        self.seller
    }

    pub fn price(&self) -> i64 {
        self.price
    }

    pub fn volume(&self) -> i64 {
        self.volume
    }

    /// Binary scoring against a settlement price: the buyer gains the full
    /// volume if the trade was below `theo`, loses it if above, zero at
    /// par. The seller's value is the negation.
    pub fn binary_value(&self, theo: i64) -> i64 {
        if self.price > theo {
            -self.volume
        } else if self.price < theo {
            self.volume
        } else {
            0
        }
    }

    /// Proportional scoring against a settlement price: volume times the
    /// buyer's price improvement.
    pub fn true_value(&self, theo: i64) -> i64 {
        self.volume * (theo - self.price)
    }
}

impl fmt::Display for Trade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {}->{},{}@{}",
            self.id, self.seller, self.buyer, self.volume, self.price
        )
    }
}
