//! Post-close valuation of trades against a settlement price.

use exchange_core::Trade;

/// How a session's trades are valued when the market closes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Scoring {
    /// Fixed payout: the buyer gains the traded volume when the trade
    /// printed below the settlement price, loses it when above.
    Binary,
    /// Linear payout: volume times the distance between settlement and
    /// trade price.
    Proportional,
}

impl Scoring {
    /// Value of `trade` to the buyer; the seller receives the negation.
    pub fn value(self, trade: &Trade, settlement: i64) -> i64 {
        match self {
            Scoring::Binary => trade.binary_value(settlement),
            Scoring::Proportional => trade.true_value(settlement),
        }
    }
}
