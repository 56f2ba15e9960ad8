//! Side (Bid / Ask) for orders and book queries.

/// Order side: Bid (buy) or Ask (sell).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Side {
    Bid,
    Ask,
}

impl Side {
    /// The side an incoming order matches against.
    pub fn opposite(self) -> Side {
        match self {
            Side::Bid => Side::Ask,
            Side::Ask => Side::Bid,
        }
    }
}
