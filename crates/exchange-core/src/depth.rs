//! Read-only depth view of the book, for display and inspection.

use std::fmt;

/// Aggregate live resting volume per price level, per side.
///
/// Bids are ordered best-first (descending price), asks best-first
/// (ascending price). Levels whose live volume is zero are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DepthSnapshot {
    /// `(price, volume)` pairs, highest price first.
    pub bids: Vec<(i64, i64)>,
    /// `(price, volume)` pairs, lowest price first.
    pub asks: Vec<(i64, i64)>,
}

impl fmt::Display for DepthSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |levels: &[(i64, i64)]| {
            levels
                .iter()
                .map(|&(price, volume)| format!("{volume}@{price}"))
                .collect::<Vec<_>>()
                .join(", ")
        };
        writeln!(f, "ASK: {}", join(&self.asks))?;
        write!(f, "BID: {}", join(&self.bids))
    }
}
