//! Error types for the matching core.
//!
//! Precondition violations (`InvalidOrder`) are rejected before any book
//! state is touched. `InvariantViolation` means the core itself found its
//! bookkeeping inconsistent; it aborts the current operation and is not a
//! recoverable runtime condition.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BookError {
    /// The caller submitted a non-positive volume or a negative price.
    #[error("invalid order from issuer {issuer}: volume {volume} @ price {price}")]
    InvalidOrder {
        issuer: u32,
        price: i64,
        volume: i64,
    },

    /// The book's internal bookkeeping was found inconsistent.
    #[error("order book invariant violated: {0}")]
    InvariantViolation(&'static str),
}
