//! Error types for the exchange façade.

use exchange_core::BookError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExchangeError {
    /// An order arrived outside an open market session.
    #[error("{user} tried to insert an order while the market was closed")]
    MarketClosed { user: String },

    /// The matching core rejected the order or hit an invariant failure.
    #[error(transparent)]
    Book(#[from] BookError),
}
