//! exchange-core
//!
//! Pure limit-order matching logic:
//! - orders and trades (leaf records with monotonic sequencing)
//! - per-participant risk state and limit trimming
//! - single-instrument order book with price-time priority
//!
//! The core has no internal concurrency and performs no I/O. It is built
//! for a single logical writer per book; callers serialize mutating access
//! per market instance (the `exchange` façade crate holds one mutex per
//! market for exactly this).

pub mod depth;
pub mod error;
pub mod order;
pub mod order_book;
pub mod participant;
pub mod sequence;
pub mod side;
pub mod trade;

pub use depth::DepthSnapshot;
pub use error::BookError;
pub use order::Order;
pub use order_book::{Orderbook, DEFAULT_POSITION_LIMIT};
pub use participant::ParticipantView;
pub use sequence::Sequence;
pub use side::Side;
pub use trade::Trade;
