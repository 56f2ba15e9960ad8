//! exchange
//!
//! Thin façade around the `exchange-core` order book:
//! - user-name-to-id registration (dense, permanent ids)
//! - market open/close lifecycle
//! - one coarse mutex per market serializing every book access
//! - scoring of the session's trades against a settlement price at close
//!
//! The matching core assumes a single logical writer; this crate provides
//! that guarantee by holding the lock for the full duration of each
//! submission, including cascading matches and risk trimming.

mod error;
mod scoring;

pub use error::ExchangeError;
pub use scoring::Scoring;

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::info;

use exchange_core::{DepthSnapshot, Orderbook, ParticipantView, Side, Trade};

/// A single-instrument market with named users.
///
/// All methods take `&self`; internal state is guarded by one mutex.
pub struct Exchange {
    inner: Mutex<Inner>,
}

struct Inner {
    book: Orderbook,
    trades: Vec<Trade>,
    ids_by_name: HashMap<String, u32>,
    names: Vec<String>,
    open: bool,
    /// Running per-user scores; they accumulate across sessions.
    scores: HashMap<u32, i64>,
}

impl Default for Exchange {
    fn default() -> Self {
        Exchange::new()
    }
}

impl Exchange {
    /// Create a closed exchange. Call [`open`](Exchange::open) to start a
    /// session.
    pub fn new() -> Self {
        Exchange {
            inner: Mutex::new(Inner {
                book: Orderbook::default(),
                trades: Vec::new(),
                ids_by_name: HashMap::new(),
                names: Vec::new(),
                open: false,
                scores: HashMap::new(),
            }),
        }
    }

    /// Open a new session with a fresh book and empty trade log.
    /// User ids and accumulated scores survive across sessions.
    pub fn open(&self, position_limit: i64) {
        let mut inner = self.inner.lock();
        inner.book = Orderbook::new(position_limit);
        inner.trades.clear();
        inner.open = true;
        info!(position_limit, "market opened");
    }

    pub fn is_open(&self) -> bool {
        self.inner.lock().open
    }

    /// Submit a bid for `name`, registering the name on first use.
    pub fn bid(&self, name: &str, price: i64, volume: i64) -> Result<Vec<Trade>, ExchangeError> {
        self.insert(Side::Bid, name, price, volume)
    }

    /// Submit an ask for `name`, registering the name on first use.
    pub fn ask(&self, name: &str, price: i64, volume: i64) -> Result<Vec<Trade>, ExchangeError> {
        self.insert(Side::Ask, name, price, volume)
    }

    fn insert(
        &self,
        side: Side,
        name: &str,
        price: i64,
        volume: i64,
    ) -> Result<Vec<Trade>, ExchangeError> {
        let mut inner = self.inner.lock();
        if !inner.open {
            return Err(ExchangeError::MarketClosed {
                user: name.to_string(),
            });
        }
        let user = inner.user_id(name);
        let trades = inner.book.submit(side, user, price, volume)?;
        inner.trades.extend(trades.iter().cloned());
        Ok(trades)
    }

    /// Close the session and fold every trade of it into the running
    /// per-user scores: the buyer gains the trade's value under the chosen
    /// scoring mode, the seller loses it.
    pub fn close_at(&self, settlement: i64, scoring: Scoring) {
        let mut inner = self.inner.lock();
        inner.open = false;
        let Inner { trades, scores, .. } = &mut *inner;
        for trade in trades.iter() {
            let value = scoring.value(trade, settlement);
            *scores.entry(trade.buyer()).or_insert(0) += value;
            *scores.entry(trade.seller()).or_insert(0) -= value;
        }
        info!(settlement, ?scoring, trades = trades.len(), "market closed");
    }

    /// Depth of the current book, bids and asks best-first.
    pub fn depth(&self) -> DepthSnapshot {
        self.inner.lock().book.snapshot()
    }

    /// Every trade of the current session, in execution order.
    pub fn trades(&self) -> Vec<Trade> {
        self.inner.lock().trades.clone()
    }

    /// Accumulated score for `name` (0 for unknown or scoreless users).
    pub fn score(&self, name: &str) -> i64 {
        let inner = self.inner.lock();
        inner
            .ids_by_name
            .get(name)
            .and_then(|id| inner.scores.get(id))
            .copied()
            .unwrap_or(0)
    }

    /// All accumulated scores as `(name, score)` pairs, by registration
    /// order.
    pub fn scores(&self) -> Vec<(String, i64)> {
        let inner = self.inner.lock();
        inner
            .names
            .iter()
            .enumerate()
            .map(|(id, name)| {
                (
                    name.clone(),
                    inner.scores.get(&(id as u32)).copied().unwrap_or(0),
                )
            })
            .collect()
    }

    /// Current exposure of `name` in the open book, if they have traded
    /// or rested anything this session.
    pub fn participant(&self, name: &str) -> Option<ParticipantView> {
        let inner = self.inner.lock();
        let id = *inner.ids_by_name.get(name)?;
        inner.book.participant(id)
    }
}

impl Inner {
    /// Permanent, dense id for a user name, assigned on first use.
    fn user_id(&mut self, name: &str) -> u32 {
        if let Some(&id) = self.ids_by_name.get(name) {
            return id;
        }
        let id = self.names.len() as u32;
        self.ids_by_name.insert(name.to_string(), id);
        self.names.push(name.to_string());
        info!(user = name, id, "registered user");
        id
    }
}
