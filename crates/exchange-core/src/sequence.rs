//! Monotonic counters for order-update stamps and trade ids.

/// A monotonically increasing counter owned by a single order book.
///
/// Order update stamps and trade ids each draw from one of these instead
/// of from ambient global state, so two books never share sequencing and
/// tests get deterministic ids.
#[derive(Debug, Default, Clone)]
pub struct Sequence(u64);

impl Sequence {
    pub fn new() -> Self {
        Sequence(0)
    }

    /// Return the current value and advance the counter.
    pub fn next(&mut self) -> u64 {
        let value = self.0;
        self.0 += 1;
        value
    }

    /// The value the next call to [`next`](Sequence::next) will return.
    pub fn peek(&self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::Sequence;

    #[test]
    fn values_strictly_increase() {
        let mut seq = Sequence::new();
        assert_eq!(seq.next(), 0);
        assert_eq!(seq.next(), 1);
        assert_eq!(seq.peek(), 2);
        assert_eq!(seq.next(), 2);
    }
}
