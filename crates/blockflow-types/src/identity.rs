//! Session-unique block identifiers
//!
//! Block ids are derived from the creation timestamp (milliseconds since the
//! Unix epoch). Two blocks created within the same millisecond must still get
//! distinct ids, so the generator never hands out a value that is not strictly
//! greater than the previous one. Removed ids are therefore never reused.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a placed block
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub i64);

impl BlockId {
    /// Raw timestamp-derived value
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "blk_{}", self.0)
    }
}

/// Monotonic, timestamp-derived id source
#[derive(Debug, Clone, Default)]
pub struct BlockIdGenerator {
    last: Option<i64>,
}

impl BlockIdGenerator {
    /// Create a generator with no history
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Issue the next id using the wall clock
    pub fn next_id(&mut self) -> BlockId {
        self.next_at(chrono::Utc::now().timestamp_millis())
    }

    /// Issue the next id for an explicit timestamp.
    ///
    /// A timestamp that does not advance past the last issued id is bumped to
    /// `last + 1`.
    pub fn next_at(&mut self, timestamp_millis: i64) -> BlockId {
        let value = match self.last {
            Some(last) if timestamp_millis <= last => last + 1,
            _ => timestamp_millis,
        };
        self.last = Some(value);
        BlockId(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_follow_timestamps() {
        let mut gen = BlockIdGenerator::new();
        assert_eq!(gen.next_at(1_000), BlockId(1_000));
        assert_eq!(gen.next_at(2_500), BlockId(2_500));
    }

    #[test]
    fn test_same_millisecond_is_bumped() {
        let mut gen = BlockIdGenerator::new();
        let a = gen.next_at(5_000);
        let b = gen.next_at(5_000);
        let c = gen.next_at(4_000);
        assert!(a < b && b < c);
        assert_eq!(c, BlockId(5_002));
    }

    #[test]
    fn test_wall_clock_ids_strictly_increase() {
        let mut gen = BlockIdGenerator::new();
        let ids: Vec<_> = (0..50).map(|_| gen.next_id()).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_display() {
        assert_eq!(BlockId(42).to_string(), "blk_42");
    }
}
