use serde::{Deserialize, Serialize};

/// Logical monotonic time, in milliseconds since the presentation was mounted.
/// The kernel never reads a wall clock; drivers translate their own clock into `Millis`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Millis(pub u64);

/// Driver cadence for progress updates while a segment is playing.
pub const TICK_MS: u64 = 20;

impl Millis {
    pub const ZERO: Millis = Millis(0);

    pub fn new(ms: u64) -> Self {
        Millis(ms)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Instant `ms` later than this one.
    pub fn after(&self, ms: u64) -> Self {
        Millis(self.0.saturating_add(ms))
    }

    /// Milliseconds elapsed since `earlier` (zero if `earlier` is in the future).
    pub fn since(&self, earlier: Millis) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn since_saturates() {
        assert_eq!(Millis(500).since(Millis(200)), 300);
        assert_eq!(Millis(200).since(Millis(500)), 0);
        assert_eq!(Millis(u64::MAX).after(10), Millis(u64::MAX));
    }
}
