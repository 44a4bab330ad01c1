use serde::{Deserialize, Serialize};

use super::time::Millis;

/// Identity of one arming of the scheduler. A fire carrying a stale id is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    pub id: TimerId,
    pub armed_at: Millis,
    pub due: Millis,
}

/// Single-slot delay. Holding the timer in an `Option` makes a second in-flight
/// timer unrepresentable: arming always replaces (and counts as cancelling) the previous one.
#[derive(Debug, Default)]
pub struct Scheduler {
    slot: Option<Timer>,
    next_id: u64,
    cancelled_total: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, now: Millis, delay_ms: u64) -> TimerId {
        self.cancel();
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.slot = Some(Timer {
            id,
            armed_at: now,
            due: now.after(delay_ms),
        });
        id
    }

    pub fn cancel(&mut self) -> Option<Timer> {
        let timer = self.slot.take();
        if timer.is_some() {
            self.cancelled_total += 1;
        }
        timer
    }

    /// Removes and returns the pending timer if it is due at `now`.
    pub fn take_due(&mut self, now: Millis) -> Option<Timer> {
        match self.slot {
            Some(timer) if timer.due <= now => self.slot.take(),
            _ => None,
        }
    }

    pub fn is_current(&self, id: TimerId) -> bool {
        self.slot.map(|t| t.id == id).unwrap_or(false)
    }

    pub fn pending(&self) -> Option<Timer> {
        self.slot
    }

    pub fn deadline(&self) -> Option<Millis> {
        self.slot.map(|t| t.due)
    }

    /// Zero or one, by construction.
    pub fn pending_count(&self) -> usize {
        usize::from(self.slot.is_some())
    }

    pub fn cancelled_total(&self) -> u64 {
        self.cancelled_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arming_replaces_pending_timer() {
        let mut s = Scheduler::new();
        let first = s.arm(Millis(0), 3000);
        let second = s.arm(Millis(100), 3000);

        assert_ne!(first, second);
        assert_eq!(s.pending_count(), 1);
        assert_eq!(s.deadline(), Some(Millis(3100)));
        assert!(!s.is_current(first));
        assert!(s.is_current(second));
        assert_eq!(s.cancelled_total(), 1);
    }

    #[test]
    fn take_due_respects_deadline() {
        let mut s = Scheduler::new();
        s.arm(Millis(0), 500);

        assert!(s.take_due(Millis(499)).is_none());
        let timer = s.take_due(Millis(500)).expect("due at 500");
        assert_eq!(timer.due, Millis(500));
        assert_eq!(s.pending_count(), 0);
        // Firing is not a cancellation.
        assert_eq!(s.cancelled_total(), 0);
    }

    #[test]
    fn cancel_on_empty_slot_is_harmless() {
        let mut s = Scheduler::new();
        assert!(s.cancel().is_none());
        assert_eq!(s.cancelled_total(), 0);
    }
}
