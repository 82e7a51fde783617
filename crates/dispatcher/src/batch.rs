//! Double-slot batch storage.
//!
//! Two rotating batches share one lock: the active batch accepts new
//! entries, the draining batch holds everything already handed off to the
//! drain task. Rotation moves the active contents to the tail of the
//! draining batch, so a slow drain task sees several flushed generations
//! as one ordered sequence.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// One buffered record with its arrival time.
#[derive(Debug)]
pub(crate) struct Entry<T> {
    /// Captured at push, microsecond resolution, never mutated
    pub arrived: DateTime<Utc>,
    pub record: T,
}

/// The two batch slots guarded by the dispatcher lock.
#[derive(Debug)]
pub(crate) struct BatchSlots<T> {
    active: Vec<Entry<T>>,
    draining: Vec<Entry<T>>,
}

impl<T> BatchSlots<T> {
    pub fn new() -> Self {
        Self {
            active: Vec::new(),
            draining: Vec::new(),
        }
    }

    /// Append an entry to the active batch.
    #[inline]
    pub fn push(&mut self, entry: Entry<T>) {
        self.active.push(entry);
    }

    /// Flush-policy check for an entry arriving at `now`.
    ///
    /// True when the active batch is at/over the size cap, or when its
    /// oldest entry is older than `max_age`. Staleness is judged against
    /// the oldest buffered entry, not an absolute timer, so an idle
    /// dispatcher never rotates on its own.
    #[inline]
    pub fn should_rotate(&self, now: DateTime<Utc>, max_age: Duration, max_size: usize) -> bool {
        if self.active.len() >= max_size {
            return true;
        }
        match self.active.first() {
            Some(oldest) => now
                .signed_duration_since(oldest.arrived)
                .to_std()
                .map(|age| age > max_age)
                .unwrap_or(false),
            None => false,
        }
    }

    /// Hand the active batch off to the draining slot.
    ///
    /// Relative order is preserved on both sides; the active slot is left
    /// empty. Returns the number of entries moved.
    pub fn rotate(&mut self) -> usize {
        let moved = self.active.len();
        self.draining.append(&mut self.active);
        moved
    }

    /// Take exclusive ownership of everything handed off so far.
    pub fn take_draining(&mut self) -> Vec<Entry<T>> {
        std::mem::take(&mut self.draining)
    }

    #[inline]
    #[allow(dead_code)]
    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    #[inline]
    pub fn active_is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Entries buffered across both slots.
    #[inline]
    pub fn depth(&self) -> usize {
        self.active.len() + self.draining.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn entry(record: u32) -> Entry<u32> {
        Entry {
            arrived: Utc::now(),
            record,
        }
    }

    #[test]
    fn test_rotate_preserves_order_across_generations() {
        let mut slots = BatchSlots::new();
        slots.push(entry(1));
        slots.push(entry(2));
        slots.rotate();
        slots.push(entry(3));
        slots.rotate();

        let drained: Vec<u32> = slots.take_draining().into_iter().map(|e| e.record).collect();
        assert_eq!(drained, vec![1, 2, 3]);
        assert_eq!(slots.depth(), 0);
    }

    #[test]
    fn test_size_trigger() {
        let mut slots = BatchSlots::new();
        let now = Utc::now();
        slots.push(entry(1));
        slots.push(entry(2));

        assert!(!slots.should_rotate(now, Duration::from_secs(3600), 3));
        slots.push(entry(3));
        assert!(slots.should_rotate(now, Duration::from_secs(3600), 3));
    }

    #[test]
    fn test_age_trigger_uses_oldest_entry() {
        let mut slots = BatchSlots::new();
        let now = Utc::now();
        slots.push(Entry {
            arrived: now - TimeDelta::milliseconds(200),
            record: 1u32,
        });
        slots.push(Entry {
            arrived: now,
            record: 2,
        });

        assert!(slots.should_rotate(now, Duration::from_millis(100), 1000));
        assert!(!slots.should_rotate(now, Duration::from_millis(300), 1000));
    }

    #[test]
    fn test_empty_active_never_stale() {
        let slots: BatchSlots<u32> = BatchSlots::new();
        assert!(!slots.should_rotate(Utc::now(), Duration::ZERO, 1000));
    }

    #[test]
    fn test_clock_skew_does_not_rotate() {
        // An entry "from the future" must not trip the age check.
        let mut slots = BatchSlots::new();
        let now = Utc::now();
        slots.push(Entry {
            arrived: now + TimeDelta::seconds(10),
            record: 1u32,
        });
        assert!(!slots.should_rotate(now, Duration::from_millis(1), 1000));
    }

    #[test]
    fn test_take_draining_leaves_active_untouched() {
        let mut slots = BatchSlots::new();
        slots.push(entry(1));
        slots.rotate();
        slots.push(entry(2));

        let drained = slots.take_draining();
        assert_eq!(drained.len(), 1);
        assert_eq!(slots.active_len(), 1);
    }
}
