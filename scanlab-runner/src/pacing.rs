//! Request pacing shared by every fetch worker.
//!
//! Each caller reserves the next start slot under the lock, then sleeps outside
//! it until that slot. Fetch starts are therefore at least `interval` apart no
//! matter how many pool threads are fetching.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct RequestPacer {
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl RequestPacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: Mutex::new(None),
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    fn lock(&self) -> MutexGuard<'_, Option<Instant>> {
        self.next_slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Reserve the next start slot and return how long the caller must wait.
    pub fn reserve(&self) -> Duration {
        if self.interval.is_zero() {
            return Duration::ZERO;
        }
        let now = Instant::now();
        let mut next = self.lock();
        let slot = next.map_or(now, |n| n.max(now));
        *next = Some(slot + self.interval);
        slot.saturating_duration_since(now)
    }

    /// Block until this caller's slot comes up.
    pub fn wait(&self) {
        let delay = self.reserve();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}
