//! Time sources for cooldown and recency comparisons.
//!
//! Cooldown windows are lazy monotonic-time comparisons evaluated on read,
//! never scheduled timers, so the registry only ever needs "what time is it
//! now" in milliseconds.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Supplies the current time in milliseconds.
pub trait TimeSource {
    fn now_ms(&self) -> u64;
}

/// Monotonic wall-clock time measured from construction.
pub struct MonotonicClock {
    started: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}

/// Manually-advanced clock for tests and hosts that drive virtual time.
///
/// Clones share the same underlying instant, so a host can keep one handle
/// and hand another to the registry.
#[derive(Clone, Default)]
pub struct ManualClock {
    now_ms: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, now_ms: u64) {
        self.now_ms.store(now_ms, Ordering::Relaxed);
    }

    pub fn advance(&self, delta_ms: u64) {
        self.now_ms.fetch_add(delta_ms, Ordering::Relaxed);
    }
}

impl TimeSource for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::Relaxed)
    }
}
