//! Forced rotation: the empty-pool boundary.
//!
//! When every catalog item is displayed or cooling, the controller reclaims
//! the longest-displayed active item so the spawning loop always makes
//! progress. The reclaimed item bypasses its cooldown and is immediately
//! selectable again.

use log::debug;

use crate::content_pool::ContentPool;

pub struct RotationController {
    rotation_cycle: u64,
}

impl RotationController {
    pub fn new() -> Self {
        Self { rotation_cycle: 0 }
    }

    /// Number of forced reclaims since initialization or the last reset.
    pub fn rotation_cycle(&self) -> u64 {
        self.rotation_cycle
    }

    pub fn reset(&mut self) {
        self.rotation_cycle = 0;
    }

    /// Force-releases the displayed entry with the oldest timestamp and
    /// returns its content id, or `None` when nothing is displayed. Ties
    /// are broken by iteration order; which of two same-instant entries is
    /// reclaimed is not significant.
    pub fn reclaim_oldest(&mut self, pool: &mut ContentPool) -> Option<String> {
        let oldest_id = pool.oldest_displayed()?.content_id.clone();
        if !pool.force_release(&oldest_id) {
            return None;
        }
        self.rotation_cycle += 1;
        debug!(
            "Forced rotation reclaimed content: id={} cycle={}",
            oldest_id, self.rotation_cycle
        );
        Some(oldest_id)
    }
}

impl Default for RotationController {
    fn default() -> Self {
        Self::new()
    }
}
