//! Per-variant "pinning" flags for the add-to-cart correction window.
//!
//! While a fresh add is being pinned to 1, the store may briefly read 2 for
//! that variant. Every card showing the variant consults the same registry,
//! so the flag lives here keyed by `VariantId` rather than on a card.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::ids::VariantId;

/// Default bound on how long a pin may stay set.
pub const DEFAULT_PIN_TTL: Duration = Duration::from_millis(100);

#[derive(Debug)]
struct PinEntry {
    holds: u32,
    deadline: Instant,
    /// Guards from an expired generation must not release a newer one.
    epoch: u64,
}

#[derive(Debug, Default)]
struct PinState {
    entries: HashMap<VariantId, PinEntry>,
    next_epoch: u64,
}

/// Shared registry of pinned variants.
#[derive(Debug, Clone, Default)]
pub struct PinRegistry {
    state: Arc<Mutex<PinState>>,
}

impl PinRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin a variant for at most `ttl`. The hold is released when the guard
    /// drops or the deadline passes, whichever comes first.
    pub fn pin(&self, variant_id: &VariantId, ttl: Duration) -> PinGuard {
        self.pin_at(variant_id, ttl, Instant::now())
    }

    pub(crate) fn pin_at(&self, variant_id: &VariantId, ttl: Duration, now: Instant) -> PinGuard {
        let deadline = now + ttl;
        let mut state = self.state.lock();
        let PinState {
            entries,
            next_epoch,
        } = &mut *state;

        let expired = entries
            .get(variant_id)
            .is_some_and(|e| e.holds == 0 || e.deadline <= now);
        if expired {
            entries.remove(variant_id);
        }
        let entry = entries.entry(variant_id.clone()).or_insert_with(|| {
            *next_epoch += 1;
            PinEntry {
                holds: 0,
                deadline,
                epoch: *next_epoch,
            }
        });
        entry.holds += 1;
        entry.deadline = entry.deadline.max(deadline);
        tracing::trace!(variant_id = %variant_id, holds = entry.holds, "variant pinned");
        PinGuard {
            registry: self.clone(),
            variant_id: variant_id.clone(),
            epoch: entry.epoch,
            released: false,
        }
    }

    pub fn is_pinned(&self, variant_id: &VariantId) -> bool {
        self.is_pinned_at(variant_id, Instant::now())
    }

    /// Whether `variant_id` is pinned as of `now`. Expired entries are purged.
    pub fn is_pinned_at(&self, variant_id: &VariantId, now: Instant) -> bool {
        let mut state = self.state.lock();
        let live = match state.entries.get(variant_id) {
            Some(e) => e.holds > 0 && e.deadline > now,
            None => return false,
        };
        if !live {
            state.entries.remove(variant_id);
        }
        live
    }

    /// Number of variants with a live entry.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn release(&self, variant_id: &VariantId, epoch: u64) {
        let mut state = self.state.lock();
        let drained = match state.entries.get_mut(variant_id) {
            Some(entry) if entry.epoch == epoch => {
                entry.holds = entry.holds.saturating_sub(1);
                entry.holds == 0
            }
            _ => false,
        };
        if drained {
            state.entries.remove(variant_id);
            tracing::trace!(variant_id = %variant_id, "variant unpinned");
        }
    }
}

/// One hold on a pinned variant.
#[derive(Debug)]
#[must_use = "dropping the guard releases the pin immediately"]
pub struct PinGuard {
    registry: PinRegistry,
    variant_id: VariantId,
    epoch: u64,
    released: bool,
}

impl PinGuard {
    pub fn variant_id(&self) -> &VariantId {
        &self.variant_id
    }

    /// Release the hold now.
    pub fn release(mut self) {
        self.release_once();
    }

    fn release_once(&mut self) {
        if !self.released {
            self.released = true;
            self.registry.release(&self.variant_id, self.epoch);
        }
    }
}

impl Drop for PinGuard {
    fn drop(&mut self) {
        self.release_once();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_and_release() {
        let pins = PinRegistry::new();
        let id = VariantId::new("v1");

        let guard = pins.pin(&id, Duration::from_secs(5));
        assert!(pins.is_pinned(&id));

        guard.release();
        assert!(!pins.is_pinned(&id));
        assert!(pins.is_empty());
    }

    #[test]
    fn test_drop_releases() {
        let pins = PinRegistry::new();
        let id = VariantId::new("v1");
        {
            let _guard = pins.pin(&id, Duration::from_secs(5));
            assert!(pins.is_pinned(&id));
        }
        assert!(!pins.is_pinned(&id));
    }

    #[test]
    fn test_overlapping_holds() {
        let pins = PinRegistry::new();
        let id = VariantId::new("v1");

        let first = pins.pin(&id, Duration::from_secs(5));
        let second = pins.pin(&id, Duration::from_secs(5));
        first.release();
        assert!(pins.is_pinned(&id));
        second.release();
        assert!(!pins.is_pinned(&id));
    }

    #[test]
    fn test_deadline_expires_leaked_pin() {
        let pins = PinRegistry::new();
        let id = VariantId::new("v1");
        let now = Instant::now();

        let guard = pins.pin_at(&id, Duration::from_millis(100), now);
        std::mem::forget(guard);

        assert!(pins.is_pinned_at(&id, now + Duration::from_millis(50)));
        assert!(!pins.is_pinned_at(&id, now + Duration::from_millis(100)));
        assert!(pins.is_empty());
    }

    #[test]
    fn test_stale_guard_does_not_release_newer_pin() {
        let pins = PinRegistry::new();
        let id = VariantId::new("v1");
        let now = Instant::now();

        let stale = pins.pin_at(&id, Duration::from_millis(10), now);
        let fresh = pins.pin_at(&id, Duration::from_secs(5), now + Duration::from_millis(20));
        drop(stale);

        assert!(pins.is_pinned_at(&id, now + Duration::from_millis(30)));
        drop(fresh);
        assert!(!pins.is_pinned_at(&id, now + Duration::from_millis(30)));
    }

    #[test]
    fn test_clones_share_flags() {
        let pins = PinRegistry::new();
        let other = pins.clone();
        let id = VariantId::new("v1");

        let _guard = pins.pin(&id, Duration::from_secs(5));
        assert!(other.is_pinned(&id));
        assert!(!other.is_pinned(&VariantId::new("v2")));
    }
}
