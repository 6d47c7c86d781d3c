//! Cart mutations triggered by UI surfaces.
//!
//! "Add" always means "ensure exactly one": a fresh add creates the line at
//! 1, and an add on a line that already exists pins it back to 1. "One more"
//! is only reachable through [`CartMutationSequencer::increase`].
//!
//! The add sequence has two steps. The first step creates the line, or pins
//! an existing one. The second step is a correction that re-reads the store
//! and writes 1 if something else incremented the line in between. The
//! variant stays pinned in the shared [`PinRegistry`] for the duration, so
//! resolvers display 1 rather than a transient 2.

use std::time::Duration;

use crate::catalog::VariantSnapshot;
use crate::ids::VariantId;
use crate::pinning::{PinGuard, PinRegistry, DEFAULT_PIN_TTL};
use crate::resolver::VariantResolver;
use crate::store::CartStore;

/// Mutation entry points shared by every card, sheet and checkout row.
#[derive(Debug, Clone)]
pub struct CartMutationSequencer {
    store: CartStore,
    pins: PinRegistry,
    pin_ttl: Duration,
}

impl CartMutationSequencer {
    pub fn new(store: CartStore, pins: PinRegistry) -> Self {
        Self {
            store,
            pins,
            pin_ttl: DEFAULT_PIN_TTL,
        }
    }

    /// Bound on how long a pin may outlive its sequence.
    pub fn with_pin_ttl(mut self, ttl: Duration) -> Self {
        self.pin_ttl = ttl;
        self
    }

    pub fn store(&self) -> &CartStore {
        &self.store
    }

    pub fn pins(&self) -> &PinRegistry {
        &self.pins
    }

    /// A resolver reading this sequencer's pin registry.
    pub fn resolver(&self) -> VariantResolver {
        VariantResolver::new(self.pins.clone())
    }

    /// Add one more. From zero this is a fresh add yielding 1.
    pub fn increase(&self, snapshot: &VariantSnapshot) -> i64 {
        let current = self.store.quantity(&snapshot.variant_id);
        if current > 0 {
            self.store
                .set_quantity(&snapshot.variant_id, current.saturating_add(1))
        } else {
            self.add_fresh(snapshot)
        }
    }

    /// Remove one. At quantity 1 the line is removed.
    pub fn decrease(&self, variant_id: &VariantId) -> i64 {
        let current = self.store.quantity(variant_id);
        match current {
            0 => 0,
            1 => {
                self.store.remove_item(variant_id);
                0
            }
            n => self.store.set_quantity(variant_id, n - 1),
        }
    }

    /// Add exactly one unit, completing the correction synchronously.
    pub fn add_fresh(&self, snapshot: &VariantSnapshot) -> i64 {
        self.begin_add_fresh(snapshot).complete()
    }

    /// Add exactly one unit, running the correction on the next scheduler
    /// turn. The correction still re-reads the store before writing.
    pub async fn add_fresh_deferred(&self, snapshot: &VariantSnapshot) -> i64 {
        let pending = self.begin_add_fresh(snapshot);
        tokio::task::yield_now().await;
        pending.complete()
    }

    /// Run the first step of an add and return the pending correction.
    ///
    /// The variant stays pinned until the returned [`PendingAdd`] is
    /// completed or dropped, or until the pin deadline passes.
    pub fn begin_add_fresh(&self, snapshot: &VariantSnapshot) -> PendingAdd {
        let guard = self.pins.pin(&snapshot.variant_id, self.pin_ttl);
        let existing = self.store.quantity(&snapshot.variant_id);

        if existing > 0 {
            tracing::debug!(variant_id = %snapshot.variant_id, existing, "add on existing line, pinning to 1");
            self.store.set_quantity(&snapshot.variant_id, 1);
        } else {
            tracing::debug!(variant_id = %snapshot.variant_id, "fresh add");
            self.store.add_item(snapshot);
        }

        PendingAdd {
            store: self.store.clone(),
            guard: Some(guard),
            completed: false,
        }
    }

    /// Set a quantity directly; 0 or below removes the line.
    pub fn set_variant_quantity(&self, variant_id: &VariantId, quantity: i64) -> i64 {
        self.store.set_quantity(variant_id, quantity)
    }

    /// Remove the line entirely.
    pub fn remove(&self, variant_id: &VariantId) -> bool {
        self.store.remove_item(variant_id)
    }
}

/// The correction step of an add sequence.
///
/// Holds its own store handle, so it can complete after the surface that
/// started it has gone away. Dropping it without completing releases the pin
/// and skips the correction.
#[derive(Debug)]
#[must_use = "an uncompleted add skips the pin-to-one correction"]
pub struct PendingAdd {
    store: CartStore,
    guard: Option<PinGuard>,
    completed: bool,
}

impl PendingAdd {
    pub fn variant_id(&self) -> Option<&VariantId> {
        self.guard.as_ref().map(PinGuard::variant_id)
    }

    /// Pin the line to 1 if it still exists, then release the pin.
    ///
    /// Returns the resulting stored quantity.
    pub fn complete(mut self) -> i64 {
        self.completed = true;
        let Some(guard) = self.guard.take() else {
            return 0;
        };
        let variant_id = guard.variant_id().clone();

        let quantity = match self.store.quantity(&variant_id) {
            0 => {
                tracing::debug!(variant_id = %variant_id, "line gone before correction, skipping");
                0
            }
            1 => 1,
            n => {
                tracing::debug!(variant_id = %variant_id, observed = n, "correcting quantity to 1");
                self.store.set_quantity(&variant_id, 1)
            }
        };
        guard.release();
        quantity
    }
}

impl Drop for PendingAdd {
    fn drop(&mut self) {
        if !self.completed {
            if let Some(guard) = &self.guard {
                tracing::warn!(variant_id = %guard.variant_id(), "add sequence dropped before correction");
            }
        }
    }
}
