//! Cart store: the single source of truth for cart contents.
//!
//! `CartStore` is a cheap handle; clones share the same lines. Surfaces get
//! the handle injected and re-read through [`CartStore::snapshot`] whenever
//! the revision published by [`CartStore::subscribe`] changes.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::catalog::{ImageRef, VariantSnapshot};
use crate::ids::{ProductId, VariantId};
use crate::money::{Currency, Money};

/// One row of the cart. At most one line exists per variant and its
/// quantity is always at least 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub variant_id: VariantId,
    pub product_id: ProductId,
    pub product_name: String,
    pub size: String,
    pub image: ImageRef,
    /// Price seen when the line was created; not re-synced from the catalog.
    pub price: Money,
    pub original_price: Money,
    pub discount_label: String,
    pub quantity: i64,
}

impl CartLine {
    fn from_snapshot(snapshot: &VariantSnapshot) -> Self {
        Self {
            variant_id: snapshot.variant_id.clone(),
            product_id: snapshot.product_id.clone(),
            product_name: snapshot.product_name.clone(),
            size: snapshot.size.clone(),
            image: snapshot.image.clone(),
            price: snapshot.price,
            original_price: snapshot.original_price,
            discount_label: snapshot.discount_label.clone(),
            quantity: 1,
        }
    }

    /// `price * quantity`.
    pub fn line_total(&self) -> Money {
        self.price.times(self.quantity)
    }

    /// `original_price * quantity`.
    pub fn line_total_original(&self) -> Money {
        self.original_price.times(self.quantity)
    }
}

/// A consistent, immutable read of the cart.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CartSnapshot {
    lines: Vec<CartLine>,
    revision: u64,
}

impl CartSnapshot {
    /// Build a snapshot from explicit lines (revision 0).
    ///
    /// Lines with a non-positive quantity are dropped and duplicate variants
    /// are merged, so the snapshot keeps the store's invariants.
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut state = CartState::default();
        for line in lines {
            if line.quantity <= 0 {
                continue;
            }
            match state.position(&line.variant_id) {
                Some(i) => {
                    let existing = &mut state.lines[i];
                    existing.quantity = existing.quantity.saturating_add(line.quantity);
                }
                None => state.lines.push(line),
            }
        }
        Self {
            lines: state.lines,
            revision: 0,
        }
    }

    /// Stored quantity, 0 if the variant is not in the cart.
    pub fn quantity(&self, variant_id: &VariantId) -> i64 {
        self.line(variant_id).map(|l| l.quantity).unwrap_or(0)
    }

    pub fn line(&self, variant_id: &VariantId) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.variant_id == variant_id)
    }

    /// Lines in first-add order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn total_items(&self) -> i64 {
        total_quantity(&self.lines)
    }

    /// Sum of `price * quantity`, in `currency`.
    pub fn total_price(&self, currency: Currency) -> Money {
        Money::sum(self.lines.iter().map(CartLine::line_total), currency)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Sum of line quantities, saturating at `i64::MAX`.
pub(crate) fn total_quantity(lines: &[CartLine]) -> i64 {
    lines
        .iter()
        .fold(0i64, |acc, l| acc.saturating_add(l.quantity))
}

#[derive(Debug, Default)]
struct CartState {
    lines: Vec<CartLine>,
}

impl CartState {
    fn position(&self, variant_id: &VariantId) -> Option<usize> {
        self.lines.iter().position(|l| &l.variant_id == variant_id)
    }
}

struct Shared {
    state: Mutex<CartState>,
    currency: Currency,
    revision: watch::Sender<u64>,
}

/// Shared handle to the in-memory cart.
#[derive(Clone)]
pub struct CartStore {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("lines", &self.shared.state.lock().lines.len())
            .field("revision", &self.revision())
            .finish()
    }
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new(Currency::default())
    }
}

impl CartStore {
    /// Create an empty cart priced in `currency`.
    pub fn new(currency: Currency) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(CartState::default()),
                currency,
                revision,
            }),
        }
    }

    pub fn currency(&self) -> Currency {
        self.shared.currency
    }

    /// Create the line at quantity 1, or increment an existing line by 1.
    ///
    /// A repeated add keeps the snapshot taken on first add. A snapshot
    /// priced in a currency other than the store's is skipped and the
    /// current quantity returned.
    pub fn add_item(&self, snapshot: &VariantSnapshot) -> i64 {
        if snapshot.price.currency != self.shared.currency
            || snapshot.original_price.currency != self.shared.currency
        {
            tracing::warn!(
                variant_id = %snapshot.variant_id,
                currency = snapshot.price.currency.code(),
                expected = self.shared.currency.code(),
                "skipping add in foreign currency"
            );
            return self.quantity(&snapshot.variant_id);
        }
        let quantity = {
            let mut state = self.shared.state.lock();
            match state.position(&snapshot.variant_id) {
                Some(i) => {
                    let line = &mut state.lines[i];
                    line.quantity = line.quantity.saturating_add(1);
                    line.quantity
                }
                None => {
                    state.lines.push(CartLine::from_snapshot(snapshot));
                    1
                }
            }
        };
        tracing::debug!(variant_id = %snapshot.variant_id, quantity, "cart add_item");
        self.bump();
        quantity
    }

    /// Set the quantity of an existing line.
    ///
    /// `quantity <= 0` removes the line. Setting a quantity on an absent line
    /// does nothing; lines are only created by [`add_item`](Self::add_item).
    pub fn set_quantity(&self, variant_id: &VariantId, quantity: i64) -> i64 {
        if quantity <= 0 {
            self.remove_item(variant_id);
            return 0;
        }
        let changed = {
            let mut state = self.shared.state.lock();
            match state.position(variant_id) {
                Some(i) if state.lines[i].quantity != quantity => {
                    state.lines[i].quantity = quantity;
                    true
                }
                Some(_) => false,
                None => return 0,
            }
        };
        if changed {
            tracing::debug!(variant_id = %variant_id, quantity, "cart set_quantity");
            self.bump();
        }
        quantity
    }

    /// Remove a line. Returns whether a line was removed.
    pub fn remove_item(&self, variant_id: &VariantId) -> bool {
        let removed = {
            let mut state = self.shared.state.lock();
            let before = state.lines.len();
            state.lines.retain(|l| &l.variant_id != variant_id);
            state.lines.len() < before
        };
        if removed {
            tracing::debug!(variant_id = %variant_id, "cart remove_item");
            self.bump();
        }
        removed
    }

    /// Stored quantity, 0 if absent.
    pub fn quantity(&self, variant_id: &VariantId) -> i64 {
        let state = self.shared.state.lock();
        state
            .position(variant_id)
            .map(|i| state.lines[i].quantity)
            .unwrap_or(0)
    }

    pub fn contains(&self, variant_id: &VariantId) -> bool {
        self.shared.state.lock().position(variant_id).is_some()
    }

    pub fn line(&self, variant_id: &VariantId) -> Option<CartLine> {
        let state = self.shared.state.lock();
        state.position(variant_id).map(|i| state.lines[i].clone())
    }

    /// Lines in first-add order.
    pub fn lines(&self) -> Vec<CartLine> {
        self.shared.state.lock().lines.clone()
    }

    /// The `n` most recently added lines, oldest first.
    pub fn recent_lines(&self, n: usize) -> Vec<CartLine> {
        let state = self.shared.state.lock();
        let start = state.lines.len().saturating_sub(n);
        state.lines[start..].to_vec()
    }

    pub fn total_items(&self) -> i64 {
        total_quantity(&self.shared.state.lock().lines)
    }

    pub fn total_price(&self) -> Money {
        let state = self.shared.state.lock();
        Money::sum(state.lines.iter().map(CartLine::line_total), self.shared.currency)
    }

    pub fn unique_item_count(&self) -> usize {
        self.shared.state.lock().lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.state.lock().lines.is_empty()
    }

    /// Remove every line.
    pub fn clear(&self) {
        let had_lines = {
            let mut state = self.shared.state.lock();
            let had_lines = !state.lines.is_empty();
            state.lines.clear();
            had_lines
        };
        if had_lines {
            tracing::debug!("cart cleared");
            self.bump();
        }
    }

    /// Read every line under one lock.
    pub fn snapshot(&self) -> CartSnapshot {
        let state = self.shared.state.lock();
        CartSnapshot {
            lines: state.lines.clone(),
            revision: *self.shared.revision.borrow(),
        }
    }

    /// Current revision; bumped on every mutation that changed the cart.
    pub fn revision(&self) -> u64 {
        *self.shared.revision.borrow()
    }

    /// Subscribe to revision changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.revision.subscribe()
    }

    fn bump(&self) {
        self.shared.revision.send_modify(|r| *r += 1);
    }
}
