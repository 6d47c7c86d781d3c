//! Active-variant resolution for product cards.
//!
//! A card for a multi-size product shows exactly one variant. Which one is
//! decided from three signals, highest precedence first:
//!
//! 1. an explicit selection made in the size picker, if it is still one of
//!    the product's variants (even at cart quantity 0);
//! 2. the first variant, in list order, that has a cart quantity above 0;
//! 3. the first variant in the list.
//!
//! A selection that is no longer in the variant list (for example after a
//! catalog refresh) is skipped for that resolution only, so rule 2 still
//! applies before rule 3. The selection itself is kept.
//!
//! Nothing is cached: callers resolve again whenever the variant list, the
//! cart revision or the selection changes.

use std::time::Instant;

use serde::Serialize;

use crate::catalog::Variant;
use crate::ids::{ProductId, VariantId};
use crate::pinning::PinRegistry;
use crate::store::CartSnapshot;

/// Which precedence rule picked the active variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionSource {
    Explicit,
    InCart,
    Default,
}

/// The variant a card should render, with the quantity to show for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveVariant {
    pub variant_id: VariantId,
    pub display_quantity: i64,
    pub source: SelectionSource,
}

/// Resolves active variants against a cart snapshot, applying the
/// anti-flicker correction for variants that are mid add-sequence.
#[derive(Debug, Clone, Default)]
pub struct VariantResolver {
    pins: PinRegistry,
}

impl VariantResolver {
    /// Create a resolver that reads the given pin registry.
    ///
    /// Pass the same registry the [`CartMutationSequencer`](crate::sequencer::CartMutationSequencer)
    /// writes to, otherwise the correction never applies.
    pub fn new(pins: PinRegistry) -> Self {
        Self { pins }
    }

    pub fn pins(&self) -> &PinRegistry {
        &self.pins
    }

    /// Pick the active variant. Returns `None` for an empty list.
    pub fn resolve_active(
        &self,
        variants: &[Variant],
        explicit_selection: Option<&VariantId>,
        cart: &CartSnapshot,
    ) -> Option<ActiveVariant> {
        self.resolve_active_at(variants, explicit_selection, cart, Instant::now())
    }

    pub fn resolve_active_at(
        &self,
        variants: &[Variant],
        explicit_selection: Option<&VariantId>,
        cart: &CartSnapshot,
        now: Instant,
    ) -> Option<ActiveVariant> {
        let explicit = explicit_selection
            .and_then(|id| variants.iter().find(|v| &v.variant_id == id))
            .map(|v| (v, SelectionSource::Explicit));
        let in_cart = || {
            variants
                .iter()
                .find(|v| cart.quantity(&v.variant_id) > 0)
                .map(|v| (v, SelectionSource::InCart))
        };
        let first = || variants.first().map(|v| (v, SelectionSource::Default));

        let (variant, source) = explicit.or_else(in_cart).or_else(first)?;
        let display_quantity = self.display_quantity_at(&variant.variant_id, cart, now);

        tracing::trace!(
            variant_id = %variant.variant_id,
            ?source,
            display_quantity,
            "resolved active variant"
        );
        Some(ActiveVariant {
            variant_id: variant.variant_id.clone(),
            display_quantity,
            source,
        })
    }

    /// Quantity to display for a variant.
    ///
    /// While the variant is pinned and the store reads exactly 2, this
    /// reports 1. The stored quantity is never touched.
    pub fn display_quantity(&self, variant_id: &VariantId, cart: &CartSnapshot) -> i64 {
        self.display_quantity_at(variant_id, cart, Instant::now())
    }

    pub fn display_quantity_at(&self, variant_id: &VariantId, cart: &CartSnapshot, now: Instant) -> i64 {
        let stored = cart.quantity(variant_id);
        if stored == 2 && self.pins.is_pinned_at(variant_id, now) {
            1
        } else {
            stored
        }
    }
}

/// Per-card selection state.
///
/// Holds only what the user chose; the active variant is always derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveVariantSelection {
    product_id: ProductId,
    explicit: Option<VariantId>,
}

impl ActiveVariantSelection {
    pub fn new(product_id: ProductId) -> Self {
        Self {
            product_id,
            explicit: None,
        }
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    pub fn explicit(&self) -> Option<&VariantId> {
        self.explicit.as_ref()
    }

    /// Record a picker choice. It persists until replaced or cleared.
    pub fn select(&mut self, variant_id: VariantId) {
        self.explicit = Some(variant_id);
    }

    pub fn clear(&mut self) {
        self.explicit = None;
    }

    pub fn resolve(
        &self,
        resolver: &VariantResolver,
        variants: &[Variant],
        cart: &CartSnapshot,
    ) -> Option<ActiveVariant> {
        resolver.resolve_active(variants, self.explicit.as_ref(), cart)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::catalog::ImageRef;
    use crate::money::{Currency, Money};
    use crate::store::CartLine;

    fn variant(id: &str) -> Variant {
        Variant {
            variant_id: VariantId::new(id),
            product_id: ProductId::new("p1"),
            size: id.to_uppercase(),
            price: Money::from_major(10, Currency::INR),
            original_price: Money::from_major(12, Currency::INR),
            discount_label: "17% OFF".to_string(),
            image: ImageRef::default(),
        }
    }

    fn cart(entries: &[(&str, i64)]) -> CartSnapshot {
        CartSnapshot::from_lines(entries.iter().map(|(id, qty)| {
            let v = variant(id);
            CartLine {
                variant_id: v.variant_id.clone(),
                product_id: v.product_id.clone(),
                product_name: "Test".to_string(),
                size: v.size.clone(),
                image: v.image.clone(),
                price: v.price,
                original_price: v.original_price,
                discount_label: v.discount_label.clone(),
                quantity: *qty,
            }
        }))
    }

    #[test]
    fn test_empty_variants_resolve_to_none() {
        let resolver = VariantResolver::default();
        assert_eq!(resolver.resolve_active(&[], None, &cart(&[])), None);
    }

    #[test]
    fn test_default_is_first_variant() {
        let resolver = VariantResolver::default();
        let variants = [variant("a"), variant("b")];
        let active = resolver.resolve_active(&variants, None, &cart(&[])).unwrap();
        assert_eq!(active.variant_id, VariantId::new("a"));
        assert_eq!(active.display_quantity, 0);
        assert_eq!(active.source, SelectionSource::Default);
    }

    #[test]
    fn test_in_cart_beats_default() {
        let resolver = VariantResolver::default();
        let variants = [variant("a"), variant("b"), variant("c")];
        let active = resolver
            .resolve_active(&variants, None, &cart(&[("c", 1), ("b", 2)]))
            .unwrap();
        assert_eq!(active.variant_id, VariantId::new("b"));
        assert_eq!(active.display_quantity, 2);
        assert_eq!(active.source, SelectionSource::InCart);
    }

    #[test]
    fn test_explicit_beats_in_cart() {
        let resolver = VariantResolver::default();
        let variants = [variant("a"), variant("b"), variant("c")];
        let selected = VariantId::new("b");
        let active = resolver
            .resolve_active(&variants, Some(&selected), &cart(&[("a", 3)]))
            .unwrap();
        assert_eq!(active.variant_id, selected);
        assert_eq!(active.display_quantity, 0);
        assert_eq!(active.source, SelectionSource::Explicit);
    }

    #[test]
    fn test_stale_selection_falls_through() {
        let resolver = VariantResolver::default();
        let variants = [variant("a"), variant("b")];
        let gone = VariantId::new("z");

        let active = resolver.resolve_active(&variants, Some(&gone), &cart(&[])).unwrap();
        assert_eq!(active.variant_id, VariantId::new("a"));
        assert_eq!(active.source, SelectionSource::Default);
    }

    #[test]
    fn test_stale_selection_prefers_in_cart_variant() {
        let resolver = VariantResolver::default();
        let variants = [variant("a"), variant("b")];
        let mut selection = ActiveVariantSelection::new(ProductId::new("p1"));
        selection.select(VariantId::new("z"));

        let active = selection.resolve(&resolver, &variants, &cart(&[("b", 3)])).unwrap();
        assert_eq!(active.variant_id, VariantId::new("b"));
        assert_eq!(active.display_quantity, 3);
        assert_eq!(active.source, SelectionSource::InCart);
        assert_eq!(selection.explicit(), Some(&VariantId::new("z")));
    }

    #[test]
    fn test_pinned_two_displays_as_one() {
        let pins = PinRegistry::new();
        let resolver = VariantResolver::new(pins.clone());
        let id = VariantId::new("a");
        let snapshot = cart(&[("a", 2)]);

        let guard = pins.pin(&id, Duration::from_secs(5));
        assert_eq!(resolver.display_quantity(&id, &snapshot), 1);
        assert_eq!(snapshot.quantity(&id), 2);

        drop(guard);
        assert_eq!(resolver.display_quantity(&id, &snapshot), 2);
    }

    #[test]
    fn test_pin_only_masks_exactly_two() {
        let pins = PinRegistry::new();
        let resolver = VariantResolver::new(pins.clone());
        let id = VariantId::new("a");
        let _guard = pins.pin(&id, Duration::from_secs(5));

        assert_eq!(resolver.display_quantity(&id, &cart(&[("a", 3)])), 3);
        assert_eq!(resolver.display_quantity(&id, &cart(&[("a", 1)])), 1);
    }

    #[test]
    fn test_selection_persists_at_zero_quantity() {
        let resolver = VariantResolver::default();
        let variants = [variant("a"), variant("b")];
        let mut selection = ActiveVariantSelection::new(ProductId::new("p1"));
        selection.select(VariantId::new("b"));

        let with_line = selection.resolve(&resolver, &variants, &cart(&[("b", 1)])).unwrap();
        assert_eq!(with_line.display_quantity, 1);

        let emptied = selection.resolve(&resolver, &variants, &cart(&[("a", 2)])).unwrap();
        assert_eq!(emptied.variant_id, VariantId::new("b"));
        assert_eq!(emptied.display_quantity, 0);

        selection.clear();
        let cleared = selection.resolve(&resolver, &variants, &cart(&[("a", 2)])).unwrap();
        assert_eq!(cleared.variant_id, VariantId::new("a"));
    }
}
