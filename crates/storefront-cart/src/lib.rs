//! Cart and product-variant synchronization engine for the storefront client.
//!
//! Every product card, banner card, variant sheet and checkout row talks to
//! the same few pieces:
//!
//! - **Store**: [`CartStore`], the single shared record of what is in the cart
//! - **Resolver**: [`VariantResolver`], which variant a card shows and what quantity
//! - **Sequencer**: [`CartMutationSequencer`], add / increase / decrease with the
//!   "add always yields exactly one" guarantee
//! - **Checkout**: [`CheckoutAggregator`], bill totals derived from cart lines
//!
//! The store is the only mutable shared state. Everything else is recomputed
//! from a [`CartSnapshot`] whenever the store's revision changes.
//!
//! # Example
//!
//! ```rust
//! use storefront_cart::prelude::*;
//!
//! let store = CartStore::new(Currency::INR);
//! let sequencer = CartMutationSequencer::new(store.clone(), PinRegistry::new());
//! let resolver = sequencer.resolver();
//!
//! let variant = Variant {
//!     variant_id: VariantId::new("milk-500ml"),
//!     product_id: ProductId::new("milk"),
//!     size: "500 ml".to_string(),
//!     price: Money::from_major(126, Currency::INR),
//!     original_price: Money::from_major(256, Currency::INR),
//!     discount_label: "51% OFF".to_string(),
//!     image: ImageRef::default(),
//! };
//!
//! sequencer.add_fresh(&variant.snapshot("Toned Milk"));
//! let active = resolver
//!     .resolve_active(&[variant], None, &store.snapshot())
//!     .unwrap();
//! assert_eq!(active.display_quantity, 1);
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod catalog;
pub mod checkout;
pub mod config;
pub mod connectivity;
pub mod pinning;
pub mod resolver;
pub mod sequencer;
pub mod store;

pub use catalog::{Variant, VariantCatalog, VariantSnapshot};
pub use checkout::{BillSummary, CheckoutAggregator, OrderCharges};
pub use config::EngineConfig;
pub use error::{CatalogError, ConfigError};
pub use ids::{ProductId, VariantId};
pub use money::{Currency, Money};
pub use pinning::PinRegistry;
pub use resolver::{ActiveVariant, ActiveVariantSelection, VariantResolver};
pub use sequencer::{CartMutationSequencer, PendingAdd};
pub use store::{CartLine, CartSnapshot, CartStore};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{CatalogError, ConfigError};
    pub use crate::ids::{ProductId, VariantId};
    pub use crate::money::{Currency, Money};

    pub use crate::catalog::{
        discount_label, fetch_many, fetch_variants_or_empty, ImageRef, InMemoryCatalog, Variant,
        VariantCatalog, VariantList, VariantSnapshot,
    };
    pub use crate::checkout::{summarize, BillSummary, CheckoutAggregator, OrderCharges};
    pub use crate::config::EngineConfig;
    pub use crate::connectivity::{ConnectivityAction, ConnectivityWatcher};
    pub use crate::pinning::{PinGuard, PinRegistry};
    pub use crate::resolver::{ActiveVariant, ActiveVariantSelection, SelectionSource, VariantResolver};
    pub use crate::sequencer::{CartMutationSequencer, PendingAdd};
    pub use crate::store::{CartLine, CartSnapshot, CartStore};
}
