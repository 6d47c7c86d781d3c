//! Variant catalog contract.
//!
//! The catalog is an external collaborator: it supplies the purchasable
//! variants of a product. The engine only consumes it through
//! [`VariantCatalog`] and always degrades a failed fetch to an empty list.

use std::collections::HashMap;

use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::ids::{ProductId, VariantId};
use crate::money::{Currency, Money};

/// Opaque display handle for a variant image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct ImageRef(pub String);

impl ImageRef {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }
}

/// One purchasable size of a product. Read-only once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub variant_id: VariantId,
    pub product_id: ProductId,
    /// Display label (e.g., "500 g").
    pub size: String,
    pub price: Money,
    pub original_price: Money,
    /// Precomputed label (e.g., "16% OFF").
    pub discount_label: String,
    pub image: ImageRef,
}

impl Variant {
    /// Build the snapshot copied into a cart line on first add.
    pub fn snapshot(&self, product_name: impl Into<String>) -> VariantSnapshot {
        VariantSnapshot {
            variant_id: self.variant_id.clone(),
            product_id: self.product_id.clone(),
            product_name: product_name.into(),
            size: self.size.clone(),
            image: self.image.clone(),
            price: self.price,
            original_price: self.original_price,
            discount_label: self.discount_label.clone(),
        }
    }
}

/// The variant fields a cart line copies at the moment of first add.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantSnapshot {
    pub variant_id: VariantId,
    pub product_id: ProductId,
    pub product_name: String,
    pub size: String,
    pub image: ImageRef,
    pub price: Money,
    pub original_price: Money,
    pub discount_label: String,
}

/// Format a catalog-style discount label ("16% OFF").
///
/// Returns an empty string when `price` is not below `original_price`.
pub fn discount_label(price: Money, original_price: Money) -> String {
    let original = original_price.amount_minor;
    let savings = original - price.amount_minor;
    if original <= 0 || savings <= 0 {
        return String::new();
    }
    let percent = (savings.saturating_mul(100) + original / 2) / original;
    format!("{}% OFF", percent)
}

/// Source of product variants.
#[async_trait]
pub trait VariantCatalog: Send + Sync {
    /// Fetch the variants of one product, in display order.
    async fn fetch_variants(&self, product_id: &ProductId) -> Result<Vec<Variant>, CatalogError>;
}

/// Fetch variants, substituting an empty list on failure.
pub async fn fetch_variants_or_empty<C>(catalog: &C, product_id: &ProductId) -> Vec<Variant>
where
    C: VariantCatalog + ?Sized,
{
    match catalog.fetch_variants(product_id).await {
        Ok(variants) => variants,
        Err(e) => {
            tracing::warn!(product_id = %product_id, error = %e, "variant fetch failed, using empty list");
            Vec::new()
        }
    }
}

/// Fetch several products concurrently. Each entry is fail-soft.
pub async fn fetch_many<C>(catalog: &C, product_ids: &[ProductId]) -> Vec<(ProductId, Vec<Variant>)>
where
    C: VariantCatalog + ?Sized,
{
    let fetches = product_ids
        .iter()
        .map(|id| async move { (id.clone(), fetch_variants_or_empty(catalog, id).await) });
    join_all(fetches).await
}

/// Per-product fetch state as seen by a card.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum VariantList {
    /// Fetch not resolved yet.
    #[default]
    Pending,
    /// Fetch resolved (possibly to an empty list).
    Loaded(Vec<Variant>),
}

impl VariantList {
    /// Variants to resolve against; empty while pending.
    pub fn variants(&self) -> &[Variant] {
        match self {
            VariantList::Pending => &[],
            VariantList::Loaded(variants) => variants,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, VariantList::Pending)
    }

    pub fn get(&self, variant_id: &VariantId) -> Option<&Variant> {
        self.variants().iter().find(|v| &v.variant_id == variant_id)
    }
}

/// A catalog product as loaded from a fixture.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogProduct {
    pub product_id: ProductId,
    pub name: String,
    pub variants: Vec<Variant>,
}

/// Fixture file layout, with prices in major units.
#[derive(Debug, Clone, Deserialize)]
struct CatalogFixture {
    #[serde(default)]
    currency: Currency,
    products: Vec<ProductRecord>,
}

#[derive(Debug, Clone, Deserialize)]
struct ProductRecord {
    id: ProductId,
    name: String,
    variants: Vec<VariantRecord>,
}

#[derive(Debug, Clone, Deserialize)]
struct VariantRecord {
    id: VariantId,
    size: String,
    price: f64,
    original_price: Option<f64>,
    discount_label: Option<String>,
    #[serde(default)]
    image: ImageRef,
}

/// Catalog backed by in-memory fixture data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    currency: Currency,
    products: Vec<CatalogProduct>,
    index: HashMap<ProductId, usize>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currency the fixture is priced in.
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Load a JSON fixture (`{"currency": "INR", "products": [...]}`).
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let fixture: CatalogFixture = serde_json::from_str(json)?;
        let mut catalog = Self {
            currency: fixture.currency,
            ..Self::default()
        };
        for record in fixture.products {
            let variants = record
                .variants
                .into_iter()
                .map(|v| {
                    let price = Money::from_decimal(v.price, fixture.currency);
                    let original_price = v
                        .original_price
                        .map(|p| Money::from_decimal(p, fixture.currency))
                        .unwrap_or(price);
                    Variant {
                        variant_id: v.id,
                        product_id: record.id.clone(),
                        size: v.size,
                        price,
                        original_price,
                        discount_label: v
                            .discount_label
                            .unwrap_or_else(|| discount_label(price, original_price)),
                        image: v.image,
                    }
                })
                .collect();
            catalog.insert(record.id, record.name, variants);
        }
        Ok(catalog)
    }

    /// Add or replace a product.
    pub fn insert(&mut self, product_id: ProductId, name: impl Into<String>, variants: Vec<Variant>) {
        let product = CatalogProduct {
            product_id: product_id.clone(),
            name: name.into(),
            variants,
        };
        match self.index.get(&product_id) {
            Some(&i) => self.products[i] = product,
            None => {
                self.index.insert(product_id, self.products.len());
                self.products.push(product);
            }
        }
    }

    pub fn product(&self, product_id: &ProductId) -> Option<&CatalogProduct> {
        self.index.get(product_id).map(|&i| &self.products[i])
    }

    /// Products in fixture order.
    pub fn products(&self) -> &[CatalogProduct] {
        &self.products
    }

    /// Find a variant and its product name by variant id.
    pub fn find_variant(&self, variant_id: &VariantId) -> Option<(&CatalogProduct, &Variant)> {
        self.products.iter().find_map(|p| {
            p.variants
                .iter()
                .find(|v| &v.variant_id == variant_id)
                .map(|v| (p, v))
        })
    }
}

#[async_trait]
impl VariantCatalog for InMemoryCatalog {
    async fn fetch_variants(&self, product_id: &ProductId) -> Result<Vec<Variant>, CatalogError> {
        self.product(product_id)
            .map(|p| p.variants.clone())
            .ok_or_else(|| CatalogError::ProductNotFound(product_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "currency": "INR",
        "products": [
            {
                "id": "atta",
                "name": "Whole Wheat Atta",
                "variants": [
                    { "id": "atta-1kg", "size": "1 kg", "price": 126, "original_price": 150 },
                    { "id": "atta-5kg", "size": "5 kg", "price": 256, "original_price": 256,
                      "image": "img/atta-5kg.png" }
                ]
            }
        ]
    }"#;

    #[test]
    fn test_discount_label() {
        let label = discount_label(
            Money::from_major(126, Currency::INR),
            Money::from_major(150, Currency::INR),
        );
        assert_eq!(label, "16% OFF");
        assert_eq!(
            discount_label(Money::from_major(50, Currency::INR), Money::from_major(50, Currency::INR)),
            ""
        );
        assert_eq!(discount_label(Money::zero(Currency::INR), Money::zero(Currency::INR)), "");
    }

    #[test]
    fn test_fixture_loading() {
        let catalog = InMemoryCatalog::from_json(FIXTURE).unwrap();
        let product = catalog.product(&ProductId::new("atta")).unwrap();
        assert_eq!(product.variants.len(), 2);
        assert_eq!(product.variants[0].price.amount_minor, 12600);
        assert_eq!(product.variants[0].discount_label, "16% OFF");
        assert_eq!(product.variants[1].discount_label, "");
        assert_eq!(product.variants[1].image, ImageRef::new("img/atta-5kg.png"));

        let (owner, variant) = catalog.find_variant(&VariantId::new("atta-5kg")).unwrap();
        assert_eq!(owner.name, "Whole Wheat Atta");
        assert_eq!(variant.size, "5 kg");
    }

    #[test]
    fn test_fixture_currency() {
        assert_eq!(InMemoryCatalog::from_json(FIXTURE).unwrap().currency(), Currency::INR);

        let usd = InMemoryCatalog::from_json(
            r#"{"currency": "USD", "products": [
                {"id": "tea", "name": "Tea", "variants": [{"id": "tea-100", "size": "100 g", "price": 4.5}]}
            ]}"#,
        )
        .unwrap();
        assert_eq!(usd.currency(), Currency::USD);
        let (_, variant) = usd.find_variant(&VariantId::new("tea-100")).unwrap();
        assert_eq!(variant.price, Money::new(450, Currency::USD));
    }

    #[test]
    fn test_snapshot_copies_fields() {
        let catalog = InMemoryCatalog::from_json(FIXTURE).unwrap();
        let (product, variant) = catalog.find_variant(&VariantId::new("atta-1kg")).unwrap();
        let snap = variant.snapshot(&product.name);
        assert_eq!(snap.product_name, "Whole Wheat Atta");
        assert_eq!(snap.price, variant.price);
        assert_eq!(snap.original_price, variant.original_price);
    }

    #[test]
    fn test_pending_list_is_empty() {
        let list = VariantList::Pending;
        assert!(list.variants().is_empty());
        assert!(list.is_pending());
    }

    #[tokio::test]
    async fn test_fetch_failure_is_soft() {
        let catalog = InMemoryCatalog::from_json(FIXTURE).unwrap();
        let missing = fetch_variants_or_empty(&catalog, &ProductId::new("nope")).await;
        assert!(missing.is_empty());

        let many = fetch_many(&catalog, &[ProductId::new("atta"), ProductId::new("nope")]).await;
        assert_eq!(many.len(), 2);
        assert_eq!(many[0].1.len(), 2);
        assert!(many[1].1.is_empty());
    }
}
