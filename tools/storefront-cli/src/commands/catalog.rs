//! Catalog listing.

use anyhow::{bail, Result};
use serde::Serialize;
use storefront_cart::catalog::CatalogProduct;
use storefront_cart::ProductId;

use super::CatalogArgs;
use crate::context::Context;
use crate::output::discount_badge;

#[derive(Serialize)]
struct VariantRow<'a> {
    product_id: &'a str,
    variant_id: &'a str,
    size: &'a str,
    price: String,
    original_price: String,
    discount_label: &'a str,
}

/// Run the catalog command.
pub async fn run(args: CatalogArgs, ctx: &Context) -> Result<()> {
    let catalog = ctx.load_catalog()?;

    let products: Vec<&CatalogProduct> = match args.product {
        Some(id) => match catalog.product(&ProductId::new(id.as_str())) {
            Some(product) => vec![product],
            None => bail!("Product not found: {}", id),
        },
        None => catalog.products().iter().collect(),
    };

    if ctx.output.is_json() {
        let rows: Vec<VariantRow<'_>> = products
            .iter()
            .flat_map(|p| p.variants.iter())
            .map(|v| VariantRow {
                product_id: v.product_id.as_str(),
                variant_id: v.variant_id.as_str(),
                size: &v.size,
                price: v.price.display(),
                original_price: v.original_price.display(),
                discount_label: &v.discount_label,
            })
            .collect();
        ctx.output.json(&rows);
        return Ok(());
    }

    let widths = [12, 10, 10, 10, 10];
    for product in products {
        ctx.output
            .header(&format!("{} ({})", product.name, product.product_id));
        if product.variants.is_empty() {
            ctx.output.list_item("no variants");
            continue;
        }
        ctx.output
            .table_row(&["VARIANT", "SIZE", "PRICE", "MRP", "OFFER"], &widths);
        for variant in &product.variants {
            let price = variant.price.display();
            let original = variant.original_price.display();
            let badge = discount_badge(&variant.discount_label);
            ctx.output.table_row(
                &[
                    variant.variant_id.as_str(),
                    &variant.size,
                    &price,
                    &original,
                    &badge,
                ],
                &widths,
            );
        }
    }

    Ok(())
}
