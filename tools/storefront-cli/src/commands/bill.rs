//! Bill summary for a saved cart.

use std::fs;

use anyhow::{bail, Context as _, Result};
use storefront_cart::{BillSummary, CartLine, CartSnapshot, Money};

use super::BillArgs;
use crate::context::Context;

/// Run the bill command.
pub async fn run(args: BillArgs, ctx: &Context) -> Result<()> {
    let path = ctx.resolve_path(&args.cart);
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read cart file: {}", path.display()))?;
    let lines: Vec<CartLine> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse cart file: {}", path.display()))?;

    let aggregator = ctx.config.engine.build_aggregator();
    let currency = aggregator.currency();
    if let Some(line) = lines.iter().find(|l| l.price.currency != currency) {
        bail!(
            "Line {} is priced in {}, expected {}",
            line.variant_id,
            line.price.currency.code(),
            currency.code()
        );
    }

    // Same normalization the store applies: merged, positive quantities only.
    let cart = CartSnapshot::from_lines(lines);
    let tip = args.tip.map(|t| Money::from_decimal(t, currency));
    let coupon = args.coupon.map(|c| Money::from_decimal(c, currency));
    let summary = aggregator.summarize_with(cart.lines(), tip, coupon);

    print_summary(&summary, ctx);
    Ok(())
}

/// Print a bill summary in the checkout screen's order.
pub fn print_summary(summary: &BillSummary, ctx: &Context) {
    if ctx.output.is_json() {
        ctx.output.json(summary);
        return;
    }

    ctx.output.header("Bill Summary");
    ctx.output.kv("Items", &summary.item_count.to_string());
    ctx.output.kv("Item total", &summary.item_total.display());
    ctx.output
        .kv("Item total (MRP)", &summary.item_total_original.display());
    if !summary.total_savings.is_zero() {
        ctx.output.kv("You save", &summary.total_savings.display());
    }
    ctx.output.kv("Handling", &summary.handling_charge.display());
    ctx.output.kv("Delivery", &summary.delivery_fee.display());
    if !summary.tip.is_zero() {
        ctx.output.kv("Tip", &summary.tip.display());
    }
    if !summary.coupon_discount.is_zero() {
        ctx.output
            .kv("Coupon", &format!("-{}", summary.coupon_discount.display()));
    }
    ctx.output.kv("To pay", &summary.total_bill.display());
}
