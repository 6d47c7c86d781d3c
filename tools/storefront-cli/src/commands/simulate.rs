//! Replay a script of storefront UI actions against the cart engine.

use std::collections::HashMap;
use std::fs;

use anyhow::{bail, Context as _, Result};
use serde::{Deserialize, Serialize};
use storefront_cart::prelude::*;

use super::bill::print_summary;
use super::SimulateArgs;
use crate::context::Context;
use crate::output::source_badge;

/// A recorded sequence of UI actions.
#[derive(Debug, Deserialize)]
pub struct Script {
    pub steps: Vec<Step>,
}

/// One UI action, tagged by `action`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// ADD button on a card or the variant sheet.
    Add { variant: VariantId },
    /// `+` on a stepper.
    Increase { variant: VariantId },
    /// `-` on a stepper.
    Decrease { variant: VariantId },
    /// Quantity typed into a cart row.
    Set { variant: VariantId, quantity: i64 },
    /// Delete a cart row.
    Remove { variant: VariantId },
    /// Pick a size in the variant sheet.
    Select { product: ProductId, variant: VariantId },
    /// Empty the cart.
    Clear,
}

impl Step {
    fn describe(&self) -> String {
        match self {
            Step::Add { variant } => format!("add {}", variant),
            Step::Increase { variant } => format!("+ {}", variant),
            Step::Decrease { variant } => format!("- {}", variant),
            Step::Set { variant, quantity } => format!("set {} = {}", variant, quantity),
            Step::Remove { variant } => format!("remove {}", variant),
            Step::Select { product, variant } => format!("select {} on {}", variant, product),
            Step::Clear => "clear cart".to_string(),
        }
    }
}

/// State of one product card after the replay.
#[derive(Debug, Serialize)]
struct CardView {
    product_id: ProductId,
    name: String,
    active: Option<ActiveVariant>,
}

#[derive(Serialize)]
struct Report<'a> {
    lines: &'a [CartLine],
    cards: &'a [CardView],
    bill: &'a BillSummary,
}

/// Run the simulate command.
pub async fn run(args: SimulateArgs, ctx: &Context) -> Result<()> {
    let path = ctx.resolve_path(&args.script);
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read script: {}", path.display()))?;
    let script: Script = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse script: {}", path.display()))?;

    let catalog = ctx.load_catalog()?;
    let engine = &ctx.config.engine;
    check_currency(&catalog, engine.currency)?;
    let sequencer = engine.build_sequencer(engine.build_store(), PinRegistry::new());
    let resolver = sequencer.resolver();
    let mut selections: HashMap<ProductId, ActiveVariantSelection> = HashMap::new();

    if !ctx.output.is_json() {
        ctx.output.header("Replaying script");
    }
    let total = script.steps.len();
    for (i, step) in script.steps.iter().enumerate() {
        let quantity = apply_step(step, &catalog, &sequencer, &mut selections).await?;
        let msg = match quantity {
            Some(q) => format!("{} -> {}", step.describe(), q),
            None => step.describe(),
        };
        ctx.output.step(i + 1, total, &msg);
        ctx.output.debug(&format!(
            "revision {}, {} items",
            sequencer.store().revision(),
            sequencer.store().total_items()
        ));
        tracing::debug!(step = i + 1, revision = sequencer.store().revision(), "applied");
    }

    let snapshot = sequencer.store().snapshot();
    let product_ids: Vec<ProductId> = catalog
        .products()
        .iter()
        .map(|p| p.product_id.clone())
        .filter(|id| args.product.is_empty() || args.product.iter().any(|p| p == id.as_str()))
        .collect();

    let mut cards = Vec::with_capacity(product_ids.len());
    for (product_id, variants) in fetch_many(&catalog, &product_ids).await {
        let name = catalog
            .product(&product_id)
            .map(|p| p.name.clone())
            .unwrap_or_default();
        let active = match selections.get(&product_id) {
            Some(selection) => selection.resolve(&resolver, &variants, &snapshot),
            None => resolver.resolve_active(&variants, None, &snapshot),
        };
        cards.push(CardView {
            product_id,
            name,
            active,
        });
    }

    let tip = args.tip.map(|t| Money::from_decimal(t, engine.currency));
    let bill = engine
        .build_aggregator()
        .summarize_with(snapshot.lines(), tip, None);

    if let Some(save) = &args.save {
        let save_path = ctx.resolve_path(save);
        fs::write(&save_path, serde_json::to_string_pretty(snapshot.lines())?)
            .with_context(|| format!("Failed to write cart: {}", save_path.display()))?;
        ctx.output.success(&format!("Saved cart to {}", save_path.display()));
    }

    if ctx.output.is_json() {
        ctx.output.json(&Report {
            lines: snapshot.lines(),
            cards: &cards,
            bill: &bill,
        });
        return Ok(());
    }

    print_lines(snapshot.lines(), ctx);
    print_cards(&cards, ctx);
    print_summary(&bill, ctx);
    Ok(())
}

/// Apply one step. Returns the resulting stored quantity for cart mutations.
async fn apply_step(
    step: &Step,
    catalog: &InMemoryCatalog,
    sequencer: &CartMutationSequencer,
    selections: &mut HashMap<ProductId, ActiveVariantSelection>,
) -> Result<Option<i64>> {
    let quantity = match step {
        Step::Add { variant } => {
            let snapshot = lookup(catalog, variant)?;
            Some(sequencer.add_fresh_deferred(&snapshot).await)
        }
        Step::Increase { variant } => Some(sequencer.increase(&lookup(catalog, variant)?)),
        Step::Decrease { variant } => Some(sequencer.decrease(variant)),
        Step::Set { variant, quantity } => Some(sequencer.set_variant_quantity(variant, *quantity)),
        Step::Remove { variant } => {
            sequencer.remove(variant);
            Some(0)
        }
        Step::Select { product, variant } => {
            if catalog.product(product).is_none() {
                bail!("Unknown product: {}", product);
            }
            selections
                .entry(product.clone())
                .or_insert_with(|| ActiveVariantSelection::new(product.clone()))
                .select(variant.clone());
            None
        }
        Step::Clear => {
            // Size choices are card state and outlive the cart contents.
            sequencer.store().clear();
            None
        }
    };
    Ok(quantity)
}

/// Reject a fixture priced in a currency other than the engine's.
fn check_currency(catalog: &InMemoryCatalog, expected: Currency) -> Result<()> {
    if catalog.currency() != expected {
        bail!(
            "Catalog fixture is priced in {}, engine expects {}",
            catalog.currency().code(),
            expected.code()
        );
    }
    Ok(())
}

fn lookup(catalog: &InMemoryCatalog, variant_id: &VariantId) -> Result<VariantSnapshot> {
    match catalog.find_variant(variant_id) {
        Some((product, variant)) => Ok(variant.snapshot(product.name.as_str())),
        None => bail!("Unknown variant: {}", variant_id),
    }
}

fn print_lines(lines: &[CartLine], ctx: &Context) {
    ctx.output.header("Cart");
    if lines.is_empty() {
        ctx.output.info("Cart is empty");
        return;
    }
    let widths = [10, 24, 10, 4, 10];
    ctx.output
        .table_row(&["VARIANT", "PRODUCT", "SIZE", "QTY", "TOTAL"], &widths);
    for line in lines {
        let quantity = line.quantity.to_string();
        let total = line.line_total().display();
        ctx.output.table_row(
            &[
                line.variant_id.as_str(),
                &line.product_name,
                &line.size,
                &quantity,
                &total,
            ],
            &widths,
        );
    }
}

fn print_cards(cards: &[CardView], ctx: &Context) {
    ctx.output.header("Product cards");
    for card in cards {
        match &card.active {
            Some(active) => ctx.output.list_item(&format!(
                "{}: {} x{} ({})",
                card.name,
                active.variant_id,
                active.display_quantity,
                source_badge(active.source)
            )),
            None => ctx.output.list_item(&format!("{}: loading", card.name)),
        }
    }
}
