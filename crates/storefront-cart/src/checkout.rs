//! Bill summary derived from cart lines.

use serde::{Deserialize, Serialize};

use crate::money::{Currency, Money};
use crate::store::{total_quantity, CartLine};

/// Order-level charges and credits applied on top of the item total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderCharges {
    pub handling_charge: Money,
    pub delivery_fee: Money,
    pub tip: Option<Money>,
    pub coupon_discount: Option<Money>,
}

impl OrderCharges {
    /// No charges at all.
    pub fn none(currency: Currency) -> Self {
        Self {
            handling_charge: Money::zero(currency),
            delivery_fee: Money::zero(currency),
            tip: None,
            coupon_discount: None,
        }
    }
}

/// Totals shown on the checkout screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillSummary {
    /// Σ price × quantity.
    pub item_total: Money,
    /// Σ original price × quantity.
    pub item_total_original: Money,
    /// `item_total_original - item_total`, never negative.
    pub total_savings: Money,
    pub handling_charge: Money,
    pub delivery_fee: Money,
    pub tip: Money,
    pub coupon_discount: Money,
    /// Grand total, never negative.
    pub total_bill: Money,
    pub item_count: i64,
}

/// Reduce cart lines and order charges to a bill summary.
///
/// Amounts are summed in `currency` minor units without intermediate
/// rounding. Negative tip or coupon inputs count as zero.
pub fn summarize(lines: &[CartLine], charges: &OrderCharges, currency: Currency) -> BillSummary {
    let item_total = Money::sum(lines.iter().map(CartLine::line_total), currency);
    let item_total_original = Money::sum(lines.iter().map(CartLine::line_total_original), currency);
    let total_savings = item_total_original
        .saturating_sub(item_total)
        .clamp_non_negative();

    let tip = charges
        .tip
        .map(Money::clamp_non_negative)
        .unwrap_or_else(|| Money::zero(currency));
    let coupon_discount = charges
        .coupon_discount
        .map(Money::clamp_non_negative)
        .unwrap_or_else(|| Money::zero(currency));

    let total_bill = Money::sum(
        [item_total, charges.handling_charge, charges.delivery_fee, tip],
        currency,
    )
    .saturating_sub(coupon_discount)
    .clamp_non_negative();

    BillSummary {
        item_total,
        item_total_original,
        total_savings,
        handling_charge: charges.handling_charge,
        delivery_fee: charges.delivery_fee,
        tip,
        coupon_discount,
        total_bill,
        item_count: total_quantity(lines),
    }
}

/// Summarizer carrying the storefront's standing charges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckoutAggregator {
    currency: Currency,
    handling_charge: Money,
    delivery_fee: Money,
}

impl CheckoutAggregator {
    pub fn new(currency: Currency, handling_charge: Money, delivery_fee: Money) -> Self {
        Self {
            currency,
            handling_charge,
            delivery_fee,
        }
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Summarize with explicit charges.
    pub fn summarize(&self, lines: &[CartLine], charges: &OrderCharges) -> BillSummary {
        summarize(lines, charges, self.currency)
    }

    /// Summarize with the standing handling charge and delivery fee.
    pub fn summarize_with(&self, lines: &[CartLine], tip: Option<Money>, coupon_discount: Option<Money>) -> BillSummary {
        let charges = OrderCharges {
            handling_charge: self.handling_charge,
            delivery_fee: self.delivery_fee,
            tip,
            coupon_discount,
        };
        summarize(lines, &charges, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ImageRef;
    use crate::ids::{ProductId, VariantId};

    fn inr(amount: i64) -> Money {
        Money::from_major(amount, Currency::INR)
    }

    fn line(id: &str, price: i64, original: i64, quantity: i64) -> CartLine {
        CartLine {
            variant_id: VariantId::new(id),
            product_id: ProductId::new("p"),
            product_name: "Item".to_string(),
            size: "1 pc".to_string(),
            image: ImageRef::default(),
            price: inr(price),
            original_price: inr(original),
            discount_label: String::new(),
            quantity,
        }
    }

    fn sample_lines() -> Vec<CartLine> {
        vec![line("a", 100, 120, 2), line("b", 50, 50, 1)]
    }

    #[test]
    fn test_bill_summary() {
        let charges = OrderCharges {
            handling_charge: inr(5),
            ..OrderCharges::none(Currency::INR)
        };
        let bill = summarize(&sample_lines(), &charges, Currency::INR);

        assert_eq!(bill.item_total, inr(250));
        assert_eq!(bill.item_total_original, inr(290));
        assert_eq!(bill.total_savings, inr(40));
        assert_eq!(bill.total_bill, inr(255));
        assert_eq!(bill.item_count, 3);
    }

    #[test]
    fn test_coupon_clamps_to_zero() {
        let charges = OrderCharges {
            handling_charge: inr(5),
            coupon_discount: Some(inr(1000)),
            ..OrderCharges::none(Currency::INR)
        };
        let bill = summarize(&sample_lines(), &charges, Currency::INR);
        assert!(bill.total_bill.is_zero());
    }

    #[test]
    fn test_savings_never_negative() {
        let lines = [line("a", 120, 100, 1)];
        let bill = summarize(&lines, &OrderCharges::none(Currency::INR), Currency::INR);
        assert!(bill.total_savings.is_zero());
        assert_eq!(bill.total_bill, inr(120));
    }

    #[test]
    fn test_tip_and_negative_inputs() {
        let aggregator = CheckoutAggregator::new(Currency::INR, inr(4), inr(30));
        let bill = aggregator.summarize_with(&sample_lines(), Some(inr(20)), Some(inr(-10)));
        assert_eq!(bill.tip, inr(20));
        assert!(bill.coupon_discount.is_zero());
        assert_eq!(bill.total_bill, inr(250 + 4 + 30 + 20));
    }

    #[test]
    fn test_item_count_saturates() {
        let lines = [line("a", 1, 1, i64::MAX), line("b", 1, 1, 3)];
        let bill = summarize(&lines, &OrderCharges::none(Currency::INR), Currency::INR);
        assert_eq!(bill.item_count, i64::MAX);
    }

    #[test]
    fn test_empty_cart() {
        let aggregator = CheckoutAggregator::new(Currency::INR, inr(4), Money::zero(Currency::INR));
        let bill = aggregator.summarize_with(&[], None, None);
        assert!(bill.item_total.is_zero());
        assert_eq!(bill.total_bill, inr(4));
        assert_eq!(bill.item_count, 0);
    }
}
