//! Money type for prices and bill amounts.
//!
//! Amounts are integers in the currency's minor unit (paise for INR). Every
//! sum the cart and checkout compute is exact; rounding only happens when a
//! value is formatted for display.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    INR,
    USD,
    EUR,
    GBP,
    JPY,
}

impl Currency {
    /// Get the currency code (e.g., "INR").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::INR => "INR",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
        }
    }

    /// Get the currency symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::INR => "\u{20b9}",
            Currency::USD => "$",
            Currency::EUR => "\u{20ac}",
            Currency::GBP => "\u{00a3}",
            Currency::JPY => "\u{00a5}",
        }
    }

    /// Number of decimal places in the minor unit.
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Minor units per major unit (100 for INR, 1 for JPY).
    pub fn minor_per_major(&self) -> i64 {
        10_i64.pow(self.decimal_places())
    }

    /// Parse a currency code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_uppercase().as_str() {
            "INR" => Some(Currency::INR),
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            "GBP" => Some(Currency::GBP),
            "JPY" => Some(Currency::JPY),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A monetary value with currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in the smallest currency unit.
    pub amount_minor: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a value from minor units.
    pub fn new(amount_minor: i64, currency: Currency) -> Self {
        Self {
            amount_minor,
            currency,
        }
    }

    /// Create a value from whole major units.
    ///
    /// ```
    /// use storefront_cart::money::{Currency, Money};
    /// assert_eq!(Money::from_major(126, Currency::INR).amount_minor, 12600);
    /// ```
    pub fn from_major(amount: i64, currency: Currency) -> Self {
        Self::new(amount.saturating_mul(currency.minor_per_major()), currency)
    }

    /// Create a value from a decimal amount, rounding once to the minor unit.
    pub fn from_decimal(amount: f64, currency: Currency) -> Self {
        let amount_minor = (amount * currency.minor_per_major() as f64).round() as i64;
        Self::new(amount_minor, currency)
    }

    /// A zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    pub fn is_zero(&self) -> bool {
        self.amount_minor == 0
    }

    pub fn is_negative(&self) -> bool {
        self.amount_minor < 0
    }

    /// Convert to a decimal value.
    pub fn to_decimal(&self) -> f64 {
        self.amount_minor as f64 / self.currency.minor_per_major() as f64
    }

    /// Format for display (e.g., "₹126.00").
    pub fn display(&self) -> String {
        let places = self.currency.decimal_places() as usize;
        if self.is_negative() {
            format!("-{}{:.places$}", self.currency.symbol(), -self.to_decimal())
        } else {
            format!("{}{:.places$}", self.currency.symbol(), self.to_decimal())
        }
    }

    /// Add another amount, saturating at the numeric bounds.
    ///
    /// The result keeps `self`'s currency; a store holds a single currency.
    pub fn saturating_add(self, other: Money) -> Money {
        Money::new(self.amount_minor.saturating_add(other.amount_minor), self.currency)
    }

    /// Subtract another amount, saturating at the numeric bounds.
    pub fn saturating_sub(self, other: Money) -> Money {
        Money::new(self.amount_minor.saturating_sub(other.amount_minor), self.currency)
    }

    /// Multiply by a quantity, saturating at the numeric bounds.
    pub fn times(self, quantity: i64) -> Money {
        Money::new(self.amount_minor.saturating_mul(quantity), self.currency)
    }

    /// Clamp negative amounts to zero.
    pub fn clamp_non_negative(self) -> Money {
        Money::new(self.amount_minor.max(0), self.currency)
    }

    /// Sum an iterator of amounts into the given currency.
    pub fn sum(iter: impl IntoIterator<Item = Money>, currency: Currency) -> Money {
        iter.into_iter()
            .fold(Money::zero(currency), |acc, m| acc.saturating_add(m))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_major() {
        let m = Money::from_major(256, Currency::INR);
        assert_eq!(m.amount_minor, 25600);
        assert_eq!(m.display(), "\u{20b9}256.00");
    }

    #[test]
    fn test_money_from_decimal() {
        assert_eq!(Money::from_decimal(49.99, Currency::USD).amount_minor, 4999);
        assert_eq!(Money::from_decimal(100.0, Currency::JPY).amount_minor, 100);
    }

    #[test]
    fn test_money_times_and_sum() {
        let price = Money::from_major(100, Currency::INR);
        let total = Money::sum([price.times(2), Money::from_major(50, Currency::INR)], Currency::INR);
        assert_eq!(total, Money::from_major(250, Currency::INR));
    }

    #[test]
    fn test_money_saturates() {
        let big = Money::new(i64::MAX, Currency::INR);
        assert_eq!(big.saturating_add(Money::new(1, Currency::INR)).amount_minor, i64::MAX);
        assert_eq!(big.times(3).amount_minor, i64::MAX);
    }

    #[test]
    fn test_money_clamp_and_negative_display() {
        let m = Money::new(-250, Currency::INR);
        assert_eq!(m.display(), "-\u{20b9}2.50");
        assert!(m.clamp_non_negative().is_zero());
    }

    #[test]
    fn test_currency_from_code() {
        assert_eq!(Currency::from_code("inr"), Some(Currency::INR));
        assert_eq!(Currency::from_code("XYZ"), None);
    }
}
