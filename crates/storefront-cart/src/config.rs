//! Engine configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::checkout::CheckoutAggregator;
use crate::error::ConfigError;
use crate::money::{Currency, Money};
use crate::pinning::PinRegistry;
use crate::sequencer::CartMutationSequencer;
use crate::store::CartStore;

/// Tunables for the cart engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Currency every price is expressed in.
    #[serde(default)]
    pub currency: Currency,

    /// Handling charge per order, in major units.
    #[serde(default)]
    pub handling_charge: f64,

    /// Delivery fee per order, in major units.
    #[serde(default)]
    pub delivery_fee: f64,

    /// Upper bound on a variant's pin during an add sequence.
    #[serde(default = "default_pin_timeout_ms")]
    pub pin_timeout_ms: u64,

    /// How long an offline signal must persist before it is acted on.
    #[serde(default = "default_offline_debounce_ms")]
    pub offline_debounce_ms: u64,
}

fn default_pin_timeout_ms() -> u64 {
    100
}

fn default_offline_debounce_ms() -> u64 {
    2500
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            currency: Currency::default(),
            handling_charge: 0.0,
            delivery_fee: 0.0,
            pin_timeout_ms: default_pin_timeout_ms(),
            offline_debounce_ms: default_offline_debounce_ms(),
        }
    }
}

impl EngineConfig {
    /// Parse from TOML.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file; `.json` files are parsed as JSON, anything else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        if path.extension().is_some_and(|ext| ext == "json") {
            let config: Self = serde_json::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Self::from_toml_str(&content)
        }
    }

    /// Reject values the engine cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.handling_charge.is_finite() || self.handling_charge < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "handling_charge must be a non-negative amount, got {}",
                self.handling_charge
            )));
        }
        if !self.delivery_fee.is_finite() || self.delivery_fee < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "delivery_fee must be a non-negative amount, got {}",
                self.delivery_fee
            )));
        }
        if self.pin_timeout_ms == 0 {
            return Err(ConfigError::Invalid("pin_timeout_ms must be positive".to_string()));
        }
        Ok(())
    }

    pub fn pin_timeout(&self) -> Duration {
        Duration::from_millis(self.pin_timeout_ms)
    }

    pub fn offline_debounce(&self) -> Duration {
        Duration::from_millis(self.offline_debounce_ms)
    }

    pub fn handling_charge(&self) -> Money {
        Money::from_decimal(self.handling_charge, self.currency)
    }

    pub fn delivery_fee(&self) -> Money {
        Money::from_decimal(self.delivery_fee, self.currency)
    }

    /// An empty store in the configured currency.
    pub fn build_store(&self) -> CartStore {
        CartStore::new(self.currency)
    }

    /// A sequencer over `store` with the configured pin timeout.
    pub fn build_sequencer(&self, store: CartStore, pins: PinRegistry) -> CartMutationSequencer {
        CartMutationSequencer::new(store, pins).with_pin_ttl(self.pin_timeout())
    }

    pub fn build_aggregator(&self) -> CheckoutAggregator {
        CheckoutAggregator::new(self.currency, self.handling_charge(), self.delivery_fee())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.pin_timeout(), Duration::from_millis(100));
        assert_eq!(config.offline_debounce(), Duration::from_millis(2500));
    }

    #[test]
    fn test_parse_toml() {
        let config = EngineConfig::from_toml_str(
            r#"
            currency = "INR"
            handling_charge = 4.5
            delivery_fee = 25
            pin_timeout_ms = 250
            "#,
        )
        .unwrap();
        assert_eq!(config.handling_charge().amount_minor, 450);
        assert_eq!(config.delivery_fee().amount_minor, 2500);
        assert_eq!(config.pin_timeout(), Duration::from_millis(250));

        let aggregator = config.build_aggregator();
        let bill = aggregator.summarize_with(&[], None, None);
        assert_eq!(bill.total_bill.amount_minor, 2950);
    }

    #[test]
    fn test_rejects_negative_charges() {
        assert!(matches!(
            EngineConfig::from_toml_str("handling_charge = -1.0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("pin_timeout_ms = 0"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_rejects_unknown_currency() {
        assert!(matches!(
            EngineConfig::from_toml_str(r#"currency = "XYZ""#),
            Err(ConfigError::Toml(_))
        ));
    }
}
