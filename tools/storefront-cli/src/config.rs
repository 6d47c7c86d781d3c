//! CLI configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use storefront_cart::EngineConfig;

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Cart engine settings.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Catalog fixture settings.
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Self = if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))?
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))?
        };

        config
            .engine
            .validate()
            .with_context(|| format!("Invalid engine settings in {}", path))?;
        Ok(config)
    }
}

/// Catalog fixture location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Path to the JSON catalog fixture, relative to the working directory.
    #[serde(default = "default_fixture")]
    pub fixture: String,
}

fn default_fixture() -> String {
    "catalog.json".to_string()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            fixture: default_fixture(),
        }
    }
}

/// Generate a default storefront.toml config file.
pub fn generate_default_config() -> String {
    r#"# Storefront cart engine configuration

[engine]
currency = "INR"
# Charges in major units
handling_charge = 4.0
delivery_fee = 0.0
# Upper bound on the add-to-cart pin window
pin_timeout_ms = 100
# Offline signals shorter than this are ignored
offline_debounce_ms = 2500

[catalog]
fixture = "catalog.json"
"#
    .to_string()
}
