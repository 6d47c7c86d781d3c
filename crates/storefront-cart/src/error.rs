//! Error types.
//!
//! Cart mutations have no error type: an invalid target is a no-op. Errors
//! only come from the edges of the engine, catalog fetches and config loading.

use thiserror::Error;

/// Errors reported by a [`VariantCatalog`](crate::catalog::VariantCatalog).
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// The catalog backend could not be reached.
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),

    /// The catalog returned data that could not be decoded.
    #[error("Invalid catalog data: {0}")]
    InvalidData(String),
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::InvalidData(e.to_string())
    }
}

/// Errors loading an [`EngineConfig`](crate::config::EngineConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}
