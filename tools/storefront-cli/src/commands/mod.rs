//! CLI command implementations.

pub mod bill;
pub mod catalog;
pub mod config;
pub mod simulate;

use clap::{Args, Subcommand};

/// Arguments for the simulate command.
#[derive(Args)]
pub struct SimulateArgs {
    /// Script of UI actions (JSON).
    pub script: String,

    /// Only show cards for these products.
    #[arg(short, long)]
    pub product: Vec<String>,

    /// Tip added to the final bill, in major units.
    #[arg(long)]
    pub tip: Option<f64>,

    /// Write the final cart lines to this file.
    #[arg(long)]
    pub save: Option<String>,
}

/// Arguments for the bill command.
#[derive(Args)]
pub struct BillArgs {
    /// Cart file (JSON list of lines).
    pub cart: String,

    /// Tip, in major units.
    #[arg(long)]
    pub tip: Option<f64>,

    /// Coupon discount, in major units.
    #[arg(long)]
    pub coupon: Option<f64>,
}

/// Arguments for the catalog command.
#[derive(Args)]
pub struct CatalogArgs {
    /// Show a single product.
    #[arg(short, long)]
    pub product: Option<String>,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate configuration.
    Validate,
}
