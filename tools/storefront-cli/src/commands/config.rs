//! Configuration management commands.

use std::fs;

use anyhow::{bail, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::generate_default_config;
use crate::context::{Context, CONFIG_NAMES};

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx).await,
        ConfigCommand::Init { force } => init_config(force, ctx).await,
        ConfigCommand::Validate => validate_config(ctx).await,
    }
}

async fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");

    let engine = &ctx.config.engine;
    ctx.output.info("[engine]");
    ctx.output.kv("currency", engine.currency.code());
    ctx.output.kv("handling_charge", &engine.handling_charge().display());
    ctx.output.kv("delivery_fee", &engine.delivery_fee().display());
    ctx.output.kv("pin_timeout_ms", &engine.pin_timeout_ms.to_string());
    ctx.output
        .kv("offline_debounce_ms", &engine.offline_debounce_ms.to_string());

    ctx.output.info("[catalog]");
    ctx.output.kv("fixture", &ctx.config.catalog.fixture);

    Ok(())
}

async fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join(CONFIG_NAMES[0]);

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, generate_default_config())?;
    ctx.output
        .success(&format!("Created {}", config_path.display()));

    Ok(())
}

async fn validate_config(ctx: &Context) -> Result<()> {
    ctx.config.engine.validate()?;

    let fixture = ctx.resolve_path(&ctx.config.catalog.fixture);
    if !fixture.exists() {
        ctx.output.warn(&format!(
            "Catalog fixture not found: {}",
            fixture.display()
        ));
    }

    ctx.output.success("Configuration is valid");
    Ok(())
}
