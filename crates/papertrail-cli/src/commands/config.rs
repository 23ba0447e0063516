//! Config command - manage configuration.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;

use papertrail_core::models::config::PapertrailConfig;

use super::{Context, ensure_parent, json_get, json_set, parse_value};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Initialize a new configuration file
    Init(InitArgs),

    /// Get a specific configuration value
    Get {
        /// Configuration key (e.g., "storage.file_name")
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// New value
        value: String,
    },

    /// Show configuration file and store paths
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Output path for configuration file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

pub fn run(args: ConfigArgs, ctx: &Context) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init(init_args) => init_config(init_args, ctx),
        ConfigCommand::Get { key } => get_config(&key, ctx),
        ConfigCommand::Set { key, value } => set_config(&key, &value, ctx),
        ConfigCommand::Path => show_path(ctx),
    }
}

fn show_config(ctx: &Context) -> anyhow::Result<()> {
    if !ctx.config_path().exists() {
        println!(
            "{} No config file found, showing defaults.",
            style("ℹ").blue()
        );
    }

    let config = ctx.load_config()?;
    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}

fn init_config(args: InitArgs, ctx: &Context) -> anyhow::Result<()> {
    let output_path = args.output.unwrap_or_else(|| ctx.config_path());

    if output_path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            output_path.display()
        );
    }

    ensure_parent(&output_path)?;
    PapertrailConfig::default().save(&output_path)?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        output_path.display()
    );

    Ok(())
}

fn get_config(key: &str, ctx: &Context) -> anyhow::Result<()> {
    let json = serde_json::to_value(ctx.load_config()?)?;
    println!("{}", serde_json::to_string_pretty(json_get(&json, key)?)?);
    Ok(())
}

fn set_config(key: &str, value: &str, ctx: &Context) -> anyhow::Result<()> {
    let config_path = ctx.config_path();

    // Convert config to JSON, modify, and convert back
    let mut json = serde_json::to_value(ctx.load_config()?)?;
    let parsed_value = parse_value(&json, key, value);
    json_set(&mut json, key, parsed_value.clone())?;
    let config: PapertrailConfig = serde_json::from_value(json)?;

    ensure_parent(&config_path)?;
    config.save(&config_path)?;

    println!(
        "{} Set {} = {}",
        style("✓").green(),
        key,
        serde_json::to_string(&parsed_value)?
    );

    Ok(())
}

fn show_path(ctx: &Context) -> anyhow::Result<()> {
    let config_path = ctx.config_path();

    println!("Configuration file: {}", config_path.display());

    if config_path.exists() {
        println!("Status: {}", style("exists").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!();
        println!("Run 'papertrail config init' to create a configuration file.");
    }

    println!("Store file: {}", ctx.store_path()?.display());

    Ok(())
}
