//! Settings command - defaults applied to new invoices.

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use clap::{Args, Subcommand};
use console::style;

use papertrail_core::AppSettings;

use super::{Context, json_get, json_set, parse_value};

/// Arguments for the settings command.
#[derive(Args)]
pub struct SettingsArgs {
    #[command(subcommand)]
    command: SettingsCommand,
}

#[derive(Subcommand)]
enum SettingsCommand {
    /// Show the effective settings (stored values merged over defaults)
    Show,

    /// Get a specific setting
    Get {
        /// Setting key (e.g., "invoicePrefix", "branding.primaryColor")
        key: String,
    },

    /// Set a setting
    Set {
        /// Setting key
        key: String,
        /// New value
        value: String,
    },

    /// Apply a preset color theme to the default branding
    Theme {
        /// Theme name (default, dark, pinkHell, blueNight, greenGrass)
        name: String,
    },

    /// Use an image file as the default logo
    Logo {
        /// Image file (png, jpg, gif, svg, webp)
        path: PathBuf,
    },

    /// Restore all defaults
    Reset,
}

pub fn run(args: SettingsArgs, ctx: &Context) -> anyhow::Result<()> {
    match args.command {
        SettingsCommand::Show => show_settings(ctx),
        SettingsCommand::Get { key } => get_setting(&key, ctx),
        SettingsCommand::Set { key, value } => set_setting(&key, &value, ctx),
        SettingsCommand::Theme { name } => apply_theme(&name, ctx),
        SettingsCommand::Logo { path } => set_logo(&path, ctx),
        SettingsCommand::Reset => reset_settings(ctx),
    }
}

fn show_settings(ctx: &Context) -> anyhow::Result<()> {
    let settings = ctx.open_repository()?.settings()?;
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

fn get_setting(key: &str, ctx: &Context) -> anyhow::Result<()> {
    let json = serde_json::to_value(ctx.open_repository()?.settings()?)?;
    println!("{}", serde_json::to_string_pretty(json_get(&json, key)?)?);
    Ok(())
}

fn set_setting(key: &str, value: &str, ctx: &Context) -> anyhow::Result<()> {
    let mut repo = ctx.open_repository()?;

    let mut json = serde_json::to_value(repo.settings()?)?;
    let parsed_value = parse_value(&json, key, value);
    json_set(&mut json, key, parsed_value)?;
    let mut settings: AppSettings = serde_json::from_value(json)
        .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e))?;
    let scale = settings.pdf_settings.scale;
    settings.pdf_settings.set_scale(scale);
    repo.save_settings(&settings)?;

    // Echo what was stored, which may differ from the input after clamping.
    let stored = serde_json::to_value(&settings)?;
    println!(
        "{} Set {} = {}",
        style("✓").green(),
        key,
        serde_json::to_string(json_get(&stored, key)?)?
    );

    Ok(())
}

fn apply_theme(name: &str, ctx: &Context) -> anyhow::Result<()> {
    let theme = super::parse_theme(name)?;

    let mut repo = ctx.open_repository()?;
    let mut settings = repo.settings()?;
    settings.branding.apply_theme(theme);
    repo.save_settings(&settings)?;

    println!("{} Applied theme {}", style("✓").green(), name);
    Ok(())
}

fn set_logo(path: &Path, ctx: &Context) -> anyhow::Result<()> {
    let mime = match path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
        .as_str()
    {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        other => anyhow::bail!("Unsupported image format: {}", other),
    };

    let bytes = std::fs::read(path)?;
    let data_url = format!("data:{};base64,{}", mime, STANDARD.encode(&bytes));

    let mut repo = ctx.open_repository()?;
    let mut settings = repo.settings()?;
    settings.branding.logo = data_url;
    repo.save_settings(&settings)?;

    println!(
        "{} Logo set from {} ({} bytes)",
        style("✓").green(),
        path.display(),
        bytes.len()
    );
    Ok(())
}

fn reset_settings(ctx: &Context) -> anyhow::Result<()> {
    ctx.open_repository()?.reset_settings()?;
    println!("{} Settings reset to defaults", style("✓").green());
    Ok(())
}
