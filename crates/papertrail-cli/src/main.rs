//! CLI application for the papertrail invoice builder.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{client, config, invoice, settings, Context};

/// papertrail - Build and track invoices from the command line
#[derive(Parser)]
#[command(name = "papertrail")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the store file (overrides the configured location)
    #[arg(short, long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create, list and update invoices
    Invoice(invoice::InvoiceArgs),

    /// Manage saved clients
    Client(client::ClientArgs),

    /// Manage defaults for new invoices
    Settings(settings::SettingsArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let ctx = Context::new(cli.config, cli.store);

    match cli.command {
        Commands::Invoice(args) => invoice::run(args, &ctx),
        Commands::Client(args) => client::run(args, &ctx),
        Commands::Settings(args) => settings::run(args, &ctx),
        Commands::Config(args) => config::run(args, &ctx),
    }
}
