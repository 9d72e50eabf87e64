//! sfjwt - Salesforce OAuth 2.0 JWT Bearer flow tool
//!
//! Main entry point for the sfjwt CLI.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use tracing_appender::rolling::{RollingFileAppender, Rotation};

mod commands;

use commands::{config, decode, exchange, query, sign, start};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// sfjwt - Salesforce OAuth 2.0 JWT Bearer flow tool and relay server
#[derive(Parser)]
#[command(name = "sfjwt")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file to use instead of the discovered layers
    #[arg(long, global = true, env = "SFJWT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP relay server
    Start(start::StartArgs),

    /// Sign a JWT Bearer assertion
    Sign(sign::SignArgs),

    /// Decode a JWT without verifying it
    Decode(decode::DecodeArgs),

    /// Exchange a signed assertion for an access token
    Exchange(exchange::ExchangeArgs),

    /// Run a SOQL query with an access token
    Query(query::QueryArgs),

    /// Configuration management
    Config(config::ConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Console (human-readable, stderr) + rotating JSON file
    let filter = if cli.verbose {
        "sfjwt=debug,sfjwt_oauth=debug,sfjwt_server=debug,sfjwt_session=debug,sfjwt_config=debug,tower_http=debug,info"
    } else {
        "sfjwt=info,sfjwt_oauth=info,sfjwt_server=info,warn"
    };

    let log_dir = sfjwt_config::log_dir().unwrap_or_else(|| PathBuf::from("logs"));
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("sfjwt")
        .filename_suffix("log")
        .build(&log_dir)
        .ok();
    let (file_writer, _guard) = match file_appender {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(file_writer.map(|writer| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "sfjwt=trace,sfjwt_oauth=trace,sfjwt_server=trace,sfjwt_session=trace,sfjwt_config=trace,info",
                ))
        }))
        .init();

    let loaded = match &cli.config {
        Some(path) => {
            let config = sfjwt_config::load_config_file(path)
                .with_context(|| format!("loading {}", path.display()))?;
            sfjwt_config::LoadedConfig {
                warnings: config.lint(),
                config,
                sources: vec![sfjwt_config::ConfigSource {
                    path: path.clone(),
                    loaded: true,
                }],
            }
        }
        None => sfjwt_config::load_config(None)?,
    };
    for warning in &loaded.warnings {
        tracing::warn!("{}", warning);
    }

    let ctx = commands::Context {
        json_output: cli.json,
        verbose: cli.verbose,
        loaded,
    };

    match cli.command {
        Commands::Start(args) => start::run(args, &ctx).await,
        Commands::Sign(args) => sign::run(args, &ctx).await,
        Commands::Decode(args) => decode::run(args, &ctx).await,
        Commands::Exchange(args) => exchange::run(args, &ctx).await,
        Commands::Query(args) => query::run(args, &ctx).await,
        Commands::Config(args) => config::run(args, &ctx).await,
    }
}
