//! Config command - configuration management.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::Style;
use serde::Serialize;

use super::Context;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the merged configuration and the files it came from
    Show,

    /// Show which config files are searched and which were loaded
    Which,

    /// Initialize a config file with defaults
    Init {
        /// Create project-local config (./sfjwt.toml) instead of user config
        #[arg(long)]
        local: bool,
    },

    /// Show configuration file path
    Path,
}

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => cmd_show(ctx),
        ConfigCommand::Which => cmd_which(ctx),
        ConfigCommand::Init { local } => cmd_init(local),
        ConfigCommand::Path => cmd_path(),
    }
}

#[derive(Serialize)]
struct ShowOutput<'a> {
    sources: Vec<String>,
    warnings: &'a [String],
    config: sfjwt_config::SfjwtConfig,
}

fn cmd_show(ctx: &Context) -> Result<()> {
    let loaded = &ctx.loaded;
    let effective = loaded.config.effective();

    if ctx.json_output {
        let output = ShowOutput {
            sources: loaded
                .loaded_from()
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            warnings: &loaded.warnings,
            config: effective,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    let sources = loaded.loaded_from();
    if sources.is_empty() {
        println!("{}", dim.apply_to("# No config files loaded (using defaults)"));
    } else {
        for source in &sources {
            println!("{} {}", dim.apply_to("# loaded:"), source.display());
        }
    }
    for warning in &loaded.warnings {
        println!("{} {}", Style::new().yellow().apply_to("# warning:"), warning);
    }
    println!();
    print!("{}", effective.to_toml()?);

    Ok(())
}

fn cmd_which(ctx: &Context) -> Result<()> {
    println!("Config file search order (later overrides earlier):\n");
    for source in &ctx.loaded.sources {
        let status = if source.loaded {
            Style::new().green().apply_to("✓ loaded")
        } else {
            Style::new().dim().apply_to("· not found")
        };
        println!("  {} {}", status, source.path.display());
    }
    println!();

    let loaded_count = ctx.loaded.loaded_from().len();
    if loaded_count == 0 {
        println!("No config files found. Run 'sfjwt config init' to create one.");
    } else {
        println!("{} config file(s) loaded.", loaded_count);
    }
    Ok(())
}

const TEMPLATE: &str = r#"# sfjwt configuration

[server]
bind = "127.0.0.1"
port = 8080
# rate_limiting = true
# api_rpm = 120
# cors_origins = ["http://localhost:3000"]

[salesforce]
default_audience = "https://login.salesforce.com"
# api_version = "v60.0"
# timeout_secs = 30

[signing]
default_expiration_secs = 3600
allowed_algorithms = ["RS256"]

# [session]
# max_sessions = 1000
# ttl_secs = 3600
"#;

fn cmd_init(local: bool) -> Result<()> {
    let path = if local {
        std::path::PathBuf::from("sfjwt.toml")
    } else {
        let dir = sfjwt_config::xdg_config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        std::fs::create_dir_all(&dir)?;
        dir.join("config.toml")
    };

    if path.exists() {
        println!("Config file already exists: {}", path.display());
        return Ok(());
    }

    std::fs::write(&path, TEMPLATE)?;
    println!("✓ Created config file: {}", path.display());
    Ok(())
}

fn cmd_path() -> Result<()> {
    let path = sfjwt_config::xdg_config_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    println!("{}", path.display());
    Ok(())
}
