//! Start command - launches the relay server.

use std::net::{IpAddr, SocketAddr};

use anyhow::{Context as _, Result};
use clap::Args;

use sfjwt_server::{AppState, Server, ServerConfig};

use super::Context;

/// Arguments for the start command.
///
/// CLI arguments override config file values.
#[derive(Args, Debug)]
pub struct StartArgs {
    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind to (overrides config)
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Disable the global rate limiter
    #[arg(long)]
    pub no_rate_limit: bool,
}

/// Run the start command.
pub async fn run(args: StartArgs, ctx: &Context) -> Result<()> {
    let file_config = ctx.config();
    let mut config = ServerConfig::from_config(file_config)?;

    if args.port.is_some() || args.bind.is_some() {
        let ip: IpAddr = match &args.bind {
            Some(bind) => bind
                .parse()
                .with_context(|| format!("invalid bind address '{}'", bind))?,
            None => config.bind_address.ip(),
        };
        let port = args.port.unwrap_or(config.bind_address.port());
        config = config.with_bind_address(SocketAddr::new(ip, port));
    }
    if args.no_rate_limit {
        config = config.with_rate_limiting(false);
    }

    if ctx.verbose {
        tracing::debug!(
            bind = %config.bind_address,
            rate_limiting = config.rate_limiting,
            api_rpm = config.api_rpm,
            audience = %config.default_audience,
            "Server configuration"
        );
    }

    let addr = config.bind_address;
    let state = AppState::with_server_config(file_config, config)?;
    let session_config = file_config.session();
    tracing::info!(
        max_sessions = session_config.max_sessions,
        ttl_secs = session_config.ttl_secs,
        "Session store ready"
    );

    if !ctx.json_output {
        println!("sfjwt listening on http://{}", addr);
    }

    Server::new(state).run().await?;
    Ok(())
}
