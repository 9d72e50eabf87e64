//! Exchange command - trades a signed assertion for an access token.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use sfjwt_oauth::{TokenExchangeRequest, TokenExchangeResult};

use super::{Context, print_upstream, read_input, report};

/// Arguments for the exchange command.
#[derive(Args, Debug)]
pub struct ExchangeArgs {
    /// Signed assertion
    #[arg(long, conflicts_with = "jwt_file")]
    pub jwt: Option<String>,

    /// File holding the signed assertion (`-` reads stdin)
    #[arg(long)]
    pub jwt_file: Option<PathBuf>,

    /// Login host, defaults to `[salesforce] default_audience`
    #[arg(long)]
    pub audience: Option<String>,
}

/// Run the exchange command.
pub async fn run(args: ExchangeArgs, ctx: &Context) -> Result<()> {
    let jwt = match (args.jwt, &args.jwt_file) {
        (Some(jwt), _) => Some(jwt),
        (None, Some(path)) => Some(read_input(path)?.trim().to_string()),
        (None, None) => None,
    };
    let audience = args
        .audience
        .unwrap_or_else(|| ctx.config().salesforce().default_audience);

    let request = TokenExchangeRequest {
        jwt,
        audience: Some(audience),
    };

    let relay = ctx.relay()?;
    let response = relay
        .exchange_token(&request)
        .await
        .map_err(|e| report(ctx, e))?;

    let summary = match TokenExchangeResult::from_response(&response) {
        TokenExchangeResult::Success(grant) => {
            format!("Access token issued for {}", grant.instance_url)
        }
        TokenExchangeResult::Failure(err) => format!("{}: {}", err.code, err.message()),
    };

    print_upstream(ctx, &response, &summary)
}
