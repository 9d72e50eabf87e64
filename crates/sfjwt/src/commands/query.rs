//! Query command - runs SOQL with an access token.

use anyhow::Result;
use clap::Args;

use sfjwt_oauth::{QueryRequest, QueryResult};

use super::{Context, print_upstream, report};

/// Arguments for the query command.
#[derive(Args, Debug)]
pub struct QueryArgs {
    /// SOQL statement
    pub soql: String,

    /// Bearer token from a previous exchange
    #[arg(long, env = "SFJWT_ACCESS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Org instance URL from a previous exchange
    #[arg(long, env = "SFJWT_INSTANCE_URL")]
    pub instance_url: Option<String>,
}

/// Run the query command.
pub async fn run(args: QueryArgs, ctx: &Context) -> Result<()> {
    let request = QueryRequest {
        query: Some(args.soql),
        access_token: args.token,
        instance_url: args.instance_url,
    };

    let relay = ctx.relay()?;
    let response = relay.query(&request).await.map_err(|e| report(ctx, e))?;

    let summary = match QueryResult::from_response(&response) {
        QueryResult::Success(page) if page.has_more() => {
            format!("{} More records are available.", page.summary())
        }
        QueryResult::Success(page) => page.summary(),
        QueryResult::Failure(errors) => errors
            .iter()
            .map(|e| format!("{}: {}", e.code, e.message()))
            .collect::<Vec<_>>()
            .join("\n"),
    };

    print_upstream(ctx, &response, &summary)
}
