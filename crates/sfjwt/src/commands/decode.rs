//! Decode command - inspects a JWT without verifying it.

use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use console::Style;
use serde::Serialize;

use sfjwt_oauth::decode_unverified;

use super::{Context, read_input, report};

/// Arguments for the decode command.
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Compact JWT (`-` reads stdin)
    pub token: String,
}

#[derive(Debug, Serialize)]
struct DecodeOutput<'a> {
    header: &'a serde_json::Value,
    payload: &'a serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expired: Option<bool>,
}

fn expiry(payload: &serde_json::Value) -> Option<DateTime<Utc>> {
    payload
        .get("exp")
        .and_then(serde_json::Value::as_i64)
        .and_then(|exp| DateTime::from_timestamp(exp, 0))
}

/// Run the decode command.
pub async fn run(args: DecodeArgs, ctx: &Context) -> Result<()> {
    let token = if args.token == "-" {
        read_input(Path::new("-"))?
    } else {
        args.token
    };

    let decoded = decode_unverified(&token).map_err(|e| report(ctx, e))?;
    let expires_at = expiry(&decoded.payload);
    let expired = expires_at.map(|at| at <= Utc::now());

    if ctx.json_output {
        let output = DecodeOutput {
            header: &decoded.header,
            payload: &decoded.payload,
            expires_at: expires_at.map(|at| at.to_rfc3339()),
            expired,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let bold = Style::new().bold();
    println!("{}", bold.apply_to("Header"));
    println!("{}", serde_json::to_string_pretty(&decoded.header)?);
    println!();
    println!("{}", bold.apply_to("Payload"));
    println!("{}", serde_json::to_string_pretty(&decoded.payload)?);

    if let Some(at) = expires_at {
        println!();
        let status = if at <= Utc::now() {
            Style::new().red().apply_to("expired")
        } else {
            Style::new().green().apply_to("valid")
        };
        println!("Expires: {} ({})", at.to_rfc3339(), status);
    }
    println!();
    println!(
        "{}",
        Style::new().dim().apply_to("Signature not verified.")
    );

    Ok(())
}
