//! CLI command handlers.

pub mod config;
pub mod decode;
pub mod exchange;
pub mod query;
pub mod sign;
pub mod start;

use std::path::Path;

use anyhow::{Context as _, Result};
use console::Style;
use serde::Serialize;
use sfjwt_config::{LoadedConfig, SfjwtConfig};
use sfjwt_oauth::{OAuthError, Relay, RelayConfig, UpstreamResponse};

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
    /// Merged configuration and where it came from.
    pub loaded: LoadedConfig,
}

impl Context {
    pub fn config(&self) -> &SfjwtConfig {
        &self.loaded.config
    }

    /// Relay client honoring `[salesforce]` settings.
    pub fn relay(&self) -> Result<Relay> {
        let salesforce = self.config().salesforce();
        let config = RelayConfig::default()
            .with_api_version(salesforce.api_version.clone())
            .with_timeout(salesforce.timeout());
        Ok(Relay::with_config(config)?)
    }
}

/// Error body printed in `--json` mode, same shape as the HTTP API.
#[derive(Debug, Serialize)]
struct ErrorOutput<'a> {
    error: &'a str,
    error_description: String,
}

/// Tag shown for a failure. Transport failures read as `network_error`
/// here, where the HTTP API collapses them into `internal_error`.
pub fn error_code(err: &OAuthError) -> &'static str {
    match err {
        OAuthError::Network(_) => "network_error",
        other => other.code(),
    }
}

/// Print an operation failure and turn it into the command's error.
pub fn report(ctx: &Context, err: OAuthError) -> anyhow::Error {
    if ctx.json_output {
        let output = ErrorOutput {
            error: error_code(&err),
            error_description: err.to_string(),
        };
        if let Ok(text) = serde_json::to_string_pretty(&output) {
            println!("{}", text);
        }
    }
    anyhow::Error::new(err)
}

/// Print a relayed provider response. Non-2xx statuses become an error so
/// the process exits non-zero.
pub fn print_upstream(ctx: &Context, response: &UpstreamResponse, summary: &str) -> Result<()> {
    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(response)?);
    } else {
        let status_style = if response.is_success() {
            Style::new().green()
        } else {
            Style::new().red()
        };
        let dim = Style::new().dim();

        println!(
            "{} {}",
            dim.apply_to("Status:"),
            status_style.apply_to(response.status)
        );
        println!("{}", summary);
        println!();
        println!("{}", serde_json::to_string_pretty(&response.body)?);
    }

    if response.is_success() {
        Ok(())
    } else {
        anyhow::bail!("provider answered with HTTP {}", response.status)
    }
}

/// Read a text file, or stdin when the path is `-`.
pub fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut buf)
            .context("reading stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_failure_reads_as_network_error() {
        assert_eq!(
            error_code(&OAuthError::Network("refused".into())),
            "network_error"
        );
        assert_eq!(
            error_code(&OAuthError::InvalidResponse("html".into())),
            "internal_error"
        );
        assert_eq!(error_code(&OAuthError::MissingAssertion), "missing_jwt");
    }
}
