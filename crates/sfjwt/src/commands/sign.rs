//! Sign command - builds and signs a JWT Bearer assertion.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use console::Style;
use serde::Serialize;

use sfjwt_oauth::{ClaimsParams, JwtClaims, OAuthError, SigningAlgorithm, sign_assertion};

use super::{Context, read_input, report};

/// Arguments for the sign command.
#[derive(Args, Debug)]
pub struct SignArgs {
    /// Connected app consumer key (`iss`)
    #[arg(long, env = "SFJWT_ISSUER")]
    pub issuer: Option<String>,

    /// Salesforce username (`sub`)
    #[arg(long, env = "SFJWT_SUBJECT")]
    pub subject: Option<String>,

    /// Login host (`aud`), defaults to `[salesforce] default_audience`
    #[arg(long)]
    pub audience: Option<String>,

    /// Lifetime in seconds, defaults to `[signing] default_expiration_secs`
    #[arg(long)]
    pub expiration: Option<u64>,

    /// PEM private key file (`-` reads stdin)
    #[arg(long, env = "SFJWT_KEY_FILE")]
    pub key_file: Option<PathBuf>,

    /// Signing algorithm, defaults to the first allowed one
    #[arg(long)]
    pub algorithm: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignOutput {
    jwt: String,
    claims: JwtClaims,
    expires_at: String,
    algorithm: SigningAlgorithm,
}

impl SignArgs {
    fn into_params(self, ctx: &Context) -> Result<ClaimsParams> {
        let config = ctx.config();
        let signing = config.signing();

        let issuer = self.issuer.unwrap_or_default();
        let subject = self.subject.unwrap_or_default();
        // The key file is only opened once the identity fields are present.
        if issuer.trim().is_empty() {
            return Err(report(ctx, OAuthError::MissingIssuer));
        }
        if subject.trim().is_empty() {
            return Err(report(ctx, OAuthError::MissingSubject));
        }

        let private_key = match &self.key_file {
            Some(path) => read_input(path)?,
            None => String::new(),
        };

        let params = ClaimsParams::new(issuer, subject, private_key)
            .with_audience(
                self.audience
                    .filter(|a| !a.trim().is_empty())
                    .unwrap_or_else(|| config.salesforce().default_audience),
            )
            .with_expiration(self.expiration.unwrap_or(signing.default_expiration_secs));
        params.validate().map_err(|e| report(ctx, e))?;

        let algorithm = match self.algorithm.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => {
                name.parse::<SigningAlgorithm>().map_err(|e| report(ctx, e))?
            }
            _ => signing.algorithms().first().copied().unwrap_or_default(),
        };
        if !signing.allows(algorithm) {
            return Err(report(
                ctx,
                OAuthError::UnsupportedAlgorithm(algorithm.to_string()),
            ));
        }

        Ok(params.with_algorithm(algorithm))
    }
}

/// Run the sign command.
pub async fn run(args: SignArgs, ctx: &Context) -> Result<()> {
    let params = args.into_params(ctx)?;
    let signed = sign_assertion(&params).map_err(|e| report(ctx, e))?;

    tracing::debug!(
        issuer = %signed.claims.iss,
        audience = %signed.claims.aud,
        algorithm = %signed.algorithm,
        "Signed JWT assertion"
    );

    if ctx.json_output {
        let output = SignOutput {
            expires_at: signed.claims.expires_at_display(),
            jwt: signed.token,
            claims: signed.claims,
            algorithm: signed.algorithm,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", signed.token);

    if ctx.verbose {
        let dim = Style::new().dim();
        eprintln!();
        eprintln!("{} {}", dim.apply_to("iss:"), signed.claims.iss);
        eprintln!("{} {}", dim.apply_to("sub:"), signed.claims.sub);
        eprintln!("{} {}", dim.apply_to("aud:"), signed.claims.aud);
        eprintln!(
            "{} {}",
            dim.apply_to("exp:"),
            signed.claims.expires_at_display()
        );
        eprintln!("{} {}", dim.apply_to("alg:"), signed.algorithm);
    }

    Ok(())
}
