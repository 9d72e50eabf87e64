//! Assertion signing over HTTP.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use sfjwt_oauth::{
    ClaimsParams, JwtClaims, OAuthError, SignedAssertion, SigningAlgorithm, sign_assertion,
};

use crate::config::ServerConfig;
use crate::error::Result;
use crate::extract::JsonBody;
use crate::state::AppState;

/// Signing form. The private key is used for this request only.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignRequest {
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub audience: Option<String>,
    #[serde(default)]
    pub expiration_seconds: Option<u64>,
    #[serde(default)]
    pub private_key: Option<String>,
    #[serde(default)]
    pub algorithm: Option<String>,
}

impl SignRequest {
    /// Resolve defaults and validate, reporting the first problem in form order.
    pub fn into_params(self, config: &ServerConfig) -> Result<ClaimsParams> {
        let algorithm = match self.algorithm.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.parse::<SigningAlgorithm>(),
            _ => Ok(config
                .allowed_algorithms
                .first()
                .copied()
                .unwrap_or_default()),
        };

        let audience = self
            .audience
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| config.default_audience.clone());

        let params = ClaimsParams::new(
            self.issuer.unwrap_or_default(),
            self.subject.unwrap_or_default(),
            self.private_key.unwrap_or_default(),
        )
        .with_audience(audience)
        .with_expiration(
            self.expiration_seconds
                .unwrap_or(config.default_expiration_secs),
        );
        params.validate()?;

        let algorithm = algorithm?;
        if !config.allows(algorithm) {
            return Err(OAuthError::UnsupportedAlgorithm(algorithm.to_string()).into());
        }
        Ok(params.with_algorithm(algorithm))
    }
}

/// A signed assertion with its claims.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignResponse {
    pub jwt: String,
    pub claims: JwtClaims,
    /// RFC 3339 expiry.
    pub expires_at: String,
    pub algorithm: SigningAlgorithm,
}

impl From<SignedAssertion> for SignResponse {
    fn from(signed: SignedAssertion) -> Self {
        Self {
            expires_at: signed.claims.expires_at_display(),
            jwt: signed.token,
            claims: signed.claims,
            algorithm: signed.algorithm,
        }
    }
}

/// `POST /api/jwt`
pub async fn jwt_handler(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<SignRequest>,
) -> Result<Json<SignResponse>> {
    let params = request.into_params(&state.config)?;
    let signed = sign_assertion(&params)?;

    tracing::info!(
        issuer = %signed.claims.iss,
        audience = %signed.claims.aud,
        algorithm = %signed.algorithm,
        "Signed JWT assertion"
    );

    Ok(Json(signed.into()))
}
