//! Stateless token exchange relay.

use axum::extract::State;
use sfjwt_oauth::TokenExchangeRequest;

use super::Relayed;
use crate::error::Result;
use crate::extract::JsonBody;
use crate::state::AppState;

/// `POST /api/auth/exchange`
///
/// Forwards `{jwt, audience}` to the audience's token endpoint and relays
/// the provider's status and body unchanged.
pub async fn exchange_handler(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<TokenExchangeRequest>,
) -> Result<Relayed> {
    let response = state.relay.exchange_token(&request).await?;
    Ok(Relayed(response))
}
