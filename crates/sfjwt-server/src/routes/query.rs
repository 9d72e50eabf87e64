//! Stateless SOQL query relay.

use axum::extract::State;
use sfjwt_oauth::QueryRequest;

use super::Relayed;
use crate::error::Result;
use crate::extract::JsonBody;
use crate::state::AppState;

/// `POST /api/query`
pub async fn query_handler(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<QueryRequest>,
) -> Result<Relayed> {
    let response = state.relay.query(&request).await?;
    Ok(Relayed(response))
}
