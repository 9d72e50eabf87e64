//! Per-session flow endpoints.
//!
//! A session holds the last signing form, the signed assertion and the access
//! token from a successful exchange, so a client can walk the flow step by
//! step without resending earlier results.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sfjwt_oauth::{QueryRequest, TokenExchangeRequest, TokenExchangeResult, sign_assertion};
use sfjwt_session::{JwtFormData, SessionState};
use tracing::{info, warn};
use uuid::Uuid;

use super::Relayed;
use super::jwt::{SignRequest, SignResponse};
use crate::error::{Result, ServerError};
use crate::extract::JsonBody;
use crate::state::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
}

/// Session contents as shown to clients. The access token is never echoed.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub jwt_form: Option<JwtFormData>,
    pub jwt_token: Option<String>,
    pub has_access_token: bool,
    pub instance_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionSnapshot {
    fn new(session_id: Uuid, state: &SessionState) -> Self {
        Self {
            session_id,
            jwt_form: state.jwt_form().cloned(),
            jwt_token: state.jwt_token().map(str::to_string),
            has_access_token: state.access_token().is_some(),
            instance_url: state.instance_url().map(str::to_string),
            created_at: state.created_at(),
            updated_at: state.updated_at(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SessionQueryRequest {
    #[serde(default)]
    pub query: Option<String>,
}

fn parse_session_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ServerError::InvalidSessionId(raw.to_string()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// `POST /api/sessions`
pub async fn create_session_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<CreateSessionResponse>) {
    let session_id = state.sessions.create(SessionState::new()).await;
    info!(session_id = %session_id, "Session created");
    (StatusCode::CREATED, Json(CreateSessionResponse { session_id }))
}

/// `GET /api/sessions/{id}`
pub async fn get_session_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<SessionSnapshot>> {
    let id = parse_session_id(&raw_id)?;
    let session = state.sessions.get(&id).await?;
    Ok(Json(SessionSnapshot::new(id, &session)))
}

/// `DELETE /api/sessions/{id}`
pub async fn delete_session_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_session_id(&raw_id)?;
    state.sessions.with_mut(&id, SessionState::clear).await?;
    state.sessions.remove(&id).await;
    info!(session_id = %id, "Session deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/sessions/{id}/jwt`
///
/// Signs like `/api/jwt`, then stores the form (without the key) and token.
pub async fn session_jwt_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    JsonBody(request): JsonBody<SignRequest>,
) -> Result<Json<SignResponse>> {
    let id = parse_session_id(&raw_id)?;
    state.sessions.get(&id).await?;

    let params = request.into_params(&state.config)?;
    let signed = sign_assertion(&params)?;
    let form = JwtFormData::from_params(&params);

    state
        .sessions
        .with_mut(&id, |session| session.set_jwt(form, &signed))
        .await?;

    info!(session_id = %id, algorithm = %signed.algorithm, "Session JWT signed");
    Ok(Json(signed.into()))
}

/// `POST /api/sessions/{id}/exchange`
///
/// Exchanges the stored assertion. The audience comes from the stored form,
/// else the configured default. A successful grant is stored in the session.
pub async fn session_exchange_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Relayed> {
    let id = parse_session_id(&raw_id)?;
    let session = state.sessions.get(&id).await?;

    let audience = session
        .jwt_form()
        .map(|form| form.audience.clone())
        .unwrap_or_else(|| state.config.default_audience.clone());
    let request = TokenExchangeRequest {
        jwt: session.jwt_token().map(str::to_string),
        audience: Some(audience),
    };

    let response = state.relay.exchange_token(&request).await?;

    if let TokenExchangeResult::Success(grant) = TokenExchangeResult::from_response(&response) {
        let instance_url = grant.instance_url.clone();
        let stored = state
            .sessions
            .with_mut(&id, |session| {
                session.set_access(grant.access_token, grant.instance_url)
            })
            .await;
        match stored {
            Ok(()) => info!(session_id = %id, instance_url = %instance_url, "Session authenticated"),
            Err(e) => warn!(session_id = %id, error = %e, "Session gone before grant was stored"),
        }
    }

    Ok(Relayed(response))
}

/// `POST /api/sessions/{id}/query`
pub async fn session_query_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    JsonBody(body): JsonBody<SessionQueryRequest>,
) -> Result<Relayed> {
    let id = parse_session_id(&raw_id)?;
    let session = state.sessions.get(&id).await?;

    let request = QueryRequest {
        query: body.query,
        access_token: session.access_token().map(str::to_string),
        instance_url: session.instance_url().map(str::to_string),
    };

    let response = state.relay.query(&request).await?;
    Ok(Relayed(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_session_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_session_id(&id.to_string()).unwrap(), id);

        let err = parse_session_id("not-a-uuid").unwrap_err();
        assert_eq!(err.code(), "invalid_session_id");
    }

    #[test]
    fn test_snapshot_hides_access_token() {
        let mut state = SessionState::new();
        state.set_access("SECRET", "https://org.my.salesforce.com");

        let snapshot = SessionSnapshot::new(Uuid::new_v4(), &state);
        let rendered = serde_json::to_string(&snapshot).unwrap();

        assert!(snapshot.has_access_token);
        assert!(!rendered.contains("SECRET"));
        assert!(rendered.contains("https://org.my.salesforce.com"));
    }
}
