//! Liveness endpoint.

use axum::{Json, Router, extract::State, routing::get};
use serde::{Deserialize, Serialize};
use sfjwt_session::CacheStats;

use crate::state::AppState;

/// `GET /health` body: build version plus the session store's occupancy.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sessions: CacheStats,
    pub rate_limited: bool,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        sessions: state.sessions.stats().await,
        rate_limited: state.limiter.is_some(),
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use sfjwt_oauth::Relay;
    use sfjwt_session::{CacheConfig, SessionState};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_reports_session_occupancy() {
        let state = AppState::new(
            ServerConfig::new().with_rate_limiting(false),
            Relay::new().unwrap(),
            CacheConfig::new().with_max_sessions(10),
        );
        state.sessions.create(SessionState::new()).await;
        state.sessions.create(SessionState::new()).await;

        let app = health_routes().with_state(state);
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let health: HealthResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(health.status, "ok");
        assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(health.sessions.size, 2);
        assert_eq!(health.sessions.capacity, 10);
        assert!(!health.rate_limited);
    }
}
