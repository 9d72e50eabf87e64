//! API routes.

pub mod exchange;
pub mod health;
pub mod jwt;
pub mod query;
pub mod sessions;

pub use exchange::exchange_handler;
pub use health::{HealthResponse, health_routes};
pub use jwt::{SignRequest, SignResponse, jwt_handler};
pub use query::query_handler;
pub use sessions::{
    CreateSessionResponse, SessionQueryRequest, SessionSnapshot, create_session_handler,
    delete_session_handler, get_session_handler, session_exchange_handler, session_jwt_handler,
    session_query_handler,
};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sfjwt_oauth::UpstreamResponse;

/// A provider response passed through with its own status and body.
#[derive(Debug)]
pub struct Relayed(pub UpstreamResponse);

impl IntoResponse for Relayed {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status).unwrap_or(StatusCode::BAD_GATEWAY);
        (status, Json(self.0.body)).into_response()
    }
}
