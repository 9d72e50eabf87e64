//! HTTP API for the Salesforce JWT Bearer flow.
//!
//! Stateless endpoints sign assertions and relay token exchange and SOQL
//! query calls. Session endpoints keep the flow's intermediate results in
//! memory so a client can drive it one step at a time.
//!
//! # Example
//!
//! ```ignore
//! use sfjwt_server::{AppState, Server};
//!
//! let state = AppState::from_config(&loaded.config)?;
//! Server::new(state).run().await?;
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::{ErrorResponse, Result, ServerError};
pub use extract::JsonBody;
pub use middleware::{rate_limit_middleware, request_logging_middleware};
pub use state::AppState;

use std::net::SocketAddr;

use axum::{Router, http::HeaderValue, http::Method, http::header};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// The sfjwt HTTP server.
pub struct Server {
    state: AppState,
}

impl Server {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        use axum::routing::{get, post};

        let router = Router::new()
            .merge(routes::health_routes())
            .route("/api/jwt", post(routes::jwt_handler))
            .route("/api/auth/exchange", post(routes::exchange_handler))
            .route("/api/query", post(routes::query_handler))
            .route("/api/sessions", post(routes::create_session_handler))
            .route(
                "/api/sessions/{id}",
                get(routes::get_session_handler).delete(routes::delete_session_handler),
            )
            .route("/api/sessions/{id}/jwt", post(routes::session_jwt_handler))
            .route(
                "/api/sessions/{id}/exchange",
                post(routes::session_exchange_handler),
            )
            .route(
                "/api/sessions/{id}/query",
                post(routes::session_query_handler),
            )
            .layer(RequestBodyLimitLayer::new(self.state.config.max_body_size))
            // Request logging (inner layer, runs first)
            .layer(axum::middleware::from_fn_with_state(
                self.state.clone(),
                middleware::request_logging_middleware,
            ))
            // Rate limiting (outer layer, runs before request logging)
            .layer(axum::middleware::from_fn_with_state(
                self.state.clone(),
                middleware::rate_limit_middleware,
            ))
            .layer(TraceLayer::new_for_http());

        let router = match self.cors_layer() {
            Some(cors) => router.layer(cors),
            None => router,
        };

        router.with_state(self.state.clone())
    }

    fn cors_layer(&self) -> Option<CorsLayer> {
        let origins = &self.state.config.cors_origins;
        if origins.is_empty() {
            return None;
        }

        let allow_origin = if origins.iter().any(|o| o == "*") {
            AllowOrigin::from(Any)
        } else {
            let values: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|o| match HeaderValue::from_str(o) {
                    Ok(v) => Some(v),
                    Err(_) => {
                        warn!(origin = %o, "Ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            AllowOrigin::list(values)
        };

        Some(
            CorsLayer::new()
                .allow_origin(allow_origin)
                .allow_methods([Method::GET, Method::POST, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE]),
        )
    }

    /// Run the server on the configured address.
    pub async fn run(self) -> Result<()> {
        let addr = self.state.config.bind_address;
        self.run_on(addr).await
    }

    /// Run the server on a specific address (useful for testing).
    pub async fn run_on(self, addr: SocketAddr) -> Result<()> {
        let router = self.router();
        let _cleanup = self.state.sessions.spawn_cleanup_task();

        info!("Starting server on {}", addr);

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| ServerError::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the configured bind address.
    pub fn bind_address(&self) -> SocketAddr {
        self.state.config.bind_address
    }
}
