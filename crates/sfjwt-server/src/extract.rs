//! Request body extraction.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use crate::error::ServerError;

/// A JSON request body, parsed whatever the `Content-Type` says.
///
/// Clients such as `curl -d` send JSON labelled as a form. The body is read
/// as bytes so those requests still reach input validation. An unreadable
/// or unparsable body is a local failure (`internal_error`), and a body over
/// the configured limit is `payload_too_large`.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await?;
        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|e| ServerError::Internal(format!("Invalid JSON body: {}", e)))
    }
}
