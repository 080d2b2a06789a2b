use axum::{
    Json,
    extract::{FromRequest, Request},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tracing::debug;

use crate::error::CertError;

/// Decoded `POST /verify` body.
///
/// The `query` field is kept only when it is a JSON string; anything else
/// (missing, `null`, numbers, objects) is treated as absent so the
/// normalizer reports it as invalid input.
#[derive(Debug, Clone)]
pub struct VerifyPayload(pub Option<String>);

impl<S> FromRequest<S> for VerifyPayload
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        // Malformed bodies get the same 400 as a missing query.
        let Json(body) = match Json::<Value>::from_request(req, state).await {
            Ok(v) => v,
            Err(rejection) => {
                debug!(reason = %rejection.body_text(), "verify body rejected");
                return Err(CertError::InvalidInput.into_response());
            }
        };

        let query = match body.get("query") {
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        };
        Ok(VerifyPayload(query))
    }
}
