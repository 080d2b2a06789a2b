use axum::extract::{Request, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, ORIGIN, VARY};
use axum::http::{HeaderValue, Method};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

use crate::error::{ConfigError, CorsError};

/// Allow-list of origins permitted to make credentialed cross-origin requests.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allowed: Arc<HashSet<HeaderValue>>,
}

impl CorsPolicy {
    /// `origins` must already be normalized to `scheme://host[:port]`.
    pub fn new(origins: impl IntoIterator<Item = String>) -> Result<Self, ConfigError> {
        let allowed = origins
            .into_iter()
            .map(|o| HeaderValue::from_str(&o).map_err(|_| ConfigError::InvalidOrigin(o)))
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(Self {
            allowed: Arc::new(allowed),
        })
    }

    pub fn allows(&self, origin: &HeaderValue) -> bool {
        self.allowed.contains(origin)
    }

    /// Response-side CORS handling for allowed origins: preflight answers,
    /// echoed origin, credentials and `Vary`.
    pub fn layer(&self) -> CorsLayer {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(self.allowed.iter().cloned()))
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers([CONTENT_TYPE, AUTHORIZATION])
            .max_age(Duration::from_secs(3600))
    }
}

/// Reject requests from unlisted origins with 403, preflight included.
///
/// Must run outside `CorsPolicy::layer`, which would otherwise answer a
/// disallowed preflight itself without the CORS headers.
pub async fn cors_guard(State(policy): State<CorsPolicy>, req: Request, next: Next) -> Response {
    let rejected = req
        .headers()
        .get(ORIGIN)
        .filter(|origin| !policy.allows(origin))
        .cloned();
    let Some(origin) = rejected else {
        return next.run(req).await;
    };

    warn!(origin = ?origin, method = %req.method(), "cross-origin request rejected");
    let mut resp = CorsError::OriginNotAllowed.into_response();
    resp.headers_mut().append(VARY, HeaderValue::from_static("origin"));
    resp
}
