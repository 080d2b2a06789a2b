use axum::{
    Router, middleware,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::certificates::{
    delete_certificate_handler, get_certificate_handler, verify_handler,
};
use crate::handlers::health::health_handler;
use crate::middleware::cors::{CorsPolicy, cors_guard};
use crate::service::CertificateService;

/// Shared per-process state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub certificates: CertificateService,
}

impl AppState {
    pub fn new(certificates: CertificateService) -> Self {
        Self { certificates }
    }
}

fn certificate_routes() -> Router<AppState> {
    Router::new()
        .route("/verify", post(verify_handler))
        .route("/certificate/{card_no}", get(get_certificate_handler))
        .route("/delete/{card_no}", delete(delete_certificate_handler))
        .route("/health", get(health_handler))
}

/// Build the HTTP router. Every route is served both at the root and under `/api`.
pub fn certverify_router(state: AppState, cors: CorsPolicy) -> Router {
    Router::new()
        .merge(certificate_routes())
        .nest("/api", certificate_routes())
        .with_state(state)
        .layer(cors.layer())
        .layer(middleware::from_fn_with_state(cors, cors_guard))
        .layer(TraceLayer::new_for_http())
}
