#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
    response::Response,
};
use certverify::db::{
    CertificateRecord, CertificateStore, NewCertificate, Predicate, SqliteCertificateStore,
};
use certverify::middleware::CorsPolicy;
use certverify::router::{AppState, certverify_router};
use certverify::{CertificateService, StoreError};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

pub const ALLOWED_ORIGIN: &str = "http://localhost:3000";

pub fn ali_hassan() -> NewCertificate {
    NewCertificate {
        name: "Ali Hassan".into(),
        iqama: "1234567890".into(),
        course: "Safety Training".into(),
        card_no: "CARD-001".into(),
        issued: "2024-01-01".into(),
        expiry: "2026-01-01".into(),
    }
}

pub fn cors() -> CorsPolicy {
    CorsPolicy::new([ALLOWED_ORIGIN.to_string()]).expect("invalid origin")
}

/// Router over a fresh in-memory SQLite store, plus the service for seeding.
pub async fn sqlite_app(match_iqama: bool) -> (Router, CertificateService) {
    let store = SqliteCertificateStore::connect("sqlite::memory:", Duration::from_secs(5))
        .await
        .expect("failed to open in-memory sqlite");
    store.init_schema().await.expect("failed to init schema");
    let service = CertificateService::new(Arc::new(store), Duration::from_secs(5), match_iqama);
    let app = certverify_router(AppState::new(service.clone()), cors());
    (app, service)
}

pub fn app_with_store(store: impl CertificateStore + 'static, timeout: Duration) -> Router {
    let service = CertificateService::new(Arc::new(store), timeout, true);
    certverify_router(AppState::new(service), cors())
}

pub async fn send(app: &Router, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.expect("request failed")
}

pub fn verify_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/verify")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("failed to build request")
}

pub fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .expect("failed to build request")
}

pub async fn json_body(resp: Response) -> (StatusCode, Value) {
    let status = resp.status();
    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let value = serde_json::from_slice(&body).expect("response body was not json");
    (status, value)
}

/// Store double that fails the test if any operation reaches it.
pub struct UnreachableStore;

#[async_trait]
impl CertificateStore for UnreachableStore {
    async fn find_one(&self, _: &Predicate) -> Result<Option<CertificateRecord>, StoreError> {
        panic!("store must not be contacted");
    }

    async fn insert_one(&self, _: NewCertificate) -> Result<CertificateRecord, StoreError> {
        panic!("store must not be contacted");
    }

    async fn delete_one(&self, _: &Predicate) -> Result<u64, StoreError> {
        panic!("store must not be contacted");
    }
}

/// Store double whose every call fails with a connectivity error.
pub struct FailingStore;

#[async_trait]
impl CertificateStore for FailingStore {
    async fn find_one(&self, _: &Predicate) -> Result<Option<CertificateRecord>, StoreError> {
        Err(sqlx::Error::PoolTimedOut.into())
    }

    async fn insert_one(&self, _: NewCertificate) -> Result<CertificateRecord, StoreError> {
        Err(sqlx::Error::PoolTimedOut.into())
    }

    async fn delete_one(&self, _: &Predicate) -> Result<u64, StoreError> {
        Err(sqlx::Error::PoolTimedOut.into())
    }
}

/// Store double that never answers.
pub struct HangingStore;

#[async_trait]
impl CertificateStore for HangingStore {
    async fn find_one(&self, _: &Predicate) -> Result<Option<CertificateRecord>, StoreError> {
        std::future::pending().await
    }

    async fn insert_one(&self, _: NewCertificate) -> Result<CertificateRecord, StoreError> {
        std::future::pending().await
    }

    async fn delete_one(&self, _: &Predicate) -> Result<u64, StoreError> {
        std::future::pending().await
    }
}
