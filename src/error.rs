use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

/// Failures raised by a `CertificateStore` implementation.
#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error("certificate with cardNo `{card_no}` already exists")]
    Uniqueness { card_no: String },

    #[error("malformed certificate record: {0}")]
    MalformedRecord(String),

    #[error("store did not respond in time")]
    Timeout,

    #[error("Database error: {0}")]
    Database(#[from] SqlxError),
}

impl StoreError {
    pub fn is_uniqueness(&self) -> bool {
        matches!(self, StoreError::Uniqueness { .. })
    }
}

#[derive(Debug, ThisError)]
pub enum CertError {
    #[error("Please enter a certificate number or ID.")]
    InvalidInput,

    /// No certificate has the requested card number.
    #[error("Certificate not found.")]
    NotFound,

    /// A verify query matched no card number or iqama.
    #[error("No record found.")]
    NoRecord,

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, ThisError)]
pub enum CorsError {
    #[error("Origin not allowed")]
    OriginNotAllowed,
}

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("database_url is required (set CERTVERIFY_DATABASE_URL)")]
    MissingDatabaseUrl,

    #[error("invalid allowed origin `{0}`")]
    InvalidOrigin(String),
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError::Figment(Box::new(e))
    }
}

impl IntoResponse for CertError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            CertError::InvalidInput => (
                StatusCode::BAD_REQUEST,
                ApiErrorResponse {
                    error: CertError::InvalidInput.to_string(),
                    details: None,
                },
            ),
            CertError::NotFound | CertError::NoRecord => (
                StatusCode::NOT_FOUND,
                ApiErrorResponse {
                    error: self.to_string(),
                    details: None,
                },
            ),
            CertError::Store(err) => {
                error!(error = %err, "certificate store failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorResponse {
                        error: "Internal server error".to_string(),
                        details: cfg!(feature = "verbose-errors").then(|| err.to_string()),
                    },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

impl IntoResponse for CorsError {
    fn into_response(self) -> axum::response::Response {
        let body = ApiErrorResponse {
            error: self.to_string(),
            details: None,
        };
        (StatusCode::FORBIDDEN, Json(body)).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
