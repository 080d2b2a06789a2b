use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::db::models::CertificateView;
use crate::error::CertError;
use crate::middleware::certificate_request::VerifyPayload;
use crate::router::AppState;

#[derive(Debug, Serialize)]
pub struct DataResponse {
    pub data: CertificateView,
}

/// POST /verify -> look up a certificate by card number or iqama.
pub async fn verify_handler(
    State(state): State<AppState>,
    VerifyPayload(query): VerifyPayload,
) -> Result<Json<DataResponse>, CertError> {
    let data = state.certificates.verify(query.as_deref()).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /certificate/{card_no} -> exact card number lookup.
pub async fn get_certificate_handler(
    State(state): State<AppState>,
    Path(card_no): Path<String>,
) -> Result<Json<DataResponse>, CertError> {
    if card_no.trim().is_empty() {
        return Err(CertError::InvalidInput);
    }
    let data = state.certificates.fetch_by_key(&card_no).await?;
    Ok(Json(DataResponse { data }))
}

/// DELETE /delete/{card_no} -> remove a certificate.
pub async fn delete_certificate_handler(
    State(state): State<AppState>,
    Path(card_no): Path<String>,
) -> Result<Json<Value>, CertError> {
    match state.certificates.delete_by_key(&card_no).await? {
        0 => Err(CertError::NotFound),
        _ => Ok(Json(json!({
            "message": format!("Deleted certificate with cardNo: {card_no}")
        }))),
    }
}
