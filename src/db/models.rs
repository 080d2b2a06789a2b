use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// A certificate as supplied by provisioning, before the store assigns metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCertificate {
    pub name: String,
    pub iqama: String,
    pub course: String,
    pub card_no: String,
    pub issued: String,
    pub expiry: String,
}

impl NewCertificate {
    /// Reject records with any blank required field.
    pub fn validate(&self) -> Result<(), StoreError> {
        let fields = [
            ("name", &self.name),
            ("iqama", &self.iqama),
            ("course", &self.course),
            ("cardNo", &self.card_no),
            ("issued", &self.issued),
            ("expiry", &self.expiry),
        ];
        match fields.iter().find(|(_, v)| v.trim().is_empty()) {
            Some((field, _)) => Err(StoreError::MalformedRecord(format!(
                "field `{field}` must not be empty"
            ))),
            None => Ok(()),
        }
    }
}

/// A persisted certificate row, including store-owned metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateRecord {
    pub id: i64,
    pub name: String,
    pub iqama: String,
    pub course: String,
    pub card_no: String,
    pub issued: String,
    pub expiry: String,
    pub created_at: DateTime<Utc>,
}

/// Public projection of a certificate. Never carries `id` or `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CertificateView {
    pub name: String,
    pub iqama: String,
    pub course: String,
    pub card_no: String,
    pub issued: String,
    pub expiry: String,
}

impl From<CertificateRecord> for CertificateView {
    fn from(r: CertificateRecord) -> Self {
        Self {
            name: r.name,
            iqama: r.iqama,
            course: r.course,
            card_no: r.card_no,
            issued: r.issued,
            expiry: r.expiry,
        }
    }
}
