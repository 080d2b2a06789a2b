use async_trait::async_trait;

use crate::db::models::{CertificateRecord, NewCertificate};
use crate::error::StoreError;

/// Lookup keys a predicate may compare against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    CardNo,
    Iqama,
}

impl Field {
    pub fn column(self) -> &'static str {
        match self {
            Field::CardNo => "card_no",
            Field::Iqama => "iqama",
        }
    }
}

/// Match condition for `find_one` and `delete_one`.
///
/// For `Or`, a record matching the first clause always outranks one matching
/// only the second; remaining ties go to the earliest inserted record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Eq(Field, String),
    Or(Field, String, Field, String),
}

impl Predicate {
    pub fn card_no(value: impl Into<String>) -> Self {
        Predicate::Eq(Field::CardNo, value.into())
    }

    pub fn card_no_or_iqama(value: impl Into<String>) -> Self {
        let value = value.into();
        Predicate::Or(Field::CardNo, value.clone(), Field::Iqama, value)
    }
}

/// Persistent certificate storage. `card_no` uniqueness is enforced here.
#[async_trait]
pub trait CertificateStore: Send + Sync {
    async fn find_one(&self, predicate: &Predicate)
    -> Result<Option<CertificateRecord>, StoreError>;

    /// Fails with `StoreError::Uniqueness` when `card_no` is already taken.
    async fn insert_one(&self, record: NewCertificate) -> Result<CertificateRecord, StoreError>;

    /// Removes at most one matching record and returns how many were removed.
    async fn delete_one(&self, predicate: &Predicate) -> Result<u64, StoreError>;
}
