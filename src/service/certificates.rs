use crate::db::models::{CertificateView, NewCertificate};
use crate::db::store::{CertificateStore, Predicate};
use crate::error::{CertError, StoreError};
use crate::service::query::normalize_query;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Request-facing certificate operations over a shared store handle.
#[derive(Clone)]
pub struct CertificateService {
    store: Arc<dyn CertificateStore>,
    timeout: Duration,
    match_iqama: bool,
}

impl CertificateService {
    pub fn new(store: Arc<dyn CertificateStore>, timeout: Duration, match_iqama: bool) -> Self {
        Self {
            store,
            timeout,
            match_iqama,
        }
    }

    /// Look up a certificate by card number, or by iqama when enabled.
    /// A card number match always wins over an iqama match.
    pub async fn verify(&self, query: Option<&str>) -> Result<CertificateView, CertError> {
        let query = normalize_query(query)?;
        let predicate = if self.match_iqama {
            Predicate::card_no_or_iqama(query)
        } else {
            Predicate::card_no(query)
        };

        let record = self
            .bounded(self.store.find_one(&predicate))
            .await?
            .ok_or(CertError::NoRecord)?;
        debug!(card_no = %record.card_no, "certificate verified");
        Ok(record.into())
    }

    /// Exact card number lookup. The key is used verbatim.
    pub async fn fetch_by_key(&self, card_no: &str) -> Result<CertificateView, CertError> {
        let predicate = Predicate::card_no(card_no);
        self.bounded(self.store.find_one(&predicate))
            .await?
            .map(Into::into)
            .ok_or(CertError::NotFound)
    }

    /// Delete the certificate with `card_no`; returns the number removed (0 or 1).
    pub async fn delete_by_key(&self, card_no: &str) -> Result<u64, CertError> {
        let predicate = Predicate::card_no(card_no);
        let removed = self.bounded(self.store.delete_one(&predicate)).await?;
        if removed > 0 {
            info!(card_no, "certificate deleted");
        }
        Ok(removed)
    }

    /// Provisioning path: insert a new certificate.
    pub async fn insert(&self, record: NewCertificate) -> Result<CertificateView, CertError> {
        let stored = self.bounded(self.store.insert_one(record)).await?;
        Ok(stored.into())
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| StoreError::Timeout)?
    }
}
