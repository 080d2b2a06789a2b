use crate::db::models::NewCertificate;
use crate::error::{CertError, StoreError};
use crate::service::certificates::CertificateService;
use serde::Deserialize;
use std::{fs, io, path::Path};
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A seed file holds either one certificate or an array of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum SeedFile {
    Many(Vec<NewCertificate>),
    One(NewCertificate),
}

/// Outcome of a seeding pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub inserted: usize,
    pub duplicates: usize,
    pub rejected: usize,
}

/// Load certificate records from a JSON file, or from every `.json` file in a directory.
/// Unreadable or malformed files are logged and skipped.
pub fn load_from_path(path: &Path) -> Result<Vec<NewCertificate>, SeedError> {
    if !path.exists() {
        info!(path = %path.display(), "seed path not found; skipping load");
        return Ok(Vec::new());
    }
    if path.is_file() {
        return load_file(path);
    }

    let mut files: Vec<_> = fs::read_dir(path)?
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.path()),
            Err(e) => {
                warn!(error = %e, "failed to read seed dir entry");
                None
            }
        })
        .filter(|p| is_json_file(p))
        .collect();
    files.sort();

    let loaded = files
        .iter()
        .filter_map(|p| {
            load_file(p)
                .inspect_err(|e| {
                    warn!(path = %p.display(), error = %e, "failed to load seed file");
                })
                .ok()
        })
        .flatten()
        .collect();
    Ok(loaded)
}

/// Insert every record, counting duplicates and malformed records instead of aborting.
pub async fn seed(
    service: &CertificateService,
    records: Vec<NewCertificate>,
) -> Result<SeedReport, CertError> {
    let mut report = SeedReport::default();
    for record in records {
        let card_no = record.card_no.clone();
        match service.insert(record).await {
            Ok(_) => report.inserted += 1,
            Err(CertError::Store(e)) if e.is_uniqueness() => {
                warn!(card_no = %card_no, "certificate already exists; skipping");
                report.duplicates += 1;
            }
            Err(CertError::Store(StoreError::MalformedRecord(reason))) => {
                warn!(card_no = %card_no, reason = %reason, "malformed certificate; skipping");
                report.rejected += 1;
            }
            Err(e) => return Err(e),
        }
    }
    Ok(report)
}

fn is_json_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        == Some(true)
}

fn load_file(path: &Path) -> Result<Vec<NewCertificate>, SeedError> {
    let contents = fs::read_to_string(path)?;
    Ok(match serde_json::from_str(&contents)? {
        SeedFile::Many(records) => records,
        SeedFile::One(record) => vec![record],
    })
}
