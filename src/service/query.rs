use crate::error::CertError;

/// Trim a raw lookup query, rejecting absent or blank input.
pub fn normalize_query(raw: Option<&str>) -> Result<String, CertError> {
    match raw.map(str::trim) {
        Some(q) if !q.is_empty() => Ok(q.to_string()),
        _ => Err(CertError::InvalidInput),
    }
}
