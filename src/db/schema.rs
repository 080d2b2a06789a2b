//! SQL DDL for initializing the certificate store.

/// SQLite schema with:
/// - `id` INTEGER PRIMARY KEY AUTOINCREMENT (store-assigned, insertion order)
/// - the six certificate fields, all required
/// - `card_no` UNIQUE, which also backs point lookups by card number
/// - a non-unique index on `iqama` for the alternate lookup key
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS certificates (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    iqama TEXT NOT NULL,
    course TEXT NOT NULL,
    card_no TEXT NOT NULL UNIQUE,
    issued TEXT NOT NULL,
    expiry TEXT NOT NULL,
    created_at TEXT NOT NULL -- RFC3339
);

CREATE INDEX IF NOT EXISTS idx_certificates_iqama ON certificates(iqama);
"#;
