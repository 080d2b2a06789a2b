//! Database module: certificate models, the store contract and its SQLite backend.
//!
//! Layout:
//! - `models.rs`: typed input record, stored row and public view
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `store.rs`: the `CertificateStore` trait and lookup predicates
//! - `sqlite.rs`: sqlx-backed implementation

pub mod models;
pub mod schema;
pub mod sqlite;
pub mod store;

pub use models::{CertificateRecord, CertificateView, NewCertificate};
pub use schema::SQLITE_INIT;
pub use sqlite::{SqliteCertificateStore, SqlitePool};
pub use store::{CertificateStore, Field, Predicate};
