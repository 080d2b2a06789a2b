use crate::db::models::{CertificateRecord, NewCertificate};
use crate::db::schema::SQLITE_INIT;
use crate::db::store::{CertificateStore, Predicate};
use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

pub type SqlitePool = Pool<Sqlite>;

const SELECT_COLUMNS: &str = "id, name, iqama, course, card_no, issued, expiry, created_at";

#[derive(Clone)]
pub struct SqliteCertificateStore {
    pool: SqlitePool,
}

impl SqliteCertificateStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a pool for `database_url`, creating the database file if needed.
    ///
    /// In-memory databases (`:memory:` or `mode=memory`) get a single
    /// long-lived connection so every query sees the same data.
    pub async fn connect(
        database_url: &str,
        acquire_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let mut pool_opts = SqlitePoolOptions::new().acquire_timeout(acquire_timeout);
        if is_in_memory(database_url) {
            pool_opts = pool_opts
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        } else {
            pool_opts = pool_opts.max_connections(5);
        }
        let pool = pool_opts.connect_with(connect_opts).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        // sqlx::query runs one statement at a time
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    fn row_to_model(row: SqliteRow) -> Result<CertificateRecord, StoreError> {
        let created_at_str: String = row.try_get("created_at")?;
        let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?
            .with_timezone(&Utc);

        Ok(CertificateRecord {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            iqama: row.try_get("iqama")?,
            course: row.try_get("course")?,
            card_no: row.try_get("card_no")?,
            issued: row.try_get("issued")?,
            expiry: row.try_get("expiry")?,
            created_at,
        })
    }
}

/// `sqlite::memory:` style URLs and `file:` URLs opened with `mode=memory`.
fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:")
        || database_url
            .split_once('?')
            .is_some_and(|(_, query)| query.split('&').any(|kv| kv == "mode=memory"))
}

/// Render a predicate as `(WHERE body, ORDER BY body, bind values)`.
/// Bind values are listed in the order their placeholders appear.
fn render(predicate: &Predicate) -> (String, String, Vec<&str>) {
    match predicate {
        Predicate::Eq(field, value) => (
            format!("{} = ?", field.column()),
            "id".to_string(),
            vec![value.as_str()],
        ),
        Predicate::Or(first, first_value, second, second_value) => (
            format!("{} = ? OR {} = ?", first.column(), second.column()),
            format!("CASE WHEN {} = ? THEN 0 ELSE 1 END, id", first.column()),
            vec![
                first_value.as_str(),
                second_value.as_str(),
                first_value.as_str(),
            ],
        ),
    }
}

#[async_trait]
impl CertificateStore for SqliteCertificateStore {
    async fn find_one(
        &self,
        predicate: &Predicate,
    ) -> Result<Option<CertificateRecord>, StoreError> {
        let (filter, order, binds) = render(predicate);
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM certificates WHERE {filter} ORDER BY {order} LIMIT 1"
        );
        let mut query = sqlx::query(&sql);
        for value in binds {
            query = query.bind(value);
        }
        let row = query.fetch_optional(&self.pool).await?;
        row.map(Self::row_to_model).transpose()
    }

    async fn insert_one(&self, record: NewCertificate) -> Result<CertificateRecord, StoreError> {
        record.validate()?;
        let created_at = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO certificates (
                name, iqama, course, card_no, issued, expiry, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.name)
        .bind(&record.iqama)
        .bind(&record.course)
        .bind(&record.card_no)
        .bind(&record.issued)
        .bind(&record.expiry)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => StoreError::Uniqueness {
                card_no: record.card_no.clone(),
            },
            other => StoreError::Database(other),
        })?;

        let id = result.last_insert_rowid();
        debug!(id, card_no = %record.card_no, "certificate inserted");

        Ok(CertificateRecord {
            id,
            name: record.name,
            iqama: record.iqama,
            course: record.course,
            card_no: record.card_no,
            issued: record.issued,
            expiry: record.expiry,
            created_at,
        })
    }

    async fn delete_one(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        let (filter, order, binds) = render(predicate);
        let sql = format!(
            "DELETE FROM certificates WHERE id = \
             (SELECT id FROM certificates WHERE {filter} ORDER BY {order} LIMIT 1)"
        );
        let mut query = sqlx::query(&sql);
        for value in binds {
            query = query.bind(value);
        }
        let result = query.execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> SqliteCertificateStore {
        let store = SqliteCertificateStore::connect("sqlite::memory:", Duration::from_secs(5))
            .await
            .unwrap();
        store.init_schema().await.unwrap();
        store
    }

    fn cert(card_no: &str, iqama: &str, name: &str) -> NewCertificate {
        NewCertificate {
            name: name.into(),
            iqama: iqama.into(),
            course: "Safety Training".into(),
            card_no: card_no.into(),
            issued: "2024-01-01".into(),
            expiry: "2026-01-01".into(),
        }
    }

    #[test]
    fn memory_urls_are_recognized() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite://:memory:"));
        assert!(is_in_memory("sqlite:file:certs?mode=memory&cache=shared"));
        assert!(is_in_memory("sqlite:file:certs?cache=shared&mode=memory"));
        assert!(!is_in_memory("sqlite:certificates.db"));
        assert!(!is_in_memory("sqlite:certificates.db?mode=rwc"));
    }

    #[tokio::test]
    async fn duplicate_card_no_is_a_uniqueness_violation() {
        let store = store().await;
        store.insert_one(cert("CARD-001", "111", "First")).await.unwrap();

        let err = store
            .insert_one(cert("CARD-001", "222", "Second"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Uniqueness { ref card_no } if card_no == "CARD-001"));

        let kept = store
            .find_one(&Predicate::card_no("CARD-001"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(kept.name, "First");
    }

    #[tokio::test]
    async fn malformed_record_never_reaches_the_table() {
        let store = store().await;
        let err = store.insert_one(cert("", "111", "Nameless")).await.unwrap_err();
        assert!(matches!(err, StoreError::MalformedRecord(_)));

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM certificates")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(count.0, 0);
    }

    #[tokio::test]
    async fn or_lookup_prefers_card_no_then_insertion_order() {
        let store = store().await;
        // "X-1" is the iqama of two records and the cardNo of a third.
        store.insert_one(cert("A", "X-1", "iqama-first")).await.unwrap();
        store.insert_one(cert("B", "X-1", "iqama-second")).await.unwrap();
        store.insert_one(cert("X-1", "999", "card-match")).await.unwrap();

        let hit = store
            .find_one(&Predicate::card_no_or_iqama("X-1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit.name, "card-match");

        store.delete_one(&Predicate::card_no("X-1")).await.unwrap();
        let hit = store
            .find_one(&Predicate::card_no_or_iqama("X-1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit.name, "iqama-first");
    }

    #[tokio::test]
    async fn delete_removes_at_most_one_row() {
        let store = store().await;
        store.insert_one(cert("A", "shared", "a")).await.unwrap();
        store.insert_one(cert("B", "shared", "b")).await.unwrap();

        let removed = store
            .delete_one(&Predicate::Eq(crate::db::store::Field::Iqama, "shared".into()))
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert!(store.find_one(&Predicate::card_no("A")).await.unwrap().is_none());
        assert!(store.find_one(&Predicate::card_no("B")).await.unwrap().is_some());

        assert_eq!(store.delete_one(&Predicate::card_no("A")).await.unwrap(), 0);
    }
}
