//! libSQL backend — async store trait implementations.
//!
//! Supports local file, in-memory, and remote (sqld / Turso) databases.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::store::migrations;
use crate::store::traits::{EnrollmentStore, NewPerson, PaymentRecord, PaymentStore};

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let backend = Self::from_database(db).await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Connect to a remote libSQL server.
    pub async fn new_remote(url: &str, auth_token: &str) -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_remote(url.to_string(), auth_token.to_string())
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to connect to {url}: {e}")))?;

        let backend = Self::from_database(db).await?;
        info!(url = %url, "Remote database connected");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        Self::from_database(db).await
    }

    async fn from_database(db: LibSqlDatabase) -> Result<Self, DatabaseError> {
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        migrations::run_migrations(&conn).await?;
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    /// Get the connection.
    fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Record a payment period for a person. Used by back-office imports and tests.
    pub async fn record_payment(
        &self,
        person_id: &str,
        period: &str,
        payment_state: &str,
        due_date: Option<NaiveDate>,
    ) -> Result<String, DatabaseError> {
        let id = Uuid::new_v4().to_string();
        self.conn()
            .execute(
                "INSERT INTO payments (id, person_id, period, payment_state, due_date)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    id.clone(),
                    person_id,
                    period,
                    payment_state,
                    opt_text(due_date.map(|d| d.format("%Y-%m-%d").to_string())),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("record_payment: {e}")))?;
        Ok(id)
    }
}

/// Convert `Option<String>` to libsql Value.
fn opt_text(s: Option<String>) -> libsql::Value {
    match s {
        Some(s) => libsql::Value::Text(s),
        None => libsql::Value::Null,
    }
}

/// Map a libsql Row to a PaymentRecord.
///
/// Column order: 0:document, 1:payment_state, 2:due_date
fn row_to_payment(row: &libsql::Row) -> Result<PaymentRecord, libsql::Error> {
    let document: String = row.get(0)?;
    let state: String = row.get(1)?;
    let due_date = row
        .get::<String>(2)
        .ok()
        .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok());
    Ok(PaymentRecord {
        document,
        state,
        due_date,
    })
}

// ── Trait implementations ───────────────────────────────────────────

#[async_trait]
impl PaymentStore for LibSqlBackend {
    async fn lookup_payment_status(
        &self,
        document: &str,
    ) -> Result<Option<PaymentRecord>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT pe.document, pa.payment_state, pa.due_date
                 FROM payments pa
                 JOIN persons pe ON pe.id = pa.person_id
                 WHERE pe.document = ?1
                 ORDER BY COALESCE(pa.due_date, '') DESC, pa.created_at DESC, pa.rowid DESC
                 LIMIT 1",
                params![document],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("lookup_payment_status: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let record = row_to_payment(&row)
                    .map_err(|e| DatabaseError::Query(format!("row parse: {e}")))?;
                debug!(document, state = %record.state, "Payment record found");
                Ok(Some(record))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("lookup_payment_status: {e}"))),
        }
    }
}

#[async_trait]
impl EnrollmentStore for LibSqlBackend {
    async fn insert_person(&self, person: &NewPerson) -> Result<String, DatabaseError> {
        let id = Uuid::new_v4().to_string();
        self.conn()
            .execute(
                "INSERT INTO persons (id, first_names, last_names, whatsapp_number, email, status, document)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    id.clone(),
                    person.first_names.clone(),
                    person.last_names.clone(),
                    person.whatsapp_number.clone(),
                    opt_text(person.email.clone()),
                    opt_text(person.status.clone()),
                    person.document.clone(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("insert_person: {e}")))?;

        debug!(id = %id, document = %person.document, "Person inserted into DB");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> LibSqlBackend {
        LibSqlBackend::new_memory().await.unwrap()
    }

    fn person(document: &str) -> NewPerson {
        NewPerson {
            first_names: "Ana".into(),
            last_names: "Quispe".into(),
            whatsapp_number: "51987654321".into(),
            email: Some("ana@example.com".into()),
            status: None,
            document: document.into(),
        }
    }

    fn date(s: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
    }

    #[tokio::test]
    async fn lookup_unknown_document_returns_none() {
        let db = test_db().await;
        let result = db.lookup_payment_status("00000000").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn person_without_payments_returns_none() {
        let db = test_db().await;
        db.insert_person(&person("12345678")).await.unwrap();
        assert!(db.lookup_payment_status("12345678").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn lookup_returns_latest_period() {
        let db = test_db().await;
        let id = db.insert_person(&person("12345678")).await.unwrap();
        db.record_payment(&id, "2026-08", "Al día", date("2026-08-05"))
            .await
            .unwrap();
        db.record_payment(&id, "2026-09", "En deuda (pago vencido)", date("2026-09-05"))
            .await
            .unwrap();

        let record = db.lookup_payment_status("12345678").await.unwrap().unwrap();
        assert_eq!(record.document, "12345678");
        assert_eq!(record.state, "En deuda (pago vencido)");
        assert_eq!(record.due_date, date("2026-09-05"));
    }

    #[tokio::test]
    async fn lookup_ignores_other_documents() {
        let db = test_db().await;
        let a = db.insert_person(&person("11111111")).await.unwrap();
        let b = db.insert_person(&person("22222222")).await.unwrap();
        db.record_payment(&a, "2026-09", "Al día", None).await.unwrap();
        db.record_payment(&b, "2026-09", "En deuda (pago vencido)", None)
            .await
            .unwrap();

        let record = db.lookup_payment_status("11111111").await.unwrap().unwrap();
        assert_eq!(record.state, "Al día");
        assert!(record.due_date.is_none());
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let db = test_db().await;
        migrations::run_migrations(db.conn()).await.unwrap();
    }

    #[tokio::test]
    async fn new_local_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let db_path = tmp.path().join("nested").join("edubot.db");
        let db = LibSqlBackend::new_local(&db_path).await.unwrap();
        assert!(db_path.exists());
        drop(db);
    }
}
