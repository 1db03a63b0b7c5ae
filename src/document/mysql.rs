use async_trait::async_trait;
use serde_json::Value;
use sqlx::MySqlPool;
use tracing::{error, info};

use super::{Document, DocumentStore, StoreError, VersionToken};

/// Documents as rows of a single `documents` table, one row per key.
#[derive(Debug, Clone)]
pub struct MySqlDocumentStore {
    pool: MySqlPool,
}

impl MySqlDocumentStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = MySqlPool::connect(database_url).await?;
        Ok(Self::new(pool))
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                doc_key VARCHAR(64) NOT NULL PRIMARY KEY,
                body    LONGTEXT NOT NULL,
                version BIGINT UNSIGNED NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        info!("Document table ready");
        Ok(())
    }

    fn conflict(key: &str, expected: VersionToken) -> StoreError {
        StoreError::Conflict {
            key: key.to_string(),
            expected: expected.0,
        }
    }
}

#[async_trait]
impl DocumentStore for MySqlDocumentStore {
    async fn load(&self, key: &str) -> Result<Document, StoreError> {
        let row = sqlx::query_as::<_, (String, u64)>(
            "SELECT body, version FROM documents WHERE doc_key = ?",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some((body, version)) => Ok(Document {
                body: serde_json::from_str(&body)?,
                version: VersionToken(version),
            }),
            None => Ok(Document::empty()),
        }
    }

    async fn save(
        &self,
        key: &str,
        body: &Value,
        expected: Option<VersionToken>,
    ) -> Result<VersionToken, StoreError> {
        let text = serde_json::to_string(body)?;

        match expected {
            // never written: the row must not exist yet
            Some(expected) if expected.0 == 0 => {
                let result = sqlx::query(
                    "INSERT INTO documents (doc_key, body, version) VALUES (?, ?, 1)",
                )
                .bind(key)
                .bind(&text)
                .execute(&self.pool)
                .await;

                match result {
                    Ok(_) => Ok(VersionToken(1)),
                    Err(e) => {
                        // someone else created it first
                        if let sqlx::Error::Database(db_err) = &e {
                            if db_err.code().as_deref() == Some("23000") {
                                return Err(Self::conflict(key, expected));
                            }
                        }
                        error!(error = %e, key, "Document insert failed");
                        Err(e.into())
                    }
                }
            }

            Some(expected) => {
                let result = sqlx::query(
                    r#"
                    UPDATE documents
                    SET body = ?, version = version + 1
                    WHERE doc_key = ?
                    AND version = ?
                    "#,
                )
                .bind(&text)
                .bind(key)
                .bind(expected.0)
                .execute(&self.pool)
                .await?;

                if result.rows_affected() == 0 {
                    return Err(Self::conflict(key, expected));
                }
                Ok(expected.next())
            }

            None => {
                sqlx::query(
                    r#"
                    INSERT INTO documents (doc_key, body, version)
                    VALUES (?, ?, 1)
                    ON DUPLICATE KEY UPDATE body = VALUES(body), version = version + 1
                    "#,
                )
                .bind(key)
                .bind(&text)
                .execute(&self.pool)
                .await?;

                let version = sqlx::query_scalar::<_, u64>(
                    "SELECT version FROM documents WHERE doc_key = ?",
                )
                .bind(key)
                .fetch_one(&self.pool)
                .await?;
                Ok(VersionToken(version))
            }
        }
    }
}
