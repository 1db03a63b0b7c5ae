//! Whole-document persistence.
//!
//! Collections are fetched wholesale, changed in memory and written back
//! wholesale. Every load returns a [`VersionToken`]; passing it back to
//! [`DocumentStore::save`] turns the write into a compare-and-swap, so a stale
//! writer gets [`StoreError::Conflict`] instead of silently clobbering a
//! concurrent session's change.

mod file;
mod memory;
mod mysql;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use mysql::MySqlDocumentStore;

use async_trait::async_trait;
use derive_more::Display;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

pub const ATTENDANCE_KEY: &str = "attendance";
pub const EMPLOYEES_KEY: &str = "employees";

/// Monotonic document revision. `0` means the document has never been written.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct VersionToken(pub u64);

impl VersionToken {
    pub fn next(self) -> Self {
        VersionToken(self.0 + 1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub body: Value,
    pub version: VersionToken,
}

impl Document {
    pub fn empty() -> Self {
        Self {
            body: Value::Array(Vec::new()),
            version: VersionToken::default(),
        }
    }

    /// Decode the body as a collection. A `null` body is an empty collection.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<Vec<T>, StoreError> {
        if self.body.is_null() {
            return Ok(Vec::new());
        }
        Ok(Vec::<T>::deserialize(&self.body)?)
    }
}

pub fn encode<T: Serialize>(items: &[T]) -> Result<Value, StoreError> {
    Ok(serde_json::to_value(items)?)
}

#[derive(Debug, Display)]
pub enum StoreError {
    #[display(
        fmt = "document '{}' changed since it was read (expected version {})",
        key,
        expected
    )]
    Conflict { key: String, expected: u64 },

    #[display(fmt = "I/O error: {}", _0)]
    Io(std::io::Error),

    #[display(fmt = "database error: {}", _0)]
    Database(sqlx::Error),

    #[display(fmt = "malformed document: {}", _0)]
    Serde(serde_json::Error),
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Conflict { .. } => None,
            StoreError::Io(e) => Some(e),
            StoreError::Database(e) => Some(e),
            StoreError::Serde(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serde(err)
    }
}

/// Key-value store of JSON collections with optimistic concurrency.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Missing documents load as an empty collection at version 0.
    async fn load(&self, key: &str) -> Result<Document, StoreError>;

    /// Replace the document. With `expected`, fails with [`StoreError::Conflict`]
    /// unless the stored version still equals it. Returns the new version.
    async fn save(
        &self,
        key: &str,
        body: &Value,
        expected: Option<VersionToken>,
    ) -> Result<VersionToken, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::AttendanceRecord;
    use serde_json::json;

    #[test]
    fn null_body_decodes_empty() {
        let doc = Document {
            body: Value::Null,
            version: VersionToken(4),
        };
        let records: Vec<AttendanceRecord> = doc.decode().unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn malformed_body_is_a_serde_error() {
        let doc = Document {
            body: json!({"not": "a list"}),
            version: VersionToken(1),
        };
        let res: Result<Vec<AttendanceRecord>, _> = doc.decode();
        assert!(matches!(res, Err(StoreError::Serde(_))));
    }
}
