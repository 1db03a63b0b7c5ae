use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use super::{Document, DocumentStore, StoreError, VersionToken};

/// Process-local store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<String, Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document, as if it had been saved once.
    pub fn with_document(self, key: &str, body: Value) -> Self {
        self.documents.lock().insert(
            key.to_string(),
            Document {
                body,
                version: VersionToken(1),
            },
        );
        self
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn load(&self, key: &str) -> Result<Document, StoreError> {
        Ok(self
            .documents
            .lock()
            .get(key)
            .cloned()
            .unwrap_or_else(Document::empty))
    }

    async fn save(
        &self,
        key: &str,
        body: &Value,
        expected: Option<VersionToken>,
    ) -> Result<VersionToken, StoreError> {
        let mut documents = self.documents.lock();
        let current = documents
            .get(key)
            .map(|doc| doc.version)
            .unwrap_or_default();

        if let Some(expected) = expected {
            if expected != current {
                return Err(StoreError::Conflict {
                    key: key.to_string(),
                    expected: expected.0,
                });
            }
        }

        let version = current.next();
        documents.insert(
            key.to_string(),
            Document {
                body: body.clone(),
                version,
            },
        );
        Ok(version)
    }
}
