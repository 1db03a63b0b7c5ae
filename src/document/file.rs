use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use actix_web::error::BlockingError;
use actix_web::web;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{Document, DocumentStore, StoreError, VersionToken};

/// On-disk layout of `{dir}/{key}.json`.
#[derive(Serialize, Deserialize)]
struct Envelope {
    version: u64,
    records: Value,
}

/// Documents as JSON files in one directory.
///
/// A bare JSON array (a hand-made or exported file) is accepted and read as
/// version 0; the first save wraps it in an envelope. File access runs on the
/// blocking pool, never on the worker's event loop.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
    // serialises read-compare-write within this process only
    write_lock: Arc<Mutex<()>>,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

fn read_document(path: &Path) -> Result<Document, StoreError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Document::empty()),
        Err(e) => return Err(e.into()),
    };

    match serde_json::from_slice::<Value>(&bytes)? {
        body @ Value::Array(_) => Ok(Document {
            body,
            version: VersionToken(0),
        }),
        other => {
            let envelope: Envelope = serde_json::from_value(other)?;
            Ok(Document {
                body: envelope.records,
                version: VersionToken(envelope.version),
            })
        }
    }
}

/// Compare-and-swap write. The caller holds the write lock.
fn write_document(
    dir: &Path,
    path: &Path,
    key: &str,
    records: Value,
    expected: Option<VersionToken>,
) -> Result<VersionToken, StoreError> {
    let current = read_document(path)?.version;
    if let Some(expected) = expected {
        if expected != current {
            return Err(StoreError::Conflict {
                key: key.to_string(),
                expected: expected.0,
            });
        }
    }

    let version = current.next();
    let envelope = Envelope {
        version: version.0,
        records,
    };

    fs::create_dir_all(dir)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_vec_pretty(&envelope)?)?;
    fs::rename(&tmp, path)?;

    debug!(key, version = version.0, path = %path.display(), "Document written");
    Ok(version)
}

fn pool_failure(err: BlockingError) -> StoreError {
    StoreError::Io(io::Error::other(err.to_string()))
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn load(&self, key: &str) -> Result<Document, StoreError> {
        let path = self.path(key);
        web::block(move || read_document(&path))
            .await
            .map_err(pool_failure)?
    }

    async fn save(
        &self,
        key: &str,
        body: &Value,
        expected: Option<VersionToken>,
    ) -> Result<VersionToken, StoreError> {
        let (dir, path, lock) = (self.dir.clone(), self.path(key), self.write_lock.clone());
        let (key, records) = (key.to_string(), body.clone());

        web::block(move || {
            let _guard = lock.lock();
            write_document(&dir, &path, &key, records, expected)
        })
        .await
        .map_err(pool_failure)?
    }
}
