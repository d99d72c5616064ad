//! In-process backend used by tests and by the CLI's offline mode.

use crate::provider::{BlobStore, OrderBy, RecordStore, StoreError, StoreResult, UploadOptions};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

const PUBLIC_BASE: &str = "memory://storage/v1/object/public";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bucket: String,
    pub path: String,
    pub bytes: Vec<u8>,
    pub options: UploadOptions,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, Vec<(u64, Value)>>>,
    objects: Mutex<Vec<StoredObject>>,
    sequence: AtomicUsize,
    inserts: AtomicUsize,
    selects: AtomicUsize,
    fail_inserts: AtomicBool,
    fail_selects: AtomicBool,
    fail_uploads: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_selects(&self, fail: bool) {
        self.fail_selects.store(fail, Ordering::SeqCst);
    }

    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    /// Number of `insert` calls, failed ones included.
    pub fn insert_count(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn select_count(&self) -> usize {
        self.selects.load(Ordering::SeqCst)
    }

    pub async fn rows(&self, table: &str) -> Vec<Value> {
        let tables = self.tables.lock().await;
        tables
            .get(table)
            .map(|rows| rows.iter().map(|(_, row)| row.clone()).collect())
            .unwrap_or_default()
    }

    pub async fn objects(&self) -> Vec<StoredObject> {
        self.objects.lock().await.clone()
    }

    fn timestamp(row: &Value, column: &str) -> Option<DateTime<Utc>> {
        row.get(column)
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert(&self, table: &str, mut row: Value) -> StoreResult<Value> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::Api {
                status: 503,
                message: format!("insert into {} rejected", table),
            });
        }

        let object = row.as_object_mut().ok_or_else(|| StoreError::Unknown {
            message: "Row must be a JSON object".to_string(),
        })?;
        let now = Utc::now().to_rfc3339();
        object
            .entry("id")
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
        object
            .entry("created_at")
            .or_insert_with(|| Value::String(now.clone()));
        object
            .entry("updated_at")
            .or_insert_with(|| Value::String(now));

        let seq = self.sequence.fetch_add(1, Ordering::SeqCst) as u64;
        let mut tables = self.tables.lock().await;
        tables
            .entry(table.to_string())
            .or_default()
            .push((seq, row.clone()));

        debug!("Stored row {} in {}", seq, table);
        Ok(row)
    }

    async fn select(&self, table: &str, order: &OrderBy) -> StoreResult<Vec<Value>> {
        self.selects.fetch_add(1, Ordering::SeqCst);
        if self.fail_selects.load(Ordering::SeqCst) {
            return Err(StoreError::ServiceUnavailable {
                message: format!("select from {} rejected", table),
            });
        }

        let tables = self.tables.lock().await;
        let mut rows = tables.get(table).cloned().unwrap_or_default();

        rows.sort_by(|(seq_a, a), (seq_b, b)| {
            let key_a = (Self::timestamp(a, &order.column), seq_a);
            let key_b = (Self::timestamp(b, &order.column), seq_b);
            if order.ascending {
                key_a.cmp(&key_b)
            } else {
                key_b.cmp(&key_a)
            }
        });

        Ok(rows.into_iter().map(|(_, row)| row).collect())
    }

    async fn health_check(&self) -> StoreResult<()> {
        if self.fail_selects.load(Ordering::SeqCst) {
            return Err(StoreError::ServiceUnavailable {
                message: "memory store is failing reads".to_string(),
            });
        }
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        options: &UploadOptions,
    ) -> StoreResult<String> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(StoreError::Api {
                status: 400,
                message: format!("upload of {} rejected", path),
            });
        }

        let mut objects = self.objects.lock().await;
        if let Some(existing) = objects
            .iter_mut()
            .find(|o| o.bucket == bucket && o.path == path)
        {
            if !options.upsert {
                return Err(StoreError::Api {
                    status: 409,
                    message: "The resource already exists".to_string(),
                });
            }
            existing.bytes = bytes;
            existing.options = options.clone();
        } else {
            objects.push(StoredObject {
                bucket: bucket.to_string(),
                path: path.to_string(),
                bytes,
                options: options.clone(),
            });
        }

        Ok(path.to_string())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/{}/{}", PUBLIC_BASE, bucket, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_assigns_identity() {
        let store = MemoryStore::new();
        let row = store
            .insert("qa_test_reports", json!({"tester_name": "Alice"}))
            .await
            .unwrap();

        assert!(row["id"].is_string());
        assert!(row["created_at"].is_string());
        assert_eq!(store.insert_count(), 1);
        assert_eq!(store.rows("qa_test_reports").await.len(), 1);
    }

    #[tokio::test]
    async fn test_select_newest_first() {
        let store = MemoryStore::new();
        store
            .insert("t", json!({"name": "old", "created_at": "2024-01-01T00:00:00Z"}))
            .await
            .unwrap();
        store
            .insert("t", json!({"name": "new", "created_at": "2024-06-01T00:00:00Z"}))
            .await
            .unwrap();
        store
            .insert("t", json!({"name": "mid", "created_at": "2024-03-01T00:00:00+00:00"}))
            .await
            .unwrap();

        let rows = store.select("t", &OrderBy::newest_first()).await.unwrap();
        let names: Vec<_> = rows.iter().map(|r| r["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let store = MemoryStore::new();
        store.fail_inserts(true);
        store.fail_selects(true);

        assert!(store.insert("t", json!({})).await.is_err());
        assert!(store.select("t", &OrderBy::newest_first()).await.is_err());
        assert!(store.health_check().await.is_err());
        assert_eq!(store.insert_count(), 1);
        assert!(store.rows("t").await.is_empty());
    }

    #[tokio::test]
    async fn test_upload_upsert() {
        let store = MemoryStore::new();
        let options = UploadOptions::default();

        store
            .upload("testing-images", "a.png", vec![1], &options)
            .await
            .unwrap();
        store
            .upload("testing-images", "a.png", vec![2], &options)
            .await
            .unwrap();

        let objects = store.objects().await;
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].bytes, vec![2]);

        let no_upsert = UploadOptions {
            upsert: false,
            ..UploadOptions::default()
        };
        assert!(store
            .upload("testing-images", "a.png", vec![3], &no_upsert)
            .await
            .is_err());

        assert_eq!(
            store.public_url("testing-images", "a.png"),
            "memory://storage/v1/object/public/testing-images/a.png"
        );
    }
}
