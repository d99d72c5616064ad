use crate::types::Table;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Backend returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Service unavailable: {message}")]
    ServiceUnavailable { message: String },

    #[error("Record not found: {id}")]
    NotFound { id: String },

    #[error("Unknown error: {message}")]
    Unknown { message: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Row ordering for `select`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub ascending: bool,
}

impl OrderBy {
    pub fn descending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }

    /// `created_at desc`, the only ordering the dashboards use.
    pub fn newest_first() -> Self {
        Self::descending("created_at")
    }

    pub fn to_query(&self) -> String {
        let direction = if self.ascending { "asc" } else { "desc" };
        format!("{}.{}", self.column, direction)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    /// Seconds, sent as `max-age`.
    pub cache_control: String,
    pub upsert: bool,
    pub content_type: Option<String>,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            cache_control: "3600".to_string(),
            upsert: true,
            content_type: None,
        }
    }
}

impl UploadOptions {
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Structured-data side of the backend. Rows travel as JSON objects.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert(&self, table: &str, row: Value) -> StoreResult<Value>;

    async fn select(&self, table: &str, order: &OrderBy) -> StoreResult<Vec<Value>>;

    async fn health_check(&self) -> StoreResult<()>;

    fn provider_name(&self) -> &'static str;
}

/// Blob side of the backend.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Returns the stored object path inside the bucket.
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        options: &UploadOptions,
    ) -> StoreResult<String>;

    fn public_url(&self, bucket: &str, path: &str) -> String;
}

/// A backend offering both tables and blobs.
pub trait Backend: RecordStore + BlobStore {}

impl<T: RecordStore + BlobStore> Backend for T {}

pub async fn insert_record<T, S>(store: &S, record: &T) -> StoreResult<T>
where
    T: Table,
    S: RecordStore + ?Sized,
{
    let row = serde_json::to_value(record)?;
    let inserted = store.insert(T::NAME, row).await?;
    Ok(serde_json::from_value(inserted)?)
}

pub async fn select_records<T, S>(store: &S) -> StoreResult<Vec<T>>
where
    T: Table,
    S: RecordStore + ?Sized,
{
    let rows = store.select(T::NAME, &OrderBy::newest_first()).await?;
    debug!("Fetched {} rows from {}", rows.len(), T::NAME);

    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(StoreError::from))
        .collect()
}
