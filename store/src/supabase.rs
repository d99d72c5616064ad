use crate::config::SupabaseConfig;
use crate::provider::{BlobStore, OrderBy, RecordStore, StoreError, StoreResult, UploadOptions};
use crate::types::{QaTestReport, Table};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info};

/// Error body shared by PostgREST and the storage API.
#[derive(Deserialize)]
struct SupabaseApiError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    hint: Option<String>,
}

impl SupabaseApiError {
    fn into_message(self) -> Option<String> {
        let mut message = self.message.or(self.error)?;
        if let Some(details) = self.details.filter(|d| !d.is_empty()) {
            message = format!("{} ({})", message, details);
        }
        if let Some(hint) = self.hint.filter(|h| !h.is_empty()) {
            message = format!("{}; hint: {}", message, hint);
        }
        Some(message)
    }
}

/// Client for a Supabase project: PostgREST tables plus the storage API.
pub struct SupabaseProvider {
    http_client: reqwest::Client,
    base_url: Url,
}

impl SupabaseProvider {
    pub fn new(config: SupabaseConfig) -> StoreResult<Self> {
        config
            .validate()
            .map_err(|message| StoreError::InvalidConfig { message })?;

        let base = format!("{}/", config.url.trim_end_matches('/'));
        let base_url = Url::parse(&base).map_err(|e| StoreError::InvalidConfig {
            message: format!("Invalid Supabase URL: {}", e),
        })?;

        let mut headers = HeaderMap::new();
        let api_key = HeaderValue::from_str(&config.anon_key).map_err(|e| {
            StoreError::InvalidConfig {
                message: format!("Anon key is not a valid header value: {}", e),
            }
        })?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.anon_key)).map_err(
            |e| StoreError::InvalidConfig {
                message: format!("Anon key is not a valid header value: {}", e),
            },
        )?;
        headers.insert("apikey", api_key);
        headers.insert(AUTHORIZATION, bearer);

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| StoreError::Unknown {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    pub fn with_default_config() -> StoreResult<Self> {
        Self::new(SupabaseConfig::default())
    }

    fn endpoint(&self, segments: &[&str]) -> StoreResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| StoreError::InvalidConfig {
                    message: "Supabase URL cannot be a base".to_string(),
                })?;
            path.pop_if_empty();
            for segment in segments {
                // Object paths may contain folders.
                path.extend(segment.split('/').filter(|s| !s.is_empty()));
            }
        }
        Ok(url)
    }

    fn rest_url(&self, table: &str) -> StoreResult<Url> {
        self.endpoint(&["rest", "v1", table])
    }

    fn map_send_error(e: reqwest::Error) -> StoreError {
        if e.is_timeout() {
            StoreError::ServiceUnavailable {
                message: "Request timeout".to_string(),
            }
        } else if e.is_connect() {
            StoreError::ServiceUnavailable {
                message: "Cannot connect to Supabase".to_string(),
            }
        } else {
            StoreError::Network(e)
        }
    }

    async fn check_status(response: reqwest::Response) -> StoreResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<SupabaseApiError>(&body)
            .ok()
            .and_then(SupabaseApiError::into_message)
            .unwrap_or(body);

        Err(StoreError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl RecordStore for SupabaseProvider {
    async fn insert(&self, table: &str, row: Value) -> StoreResult<Value> {
        debug!("Inserting row into {}", table);

        let response = self
            .http_client
            .post(self.rest_url(table)?)
            .header("Prefer", "return=representation")
            .json(&[row])
            .send()
            .await
            .map_err(Self::map_send_error)?;
        let response = Self::check_status(response).await.inspect_err(|e| {
            error!("Insert into {} failed: {}", table, e);
        })?;

        let mut rows: Vec<Value> = response.json().await?;
        if rows.is_empty() {
            return Err(StoreError::Unknown {
                message: format!("Insert into {} returned no rows", table),
            });
        }

        info!("Inserted row into {}", table);
        Ok(rows.swap_remove(0))
    }

    async fn select(&self, table: &str, order: &OrderBy) -> StoreResult<Vec<Value>> {
        debug!("Selecting rows from {} ordered by {}", table, order.to_query());

        let response = self
            .http_client
            .get(self.rest_url(table)?)
            .query(&[("select", "*".to_string()), ("order", order.to_query())])
            .send()
            .await
            .map_err(Self::map_send_error)?;
        let response = Self::check_status(response).await?;

        let rows: Vec<Value> = response.json().await?;
        Ok(rows)
    }

    async fn health_check(&self) -> StoreResult<()> {
        debug!("Checking database connection");

        let response = self
            .http_client
            .head(self.rest_url(QaTestReport::NAME)?)
            .query(&[("select", "count")])
            .header("Prefer", "count=exact")
            .send()
            .await
            .map_err(Self::map_send_error)?;
        Self::check_status(response).await?;

        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "supabase"
    }
}

#[async_trait]
impl BlobStore for SupabaseProvider {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        options: &UploadOptions,
    ) -> StoreResult<String> {
        debug!("Uploading {} bytes to {}/{}", bytes.len(), bucket, path);

        let content_type = options
            .content_type
            .clone()
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let response = self
            .http_client
            .post(self.endpoint(&["storage", "v1", "object", bucket, path])?)
            .header(CACHE_CONTROL, format!("max-age={}", options.cache_control))
            .header("x-upsert", options.upsert.to_string())
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(Self::map_send_error)?;
        Self::check_status(response).await?;

        info!("Uploaded {}/{}", bucket, path);
        Ok(path.to_string())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        match self.endpoint(&["storage", "v1", "object", "public", bucket, path]) {
            Ok(url) => url.to_string(),
            Err(_) => format!(
                "{}storage/v1/object/public/{}/{}",
                self.base_url, bucket, path
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> SupabaseProvider {
        let config = SupabaseConfig::new()
            .with_url(server.uri())
            .with_anon_key("test-anon-key");
        SupabaseProvider::new(config).unwrap()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = SupabaseConfig::new().with_url("not-a-url");
        assert!(matches!(
            SupabaseProvider::new(config),
            Err(StoreError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_public_url() {
        let config = SupabaseConfig::new().with_url("https://abc.supabase.co/");
        let provider = SupabaseProvider::new(config).unwrap();

        assert_eq!(
            provider.public_url("testing-images", "Smoke_Homepage_1700000000000.png"),
            "https://abc.supabase.co/storage/v1/object/public/testing-images/Smoke_Homepage_1700000000000.png"
        );
        assert_eq!(
            provider.public_url("testing-images", "a_Tambah_Catatan_(flow)_1.png"),
            "https://abc.supabase.co/storage/v1/object/public/testing-images/a_Tambah_Catatan_(flow)_1.png"
        );
    }

    #[tokio::test]
    async fn test_insert_posts_single_row_array() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/qa_test_reports"))
            .and(header("apikey", "test-anon-key"))
            .and(header("authorization", "Bearer test-anon-key"))
            .and(header("prefer", "return=representation"))
            .and(body_json(json!([{"tester_name": "Alice"}])))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!([{"id": "r-1", "tester_name": "Alice"}])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let row = provider
            .insert("qa_test_reports", json!({"tester_name": "Alice"}))
            .await
            .unwrap();

        assert_eq!(row["id"], "r-1");
    }

    #[tokio::test]
    async fn test_insert_surfaces_postgrest_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/qa_test_reports"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "code": "PGRST204",
                "message": "Could not find the 'toko' column",
                "details": null,
                "hint": null
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let err = provider
            .insert("qa_test_reports", json!({}))
            .await
            .unwrap_err();

        match err {
            StoreError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Could not find the 'toko' column");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_select_orders_newest_first() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/internal_testing_cases"))
            .and(query_param("select", "*"))
            .and(query_param("order", "created_at.desc"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"test_name": "b"}, {"test_name": "a"}])),
            )
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let rows = provider
            .select("internal_testing_cases", &OrderBy::newest_first())
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["test_name"], "b");
    }

    #[tokio::test]
    async fn test_upload_sends_cache_and_upsert_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/storage/v1/object/testing-images/Smoke_Homepage_1.png"))
            .and(header("cache-control", "max-age=3600"))
            .and(header("x-upsert", "true"))
            .and(header("content-type", "image/png"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"Key": "testing-images/Smoke_Homepage_1.png"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let options = UploadOptions::default().with_content_type("image/png");
        let stored = provider
            .upload("testing-images", "Smoke_Homepage_1.png", vec![1, 2, 3], &options)
            .await
            .unwrap();

        assert_eq!(stored, "Smoke_Homepage_1.png");
    }

    #[tokio::test]
    async fn test_health_check_reports_failure() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/rest/v1/qa_test_reports"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        assert!(matches!(
            provider.health_check().await,
            Err(StoreError::Api { status: 401, .. })
        ));
        assert_eq!(provider.provider_name(), "supabase");
    }
}
