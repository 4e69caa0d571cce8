//! # REST Backend
//!
//! `reqwest` client for a PostgREST-style table API plus an object
//! storage API on the same host:
//!
//! ```text
//! GET    /rest/v1/{table}?select=*           list
//! POST   /rest/v1/{table}                    insert
//! PATCH  /rest/v1/{table}?id=eq.{id}         update
//! DELETE /rest/v1/{table}?id=eq.{id}         delete
//! POST   /storage/v1/object/{bucket}/{path}  upload
//! POST   /storage/v1/object/list/{bucket}    list objects
//! DELETE /storage/v1/object/{bucket}/{path}  remove
//! GET    /storage/v1/object/public/{bucket}/{path}
//! ```
//!
//! Every request carries the API key twice: as `apikey` and as a bearer
//! token. Non-2xx responses become [`AdminError::Backend`].

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::backend::{row_id, Backend, Row, Storage, StoredObject};
use crate::config::BackendConfig;
use crate::error::{AdminError, AdminResult};

const USER_AGENT: &str = concat!("vanguard-admin/", env!("CARGO_PKG_VERSION"));
const LIST_LIMIT: u32 = 1000;

/// Client for the hosted backend.
#[derive(Debug, Clone)]
pub struct RestBackend {
    client: Client,
    base_url: String,
    bucket: String,
}

impl RestBackend {
    /// Creates a client. Does not touch the network.
    ///
    /// # Errors
    /// Returns [`AdminError::Config`] if the key isn't a valid header
    /// value or the HTTP client can't be built.
    pub fn new(config: &BackendConfig) -> AdminResult<Self> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| AdminError::Config("api_key contains invalid characters".to_string()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|_| AdminError::Config("api_key contains invalid characters".to_string()))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .map_err(|e| AdminError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.url.clone(),
            bucket: config.media_bucket.clone(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn object_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            self.bucket,
            path.trim_start_matches('/')
        )
    }

    fn table_request(&self, method: Method, table: &str, id: Option<&str>) -> RequestBuilder {
        let mut request = self
            .client
            .request(method, self.table_url(table))
            .header("Prefer", "return=representation");
        if let Some(id) = id {
            request = request.query(&[("id", format!("eq.{id}"))]);
        }
        request
    }

    /// Sends and returns the response, or the backend's error.
    async fn send(request: RequestBuilder) -> AdminResult<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), "backend request failed");
        Err(backend_error(status, &body))
    }

    /// The single row a mutation returned, or `NotFound` if none matched.
    async fn single_row(response: Response, table: &str, id: &str) -> AdminResult<Row> {
        let mut rows: Vec<Row> = response.json().await?;
        if rows.is_empty() {
            return Err(AdminError::NotFound {
                table: table.to_string(),
                id: id.to_string(),
            });
        }
        Ok(rows.swap_remove(0))
    }
}

/// Turns an error response into an [`AdminError::Backend`], preferring the
/// `message` field of a JSON body.
fn backend_error(status: StatusCode, body: &str) -> AdminError {
    #[derive(Deserialize)]
    struct ErrorBody {
        #[serde(alias = "error", alias = "msg")]
        message: String,
    }

    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.message)
        .ok()
        .filter(|m| !m.trim().is_empty())
        .or_else(|| Some(body.trim().to_string()).filter(|b| !b.is_empty()))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());

    AdminError::Backend {
        status: status.as_u16(),
        message,
    }
}

impl Backend for RestBackend {
    async fn list(&self, table: &str) -> AdminResult<Vec<Row>> {
        let request = self
            .client
            .get(self.table_url(table))
            .query(&[("select", "*")]);
        let body = Self::send(request).await?.text().await?;
        let rows = parse_rows(&body)?;
        tracing::debug!(table, rows = rows.len(), "listed table");
        Ok(rows)
    }

    async fn insert(&self, table: &str, row: Row) -> AdminResult<Row> {
        let id = row_id(&row).unwrap_or_default().to_string();
        let request = self.table_request(Method::POST, table, None).json(&row);
        let response = Self::send(request).await?;
        Self::single_row(response, table, &id).await
    }

    async fn update(&self, table: &str, id: &str, row: Row) -> AdminResult<Row> {
        let request = self.table_request(Method::PATCH, table, Some(id)).json(&row);
        let response = Self::send(request).await?;
        Self::single_row(response, table, id).await
    }

    async fn delete(&self, table: &str, id: &str) -> AdminResult<()> {
        let request = self.table_request(Method::DELETE, table, Some(id));
        let response = Self::send(request).await?;
        Self::single_row(response, table, id).await.map(|_| ())
    }

    async fn ping(&self) -> AdminResult<()> {
        let request = self.client.get(format!("{}/rest/v1/", self.base_url));
        Self::send(request).await.map(|_| ())
    }
}

#[derive(Deserialize)]
struct ListedObject {
    name: String,
    #[serde(default)]
    metadata: Option<ObjectMetadata>,
}

#[derive(Deserialize)]
struct ObjectMetadata {
    #[serde(default)]
    size: u64,
    #[serde(default)]
    mimetype: Option<String>,
}

impl Storage for RestBackend {
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> AdminResult<()> {
        let size = bytes.len();
        let request = self
            .client
            .post(self.object_url(path))
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "true")
            .body(bytes);
        Self::send(request).await?;
        tracing::info!(path, size, "uploaded media object");
        Ok(())
    }

    async fn list_objects(&self, prefix: &str) -> AdminResult<Vec<StoredObject>> {
        let url = format!("{}/storage/v1/object/list/{}", self.base_url, self.bucket);
        let request = self.client.post(url).json(&json!({
            "prefix": prefix,
            "limit": LIST_LIMIT,
            "sortBy": { "column": "name", "order": "asc" },
        }));
        let listed: Vec<ListedObject> = Self::send(request).await?.json().await?;

        let folder = prefix.trim_end_matches('/');
        Ok(listed
            .into_iter()
            // Folders come back without metadata.
            .filter_map(|object| {
                let metadata = object.metadata?;
                let path = if folder.is_empty() {
                    object.name
                } else {
                    format!("{folder}/{}", object.name)
                };
                Some(StoredObject {
                    path,
                    size: metadata.size,
                    content_type: metadata.mimetype,
                })
            })
            .collect())
    }

    async fn remove(&self, path: &str) -> AdminResult<()> {
        Self::send(self.client.delete(self.object_url(path))).await?;
        tracing::info!(path, "removed media object");
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            self.bucket,
            path.trim_start_matches('/')
        )
    }
}

/// Decodes a response body that should be a JSON array of rows.
fn parse_rows(body: &str) -> AdminResult<Vec<Row>> {
    match serde_json::from_str::<Value>(body)? {
        Value::Array(rows) => Ok(rows),
        other => Err(AdminError::Decode(format!("expected an array of rows, got {other}"))),
    }
}
