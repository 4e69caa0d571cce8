//! # Backend Seams
//!
//! Two async traits describe everything the back office needs from the
//! hosted service:
//! - [`Backend`] - CRUD over tables of JSON rows
//! - [`Storage`] - a bucket of media files
//!
//! [`RestBackend`](crate::rest::RestBackend) talks to the real service;
//! [`MemoryBackend`](crate::memory::MemoryBackend) keeps everything in
//! process for tests and offline demos. The typed helpers at the bottom
//! convert between rows and [`Record`]s.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use vanguard_content::Record;

use crate::error::{AdminError, AdminResult};

/// A table row as sent over the wire.
pub type Row = Value;

/// CRUD over backend tables.
// Screens run on a current-thread runtime, so futures need not be Send.
#[allow(async_fn_in_trait)]
pub trait Backend {
    /// Every row of `table`.
    async fn list(&self, table: &str) -> AdminResult<Vec<Row>>;

    /// Inserts a row and returns it as stored.
    async fn insert(&self, table: &str, row: Row) -> AdminResult<Row>;

    /// Replaces fields of the row with `id` and returns it as stored.
    async fn update(&self, table: &str, id: &str, row: Row) -> AdminResult<Row>;

    /// Deletes the row with `id`.
    async fn delete(&self, table: &str, id: &str) -> AdminResult<()>;

    /// Cheap round trip used by connection diagnostics.
    async fn ping(&self) -> AdminResult<()>;
}

/// A stored media object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    /// Path inside the bucket.
    pub path: String,
    /// Size in bytes.
    pub size: u64,
    /// MIME type, when the backend reports one.
    pub content_type: Option<String>,
}

/// A bucket of media files.
#[allow(async_fn_in_trait)]
pub trait Storage {
    /// Stores `bytes` at `path`, replacing any existing object.
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> AdminResult<()>;

    /// Objects whose path starts with `prefix`, sorted by path.
    async fn list_objects(&self, prefix: &str) -> AdminResult<Vec<StoredObject>>;

    /// Deletes the object at `path`.
    async fn remove(&self, path: &str) -> AdminResult<()>;

    /// Public download URL for `path`. Does not check existence.
    fn public_url(&self, path: &str) -> String;
}

/// Fetches and decodes every row of `R`'s table.
///
/// # Errors
/// Propagates backend failures; returns [`AdminError::Decode`] if a row
/// doesn't match `R`.
pub async fn fetch_records<R: Record, B: Backend>(backend: &B) -> AdminResult<Vec<R>> {
    let rows = backend.list(R::TABLE).await?;
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(AdminError::from))
        .collect()
}

/// Validates and inserts a record, returning it as stored.
///
/// # Errors
/// Returns [`AdminError::Content`] for an invalid record, otherwise
/// propagates backend failures.
pub async fn insert_record<R: Record, B: Backend>(backend: &B, record: &R) -> AdminResult<R> {
    record.validate()?;
    let stored = backend.insert(R::TABLE, serde_json::to_value(record)?).await?;
    Ok(serde_json::from_value(stored)?)
}

/// Validates and updates a record by id, returning it as stored.
///
/// # Errors
/// Returns [`AdminError::Content`] for an invalid record, otherwise
/// propagates backend failures.
pub async fn update_record<R: Record, B: Backend>(backend: &B, record: &R) -> AdminResult<R> {
    record.validate()?;
    let stored = backend
        .update(R::TABLE, record.id(), serde_json::to_value(record)?)
        .await?;
    Ok(serde_json::from_value(stored)?)
}

/// Id of a row, if it has a string `id` field.
#[must_use]
pub fn row_id(row: &Row) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}
