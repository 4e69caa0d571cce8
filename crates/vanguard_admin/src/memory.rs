//! In-process backend.
//!
//! Tables and the media bucket live behind `parking_lot` mutexes. Any
//! operation can be told to fail, either once (queued errors) or until
//! further notice (offline mode), so screens can be tested against every
//! failure path without a network.

use std::collections::{BTreeMap, HashMap, VecDeque};

use parking_lot::Mutex;
use serde_json::Value;
use vanguard_content::Record;

use crate::backend::{row_id, Backend, Row, Storage, StoredObject};
use crate::error::{AdminError, AdminResult};

/// Operations that can be failed on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// [`Backend::list`].
    List,
    /// [`Backend::insert`].
    Insert,
    /// [`Backend::update`].
    Update,
    /// [`Backend::delete`].
    Delete,
    /// [`Backend::ping`].
    Ping,
    /// [`Storage::upload`].
    Upload,
    /// [`Storage::list_objects`].
    ListObjects,
    /// [`Storage::remove`].
    Remove,
}

#[derive(Debug, Default)]
struct Faults {
    queued: HashMap<Operation, VecDeque<AdminError>>,
    offline: bool,
    calls: HashMap<Operation, usize>,
}

#[derive(Debug, Clone)]
struct Object {
    bytes: Vec<u8>,
    content_type: String,
}

/// Backend and storage held entirely in memory.
#[derive(Debug)]
pub struct MemoryBackend {
    base_url: String,
    tables: Mutex<HashMap<String, Vec<Row>>>,
    objects: Mutex<BTreeMap<String, Object>>,
    faults: Mutex<Faults>,
    next_id: Mutex<u64>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_url: "memory://media".to_string(),
            tables: Mutex::new(HashMap::new()),
            objects: Mutex::new(BTreeMap::new()),
            faults: Mutex::new(Faults::default()),
            next_id: Mutex::new(1),
        }
    }

    /// Replaces `R`'s table with `records`.
    ///
    /// # Errors
    /// Returns [`AdminError::Decode`] if a record can't be serialized.
    pub fn seed<R: Record>(&self, records: &[R]) -> AdminResult<()> {
        let rows = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        self.tables.lock().insert(R::TABLE.to_string(), rows);
        Ok(())
    }

    /// Stores an object directly, bypassing fault injection.
    pub fn put_object(&self, path: &str, bytes: Vec<u8>, content_type: &str) {
        self.objects.lock().insert(
            path.to_string(),
            Object {
                bytes,
                content_type: content_type.to_string(),
            },
        );
    }

    /// Makes the next call to `op` fail with `error`. Calls queue up.
    pub fn fail_next(&self, op: Operation, error: AdminError) {
        self.faults.lock().queued.entry(op).or_default().push_back(error);
    }

    /// Fails every call with a transport error until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.faults.lock().offline = offline;
    }

    /// How many times `op` has been called, failed or not.
    #[must_use]
    pub fn calls(&self, op: Operation) -> usize {
        self.faults.lock().calls.get(&op).copied().unwrap_or(0)
    }

    /// Number of rows currently in `table`.
    #[must_use]
    pub fn row_count(&self, table: &str) -> usize {
        self.tables.lock().get(table).map_or(0, Vec::len)
    }

    fn enter(&self, op: Operation) -> AdminResult<()> {
        let mut faults = self.faults.lock();
        *faults.calls.entry(op).or_insert(0) += 1;
        if faults.offline {
            return Err(AdminError::Transport("backend offline".to_string()));
        }
        match faults.queued.get_mut(&op).and_then(VecDeque::pop_front) {
            Some(error) => {
                tracing::debug!(?op, %error, "injected failure");
                Err(error)
            }
            None => Ok(()),
        }
    }

    fn not_found(table: &str, id: &str) -> AdminError {
        AdminError::NotFound {
            table: table.to_string(),
            id: id.to_string(),
        }
    }
}

impl Backend for MemoryBackend {
    async fn list(&self, table: &str) -> AdminResult<Vec<Row>> {
        self.enter(Operation::List)?;
        Ok(self.tables.lock().get(table).cloned().unwrap_or_default())
    }

    async fn insert(&self, table: &str, mut row: Row) -> AdminResult<Row> {
        self.enter(Operation::Insert)?;
        let Value::Object(fields) = &mut row else {
            return Err(AdminError::Backend {
                status: 400,
                message: "row must be a JSON object".to_string(),
            });
        };
        if !fields.get("id").is_some_and(Value::is_string) {
            let mut next = self.next_id.lock();
            fields.insert("id".to_string(), Value::String(format!("{table}-{next}")));
            *next += 1;
        }

        let mut tables = self.tables.lock();
        let rows = tables.entry(table.to_string()).or_default();
        if rows.iter().any(|r| row_id(r) == row_id(&row)) {
            return Err(AdminError::Backend {
                status: 409,
                message: "duplicate key value violates unique constraint".to_string(),
            });
        }
        rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, table: &str, id: &str, row: Row) -> AdminResult<Row> {
        self.enter(Operation::Update)?;
        let Value::Object(changes) = row else {
            return Err(AdminError::Backend {
                status: 400,
                message: "row must be a JSON object".to_string(),
            });
        };

        let mut tables = self.tables.lock();
        let stored = tables
            .get_mut(table)
            .and_then(|rows| rows.iter_mut().find(|r| row_id(r) == Some(id)))
            .ok_or_else(|| Self::not_found(table, id))?;
        if let Value::Object(fields) = stored {
            for (key, value) in changes {
                fields.insert(key, value);
            }
        }
        Ok(stored.clone())
    }

    async fn delete(&self, table: &str, id: &str) -> AdminResult<()> {
        self.enter(Operation::Delete)?;
        let mut tables = self.tables.lock();
        let rows = tables.get_mut(table).ok_or_else(|| Self::not_found(table, id))?;
        let before = rows.len();
        rows.retain(|r| row_id(r) != Some(id));
        if rows.len() == before {
            return Err(Self::not_found(table, id));
        }
        Ok(())
    }

    async fn ping(&self) -> AdminResult<()> {
        self.enter(Operation::Ping)
    }
}

impl Storage for MemoryBackend {
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> AdminResult<()> {
        self.enter(Operation::Upload)?;
        self.put_object(path, bytes, content_type);
        Ok(())
    }

    async fn list_objects(&self, prefix: &str) -> AdminResult<Vec<StoredObject>> {
        self.enter(Operation::ListObjects)?;
        Ok(self
            .objects
            .lock()
            .iter()
            .filter(|(path, _)| path.starts_with(prefix))
            .map(|(path, object)| StoredObject {
                path: path.clone(),
                size: object.bytes.len() as u64,
                content_type: Some(object.content_type.clone()),
            })
            .collect())
    }

    async fn remove(&self, path: &str) -> AdminResult<()> {
        self.enter(Operation::Remove)?;
        self.objects
            .lock()
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| Self::not_found("media", path))
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}
