//! Shared core behind [`MapStorage`](crate::MapStorage) and
//! [`ListStorage`](crate::ListStorage): the bound path, the in-memory
//! document, and the guarded save.

use crate::error::Result;
use crate::persist;
use crate::save::SaveGate;
use crate::serializer::JsonSerializer;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A top-level JSON shape a storage can hold.
pub trait Document: Default + Send + Sync + 'static {
    /// JSON type name of the top level, used in error messages.
    const KIND: &'static str;

    /// File body written when the file has to be created.
    const EMPTY: &'static str;

    /// Take a parsed file. Hands the value back if it has the wrong shape.
    fn from_value(value: Value) -> std::result::Result<Self, Value>;

    /// Render in the storage file format.
    fn encode(&self, serializer: &JsonSerializer) -> String;
}

impl Document for Map<String, Value> {
    const KIND: &'static str = "object";
    const EMPTY: &'static str = "{}";

    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::Object(map) => Ok(map),
            other => Err(other),
        }
    }

    fn encode(&self, serializer: &JsonSerializer) -> String {
        serializer.serialize_map(self)
    }
}

impl Document for Vec<Value> {
    const KIND: &'static str = "array";
    const EMPTY: &'static str = "[]";

    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::Array(items) => Ok(items),
            other => Err(other),
        }
    }

    fn encode(&self, serializer: &JsonSerializer) -> String {
        serializer.serialize_seq(self)
    }
}

pub(crate) struct Storage<D> {
    path: PathBuf,
    pub(crate) data: RwLock<D>,
    gate: Arc<SaveGate>,
    serializer: JsonSerializer,
}

impl<D: Document> Storage<D> {
    /// Load the (already bootstrapped) file at `path`.
    pub(crate) fn load(path: PathBuf, serializer: JsonSerializer) -> Result<Self> {
        let data = persist::load::<D>(&path)?;
        Ok(Self {
            path,
            data: RwLock::new(data),
            gate: Arc::new(SaveGate::default()),
            serializer,
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn encode(&self, serializer: &JsonSerializer) -> String {
        self.data.read().encode(serializer)
    }

    /// Claim the gate and snapshot the document now; the returned future
    /// only does the write. If a save is already in flight nothing is
    /// claimed and the future resolves to `Ok(())` without touching disk.
    pub(crate) fn save(&self) -> impl Future<Output = Result<()>> + Send + 'static {
        let job = match self.gate.try_begin() {
            Some(ticket) => {
                tracing::trace!(path = %self.path.display(), "save started");
                Some((ticket, self.encode(&self.serializer), self.path.clone()))
            }
            None => {
                tracing::debug!(
                    path = %self.path.display(),
                    state = ?self.gate.state(),
                    "save already in flight, dropped"
                );
                None
            }
        };

        async move {
            let Some((ticket, contents, path)) = job else {
                return Ok(());
            };
            let bytes = contents.len();
            let result = persist::write(&path, contents).await;
            drop(ticket);
            if result.is_ok() {
                tracing::debug!(path = %path.display(), bytes, "saved");
            }
            result
        }
    }
}
