//! File-backed key → value storage.

use crate::autosave::Autosave;
use crate::equal::deep_equal;
use crate::error::Result;
use crate::registry::Registry;
use crate::serializer::JsonSerializer;
use crate::storage::Storage;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

/// A string-keyed map of JSON values, persisted as one JSON object file.
///
/// Keys keep insertion order (source order for loaded files). Changes stay in
/// memory until [`save`](Self::save) runs, either called directly or from the
/// autosave timer.
///
/// Cloning is cheap: clones share the same map. With singleton mode on (the
/// default), opening the same file twice gives back the same map.
#[derive(Clone)]
pub struct MapStorage {
    pub(crate) inner: Arc<Storage<Map<String, Value>>>,
}

impl MapStorage {
    /// Open (or create) the map at `path` through the process-wide
    /// [`Registry::global`]. `path` is resolved against the current working
    /// directory.
    ///
    /// If the path is already open, the existing map is returned and
    /// `autosave` is ignored.
    pub fn open(path: impl AsRef<Path>, autosave: impl Into<Autosave>) -> Result<Self> {
        Registry::global().open_map(path, autosave)
    }

    /// Absolute path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.inner.path()
    }

    /// `true` if both handles point at the same live map.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // ---- reads ----

    /// Get the value for `key`, or `None` if absent.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.data.read().get(key).cloned()
    }

    /// Get the value for `key` converted to `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key) {
            Some(v) => Ok(Some(serde_json::from_value(v)?)),
            None => Ok(None),
        }
    }

    /// `true` if the key exists.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.data.read().contains_key(key)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.data.read().len()
    }

    /// `true` when the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all keys, in order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.inner.data.read().keys().cloned().collect()
    }

    /// Snapshot of all values, in order.
    #[must_use]
    pub fn values(&self) -> Vec<Value> {
        self.inner.data.read().values().cloned().collect()
    }

    /// Snapshot of all key-value pairs, in order.
    #[must_use]
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.inner
            .data
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Copy of the whole map.
    #[must_use]
    pub fn snapshot(&self) -> Map<String, Value> {
        self.inner.data.read().clone()
    }

    /// `true` if some stored value is deeply equal to `value`.
    #[must_use]
    pub fn has_value(&self, value: &Value) -> bool {
        self.inner.data.read().values().any(|v| deep_equal(value, v))
    }

    /// Keys whose value is deeply equal to `value`, in order. With `single`
    /// set, stops at the first match.
    #[must_use]
    pub fn get_key(&self, value: &Value, single: bool) -> Vec<String> {
        let data = self.inner.data.read();
        let matches = data
            .iter()
            .filter(|(_, v)| deep_equal(value, v))
            .map(|(k, _)| k.clone());
        if single {
            matches.take(1).collect()
        } else {
            matches.collect()
        }
    }

    /// New in-memory map of the entries `predicate` accepts, in order.
    ///
    /// The result is detached: it is not saved and does not track later
    /// changes. The predicate sees a snapshot, so it may call back into this
    /// storage (including mutating it).
    pub fn filter<F>(&self, mut predicate: F) -> Map<String, Value>
    where
        F: FnMut(&Value, &str, &MapStorage) -> bool,
    {
        self.entries()
            .into_iter()
            .filter(|(k, v)| predicate(v, k.as_str(), self))
            .collect()
    }

    // ---- writes ----

    /// Insert a key-value pair, returning the previous value if the key
    /// existed. An existing key keeps its position.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.inner.data.write().insert(key.into(), value.into())
    }

    /// Convert `value` to JSON and insert it.
    pub fn insert_as<T: Serialize>(
        &self,
        key: impl Into<String>,
        value: &T,
    ) -> Result<Option<Value>> {
        let value = serde_json::to_value(value)?;
        Ok(self.insert(key, value))
    }

    /// Remove a key, returning its value if it was present. Later keys keep
    /// their relative order.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.inner.data.write().shift_remove(key)
    }

    /// Drop all entries.
    pub fn clear(&self) {
        self.inner.data.write().clear();
    }

    /// Bulk-insert from an iterator under one lock.
    pub fn extend<I, K, V>(&self, iter: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut data = self.inner.data.write();
        for (k, v) in iter {
            data.insert(k.into(), v.into());
        }
    }

    /// Mutate the value at `key`. Returns `false` if the key doesn't exist
    /// (nothing happens in that case).
    ///
    /// `f` runs on a copy with no lock held, so it may call back into this
    /// storage. The result replaces whatever `key` holds afterwards, and is
    /// dropped (returning `false`) if the key was removed in the meantime.
    pub fn update<F>(&self, key: &str, f: F) -> bool
    where
        F: FnOnce(&mut Value),
    {
        let Some(mut value) = self.get(key) else {
            return false;
        };
        f(&mut value);
        match self.inner.data.write().get_mut(key) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Return the existing value for `key`, or insert `default` and return it.
    pub fn get_or_insert(&self, key: impl Into<String>, default: impl Into<Value>) -> Value {
        self.inner
            .data
            .write()
            .entry(key.into())
            .or_insert_with(|| default.into())
            .clone()
    }

    /// Like [`get_or_insert`](Self::get_or_insert) but only computes the
    /// default when the key is actually missing. `f` runs with no lock held;
    /// if the key shows up while it runs, that value wins.
    pub fn get_or_insert_with<F>(&self, key: impl Into<String>, f: F) -> Value
    where
        F: FnOnce() -> Value,
    {
        let key = key.into();
        if let Some(v) = self.get(&key) {
            return v;
        }
        let val = f();
        self.inner.data.write().entry(key).or_insert(val).clone()
    }

    // ---- persistence ----

    /// Write the whole map to the backing file.
    ///
    /// The map is captured when this is called, not when the future is
    /// polled. If a save for this map is still in flight, this one is
    /// dropped: the future resolves to `Ok(())` and nothing is written.
    pub fn save(&self) -> impl Future<Output = Result<()>> + Send + 'static {
        self.inner.save()
    }

    /// The map in the storage file format. `pretty` gives one entry per
    /// line; nested values are always single-line.
    #[must_use]
    pub fn to_json(&self, pretty: bool) -> String {
        self.inner.encode(&JsonSerializer::with_pretty(pretty))
    }
}

impl std::fmt::Debug for MapStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapStorage")
            .field("path", &self.path())
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}
