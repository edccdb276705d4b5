//! File-backed ordered list storage.

use crate::autosave::Autosave;
use crate::equal::deep_equal;
use crate::error::Result;
use crate::registry::Registry;
use crate::serializer::JsonSerializer;
use crate::storage::Storage;
use serde_json::Value;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

/// An ordered list of JSON values, persisted as one JSON array file.
///
/// Same model as [`MapStorage`](crate::MapStorage): changes live in memory
/// until [`save`](Self::save), and clones share one list.
#[derive(Clone)]
pub struct ListStorage {
    pub(crate) inner: Arc<Storage<Vec<Value>>>,
}

impl ListStorage {
    /// Open (or create) the list at `path` through [`Registry::global`].
    /// An already-open path returns the existing list and ignores `autosave`.
    pub fn open(path: impl AsRef<Path>, autosave: impl Into<Autosave>) -> Result<Self> {
        Registry::global().open_list(path, autosave)
    }

    /// Absolute path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.inner.path()
    }

    /// `true` if both handles point at the same live list.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // ---- reads ----

    /// Element at `index`, or `None` past the end.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Value> {
        self.inner.data.read().get(index).cloned()
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.data.read().len()
    }

    /// `true` when the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of every element, in order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Value> {
        self.inner.data.read().clone()
    }

    /// `true` if some element is deeply equal to `value`.
    #[must_use]
    pub fn contains(&self, value: &Value) -> bool {
        self.position(value).is_some()
    }

    /// Index of the first element deeply equal to `value`.
    #[must_use]
    pub fn position(&self, value: &Value) -> Option<usize> {
        self.inner
            .data
            .read()
            .iter()
            .position(|v| deep_equal(value, v))
    }

    // ---- writes ----

    /// Append to the end.
    pub fn push(&self, value: impl Into<Value>) {
        self.inner.data.write().push(value.into());
    }

    /// Remove and return the last element.
    pub fn pop(&self) -> Option<Value> {
        self.inner.data.write().pop()
    }

    /// Insert at `index`, shifting later elements right. `index == len()`
    /// appends. Returns `false` (and does nothing) past the end.
    pub fn insert(&self, index: usize, value: impl Into<Value>) -> bool {
        let mut data = self.inner.data.write();
        if index > data.len() {
            return false;
        }
        data.insert(index, value.into());
        true
    }

    /// Replace the element at `index`, returning the old one. `None` (and no
    /// change) past the end.
    pub fn set(&self, index: usize, value: impl Into<Value>) -> Option<Value> {
        self.inner
            .data
            .write()
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, value.into()))
    }

    /// Remove the element at `index`, shifting later elements left.
    pub fn remove(&self, index: usize) -> Option<Value> {
        let mut data = self.inner.data.write();
        if index < data.len() {
            Some(data.remove(index))
        } else {
            None
        }
    }

    /// Mutate the element at `index`. Returns `false` past the end.
    ///
    /// `f` runs on a copy with no lock held, so it may call back into this
    /// storage. The result is stored only if `index` is still in bounds.
    pub fn update<F>(&self, index: usize, f: F) -> bool
    where
        F: FnOnce(&mut Value),
    {
        let Some(mut value) = self.get(index) else {
            return false;
        };
        f(&mut value);
        match self.inner.data.write().get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Keep only the elements `keep` accepts. Returns how many were removed.
    ///
    /// `keep` runs over a snapshot with no lock held, so it may call back into
    /// this storage. The filtered snapshot then replaces the list; changes
    /// made while `keep` ran (through any handle) are overwritten.
    pub fn retain<F>(&self, mut keep: F) -> usize
    where
        F: FnMut(&Value) -> bool,
    {
        let snapshot = self.to_vec();
        let before = snapshot.len();
        let kept: Vec<Value> = snapshot.into_iter().filter(|v| keep(v)).collect();
        let removed = before - kept.len();
        *self.inner.data.write() = kept;
        removed
    }

    /// Append everything from `iter` under one lock.
    pub fn extend<I, V>(&self, iter: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.inner
            .data
            .write()
            .extend(iter.into_iter().map(Into::into));
    }

    /// Drop all elements.
    pub fn clear(&self) {
        self.inner.data.write().clear();
    }

    // ---- persistence ----

    /// Write the whole list to the backing file. Same rules as
    /// [`MapStorage::save`](crate::MapStorage::save): captured on call,
    /// dropped if another save is in flight.
    pub fn save(&self) -> impl Future<Output = Result<()>> + Send + 'static {
        self.inner.save()
    }

    /// The list in the storage file format.
    #[must_use]
    pub fn to_json(&self, pretty: bool) -> String {
        self.inner.encode(&JsonSerializer::with_pretty(pretty))
    }
}

impl std::fmt::Debug for ListStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListStorage")
            .field("path", &self.path())
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}
