//! Path-keyed registry that hands out storages, one live instance per file.

use crate::autosave::{self, Autosave, DEFAULT_AUTOSAVE_INTERVAL};
use crate::error::{Error, Result};
use crate::list::ListStorage;
use crate::map::MapStorage;
use crate::persist;
use crate::serializer::JsonSerializer;
use crate::storage::{Document, Storage};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

static GLOBAL: Lazy<Registry> = Lazy::new(Registry::new);

/// Opens storages and remembers them by absolute file path.
///
/// In singleton mode (the default) opening a path that is already open
/// returns the same live storage, so changes made through one handle are
/// seen through the other. Entries are never removed.
///
/// Maps and lists are tracked separately, each with its own singleton flag.
///
/// Each kind has one lock, held for the whole open (file creation, read and
/// parse). A slow open of a large file therefore delays every other open of
/// the same kind on this registry, whatever the path.
///
/// ```rust,no_run
/// use json_storage::Registry;
///
/// let registry = Registry::builder().pretty(false).build();
/// let settings = registry.open_map("data/settings.json", false).unwrap();
/// settings.insert("volume", 7);
/// ```
pub struct Registry {
    maps: Slots<MapStorage>,
    lists: Slots<ListStorage>,
    pretty: bool,
    autosave_interval: Duration,
}

struct Slots<H> {
    singleton: bool,
    open: Mutex<HashMap<PathBuf, H>>,
}

impl<H> Slots<H> {
    fn new(singleton: bool) -> Self {
        Self {
            singleton,
            open: Mutex::new(HashMap::new()),
        }
    }
}

/// Storage handle kinds the registry can produce.
trait Handle: Clone {
    type Doc: Document;

    fn wrap(inner: Arc<Storage<Self::Doc>>) -> Self;
}

impl Handle for MapStorage {
    type Doc = serde_json::Map<String, serde_json::Value>;

    fn wrap(inner: Arc<Storage<Self::Doc>>) -> Self {
        MapStorage { inner }
    }
}

impl Handle for ListStorage {
    type Doc = Vec<serde_json::Value>;

    fn wrap(inner: Arc<Storage<Self::Doc>>) -> Self {
        ListStorage { inner }
    }
}

impl Registry {
    /// Registry with singleton mode on for both kinds, pretty saves and the
    /// default autosave interval.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start configuring a registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// The process-wide registry used by [`MapStorage::open`] and
    /// [`ListStorage::open`].
    pub fn global() -> &'static Registry {
        &GLOBAL
    }

    /// Open (or create) a map file. A missing file is created as `{}` along
    /// with any missing parent directories.
    ///
    /// `autosave` only applies when a new storage is built; on reuse of an
    /// open path it is ignored. Asking for autosave outside a Tokio runtime
    /// is a [`Error::Config`]; a missing file is not created in that case,
    /// but an existing one is still read before the error.
    pub fn open_map(
        &self,
        path: impl AsRef<Path>,
        autosave: impl Into<Autosave>,
    ) -> Result<MapStorage> {
        self.open(&self.maps, path.as_ref(), autosave.into())
    }

    /// Open (or create) a list file. A missing file is created as `[]`.
    /// `autosave` follows the same rules as in [`open_map`](Self::open_map).
    pub fn open_list(
        &self,
        path: impl AsRef<Path>,
        autosave: impl Into<Autosave>,
    ) -> Result<ListStorage> {
        self.open(&self.lists, path.as_ref(), autosave.into())
    }

    /// Whether repeated map opens of one path share an instance.
    #[must_use]
    pub fn is_map_singleton(&self) -> bool {
        self.maps.singleton
    }

    /// Whether repeated list opens of one path share an instance.
    #[must_use]
    pub fn is_list_singleton(&self) -> bool {
        self.lists.singleton
    }

    fn open<H: Handle>(&self, slots: &Slots<H>, path: &Path, autosave: Autosave) -> Result<H> {
        let resolved = persist::resolve(path)?;

        // Held from the existence check to registration, with no await in
        // between, so two opens of one path can't both build a storage.
        let mut open = slots.open.lock();

        let period = autosave.interval(self.autosave_interval);
        // A missing file can't be registered yet, so this open will build a
        // new storage. Fail before creating anything on disk.
        if period.is_some() && !resolved.exists() {
            autosave::current_runtime(&resolved)?;
        }

        persist::bootstrap(&resolved, <H::Doc as Document>::EMPTY)?;
        let key = resolved.canonicalize().map_err(|source| Error::Read {
            path: resolved.clone(),
            source,
        })?;

        if slots.singleton {
            if let Some(existing) = open.get(&key) {
                tracing::debug!(path = %key.display(), "reusing open storage");
                if autosave != Autosave::Off {
                    tracing::debug!(
                        path = %key.display(),
                        ?autosave,
                        "storage already open, autosave option ignored"
                    );
                }
                return Ok(existing.clone());
            }
        }

        let serializer = JsonSerializer::with_pretty(self.pretty);
        let storage = Arc::new(Storage::<H::Doc>::load(key.clone(), serializer)?);
        let kind = <H::Doc as Document>::KIND;
        tracing::debug!(path = %key.display(), kind, "storage loaded");

        if let Some(period) = period {
            autosave::spawn(Arc::clone(&storage), period)?;
        }

        let handle = H::wrap(storage);
        if slots.singleton {
            open.insert(key, handle.clone());
        }
        Ok(handle)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("map_singleton", &self.maps.singleton)
            .field("list_singleton", &self.lists.singleton)
            .field("open_maps", &self.maps.open.lock().len())
            .field("open_lists", &self.lists.open.lock().len())
            .field("pretty", &self.pretty)
            .field("autosave_interval", &self.autosave_interval)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Configures a [`Registry`].
///
/// ```rust
/// use json_storage::Registry;
/// use std::time::Duration;
///
/// let registry = Registry::builder()
///     .singleton(false)
///     .autosave_interval(Duration::from_secs(5))
///     .build();
/// assert!(!registry.is_map_singleton());
/// ```
#[derive(Debug, Clone)]
pub struct RegistryBuilder {
    map_singleton: bool,
    list_singleton: bool,
    pretty: bool,
    autosave_interval: Duration,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self {
            map_singleton: true,
            list_singleton: true,
            pretty: true,
            autosave_interval: DEFAULT_AUTOSAVE_INTERVAL,
        }
    }
}

impl RegistryBuilder {
    /// Singleton mode for both maps and lists (default: on).
    pub fn singleton(mut self, yes: bool) -> Self {
        self.map_singleton = yes;
        self.list_singleton = yes;
        self
    }

    /// Singleton mode for maps only.
    pub fn map_singleton(mut self, yes: bool) -> Self {
        self.map_singleton = yes;
        self
    }

    /// Singleton mode for lists only.
    pub fn list_singleton(mut self, yes: bool) -> Self {
        self.list_singleton = yes;
        self
    }

    /// Write indented files on save (default: on).
    pub fn pretty(mut self, yes: bool) -> Self {
        self.pretty = yes;
        self
    }

    /// What [`Autosave::Default`] means for storages from this registry
    /// (default: [`DEFAULT_AUTOSAVE_INTERVAL`]).
    pub fn autosave_interval(mut self, interval: Duration) -> Self {
        self.autosave_interval = interval;
        self
    }

    /// Build the registry.
    pub fn build(self) -> Registry {
        Registry {
            maps: Slots::new(self.map_singleton),
            lists: Slots::new(self.list_singleton),
            pretty: self.pretty,
            autosave_interval: self.autosave_interval,
        }
    }
}
