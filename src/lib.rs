//! File-backed JSON storage: a string-keyed map ([`MapStorage`]) and an
//! ordered list ([`ListStorage`]), each kept in one human-readable JSON file.
//!
//! Opening a path loads the file (creating it, and any missing directories,
//! if needed). Changes stay in memory until `save()` runs, either called by
//! you or from an optional autosave timer. Only one save per storage is ever
//! in flight; a save requested meanwhile is dropped, not queued.
//!
//! ```rust,no_run
//! use json_storage::MapStorage;
//! use serde_json::json;
//!
//! # async fn run() -> json_storage::Result<()> {
//! let db = MapStorage::open("data/db.json", false)?;
//! db.insert("hello", json!({"to": "world"}));
//! db.save().await?;
//! # Ok(())
//! # }
//! ```
//!
//! **Single-process only.** There is no file locking; two processes writing
//! the same file will clobber each other. Saves overwrite the file in place,
//! so a crash mid-write can truncate it.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod autosave;
pub mod equal;
pub mod error;
pub mod list;
pub mod map;
mod persist;
pub mod registry;
mod save;
pub mod serializer;
mod storage;

pub use autosave::{Autosave, DEFAULT_AUTOSAVE_INTERVAL};
pub use equal::deep_equal;
pub use error::{Error, Result};
pub use list::ListStorage;
pub use map::MapStorage;
pub use registry::{Registry, RegistryBuilder};
pub use serializer::JsonSerializer;
