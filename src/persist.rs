//! Disk I/O helpers: bootstrap, load, and the whole-file overwrite used by
//! saves.
//!
//! Saves overwrite the file in place (no temp file + rename), so a crash in
//! the middle of a write can leave a truncated file behind.

use crate::error::{Error, Result};
use crate::storage::Document;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Make `path` absolute against the current working directory. Nothing else
/// is used as a base.
pub fn resolve(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|source| Error::Create {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(cwd.join(path))
}

/// Make sure a file exists at `path`, creating missing parent directories and
/// writing `empty_body` if it doesn't. Blocking on purpose: the caller loads
/// the file right after. Returns `true` when the file was created.
pub fn bootstrap(path: &Path, empty_body: &str) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    let create_err = |source| Error::Create {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(create_err)?;
    }
    std::fs::write(path, empty_body).map_err(create_err)?;
    tracing::debug!(path = %path.display(), "created storage file");
    Ok(true)
}

/// Read and parse the file at `path`. Empty (or whitespace-only) content
/// loads as an empty document.
pub fn load<D: Document>(path: &Path) -> Result<D> {
    let bytes = std::fs::read(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(D::default());
    }
    // Bad UTF-8 is reported by the parser, so it surfaces as a parse error.
    let value: Value = serde_json::from_slice(&bytes).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    D::from_value(value).map_err(|other| Error::Shape {
        path: path.to_path_buf(),
        expected: D::KIND,
        found: kind_of(&other),
    })
}

/// Overwrite `path` with `contents`.
pub async fn write(path: &Path, contents: String) -> Result<()> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|source| Error::Write {
            path: path.to_path_buf(),
            source,
        })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
