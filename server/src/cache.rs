use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use common::{ScoreEntry, deserialize_entries};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// The proxy's cache file: a plain array of entries. Records that do not
/// read as entries are dropped with a warning instead of emptying the cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreCache(#[serde(deserialize_with = "deserialize_entries")] pub Vec<ScoreEntry>);

/// A JSON value kept in a single file and always rewritten whole.
///
/// Each request reads the file, changes it in memory and writes it back with
/// no locking, so two concurrent submissions can lose one update.
#[derive(Debug)]
pub struct JsonFile<T> {
    path: PathBuf,
    _value: PhantomData<fn() -> T>,
}

impl<T> Clone for JsonFile<T> {
    fn clone(&self) -> Self {
        JsonFile {
            path: self.path.clone(),
            _value: PhantomData,
        }
    }
}

impl<T: Serialize + DeserializeOwned + Default> JsonFile<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFile {
            path: path.into(),
            _value: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the current value. A missing file yields the default silently;
    /// an unreadable one is logged and also yields the default.
    pub async fn read(&self) -> T {
        match self.try_read().await {
            Ok(Some(value)) => value,
            Ok(None) => {
                debug!(path = %self.path.display(), "File does not exist yet, using default");
                T::default()
            }
            Err(e) => {
                error!(path = %self.path.display(), "Error reading file, using default: {:#}", e);
                T::default()
            }
        }
    }

    async fn try_read(&self) -> Result<Option<T>> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).context("Failed to read file"),
        };
        let value = serde_json::from_slice(&raw).context("Failed to parse file contents")?;
        Ok(Some(value))
    }

    /// Replaces the whole file with `value`, pretty-printed. Not crash-safe.
    pub async fn write(&self, value: &T) -> Result<()> {
        let json = serde_json::to_vec_pretty(value).context("Failed to serialize file contents")?;
        tokio::fs::write(&self.path, json)
            .await
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }
}
