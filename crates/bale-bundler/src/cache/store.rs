//! JSON-file backed cache storage.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use super::branch::{CacheBranch, CacheBranchMut};
use super::{CacheError, CacheResult, branch_marker, is_branch_marker};
use crate::output::writer::temp_path_for;

/// One top-level value of the persisted document.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Entry {
    Value(String),
    Branch(BTreeMap<String, String>),
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum EntryRef<'a> {
    Value(&'a str),
    Branch(&'a BTreeMap<String, String>),
}

/// Persistent key-value cache backed by a single JSON file.
///
/// Reads happen once, at [`Cache::open`]. Every other operation except
/// [`save`](Cache::save) and [`clear`](Cache::clear) is purely in memory.
#[derive(Debug)]
pub struct Cache {
    path: PathBuf,
    values: BTreeMap<String, String>,
    pub(super) branches: BTreeMap<String, BTreeMap<String, String>>,
}

impl Cache {
    /// Open the cache stored at `path`.
    ///
    /// Never fails: a missing file yields an empty cache, and an unparsable
    /// file is deleted before starting empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut cache = Self {
            path,
            values: BTreeMap::new(),
            branches: BTreeMap::new(),
        };

        let content = match std::fs::read_to_string(&cache.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %cache.path.display(), "no cache file, starting empty");
                return cache;
            }
            Err(err) => {
                tracing::warn!(
                    path = %cache.path.display(),
                    error = %err,
                    "cache file unreadable, starting empty"
                );
                return cache;
            }
        };

        match parse(&content) {
            Ok((values, branches)) => {
                cache.values = values;
                cache.branches = branches;
            }
            Err(err) => {
                tracing::warn!(
                    path = %cache.path.display(),
                    error = %err,
                    "discarding corrupt cache file"
                );
                if let Err(e) = std::fs::remove_file(&cache.path) {
                    tracing::warn!(
                        path = %cache.path.display(),
                        error = %e,
                        "failed to delete corrupt cache file"
                    );
                }
            }
        }

        cache
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Insert or overwrite a top-level entry.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ReservedKey`] for keys shaped like `[name]`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> CacheResult<()> {
        let key = key.into();
        if is_branch_marker(&key) {
            return Err(CacheError::ReservedKey(key));
        }
        self.values.insert(key, value.into());
        Ok(())
    }

    /// Remove a top-level entry. Removing an absent key is a no-op.
    pub fn remove(&mut self, key: &str) -> CacheResult<Option<String>> {
        if is_branch_marker(key) {
            return Err(CacheError::ReservedKey(key.to_string()));
        }
        Ok(self.values.remove(key))
    }

    /// Total number of entries, branches included.
    pub fn len(&self) -> usize {
        self.values.len() + self.branches.values().map(BTreeMap::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read-only view of the branch `name`. Absent branches read as empty.
    pub fn branch(&self, name: &str) -> CacheBranch<'_> {
        CacheBranch::new(self.branches.get(name))
    }

    /// Mutable view of the branch `name`, created on first write.
    pub fn branch_mut(&mut self, name: &str) -> CacheBranchMut<'_> {
        CacheBranchMut::new(self, name.to_string())
    }

    /// Write the whole document to disk, replacing the previous file.
    ///
    /// Parent directories are created. The document is written to a sibling
    /// temp file, synced and renamed over the target.
    pub async fn save(&self) -> CacheResult<()> {
        let json = serde_json::to_string_pretty(&self.document())
            .map_err(|e| CacheError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let temp_path = temp_path_for(&self.path);
        let mut file = tokio::fs::File::create(&temp_path).await?;
        file.write_all(json.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        if let Err(err) = tokio::fs::rename(&temp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(err.into());
        }

        tracing::debug!(path = %self.path.display(), entries = self.len(), "saved cache");
        Ok(())
    }

    /// Delete the backing file and forget every entry in every branch.
    pub async fn clear(&mut self) -> CacheResult<()> {
        self.values.clear();
        self.branches.clear();

        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "deleted cache file");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn document(&self) -> BTreeMap<String, EntryRef<'_>> {
        let mut document: BTreeMap<String, EntryRef<'_>> = self
            .values
            .iter()
            .map(|(key, value)| (key.clone(), EntryRef::Value(value)))
            .collect();

        for (name, entries) in &self.branches {
            if !entries.is_empty() {
                document.insert(branch_marker(name), EntryRef::Branch(entries));
            }
        }

        document
    }
}

type Parsed = (
    BTreeMap<String, String>,
    BTreeMap<String, BTreeMap<String, String>>,
);

fn parse(content: &str) -> CacheResult<Parsed> {
    let document: BTreeMap<String, Entry> =
        serde_json::from_str(content).map_err(|e| CacheError::Corrupted(e.to_string()))?;

    let mut values = BTreeMap::new();
    let mut branches = BTreeMap::new();

    for (key, entry) in document {
        match (is_branch_marker(&key), entry) {
            (false, Entry::Value(value)) => {
                values.insert(key, value);
            }
            (true, Entry::Branch(entries)) => {
                let name = key[1..key.len() - 1].to_string();
                branches.insert(name, entries);
            }
            (true, Entry::Value(_)) => {
                return Err(CacheError::Corrupted(format!(
                    "branch '{}' must be an object",
                    key
                )));
            }
            (false, Entry::Branch(_)) => {
                return Err(CacheError::Corrupted(format!(
                    "entry '{}' must be a string",
                    key
                )));
            }
        }
    }

    Ok((values, branches))
}
