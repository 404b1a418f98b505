//! Namespaced views into a [`Cache`].

use std::collections::BTreeMap;

use super::CacheResult;
use super::store::Cache;

/// Read-only view of one cache branch.
#[derive(Debug, Clone, Copy)]
pub struct CacheBranch<'a> {
    entries: Option<&'a BTreeMap<String, String>>,
}

impl<'a> CacheBranch<'a> {
    pub(super) fn new(entries: Option<&'a BTreeMap<String, String>>) -> Self {
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.entries?.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &'a str> {
        self.entries
            .into_iter()
            .flat_map(|entries| entries.keys().map(String::as_str))
    }

    pub fn len(&self) -> usize {
        self.entries.map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Mutable view of one cache branch.
///
/// Writes go to the owning [`Cache`]; [`save`](Self::save) persists the
/// whole document, not only this branch.
#[derive(Debug)]
pub struct CacheBranchMut<'a> {
    cache: &'a mut Cache,
    name: String,
}

impl<'a> CacheBranchMut<'a> {
    pub(super) fn new(cache: &'a mut Cache, name: String) -> Self {
        Self { cache, name }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.cache
            .branches
            .get(&self.name)?
            .get(key)
            .map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.cache
            .branches
            .entry(self.name.clone())
            .or_default()
            .insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.cache.branches.get_mut(&self.name)?.remove(key)
    }

    /// Keep only the entries for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&str, &str) -> bool) {
        if let Some(entries) = self.cache.branches.get_mut(&self.name) {
            entries.retain(|key, value| keep(key, value));
        }
    }

    /// Empty this branch and persist the document. Other branches and
    /// top-level entries are kept.
    pub async fn clear(&mut self) -> CacheResult<()> {
        self.cache.branches.remove(&self.name);
        self.cache.save().await
    }

    pub async fn save(&self) -> CacheResult<()> {
        self.cache.save().await
    }
}
