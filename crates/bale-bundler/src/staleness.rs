//! Staleness detection.
//!
//! A bundle is stale when a rebuild is forced, when its output file is
//! missing, or when any source's current modification time differs from the
//! one recorded in the cache at the last successful build. Timestamps are
//! compared as exact strings, so touching a file without changing it still
//! triggers a rebuild.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::bundle::Bundle;
use crate::cache::CacheBranch;

/// Why a bundle has to be rebuilt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaleReason {
    Forced,
    OutputMissing,
    /// No cache entry exists for this source.
    Uncached(PathBuf),
    /// The recorded modification time differs from the current one.
    SourceChanged(PathBuf),
    /// The source has a cache entry but can no longer be stat'd.
    SourceMissing(PathBuf),
    /// The cache has an entry for a source no longer part of the bundle.
    SourceRemoved(String),
}

impl fmt::Display for StaleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaleReason::Forced => write!(f, "forced"),
            StaleReason::OutputMissing => write!(f, "output missing"),
            StaleReason::Uncached(path) => write!(f, "{} not cached", path.display()),
            StaleReason::SourceChanged(path) => write!(f, "{} changed", path.display()),
            StaleReason::SourceMissing(path) => write!(f, "{} missing", path.display()),
            StaleReason::SourceRemoved(source) => write!(f, "{} removed from bundle", source),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Staleness {
    Fresh,
    Stale(StaleReason),
}

impl Staleness {
    pub fn is_stale(&self) -> bool {
        matches!(self, Staleness::Stale(_))
    }
}

/// Decide whether `bundle` must be rebuilt, and why.
///
/// `cache` is the branch owned by the bundle's builder. Checks run in this
/// order and stop at the first hit:
///
/// 1. `force` (no I/O)
/// 2. output file existence
/// 3. a cache miss for any source, or a cached source the bundle no longer
///    lists (no I/O)
/// 4. per-source stat, in source order
///
/// Stat failures count as changes; they never surface as errors here.
pub async fn check_staleness(bundle: &Bundle, cache: CacheBranch<'_>, force: bool) -> Staleness {
    if force {
        return Staleness::Stale(StaleReason::Forced);
    }

    if !matches!(tokio::fs::try_exists(&bundle.output).await, Ok(true)) {
        return Staleness::Stale(StaleReason::OutputMissing);
    }

    if let Some(source) = bundle
        .sources
        .iter()
        .find(|source| !cache.contains_key(&bundle.cache_key(source)))
    {
        return Staleness::Stale(StaleReason::Uncached(source.clone()));
    }

    let prefix = bundle.key_prefix();
    if let Some(key) = cache.keys().filter(|key| key.starts_with(&prefix)).find(|key| {
        !bundle
            .sources
            .iter()
            .any(|source| bundle.cache_key(source) == *key)
    }) {
        return Staleness::Stale(StaleReason::SourceRemoved(key[prefix.len()..].to_string()));
    }

    for source in &bundle.sources {
        let cached = cache.get(&bundle.cache_key(source));

        match modification_time(source).await {
            Ok(current) if cached == Some(current.as_str()) => {
                tracing::debug!(bundle = %bundle.name, source = %source.display(), "source unchanged");
            }
            Ok(_) => return Staleness::Stale(StaleReason::SourceChanged(source.clone())),
            Err(err) => {
                tracing::debug!(
                    bundle = %bundle.name,
                    source = %source.display(),
                    error = %err,
                    "source stat failed"
                );
                return Staleness::Stale(StaleReason::SourceMissing(source.clone()));
            }
        }
    }

    Staleness::Fresh
}

/// Boolean form of [`check_staleness`].
pub async fn needs_rebuild(bundle: &Bundle, cache: CacheBranch<'_>, force: bool) -> bool {
    check_staleness(bundle, cache, force).await.is_stale()
}

/// Current modification time of `path` in the cache's string format.
pub async fn modification_time(path: &Path) -> std::io::Result<String> {
    let modified = tokio::fs::metadata(path).await?.modified()?;
    Ok(format_mtime(modified))
}

/// RFC 3339, UTC, nanosecond precision: `2024-05-01T10:00:00.000000000Z`.
pub fn format_mtime(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).to_rfc3339_opts(SecondsFormat::Nanos, true)
}
