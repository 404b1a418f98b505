//! Build orchestration.
//!
//! Every build call has the same shape:
//!
//! 1. resolve the requested names (unknown names fail before any work)
//! 2. decide staleness for every bundle against the cache as it was when the
//!    call started
//! 3. rebuild all stale bundles concurrently and write their output
//! 4. commit cache entries for the bundles that succeeded, then save once

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bale_config::BundlerConfig;
use futures::future::join_all;
use rustc_hash::FxHashSet;

use crate::builders::{BuildSettings, Builder, BuilderRegistry};
use crate::bundle::Bundle;
use crate::cache::Cache;
use crate::output::write_bundle;
use crate::staleness::{StaleReason, Staleness, check_staleness, modification_time};
use crate::{Error, Result};

/// Cache file location relative to the configuration root.
pub const DEFAULT_CACHE_PATH: &str = ".cache/bale/cache.json";

/// Outcome of a build call. Names follow request order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Bundles rebuilt and written.
    pub built: Vec<String>,
    /// Bundles found up to date and left untouched.
    pub fresh: Vec<String>,
}

impl BuildReport {
    pub fn is_built(&self, name: &str) -> bool {
        self.built.iter().any(|b| b == name)
    }

    pub fn is_fresh(&self, name: &str) -> bool {
        self.fresh.iter().any(|b| b == name)
    }
}

/// A bundle of a batch that failed, and why.
#[derive(Debug)]
pub struct BundleFailure {
    pub bundle: String,
    pub error: Error,
}

struct StaleBundle {
    bundle: Bundle,
    builder: Arc<dyn Builder>,
    reason: StaleReason,
}

/// Builds bundles, skipping the ones whose sources did not change.
///
/// Owns the cache; builders never see it.
#[derive(Debug)]
pub struct Bundler {
    config: BundlerConfig,
    settings: BuildSettings,
    registry: BuilderRegistry,
    cache: Cache,
}

impl Bundler {
    /// Create a bundler with the default builders and the cache at
    /// `<root>/.cache/bale/cache.json`.
    pub fn new(config: BundlerConfig) -> Self {
        let cache_path = config.root.join(DEFAULT_CACHE_PATH);
        Self::with_cache_path(config, cache_path)
    }

    /// Create a bundler whose cache lives at `cache_path`.
    pub fn with_cache_path(config: BundlerConfig, cache_path: impl Into<PathBuf>) -> Self {
        Self {
            settings: BuildSettings::from(&config),
            registry: BuilderRegistry::with_defaults(),
            cache: Cache::open(cache_path),
            config,
        }
    }

    /// Replace the builder registry.
    pub fn with_registry(mut self, registry: BuilderRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &BundlerConfig {
        &self.config
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub fn cache_path(&self) -> &Path {
        self.cache.path()
    }

    /// Resolve the bundle `name` without building it.
    pub fn resolve(&self, name: &str) -> Result<Bundle> {
        Bundle::resolve(name, &self.config)
    }

    /// Whether `name` would be rebuilt by a non-forced build right now.
    pub async fn staleness(&self, name: &str) -> Result<Staleness> {
        let bundle = self.resolve(name)?;
        let builder = self.registry.get(&bundle)?;
        Ok(check_staleness(&bundle, self.cache.branch(builder.name()), false).await)
    }

    /// Build one bundle if it is stale (or `force` is set).
    ///
    /// # Errors
    ///
    /// The bundle's own error, unwrapped from the batch.
    pub async fn bundle(&mut self, name: &str, force: bool) -> Result<BuildReport> {
        match self.run(&[name], force).await {
            Err(Error::Batch {
                mut failures,
                cache: None,
                ..
            }) if failures.len() == 1 => {
                Err(failures.remove(0).error)
            }
            other => other,
        }
    }

    /// Build several bundles. Staleness of all of them is decided before any
    /// is rebuilt; stale ones are rebuilt concurrently.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownBundle`] before any work if a name is not configured.
    /// [`Error::Batch`] if some bundles failed; the others were still built
    /// and cached. A cache save failure is carried in the batch error so the
    /// failing bundles are still reported.
    pub async fn bundles<S: AsRef<str>>(&mut self, names: &[S], force: bool) -> Result<BuildReport> {
        let names: Vec<&str> = names.iter().map(AsRef::as_ref).collect();
        self.run(&names, force).await
    }

    /// Build every configured bundle.
    pub async fn all(&mut self, force: bool) -> Result<BuildReport> {
        let names: Vec<String> = self.config.bundle_names().map(str::to_string).collect();
        self.bundles(&names, force).await
    }

    /// Forget all staleness history; every bundle is stale until rebuilt.
    pub async fn clear_cache(&mut self) -> Result<()> {
        self.cache.clear().await?;
        tracing::info!(path = %self.cache.path().display(), "cache cleared");
        Ok(())
    }

    async fn run(&mut self, names: &[&str], force: bool) -> Result<BuildReport> {
        let mut seen = FxHashSet::default();
        let bundles = names
            .iter()
            .filter(|name| seen.insert(**name))
            .map(|name| self.resolve(name))
            .collect::<Result<Vec<_>>>()?;

        let mut report = BuildReport::default();
        let mut failures = Vec::new();
        let mut stale = Vec::new();
        let mut missing_sources = Vec::new();

        // Staleness pass: reads the cache as it was before this call
        for bundle in bundles {
            let builder = match self.registry.get(&bundle) {
                Ok(builder) => builder,
                Err(error) => {
                    tracing::error!(bundle = %bundle.name, error = %error, "cannot build bundle");
                    failures.push(BundleFailure {
                        bundle: bundle.name.clone(),
                        error,
                    });
                    continue;
                }
            };

            match check_staleness(&bundle, self.cache.branch(builder.name()), force).await {
                Staleness::Fresh => {
                    tracing::info!(bundle = %bundle.name, "bundle is fresh");
                    report.fresh.push(bundle.name);
                }
                Staleness::Stale(reason) => {
                    tracing::info!(bundle = %bundle.name, reason = %reason, "rebuilding bundle");
                    if let StaleReason::SourceMissing(source) = &reason {
                        missing_sources.push((builder.name(), bundle.cache_key(source)));
                    }
                    stale.push(StaleBundle {
                        bundle,
                        builder,
                        reason,
                    });
                }
            }
        }

        let mut dirty = false;
        for (namespace, key) in missing_sources {
            dirty |= self.cache.branch_mut(namespace).remove(&key).is_some();
        }

        // Rebuild pass: concurrent, no cache access
        let settings = &self.settings;
        let results = join_all(
            stale
                .iter()
                .map(|entry| build_and_write(&entry.bundle, entry.builder.as_ref(), settings)),
        )
        .await;

        // Commit pass
        for (entry, result) in stale.into_iter().zip(results) {
            match result {
                Ok(snapshot) => {
                    self.commit(&entry.bundle, entry.builder.name(), snapshot);
                    dirty = true;
                    tracing::info!(bundle = %entry.bundle.name, reason = %entry.reason, "built bundle");
                    report.built.push(entry.bundle.name);
                }
                Err(error) => {
                    tracing::error!(bundle = %entry.bundle.name, error = %error, "bundle failed");
                    failures.push(BundleFailure {
                        bundle: entry.bundle.name,
                        error,
                    });
                }
            }
        }

        let saved = if dirty {
            self.cache.save().await
        } else {
            Ok(())
        };

        if failures.is_empty() {
            saved?;
            Ok(report)
        } else {
            Err(Error::Batch {
                failures,
                report,
                cache: saved.err(),
            })
        }
    }

    /// Record the snapshot and drop entries of sources no longer in the
    /// bundle.
    fn commit(&mut self, bundle: &Bundle, namespace: &str, snapshot: Vec<(PathBuf, String)>) {
        let mut branch = self.cache.branch_mut(namespace);

        let mut current = FxHashSet::default();
        for (source, mtime) in snapshot {
            let key = bundle.cache_key(&source);
            current.insert(key.clone());
            branch.set(key, mtime);
        }

        let prefix = bundle.key_prefix();
        branch.retain(|key, _| !key.starts_with(&prefix) || current.contains(key));
    }
}

/// Snapshot source times, build, write. Times are taken before the sources
/// are read, so an edit made during the build is seen as a change next time.
async fn build_and_write(
    bundle: &Bundle,
    builder: &dyn Builder,
    settings: &BuildSettings,
) -> Result<Vec<(PathBuf, String)>> {
    let mut snapshot = Vec::with_capacity(bundle.sources.len());
    for source in &bundle.sources {
        let mtime = modification_time(source)
            .await
            .map_err(|e| Error::SourceRead {
                path: source.clone(),
                source: e,
            })?;
        snapshot.push((source.clone(), mtime));
    }

    let output = builder.build(bundle, settings).await?;
    write_bundle(bundle, &output, settings).await?;

    Ok(snapshot)
}
