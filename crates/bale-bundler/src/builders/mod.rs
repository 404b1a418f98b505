//! Bundle builders.
//!
//! A [`Builder`] turns a resolved [`Bundle`] into output text. Builders do
//! not touch the cache or the output directory; the orchestrator writes
//! what they return. Each builder's [`name`](Builder::name) is also the cache
//! branch its bundles' entries live in.

pub mod assets;
mod css;
mod js;

pub use css::CssBuilder;
pub use js::JsBuilder;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use bale_config::{AssetsConfig, BundlerConfig};
use rustc_hash::FxHashMap;

use crate::bundle::Bundle;
use crate::{Error, Result};

/// Settings shared by every build of one orchestrator.
#[derive(Debug, Clone)]
pub struct BuildSettings {
    /// Absolute output directory.
    pub dest: PathBuf,
    /// Produce `.map` files for JavaScript bundles.
    pub sourcemaps: bool,
    pub assets: AssetsConfig,
}

impl From<&BundlerConfig> for BuildSettings {
    fn from(config: &BundlerConfig) -> Self {
        Self {
            dest: config.dest.clone(),
            sourcemaps: config.sourcemaps,
            assets: config.assets.clone(),
        }
    }
}

/// A file referenced by a stylesheet, to be copied under a content-addressed
/// name into the assets directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetCopy {
    pub source: PathBuf,
    /// `<stem>-<hash8>.<ext>`
    pub file_name: String,
}

/// What a builder produced for one bundle.
#[derive(Debug, Clone, Default)]
pub struct BuildOutput {
    pub code: String,
    /// Source map JSON, written to `<output>.map`.
    pub map: Option<String>,
    pub assets: Vec<AssetCopy>,
}

/// Builds one kind of bundle.
#[async_trait]
pub trait Builder: Send + Sync + std::fmt::Debug {
    /// Short identifier, also used as the cache branch name.
    fn name(&self) -> &'static str;

    /// Read, transform and concatenate the bundle's sources in order.
    async fn build(&self, bundle: &Bundle, settings: &BuildSettings) -> Result<BuildOutput>;
}

/// Maps bundle extensions to builders.
#[derive(Debug, Clone, Default)]
pub struct BuilderRegistry {
    builders: FxHashMap<String, Arc<dyn Builder>>,
}

impl BuilderRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// `js` and `css` builders.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("js", Arc::new(JsBuilder::new()));
        registry.register("css", Arc::new(CssBuilder::new()));
        registry
    }

    /// Register `builder` for bundles ending in `.ext`, replacing any
    /// previous registration.
    pub fn register(&mut self, ext: impl Into<String>, builder: Arc<dyn Builder>) -> &mut Self {
        self.builders.insert(ext.into(), builder);
        self
    }

    /// Builder for `bundle`'s extension.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedBundleType`] if nothing is registered for it.
    pub fn get(&self, bundle: &Bundle) -> Result<Arc<dyn Builder>> {
        self.builders
            .get(&bundle.ext)
            .cloned()
            .ok_or_else(|| Error::UnsupportedBundleType {
                bundle: bundle.name.clone(),
                extension: bundle.ext.clone(),
            })
    }
}

/// Read every source of `bundle`, in order.
pub(crate) async fn read_sources(bundle: &Bundle) -> Result<Vec<(PathBuf, String)>> {
    let mut sources = Vec::with_capacity(bundle.sources.len());
    for path in &bundle.sources {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| Error::SourceRead {
                path: path.clone(),
                source,
            })?;
        sources.push((path.clone(), text));
    }
    Ok(sources)
}

/// Run CPU-bound minification off the async runtime.
pub(crate) async fn run_blocking<T, F>(bundle: &Bundle, builder: &str, task: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| Error::builder(&bundle.name, builder, format!("task failed: {}", e)))?
}
