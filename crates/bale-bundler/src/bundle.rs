//! Bundle resolution: module references to concrete, extension-filtered
//! source lists.

use std::path::{Path, PathBuf};

use bale_config::{BundlerConfig, ConfigError};
use rustc_hash::FxHashSet;

use crate::{Error, Result};

/// A named output artifact and the sources it is assembled from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    /// Output file name, e.g. `main.js`.
    pub name: String,
    /// Extension without the dot; selects the builder and filters sources.
    pub ext: String,
    /// Absolute output path, `<dest>/<name>`.
    pub output: PathBuf,
    /// Referenced module names, in declaration order.
    pub modules: Vec<String>,
    /// Sources whose extension matches `ext`, in module order then file
    /// order, first occurrence kept.
    pub sources: Vec<PathBuf>,
}

impl Bundle {
    /// Resolve the bundle `name` against `config`.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownBundle`] if `name` is not configured.
    pub fn resolve(name: &str, config: &BundlerConfig) -> Result<Self> {
        let modules = config
            .bundles
            .get(name)
            .ok_or_else(|| Error::UnknownBundle(name.to_string()))?;

        let ext = extension_of(Path::new(name)).unwrap_or_default().to_string();

        let mut seen = FxHashSet::default();
        let mut sources = Vec::new();
        for module in modules {
            let files = config
                .modules
                .get(module)
                .ok_or_else(|| ConfigError::UnknownModule {
                    bundle: name.to_string(),
                    module: module.clone(),
                })?;

            for file in files {
                if extension_of(file) == Some(ext.as_str()) && seen.insert(file.as_path()) {
                    sources.push(file.clone());
                }
            }
        }

        Ok(Self {
            name: name.to_string(),
            ext,
            output: config.dest.join(name),
            modules: modules.clone(),
            sources,
        })
    }

    /// Prefix shared by every cache key of this bundle.
    pub fn key_prefix(&self) -> String {
        format!("{}:", self.name)
    }

    /// Cache key for one of this bundle's sources: `<bundle>:<source>`.
    pub fn cache_key(&self, source: &Path) -> String {
        format!("{}:{}", self.name, source.display())
    }

    /// Path of the source map written next to the output.
    pub fn map_output(&self) -> PathBuf {
        let mut name = self.output.clone().into_os_string();
        name.push(".map");
        PathBuf::from(name)
    }

    /// Path of the source map relative to `dest`.
    pub fn map_name(&self) -> String {
        format!("{}.map", self.name)
    }

    /// Source map reference written into the output. The map sits next to
    /// the output, so this is its bare file name.
    pub fn map_url(&self) -> String {
        self.map_output()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.map_name())
    }

    /// Directory the output is written to; map sources are relative to it.
    pub fn output_dir(&self) -> Option<&Path> {
        self.output.parent()
    }
}

/// Resolve every configured bundle, in declaration order.
pub fn resolve_all(config: &BundlerConfig) -> Result<Vec<Bundle>> {
    config
        .bundle_names()
        .map(|name| Bundle::resolve(name, config))
        .collect()
}

fn extension_of(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}
