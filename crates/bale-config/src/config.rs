//! Raw and normalized configuration structures.
//!
//! `RawConfig` mirrors what users write. `BundlerConfig` is what the bundler
//! consumes: every scalar-or-list value is a list, every path is absolute and
//! the required parameters are known to be present.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use path_clean::PathClean;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConfigError, Result};
use crate::types::{AssetsOptions, OneOrMany};
use crate::validation::SchemaValidator;

/// Configuration exactly as written in `bale.json`, `bale.toml` or the
/// `bale` field of `package.json`.
///
/// Every field is optional here so that missing parameters surface as
/// [`ConfigError`] variants instead of deserialization failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sourcemaps: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<AssetsOptions>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modules: Option<IndexMap<String, OneOrMany>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundles: Option<IndexMap<String, OneOrMany>>,
}

/// Where referenced CSS assets are copied and how rewritten URLs address them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetsConfig {
    /// Absolute directory that receives content-addressed asset copies.
    pub dest: PathBuf,
    /// URL prefix written in front of every rewritten asset reference.
    /// Empty means "same directory as the stylesheet".
    pub base: String,
}

/// Validated, normalized configuration.
#[derive(Debug, Clone)]
pub struct BundlerConfig {
    /// Directory relative paths were resolved against.
    pub root: PathBuf,
    /// Absolute output directory.
    pub dest: PathBuf,
    /// Emit `.map` files next to JavaScript bundles.
    pub sourcemaps: bool,
    pub assets: AssetsConfig,
    /// Module name -> absolute source paths, in declaration order.
    pub modules: IndexMap<String, Vec<PathBuf>>,
    /// Bundle file name -> module names, in declaration order.
    pub bundles: IndexMap<String, Vec<String>>,
}

impl RawConfig {
    /// Validate and normalize, resolving relative paths against `root`.
    pub fn normalize(self, root: &Path) -> Result<BundlerConfig> {
        SchemaValidator.validate(&self)?;

        let root = absolutize(root)?;

        let dest = match self.dest {
            Some(dest) => root.join(dest).clean(),
            None => return Err(ConfigError::MissingDest),
        };

        let assets_options = self.assets.unwrap_or_default();
        let assets_dest = assets_options
            .dest
            .map(|d| root.join(d).clean())
            .unwrap_or_else(|| dest.clone());
        let assets_base = assets_options
            .base
            .unwrap_or_else(|| relative_url(&assets_dest, &dest));

        let modules = self
            .modules
            .ok_or(ConfigError::MissingModules)?
            .into_iter()
            .map(|(name, sources)| {
                let sources = sources
                    .into_vec()
                    .into_iter()
                    .map(|source| root.join(source).clean())
                    .collect();
                (name, sources)
            })
            .collect();

        let bundles = self
            .bundles
            .ok_or(ConfigError::MissingBundles)?
            .into_iter()
            .map(|(name, modules)| (name, modules.into_vec()))
            .collect();

        Ok(BundlerConfig {
            root,
            dest,
            sourcemaps: self.sourcemaps.unwrap_or(true),
            assets: AssetsConfig {
                dest: assets_dest,
                base: assets_base,
            },
            modules,
            bundles,
        })
    }
}

impl BundlerConfig {
    /// Create from serde_json::Value (for programmatic config).
    pub fn from_value(value: Value, root: &Path) -> Result<Self> {
        let raw: RawConfig =
            serde_json::from_value(value).map_err(|e| ConfigError::InvalidValue {
                field: "config".to_string(),
                hint: Some(e.to_string()),
            })?;
        raw.normalize(root)
    }

    /// Bundle names in declaration order.
    pub fn bundle_names(&self) -> impl Iterator<Item = &str> {
        self.bundles.keys().map(String::as_str)
    }
}

fn absolutize(root: &Path) -> Result<PathBuf> {
    if root.is_absolute() {
        Ok(root.clean())
    } else {
        Ok(std::env::current_dir()?.join(root).clean())
    }
}

/// URL path of `target` as seen from `from`, with forward slashes.
fn relative_url(target: &Path, from: &Path) -> String {
    match pathdiff::diff_paths(target, from) {
        Some(relative) => relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/"),
        None => target.to_string_lossy().replace('\\', "/"),
    }
}
