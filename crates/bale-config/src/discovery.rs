//! File-based config discovery for CLI use
//!
//! Handles finding and loading bale configuration files from the filesystem.
//! Library users with an in-memory configuration should call
//! [`BundlerConfig::from_value`] directly.

use std::fs;
use std::path::{Path, PathBuf};

use figment::{Figment, providers::Env};
use serde::Deserialize;
use serde_json::Value;

use crate::config::{BundlerConfig, RawConfig};
use crate::error::{ConfigError, Result};

/// Environment variables with this prefix override top-level scalars
/// (`BALE_DEST`, `BALE_SOURCEMAPS`).
pub const ENV_PREFIX: &str = "BALE_";

const PACKAGE_FIELD: &str = "bale";

/// A configuration file found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Json(PathBuf),
    Toml(PathBuf),
    /// `package.json` carrying a `bale` field.
    PackageJson(PathBuf),
}

impl ConfigSource {
    /// Classify an explicitly given path by its file name.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path.file_name().is_some_and(|name| name == "package.json") {
            return ConfigSource::PackageJson(path);
        }
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => ConfigSource::Toml(path),
            _ => ConfigSource::Json(path),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            ConfigSource::Json(path) | ConfigSource::Toml(path) | ConfigSource::PackageJson(path) => {
                path
            }
        }
    }

    /// Directory relative paths in this file resolve against.
    pub fn root(&self) -> &Path {
        self.path().parent().unwrap_or_else(|| Path::new(""))
    }
}

/// File-based configuration discovery
///
/// # Example
///
/// ```no_run
/// use bale_config::ConfigDiscovery;
///
/// let config = ConfigDiscovery::new(".").load().unwrap();
/// println!("{} bundles", config.bundles.len());
/// ```
pub struct ConfigDiscovery {
    root: PathBuf,
}

impl ConfigDiscovery {
    /// Create a new config discovery with a root directory
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Find a config file in the root directory
    ///
    /// Searches in this order:
    /// 1. bale.json
    /// 2. bale.toml
    /// 3. package.json (bale field)
    pub fn find(&self) -> Option<ConfigSource> {
        let json_path = self.root.join("bale.json");
        if json_path.is_file() {
            return Some(ConfigSource::Json(json_path));
        }

        let toml_path = self.root.join("bale.toml");
        if toml_path.is_file() {
            return Some(ConfigSource::Toml(toml_path));
        }

        let pkg_path = self.root.join("package.json");
        if pkg_path.is_file() {
            if let Ok(content) = fs::read_to_string(&pkg_path) {
                if let Ok(parsed) = serde_json::from_str::<Value>(&content) {
                    if parsed.get(PACKAGE_FIELD).is_some_and(|v| !v.is_null()) {
                        return Some(ConfigSource::PackageJson(pkg_path));
                    }
                }
            }
        }

        None
    }

    /// Load config from the discovered file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if no config file is found.
    pub fn load(&self) -> Result<BundlerConfig> {
        let source = self.find().ok_or_else(|| ConfigError::NotFound {
            root: self.root.clone(),
        })?;
        load_source(&source)
    }
}

/// Load config from an explicit file path.
pub fn load_file(path: impl Into<PathBuf>) -> Result<BundlerConfig> {
    let source = ConfigSource::from_path(path);
    if !source.path().is_file() {
        return Err(ConfigError::NotFound {
            root: source.path().to_path_buf(),
        });
    }
    load_source(&source)
}

/// Load a specific config source, applying `BALE_*` environment overrides.
///
/// The file is deserialized straight into [`RawConfig`] so `modules` and
/// `bundles` keep their declaration order; figment only supplies the
/// environment overrides on top.
pub fn load_source(source: &ConfigSource) -> Result<BundlerConfig> {
    tracing::debug!(path = %source.path().display(), "loading configuration");

    let mut raw = read_raw(source)?;
    env_overrides()?.apply(&mut raw);

    raw.normalize(source.root())
}

/// Top-level scalars settable from the environment.
#[derive(Debug, Default, Deserialize)]
struct EnvOverrides {
    dest: Option<PathBuf>,
    sourcemaps: Option<bool>,
}

impl EnvOverrides {
    fn apply(self, raw: &mut RawConfig) {
        if let Some(dest) = self.dest {
            tracing::debug!(dest = %dest.display(), "dest overridden from environment");
            raw.dest = Some(dest);
        }
        if let Some(sourcemaps) = self.sourcemaps {
            raw.sourcemaps = Some(sourcemaps);
        }
    }
}

fn env_overrides() -> Result<EnvOverrides> {
    Figment::from(Env::prefixed(ENV_PREFIX).only(&["dest", "sourcemaps"]))
        .extract()
        .map_err(|e| ConfigError::InvalidValue {
            field: format!("{}*", ENV_PREFIX),
            hint: Some(e.to_string()),
        })
}

fn read_raw(source: &ConfigSource) -> Result<RawConfig> {
    let path = source.path();
    let content = fs::read_to_string(path)?;
    let invalid = |hint: String| ConfigError::InvalidValue {
        field: path.display().to_string(),
        hint: Some(hint),
    };

    match source {
        ConfigSource::Json(_) => serde_json::from_str(&content).map_err(|e| invalid(e.to_string())),
        ConfigSource::Toml(_) => toml::from_str(&content).map_err(|e| invalid(e.to_string())),
        ConfigSource::PackageJson(_) => read_package_field(&content),
    }
}

fn read_package_field(content: &str) -> Result<RawConfig> {
    let parsed: Value = serde_json::from_str(content).map_err(|e| ConfigError::InvalidValue {
        field: "package.json".to_string(),
        hint: Some(format!("Invalid JSON: {}", e)),
    })?;

    let value = parsed
        .get(PACKAGE_FIELD)
        .filter(|v| !v.is_null())
        .cloned()
        .ok_or_else(|| ConfigError::InvalidValue {
            field: PACKAGE_FIELD.to_string(),
            hint: Some("Add a 'bale' field to your package.json".to_string()),
        })?;

    serde_json::from_value(value).map_err(|e| ConfigError::InvalidValue {
        field: PACKAGE_FIELD.to_string(),
        hint: Some(e.to_string()),
    })
}
