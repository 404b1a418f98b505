//! Error types for configuration validation and loading.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    // Required parameters
    #[error("<dest> parameter is required")]
    MissingDest,

    #[error("<modules> parameter is required and must contain at least one module")]
    MissingModules,

    #[error("<bundles> parameter is required and must contain at least one bundle")]
    MissingBundles,

    // Cross references
    #[error("bundle '{bundle}' references unknown module '{module}'")]
    UnknownModule { bundle: String, module: String },

    // Filesystem validation errors (for CLI use)
    #[error("source of module '{module}' not found: {}", .path.display())]
    SourceNotFound { module: String, path: PathBuf },

    // Config parsing/loading errors
    #[error("config not found in {}", .root.display())]
    NotFound { root: PathBuf },

    #[error("invalid config value for '{field}'{}", .hint.as_deref().map(|h| format!(": {h}")).unwrap_or_default())]
    InvalidValue { field: String, hint: Option<String> },

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
