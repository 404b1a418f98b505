//! Shared helpers for command implementations.

use std::path::{Path, PathBuf};

use bale_config::{BundlerConfig, ConfigDiscovery};

use crate::cli::ProjectArgs;
use crate::error::{CliError, Result};

/// The project directory: `--cwd` if given, otherwise the working directory.
pub fn project_root(args: &ProjectArgs) -> Result<PathBuf> {
    let current = std::env::current_dir()?;
    let Some(cwd) = &args.cwd else {
        return Ok(current);
    };

    let root = resolve_path(cwd, &current);
    if !root.is_dir() {
        return Err(CliError::DirectoryNotFound(root));
    }
    Ok(root)
}

/// Load configuration from `--config`, or discover it in the project root.
pub fn load_config(args: &ProjectArgs) -> Result<BundlerConfig> {
    let root = project_root(args)?;

    let config = match &args.config {
        Some(path) => {
            let path = resolve_path(path, &root);
            tracing::debug!(path = %path.display(), "loading configuration");
            bale_config::load_file(path)?
        }
        None => {
            tracing::debug!(root = %root.display(), "discovering configuration");
            ConfigDiscovery::new(&root).load()?
        }
    };

    Ok(config)
}

/// `path` if absolute, otherwise `path` joined onto `base`.
pub fn resolve_path(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// `path` relative to `root` when it lies inside it.
pub fn display_path<'a>(path: &'a Path, root: &Path) -> std::path::Display<'a> {
    path.strip_prefix(root).unwrap_or(path).display()
}
