//! Error handling for the `bale` binary.
//!
//! Commands return [`CliError`]; `main` turns it into a [`miette::Report`]
//! with [`cli_error_to_miette`] so bundler diagnostics keep their codes and
//! help text.

mod report;

use std::path::PathBuf;

use thiserror::Error;

pub use report::cli_error_to_miette;

#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be found, parsed or validated
    #[error(transparent)]
    Config(#[from] bale_config::ConfigError),

    /// A build, cache or staleness operation failed
    #[error(transparent)]
    Bundler(#[from] bale_bundler::Error),

    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;
