//! # bale-bundler
//!
//! Concatenates and minifies JavaScript and CSS *modules* into *bundles*,
//! rebuilding a bundle only when one of its sources changed since the last
//! successful build.
//!
//! Change detection is driven by a small persistent cache mapping
//! `<bundle>:<absolute source path>` to the source's modification time.
//!
//! ## Quick Start
//!
//! ```no_run
//! use bale_bundler::Bundler;
//! use bale_config::ConfigDiscovery;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigDiscovery::new(".").load()?;
//! let mut bundler = Bundler::new(config);
//!
//! // Only stale bundles are rebuilt
//! let report = bundler.all(false).await?;
//! println!("built {:?}, fresh {:?}", report.built, report.fresh);
//!
//! // Rebuild one bundle regardless of cache state
//! bundler.bundle("vendor.js", true).await?;
//! # Ok(()) }
//! ```

pub mod builders;
pub mod bundle;
pub mod bundler;
pub mod cache;
pub mod output;
pub mod staleness;

pub use builders::{
    AssetCopy, BuildOutput, BuildSettings, Builder, BuilderRegistry, CssBuilder, JsBuilder,
};
pub use bundle::Bundle;
pub use bundler::{BuildReport, BundleFailure, Bundler, DEFAULT_CACHE_PATH};
pub use cache::{Cache, CacheBranch, CacheBranchMut, CacheError};
pub use staleness::{StaleReason, Staleness, check_staleness, needs_rebuild};

pub use bale_config::{BundlerConfig, ConfigError};

use std::path::PathBuf;

/// Error types for bale-bundler operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A requested bundle name is not declared in the configuration.
    #[error("Unknown bundle: {0}")]
    UnknownBundle(String),

    /// No builder is registered for the bundle's extension.
    #[error("No builder for bundle '{bundle}' (extension '{extension}')")]
    UnsupportedBundleType { bundle: String, extension: String },

    /// A source could not be read or stat'd during a rebuild.
    #[error("Failed to read source '{}': {source}", .path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The minifier reported errors; the bundle was not written.
    #[error("{builder} builder failed for bundle '{bundle}': {message}")]
    Builder {
        bundle: String,
        builder: String,
        message: String,
    },

    /// A stylesheet references a local file that does not exist.
    #[error("Asset not found: {specifier} (referenced from: {})", .stylesheet.display())]
    AssetNotFound {
        specifier: String,
        stylesheet: PathBuf,
    },

    /// Invalid output path (e.g., directory traversal attempt).
    #[error("Invalid output path: {0}")]
    InvalidOutputPath(String),

    /// File write operation failed.
    #[error("Write failure: {0}")]
    Write(String),

    /// Persisting or clearing the cache failed.
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// One or more bundles of a batch failed. Bundles in `report` succeeded;
    /// their cache entries were saved unless `cache` holds the save error.
    #[error("{}", format_batch_error(.failures, .cache.as_ref()))]
    Batch {
        failures: Vec<BundleFailure>,
        report: BuildReport,
        cache: Option<CacheError>,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for bale-bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn builder(
        bundle: impl Into<String>,
        builder: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Error::Builder {
            bundle: bundle.into(),
            builder: builder.into(),
            message: message.into(),
        }
    }
}

fn format_batch_error(failures: &[BundleFailure], cache: Option<&CacheError>) -> String {
    let message = match failures {
        [] => "Batch failed".to_string(),
        [single] => format!("{}: {}", single.bundle, single.error),
        many => format!(
            "{} bundles failed: {}",
            many.len(),
            many.iter()
                .map(|f| f.bundle.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ),
    };
    match cache {
        Some(err) => format!("{} (cache not saved: {})", message, err),
        None => message,
    }
}

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::Config(_) => "INVALID_CONFIG",
            Error::UnknownBundle(_) => "UNKNOWN_BUNDLE",
            Error::UnsupportedBundleType { .. } => "UNSUPPORTED_BUNDLE_TYPE",
            Error::SourceRead { .. } => "SOURCE_READ",
            Error::Builder { .. } => "BUILDER_ERROR",
            Error::AssetNotFound { .. } => "ASSET_NOT_FOUND",
            Error::InvalidOutputPath(_) => "INVALID_OUTPUT_PATH",
            Error::Write(_) => "WRITE_FAILURE",
            Error::Cache(_) => "CACHE_ERROR",
            Error::Batch { .. } => "BATCH_FAILED",
            Error::Io(_) => "IO_ERROR",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::Config(err) => Some(Box::new(format!(
                "Check your configuration file.\nError: {}",
                err
            ))),
            Error::UnknownBundle(name) => Some(Box::new(format!(
                "'{}' is not a key of <bundles>. Run `bale list` to see configured bundles.",
                name
            ))),
            Error::UnsupportedBundleType { extension, .. } => Some(Box::new(format!(
                "Bundles are built by extension; '.{}' has no registered builder. Use a .js or .css bundle name.",
                extension
            ))),
            Error::SourceRead { path, .. } => Some(Box::new(format!(
                "Check that '{}' exists and is readable.",
                path.display()
            ))),
            Error::AssetNotFound {
                specifier,
                stylesheet,
            } => Some(Box::new(format!(
                "Could not find asset '{}'.\nResolved relative to: {}\nCheck that the file exists and the path is correct.",
                specifier,
                stylesheet.display()
            ))),
            Error::InvalidOutputPath(path) => Some(Box::new(format!(
                "The output path '{}' is invalid. Bundle names must stay inside <dest>.",
                path
            ))),
            Error::Write(msg) => Some(Box::new(format!(
                "Failed to write file. Check disk space and permissions.\nError: {}",
                msg
            ))),
            Error::Batch { report, .. } if !report.built.is_empty() => Some(Box::new(format!(
                "These bundles were built successfully: {}",
                report.built.join(", ")
            ))),
            _ => None,
        }
    }

    fn related(&self) -> Option<Box<dyn Iterator<Item = &dyn miette::Diagnostic> + '_>> {
        match self {
            Error::Batch { failures, .. } if failures.len() > 1 => Some(Box::new(
                failures
                    .iter()
                    .map(|failure| &failure.error as &dyn miette::Diagnostic),
            )),
            _ => None,
        }
    }
}
