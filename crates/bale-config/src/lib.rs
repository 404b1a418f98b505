//! Configuration for the bale asset bundler.
//!
//! A configuration maps named *modules* (ordered lists of source files) to
//! named *bundles* (output files). This crate owns the raw serde shape, the
//! normalization step that turns scalar-or-list values into fixed lists of
//! absolute paths, validation, and file discovery.
//!
//! ```
//! use bale_config::BundlerConfig;
//! use serde_json::json;
//! use std::path::Path;
//!
//! let config = BundlerConfig::from_value(
//!     json!({
//!         "dest": "dist",
//!         "modules": { "jquery": "vendor/jquery.js" },
//!         "bundles": { "vendor.js": "jquery" }
//!     }),
//!     Path::new("/project"),
//! )
//! .unwrap();
//!
//! assert_eq!(config.dest, Path::new("/project/dist"));
//! assert_eq!(config.bundles["vendor.js"], vec!["jquery".to_string()]);
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod types;
pub mod validation;

pub use config::{AssetsConfig, BundlerConfig, RawConfig};
pub use discovery::{ConfigDiscovery, ConfigSource, ENV_PREFIX, load_file, load_source};
pub use error::{ConfigError, Result};
pub use types::{AssetsOptions, OneOrMany};
pub use validation::{FsValidator, SchemaValidator, validate_fs};
