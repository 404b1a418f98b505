//! Persistent staleness cache for bale-bundler.
//!
//! A flat string-to-string map persisted as one JSON document. Entries record
//! the modification time each source had when it was last built into a bundle.
//!
//! # Layout
//!
//! Top-level string values are plain entries. A key of the form `[name]`
//! holds a nested object: the *branch* `name`. Builders each own the branch
//! named after them, so their keys never collide:
//!
//! ```json
//! {
//!   "[js]": { "vendor.js:/project/vendor/jquery.js": "2024-05-01T10:00:00.000000000Z" },
//!   "[css]": { "site.css:/project/css/site.css": "2024-05-01T10:00:02.125000000Z" }
//! }
//! ```
//!
//! # Failure semantics
//!
//! A missing file is an empty cache. An unparsable file is deleted and also
//! treated as empty: the worst outcome is one round of unnecessary rebuilds.

mod branch;
mod store;

pub use branch::{CacheBranch, CacheBranchMut};
pub use store::Cache;

/// Error types for cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Cache document is not valid JSON or has an unexpected shape.
    #[error("cache corrupted: {0}")]
    Corrupted(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Key looks like a branch marker (`[name]`) and cannot hold a plain value.
    #[error("key '{0}' is reserved for cache branches")]
    ReservedKey(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for cache operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Whether `key` names a branch rather than a plain entry.
pub(crate) fn is_branch_marker(key: &str) -> bool {
    key.len() >= 2 && key.starts_with('[') && key.ends_with(']')
}

pub(crate) fn branch_marker(name: &str) -> String {
    format!("[{}]", name)
}
