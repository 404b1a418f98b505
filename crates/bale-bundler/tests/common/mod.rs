//! Shared fixtures for bundler integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bale_bundler::{Bundler, BundlerConfig};
use serde_json::Value;
use tempfile::TempDir;

/// A project directory with sources, a `dist` output directory and a cache
/// file under `.cache/`.
pub struct Project {
    pub dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("tempdir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn dist(&self, name: &str) -> PathBuf {
        self.path("dist").join(name)
    }

    pub fn cache_path(&self) -> PathBuf {
        self.path(".cache/test-cache.json")
    }

    /// Write a file and pin its modification time to `at(seconds)`.
    pub fn write(&self, relative: &str, content: &str, seconds: u64) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        set_mtime(&path, at(seconds));
        path
    }

    pub fn config(&self, value: Value) -> BundlerConfig {
        BundlerConfig::from_value(value, self.root()).expect("valid config")
    }

    pub fn bundler(&self, value: Value) -> Bundler {
        Bundler::with_cache_path(self.config(value), self.cache_path())
    }
}

pub fn at(seconds: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(1_700_000_000 + seconds)
}

pub fn set_mtime(path: &Path, time: SystemTime) {
    let file = fs::File::options().write(true).open(path).unwrap();
    file.set_modified(time).unwrap();
}

pub fn mtime(path: &Path) -> SystemTime {
    fs::metadata(path).unwrap().modified().unwrap()
}

/// Pin an output's modification time far in the past so a later rewrite is
/// detectable regardless of filesystem timestamp resolution.
pub fn age(path: &Path) -> SystemTime {
    let old = UNIX_EPOCH + Duration::from_secs(1_000_000_000);
    set_mtime(path, old);
    old
}
