//! Tests for configuration validation.

use bale_config::{BundlerConfig, ConfigError, FsValidator, validate_fs};
use serde_json::json;
use std::fs;
use tempfile::TempDir;

fn config_in(dir: &TempDir) -> BundlerConfig {
    BundlerConfig::from_value(
        json!({
            "dest": "dist",
            "modules": {
                "base": ["css/reset.css", "css/site.css"],
                "app": "js/app.js"
            },
            "bundles": { "site.css": "base", "app.js": "app" }
        }),
        dir.path(),
    )
    .expect("valid config")
}

#[test]
fn fs_validation_catches_missing_source() {
    let dir = TempDir::new().expect("tempdir");
    fs::create_dir(dir.path().join("css")).unwrap();
    fs::write(dir.path().join("css/reset.css"), "").unwrap();

    let config = config_in(&dir);
    match FsValidator.validate(&config).unwrap_err() {
        ConfigError::SourceNotFound { module, path } => {
            assert_eq!(module, "base");
            assert!(path.ends_with("css/site.css"));
        }
        other => panic!("expected SourceNotFound, got {:?}", other),
    }
}

#[test]
fn fs_validation_succeeds_when_sources_exist() {
    let dir = TempDir::new().expect("tempdir");
    fs::create_dir(dir.path().join("css")).unwrap();
    fs::create_dir(dir.path().join("js")).unwrap();
    for file in ["css/reset.css", "css/site.css", "js/app.js"] {
        fs::write(dir.path().join(file), "").unwrap();
    }

    assert!(validate_fs(&config_in(&dir)).is_ok());
}

#[test]
fn unknown_module_fails_before_any_filesystem_access() {
    let err = BundlerConfig::from_value(
        json!({
            "dest": "dist",
            "modules": { "m": "a.js" },
            "bundles": { "out.js": ["m", "ghost"] }
        }),
        std::path::Path::new("/does/not/exist"),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        ConfigError::UnknownModule { ref module, .. } if module == "ghost"
    ));
}
