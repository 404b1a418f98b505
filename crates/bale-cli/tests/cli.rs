//! End-to-end tests for the `bale` binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;

fn bale() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("bale"));
    cmd.env_remove("RUST_LOG").env("NO_COLOR", "1");
    cmd
}

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "src/a.js", "var first = 1;\nconsole.log(first);\n");
    write(dir.path(), "src/b.js", "var second = 2;");
    write(dir.path(), "styles/site.css", "body { margin: 0 }");
    write(
        dir.path(),
        "bale.json",
        &json!({
            "dest": "dist",
            "modules": {
                "app": ["src/a.js", "src/b.js"],
                "styles": "styles/site.css"
            },
            "bundles": {
                "app.js": "app",
                "site.css": "styles"
            }
        })
        .to_string(),
    );
    dir
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn build_writes_every_bundle() {
    let dir = project();

    bale()
        .arg("build")
        .current_dir(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Built 2 bundles"));

    assert!(dir.path().join("dist/app.js").exists());
    assert!(dir.path().join("dist/app.js.map").exists());
    assert!(dir.path().join("dist/site.css").exists());
    assert!(dir.path().join(".cache/bale/cache.json").exists());
}

#[test]
fn second_build_is_up_to_date() {
    let dir = project();

    bale().arg("build").current_dir(dir.path()).assert().success();
    bale()
        .arg("build")
        .current_dir(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("All 2 bundles up to date"));
}

#[test]
fn force_rebuilds_named_bundle() {
    let dir = project();

    bale().arg("build").current_dir(dir.path()).assert().success();
    bale()
        .args(["build", "site.css", "--force"])
        .current_dir(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Built 1 bundle"));
}

#[test]
fn cwd_flag_selects_the_project() {
    let dir = project();

    bale()
        .arg("build")
        .arg("--cwd")
        .arg(dir.path())
        .assert()
        .success();

    assert!(dir.path().join("dist/site.css").exists());
}

#[test]
fn clear_cache_removes_the_cache_file() {
    let dir = project();

    bale().arg("build").current_dir(dir.path()).assert().success();
    bale()
        .arg("clear-cache")
        .current_dir(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Cleared cache"));

    assert!(!dir.path().join(".cache/bale/cache.json").exists());
    bale()
        .arg("build")
        .current_dir(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Built 2 bundles"));
}

#[test]
fn unknown_bundle_fails_with_diagnostic() {
    let dir = project();

    bale()
        .args(["build", "missing.js"])
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.js"));

    assert!(!dir.path().join("dist").exists());
}

#[test]
fn syntax_error_fails_only_that_bundle() {
    let dir = project();
    write(dir.path(), "src/b.js", "function (");

    bale()
        .arg("build")
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("✗ app.js failed"))
        .stderr(predicate::str::contains("built site.css"));

    assert!(dir.path().join("dist/site.css").exists());
    assert!(!dir.path().join("dist/app.js").exists());
}

#[test]
fn missing_configuration_is_reported() {
    let dir = TempDir::new().unwrap();

    bale()
        .arg("build")
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("config not found"));
}

#[test]
fn explicit_toml_configuration() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "web/main.js", "var main = 1;");
    write(
        dir.path(),
        "web/bale.toml",
        "dest = \"out\"\nsourcemaps = false\n\n[modules]\nmain = \"main.js\"\n\n[bundles]\n\"main.js\" = \"main\"\n",
    );

    bale()
        .args(["build", "--config", "web/bale.toml"])
        .current_dir(dir.path())
        .assert()
        .success();

    assert!(dir.path().join("web/out/main.js").exists());
    assert!(!dir.path().join("web/out/main.js.map").exists());
}

#[test]
fn check_reports_staleness() {
    let dir = project();

    bale()
        .arg("check")
        .current_dir(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("app.js: 2 .js sources, needs rebuild"))
        .stderr(predicate::str::contains("Configuration is valid (2 bundles)"));

    bale().arg("build").current_dir(dir.path()).assert().success();
    bale()
        .arg("check")
        .current_dir(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("app.js: 2 .js sources, up to date"));
}

#[test]
fn check_fails_on_missing_source() {
    let dir = project();
    fs::remove_file(dir.path().join("src/b.js")).unwrap();

    bale()
        .arg("check")
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("b.js"));
}

#[test]
fn list_prints_resolved_sources() {
    let dir = project();

    bale()
        .arg("list")
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("app.js -> dist/app.js"))
        .stdout(predicate::str::contains("  src/a.js\n  src/b.js\n"))
        .stdout(predicate::str::contains("site.css -> dist/site.css"));
}
