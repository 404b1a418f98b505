//! File writing for bundle output.
//!
//! - **Path validation**: output names are cleaned and must stay inside the
//!   output directory (no `..` escapes, no absolute names).
//! - **Atomic writes**: content goes to a `<name>.tmp` sibling first and is
//!   renamed into place, so readers never observe a half-written bundle.
//! - **Rollback**: if any write of a bundle fails, its temp files are removed.
//!
//! Referenced assets are copied before the stylesheet that points at them.
//! Their names are content-addressed, so an existing file is never rewritten.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use path_clean::PathClean;

use crate::builders::{AssetCopy, BuildOutput, BuildSettings};
use crate::bundle::Bundle;
use crate::{Error, Result};

/// Write `output` for `bundle`: assets, then code and source map.
pub async fn write_bundle(
    bundle: &Bundle,
    output: &BuildOutput,
    settings: &BuildSettings,
) -> Result<()> {
    let dest = validate_and_normalize_dir(&settings.dest)?;

    if !output.assets.is_empty() {
        let assets_dir = validate_and_normalize_dir(&settings.assets.dest)?;
        for asset in &output.assets {
            copy_asset(&assets_dir, asset).await?;
        }
    }

    let mut operations = vec![(
        validate_output_path(&dest, &bundle.name)?,
        output.code.as_bytes(),
    )];
    if let Some(map) = &output.map {
        operations.push((validate_output_path(&dest, &bundle.map_name())?, map.as_bytes()));
    }

    write_files_atomic(&operations).await?;

    tracing::debug!(bundle = %bundle.name, path = %bundle.output.display(), "wrote bundle");
    Ok(())
}

/// `<path>.tmp`, next to `path`.
pub(crate) fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(OsString::new);
    name.push(".tmp");
    path.with_file_name(name)
}

async fn copy_asset(assets_dir: &Path, asset: &AssetCopy) -> Result<()> {
    let target = validate_output_path(assets_dir, &asset.file_name)?;

    if matches!(tokio::fs::try_exists(&target).await, Ok(true)) {
        tracing::debug!(asset = %asset.file_name, "asset already present");
        return Ok(());
    }

    create_parent(&target).await?;

    let temp_path = temp_path_for(&target);
    if let Err(e) = tokio::fs::copy(&asset.source, &temp_path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(Error::Write(format!(
            "Failed to copy asset '{}' to '{}': {}",
            asset.source.display(),
            temp_path.display(),
            e
        )));
    }

    tokio::fs::rename(&temp_path, &target).await.map_err(|e| {
        Error::Write(format!(
            "Failed to rename '{}' to '{}': {}",
            temp_path.display(),
            target.display(),
            e
        ))
    })?;

    tracing::debug!(asset = %asset.file_name, "copied asset");
    Ok(())
}

/// Make `dir` absolute and free of `.`/`..` components.
fn validate_and_normalize_dir(dir: &Path) -> Result<PathBuf> {
    let cleaned = dir.clean();

    if cleaned.is_absolute() {
        return Ok(cleaned);
    }

    Ok(std::env::current_dir()
        .map_err(|e| Error::InvalidOutputPath(format!("Failed to get current directory: {}", e)))?
        .join(&cleaned)
        .clean())
}

/// Join `filename` onto `base_dir`, rejecting results outside `base_dir`.
fn validate_output_path(base_dir: &Path, filename: &str) -> Result<PathBuf> {
    if filename.contains('\0') {
        return Err(Error::InvalidOutputPath(
            "Filename contains null byte".to_string(),
        ));
    }

    let full_path = base_dir.join(Path::new(filename).clean()).clean();

    if !full_path.starts_with(base_dir) || full_path == base_dir {
        return Err(Error::InvalidOutputPath(format!(
            "Path '{}' escapes output directory '{}' (resolved to '{}')",
            filename,
            base_dir.display(),
            full_path.display()
        )));
    }

    Ok(full_path)
}

async fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            Error::Write(format!(
                "Failed to create directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }
    Ok(())
}

/// Two-phase write: every file to its temp path, then rename all.
async fn write_files_atomic(operations: &[(PathBuf, &[u8])]) -> Result<()> {
    let mut temp_files = Vec::with_capacity(operations.len());

    for (target_path, content) in operations {
        if let Err(e) = create_parent(target_path).await {
            cleanup_temp_files(&temp_files).await;
            return Err(e);
        }

        let temp_path = temp_path_for(target_path);
        if let Err(e) = tokio::fs::write(&temp_path, content).await {
            temp_files.push((temp_path.clone(), target_path.clone()));
            cleanup_temp_files(&temp_files).await;
            return Err(Error::Write(format!(
                "Failed to write temporary file '{}': {}",
                temp_path.display(),
                e
            )));
        }

        temp_files.push((temp_path, target_path.clone()));
    }

    for (temp_path, target_path) in &temp_files {
        if let Err(e) = tokio::fs::rename(temp_path, target_path).await {
            cleanup_temp_files(&temp_files).await;
            return Err(Error::Write(format!(
                "Failed to rename '{}' to '{}': {}",
                temp_path.display(),
                target_path.display(),
                e
            )));
        }
    }

    Ok(())
}

/// Best-effort removal of leftover temp files; we are already failing.
async fn cleanup_temp_files(temp_files: &[(PathBuf, PathBuf)]) {
    for (temp_path, _) in temp_files {
        if let Err(e) = tokio::fs::remove_file(temp_path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    path = %temp_path.display(),
                    error = %e,
                    "failed to clean up temporary file"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bale_config::AssetsConfig;
    use std::fs;
    use tempfile::TempDir;

    fn settings(dest: &Path, assets_dest: &Path) -> BuildSettings {
        BuildSettings {
            dest: dest.to_path_buf(),
            sourcemaps: true,
            assets: AssetsConfig {
                dest: assets_dest.to_path_buf(),
                base: String::new(),
            },
        }
    }

    fn bundle(dest: &Path, name: &str) -> Bundle {
        Bundle {
            name: name.to_string(),
            ext: "js".to_string(),
            output: dest.join(name),
            modules: Vec::new(),
            sources: Vec::new(),
        }
    }

    #[test]
    fn validate_output_path_normal() {
        let base = Path::new("/tmp/output");
        assert_eq!(
            validate_output_path(base, "index.js").unwrap(),
            Path::new("/tmp/output/index.js")
        );
        assert_eq!(
            validate_output_path(base, "./nested/index.js").unwrap(),
            Path::new("/tmp/output/nested/index.js")
        );
    }

    #[test]
    fn validate_output_path_rejects_traversal() {
        let base = Path::new("/tmp/output");
        for name in ["../etc/passwd", "safe/../../../etc/passwd", "..", "file\0name.js"] {
            assert!(
                matches!(validate_output_path(base, name), Err(Error::InvalidOutputPath(_))),
                "{name:?}"
            );
        }
    }

    #[test]
    fn temp_path_keeps_full_file_name() {
        assert_eq!(
            temp_path_for(Path::new("/d/main.js")),
            Path::new("/d/main.js.tmp")
        );
        assert_eq!(
            temp_path_for(Path::new("/d/main.js.map")),
            Path::new("/d/main.js.map.tmp")
        );
    }

    #[tokio::test]
    async fn writes_code_and_map_creating_directories() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("public/build");
        let output = BuildOutput {
            code: "a();".to_string(),
            map: Some("{}".to_string()),
            assets: Vec::new(),
        };

        write_bundle(&bundle(&dest, "main.js"), &output, &settings(&dest, &dest))
            .await
            .unwrap();

        assert_eq!(fs::read_to_string(dest.join("main.js")).unwrap(), "a();");
        assert_eq!(fs::read_to_string(dest.join("main.js.map")).unwrap(), "{}");
        assert!(!dest.join("main.js.tmp").exists());
    }

    #[tokio::test]
    async fn copies_assets_once() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("dist");
        let assets_dest = dest.join("img");
        let logo = dir.path().join("logo.png");
        fs::write(&logo, b"logo").unwrap();

        let output = BuildOutput {
            code: ".a{}".to_string(),
            map: None,
            assets: vec![AssetCopy {
                source: logo.clone(),
                file_name: "logo-12345678.png".to_string(),
            }],
        };
        let settings = settings(&dest, &assets_dest);

        write_bundle(&bundle(&dest, "site.css"), &output, &settings)
            .await
            .unwrap();
        let copied = assets_dest.join("logo-12345678.png");
        assert_eq!(fs::read(&copied).unwrap(), b"logo");

        // A present content-addressed file is left alone
        fs::write(&copied, b"kept").unwrap();
        write_bundle(&bundle(&dest, "site.css"), &output, &settings)
            .await
            .unwrap();
        assert_eq!(fs::read(&copied).unwrap(), b"kept");
    }
}
