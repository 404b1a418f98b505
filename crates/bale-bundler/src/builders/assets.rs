//! `url()` rewriting for stylesheets.
//!
//! Local references are replaced by content-addressed names under the assets
//! base URL, and the referenced files are scheduled for copying:
//!
//! ```text
//! url("../img/logo.png?v=2")  ->  url("<base>/logo-1a2b3c4d.png?v=2")
//! ```

use std::path::Path;
use std::sync::LazyLock;

use bale_config::AssetsConfig;
use path_clean::PathClean;
use regex::Regex;
use sha2::{Digest, Sha256};

use super::AssetCopy;
use crate::{Error, Result};

/// Stylesheet text with rewritten references, plus the files to copy.
#[derive(Debug, Clone, Default)]
pub struct RewrittenCss {
    pub code: String,
    pub assets: Vec<AssetCopy>,
}

static URL_PATTERN: LazyLock<std::result::Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(r#"url\(\s*(?:"([^"]*)"|'([^']*)'|([^)"'\s]*))\s*\)"#)
});

/// Rewrite every local `url()` in `css`, a stylesheet read from `stylesheet`.
///
/// `data:`, `http:`, `https:`, protocol-relative, root-relative and fragment
/// references are left alone.
///
/// # Errors
///
/// [`Error::AssetNotFound`] if a local reference cannot be read.
pub async fn rewrite_urls(
    css: &str,
    stylesheet: &Path,
    assets: &AssetsConfig,
) -> Result<RewrittenCss> {
    let pattern = URL_PATTERN
        .as_ref()
        .map_err(|e| Error::builder(stylesheet.display().to_string(), "css", e.to_string()))?;

    let base_dir = stylesheet.parent().unwrap_or_else(|| Path::new(""));
    let mut rewritten = RewrittenCss {
        code: String::with_capacity(css.len()),
        assets: Vec::new(),
    };
    let mut last = 0;

    // Matches are collected first so no regex state is held across awaits
    let references: Vec<UrlReference<'_>> = pattern
        .captures_iter(css)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let (reference, quote) = reference_of(&caps)?;
            Some(UrlReference {
                start: whole.start(),
                end: whole.end(),
                reference,
                quote,
            })
        })
        .collect();

    for UrlReference {
        start,
        end,
        reference,
        quote,
    } in references
    {
        if !is_local(reference) {
            tracing::debug!(url = reference, stylesheet = %stylesheet.display(), "leaving url untouched");
            continue;
        }

        let (file_part, suffix) = split_suffix(reference);
        let asset_path = base_dir.join(file_part).clean();
        let bytes = tokio::fs::read(&asset_path)
            .await
            .map_err(|_| Error::AssetNotFound {
                specifier: reference.to_string(),
                stylesheet: stylesheet.to_path_buf(),
            })?;

        let file_name = hashed_file_name(&asset_path, &bytes);
        let url = public_url(&assets.base, &file_name);

        rewritten.code.push_str(&css[last..start]);
        rewritten.code.push_str("url(");
        rewritten.code.push_str(quote);
        rewritten.code.push_str(&url);
        rewritten.code.push_str(suffix);
        rewritten.code.push_str(quote);
        rewritten.code.push(')');
        last = end;

        if !rewritten.assets.iter().any(|a| a.source == asset_path) {
            rewritten.assets.push(AssetCopy {
                source: asset_path,
                file_name,
            });
        }
    }

    rewritten.code.push_str(&css[last..]);
    Ok(rewritten)
}

struct UrlReference<'t> {
    start: usize,
    end: usize,
    reference: &'t str,
    quote: &'static str,
}

fn reference_of<'t>(caps: &regex::Captures<'t>) -> Option<(&'t str, &'static str)> {
    if let Some(m) = caps.get(1) {
        Some((m.as_str(), "\""))
    } else if let Some(m) = caps.get(2) {
        Some((m.as_str(), "'"))
    } else {
        caps.get(3).map(|m| (m.as_str(), ""))
    }
}

fn is_local(reference: &str) -> bool {
    let lower = reference.trim().to_ascii_lowercase();
    !(lower.is_empty()
        || lower.starts_with("data:")
        || lower.starts_with("http:")
        || lower.starts_with("https:")
        || lower.starts_with("//")
        || lower.starts_with('/')
        || lower.starts_with('#'))
}

/// Split `img/a.svg?x#y` into `img/a.svg` and `?x#y`.
fn split_suffix(reference: &str) -> (&str, &str) {
    match reference.find(['?', '#']) {
        Some(index) => reference.split_at(index),
        None => (reference, ""),
    }
}

/// `<stem>-<first 8 hex chars of SHA-256>.<ext>`
pub fn hashed_file_name(path: &Path, content: &[u8]) -> String {
    let hash = format!("{:x}", Sha256::digest(content));
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "asset".to_string());

    match path.extension() {
        Some(ext) => format!("{}-{}.{}", stem, &hash[..8], ext.to_string_lossy()),
        None => format!("{}-{}", stem, &hash[..8]),
    }
}

fn public_url(base: &str, file_name: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.is_empty() {
        file_name.to_string()
    } else {
        format!("{}/{}", base, file_name)
    }
}
