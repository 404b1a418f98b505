//! CSS builder: asset rewriting per source, then one lightningcss pass over
//! the concatenation.

use async_trait::async_trait;
use lightningcss::{
    printer::PrinterOptions,
    stylesheet::{MinifyOptions, ParserOptions, StyleSheet},
};

use super::assets::rewrite_urls;
use super::{BuildOutput, BuildSettings, Builder, read_sources, run_blocking};
use crate::bundle::Bundle;
use crate::{Error, Result};

const NAME: &str = "css";

#[derive(Debug, Clone, Default)]
pub struct CssBuilder;

impl CssBuilder {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Builder for CssBuilder {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn build(&self, bundle: &Bundle, settings: &BuildSettings) -> Result<BuildOutput> {
        let sources = read_sources(bundle).await?;

        let mut parts = Vec::with_capacity(sources.len());
        let mut assets = Vec::new();
        for (path, text) in &sources {
            let rewritten = rewrite_urls(text, path, &settings.assets).await?;
            parts.push(rewritten.code);
            for asset in rewritten.assets {
                if !assets.contains(&asset) {
                    assets.push(asset);
                }
            }
        }

        let joined = parts.join("\n");
        let bundle_name = bundle.name.clone();
        let code = run_blocking(bundle, NAME, move || minify_css(&bundle_name, &joined)).await?;

        tracing::debug!(
            bundle = %bundle.name,
            bytes = code.len(),
            assets = assets.len(),
            "minified stylesheet"
        );

        Ok(BuildOutput {
            code,
            map: None,
            assets,
        })
    }
}

fn minify_css(bundle: &str, source: &str) -> Result<String> {
    let mut stylesheet = StyleSheet::parse(
        source,
        ParserOptions {
            filename: bundle.to_string(),
            ..Default::default()
        },
    )
    .map_err(|e| Error::builder(bundle, NAME, format!("failed to parse: {}", e)))?;

    stylesheet
        .minify(MinifyOptions::default())
        .map_err(|e| Error::builder(bundle, NAME, format!("failed to minify: {}", e)))?;

    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..Default::default()
        })
        .map_err(|e| Error::builder(bundle, NAME, format!("failed to print: {}", e)))?;

    Ok(result.code)
}
