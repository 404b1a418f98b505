//! JavaScript builder: oxc parse, minify and print, one source at a time.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_minifier::{Minifier, MinifierOptions};
use oxc_parser::Parser;
use oxc_sourcemap::{ConcatSourceMapBuilder, SourceMap};
use oxc_span::SourceType;

use super::{BuildOutput, BuildSettings, Builder, read_sources, run_blocking};
use crate::bundle::Bundle;
use crate::{Error, Result};

const NAME: &str = "js";

/// Minifies each source independently and joins the results in order.
///
/// Sources are parsed as classic scripts: bundles are concatenations of
/// browser scripts sharing one global scope, so top-level names are kept.
#[derive(Debug, Clone, Default)]
pub struct JsBuilder;

impl JsBuilder {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Builder for JsBuilder {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn build(&self, bundle: &Bundle, settings: &BuildSettings) -> Result<BuildOutput> {
        let sources = read_sources(bundle).await?;

        let bundle_name = bundle.name.clone();
        let map_url = bundle.map_url();
        let map_dir = bundle
            .output_dir()
            .map_or_else(|| settings.dest.clone(), Path::to_path_buf);
        let sourcemaps = settings.sourcemaps;

        let (mut code, map) = run_blocking(bundle, NAME, move || {
            minify_sources(&bundle_name, &map_dir, &sources, sourcemaps)
        })
        .await?;

        let map = match map {
            Some(map) => {
                code.push_str("\n//# sourceMappingURL=");
                code.push_str(&map_url);
                Some(map.to_json_string())
            }
            None => None,
        };

        tracing::debug!(bundle = %bundle.name, bytes = code.len(), "minified javascript");

        Ok(BuildOutput {
            code,
            map,
            assets: Vec::new(),
        })
    }
}

struct Minified {
    code: String,
    map: Option<SourceMap>,
}

fn minify_sources(
    bundle: &str,
    map_dir: &Path,
    sources: &[(PathBuf, String)],
    sourcemaps: bool,
) -> Result<(String, Option<SourceMap>)> {
    let mut code = String::new();
    let mut maps = Vec::new();
    let mut line_offset: u32 = 0;

    for (path, text) in sources {
        let source_map_path = sourcemaps.then(|| relative_source_path(map_dir, path));
        let minified = minify_one(bundle, path, text, source_map_path)?;

        if !code.is_empty() {
            code.push('\n');
            line_offset += 1;
        }

        let chunk = minified.code.trim_end();
        code.push_str(chunk);
        // Next file may start with `(` or `[`
        if !chunk.is_empty() && !chunk.ends_with(';') {
            code.push(';');
        }

        if let Some(map) = minified.map {
            maps.push((map, line_offset));
        }
        line_offset += chunk.matches('\n').count() as u32;
    }

    let map = sourcemaps.then(|| {
        let parts: Vec<(&SourceMap, u32)> = maps.iter().map(|(map, offset)| (map, *offset)).collect();
        ConcatSourceMapBuilder::from_sourcemaps(&parts).into_sourcemap()
    });

    Ok((code, map))
}

fn minify_one(
    bundle: &str,
    path: &Path,
    text: &str,
    source_map_path: Option<PathBuf>,
) -> Result<Minified> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, text, SourceType::cjs()).parse();

    if ret.panicked || !ret.errors.is_empty() {
        let messages = ret
            .errors
            .iter()
            .map(|err| err.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(Error::builder(
            bundle,
            NAME,
            format!("{}: {}", path.display(), messages),
        ));
    }

    let mut program = ret.program;
    let minified = Minifier::new(MinifierOptions::default()).minify(&allocator, &mut program);

    let printed = Codegen::new()
        .with_options(CodegenOptions {
            source_map_path,
            ..CodegenOptions::minify()
        })
        .with_scoping(minified.scoping)
        .build(&program);

    Ok(Minified {
        code: printed.code,
        map: printed.map,
    })
}

/// Source name recorded in the map: the source's path relative to the
/// directory holding the output, with forward slashes.
fn relative_source_path(map_dir: &Path, source: &Path) -> PathBuf {
    let relative = pathdiff::diff_paths(source, map_dir).unwrap_or_else(|| source.to_path_buf());
    PathBuf::from(relative.to_string_lossy().replace('\\', "/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bale_config::AssetsConfig;
    use std::fs;
    use tempfile::TempDir;

    fn settings(dest: &Path, sourcemaps: bool) -> BuildSettings {
        BuildSettings {
            dest: dest.to_path_buf(),
            sourcemaps,
            assets: AssetsConfig {
                dest: dest.to_path_buf(),
                base: String::new(),
            },
        }
    }

    fn bundle(dir: &Path, files: &[&str]) -> Bundle {
        Bundle {
            name: "out.js".to_string(),
            ext: "js".to_string(),
            output: dir.join("dist/out.js"),
            modules: vec!["m".to_string()],
            sources: files.iter().map(|f| dir.join(f)).collect(),
        }
    }

    #[tokio::test]
    async fn concatenates_in_source_order() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.js"), "function first() { return 1; }\nfirst();\n").unwrap();
        fs::write(dir.path().join("b.js"), "function second() { return 2; }\nsecond();\n").unwrap();

        let output = JsBuilder::new()
            .build(
                &bundle(dir.path(), &["a.js", "b.js"]),
                &settings(&dir.path().join("dist"), false),
            )
            .await
            .unwrap();

        let first = output.code.find("first").unwrap();
        let second = output.code.find("second").unwrap();
        assert!(first < second);
        assert!(output.map.is_none());
        assert!(!output.code.contains("sourceMappingURL"));
    }

    #[tokio::test]
    async fn removes_whitespace_and_comments() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("a.js"),
            "// a comment\nvar   greeting   =   'hello';\n\n\nconsole.log(greeting);\n",
        )
        .unwrap();

        let output = JsBuilder::new()
            .build(
                &bundle(dir.path(), &["a.js"]),
                &settings(&dir.path().join("dist"), false),
            )
            .await
            .unwrap();

        assert!(!output.code.contains("a comment"));
        assert!(!output.code.contains("   "));
        assert!(output.code.contains("console.log"));
    }

    #[tokio::test]
    async fn emits_map_and_reference_when_enabled() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.js"), "console.log(1);").unwrap();
        fs::write(dir.path().join("b.js"), "console.log(2);").unwrap();

        let output = JsBuilder::new()
            .build(
                &bundle(dir.path(), &["a.js", "b.js"]),
                &settings(&dir.path().join("dist"), true),
            )
            .await
            .unwrap();

        assert!(output.code.ends_with("//# sourceMappingURL=out.js.map"));
        let map: serde_json::Value = serde_json::from_str(output.map.as_deref().unwrap()).unwrap();
        let sources: Vec<&str> = map["sources"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|s| s.as_str())
            .collect();
        assert_eq!(sources, vec!["../a.js", "../b.js"]);
    }

    #[tokio::test]
    async fn nested_bundle_map_is_relative_to_its_own_directory() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/main.js"), "console.log('main');").unwrap();
        let bundle = Bundle {
            name: "js/main.js".to_string(),
            ext: "js".to_string(),
            output: dir.path().join("dist/js/main.js"),
            modules: vec!["m".to_string()],
            sources: vec![dir.path().join("src/main.js")],
        };

        let output = JsBuilder::new()
            .build(&bundle, &settings(&dir.path().join("dist"), true))
            .await
            .unwrap();

        assert!(output.code.ends_with("//# sourceMappingURL=main.js.map"));
        let map = SourceMap::from_json_string(output.map.as_deref().unwrap()).unwrap();
        let sources: Vec<&str> = map.get_sources().map(|s| s.as_ref()).collect();
        assert_eq!(sources, vec!["../../src/main.js"]);
    }

    #[tokio::test]
    async fn later_sources_map_to_their_own_lines() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.js"), "console.log('alpha');").unwrap();
        fs::write(dir.path().join("b.js"), "console.log('beta');").unwrap();
        fs::write(dir.path().join("c.js"), "console.log('gamma');").unwrap();

        let output = JsBuilder::new()
            .build(
                &bundle(dir.path(), &["a.js", "b.js", "c.js"]),
                &settings(&dir.path().join("dist"), true),
            )
            .await
            .unwrap();

        let line_of = |needle: &str| {
            output
                .code
                .lines()
                .position(|line| line.contains(needle))
                .unwrap() as u32
        };
        let map = SourceMap::from_json_string(output.map.as_deref().unwrap()).unwrap();
        for (source, needle) in [("../a.js", "alpha"), ("../b.js", "beta"), ("../c.js", "gamma")] {
            let lines: Vec<u32> = map
                .get_tokens()
                .filter(|token| {
                    token
                        .get_source_id()
                        .and_then(|id| map.get_source(id))
                        .is_some_and(|name| name.as_ref() == source)
                })
                .map(|token| token.get_dst_line())
                .collect();
            assert!(!lines.is_empty(), "no mappings for {}", source);
            assert!(lines.iter().all(|line| *line == line_of(needle)));
        }
    }

    #[tokio::test]
    async fn syntax_error_names_bundle_and_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bad.js"), "function (").unwrap();

        let err = JsBuilder::new()
            .build(
                &bundle(dir.path(), &["bad.js"]),
                &settings(&dir.path().join("dist"), false),
            )
            .await
            .unwrap_err();

        match err {
            Error::Builder {
                bundle,
                builder,
                message,
            } => {
                assert_eq!(bundle, "out.js");
                assert_eq!(builder, "js");
                assert!(message.contains("bad.js"));
            }
            other => panic!("expected Builder error, got {:?}", other),
        }
    }

    #[test]
    fn relative_source_names() {
        assert_eq!(
            relative_source_path(Path::new("/p/dist"), Path::new("/p/src/a.js")),
            PathBuf::from("../src/a.js")
        );
    }
}
