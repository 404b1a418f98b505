//! Config validation strategies
//!
//! Separates schema validation (required parameters, cross references) from
//! filesystem validation (declared sources exist), which only the CLI's
//! `check` command needs.

use crate::config::{BundlerConfig, RawConfig};
use crate::error::{ConfigError, Result};

/// Schema-only validation (no filesystem checks)
///
/// Runs as part of [`RawConfig::normalize`], so every `BundlerConfig` has
/// passed it.
pub struct SchemaValidator;

impl SchemaValidator {
    pub fn validate(&self, config: &RawConfig) -> Result<()> {
        match &config.dest {
            Some(dest) if !dest.as_os_str().is_empty() => {}
            _ => return Err(ConfigError::MissingDest),
        }

        let modules = match &config.modules {
            Some(modules) if !modules.is_empty() => modules,
            _ => return Err(ConfigError::MissingModules),
        };

        let bundles = match &config.bundles {
            Some(bundles) if !bundles.is_empty() => bundles,
            _ => return Err(ConfigError::MissingBundles),
        };

        for (bundle, referenced) in bundles {
            let names = referenced.clone().into_vec();
            if let Some(missing) = names.iter().find(|name| !modules.contains_key(*name)) {
                return Err(ConfigError::UnknownModule {
                    bundle: bundle.clone(),
                    module: missing.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Filesystem validator (for CLI use)
///
/// Checks that every declared module source exists on disk.
pub struct FsValidator;

impl FsValidator {
    pub fn validate(&self, config: &BundlerConfig) -> Result<()> {
        for (module, sources) in &config.modules {
            if let Some(path) = sources.iter().find(|path| !path.is_file()) {
                return Err(ConfigError::SourceNotFound {
                    module: module.clone(),
                    path: path.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Convenience function for filesystem validation
pub fn validate_fs(config: &BundlerConfig) -> Result<()> {
    FsValidator.validate(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OneOrMany;
    use indexmap::IndexMap;
    use std::path::PathBuf;

    fn valid() -> RawConfig {
        let mut modules = IndexMap::new();
        modules.insert("jquery".to_string(), OneOrMany::from("jquery.js"));
        let mut bundles = IndexMap::new();
        bundles.insert("vendor.js".to_string(), OneOrMany::from("jquery"));

        RawConfig {
            dest: Some(PathBuf::from("dist")),
            modules: Some(modules),
            bundles: Some(bundles),
            ..RawConfig::default()
        }
    }

    #[test]
    fn accepts_valid_config() {
        assert!(SchemaValidator.validate(&valid()).is_ok());
    }

    #[test]
    fn rejects_missing_dest() {
        let mut config = valid();
        config.dest = None;
        assert!(matches!(
            SchemaValidator.validate(&config),
            Err(ConfigError::MissingDest)
        ));

        config.dest = Some(PathBuf::new());
        assert!(matches!(
            SchemaValidator.validate(&config),
            Err(ConfigError::MissingDest)
        ));
    }

    #[test]
    fn rejects_missing_or_empty_modules() {
        let mut config = valid();
        config.modules = None;
        assert!(matches!(
            SchemaValidator.validate(&config),
            Err(ConfigError::MissingModules)
        ));

        config.modules = Some(IndexMap::new());
        assert!(matches!(
            SchemaValidator.validate(&config),
            Err(ConfigError::MissingModules)
        ));
    }

    #[test]
    fn rejects_missing_or_empty_bundles() {
        let mut config = valid();
        config.bundles = None;
        assert!(matches!(
            SchemaValidator.validate(&config),
            Err(ConfigError::MissingBundles)
        ));

        config.bundles = Some(IndexMap::new());
        assert!(matches!(
            SchemaValidator.validate(&config),
            Err(ConfigError::MissingBundles)
        ));
    }

    #[test]
    fn rejects_reference_to_unknown_module() {
        let mut config = valid();
        config.bundles.as_mut().unwrap().insert(
            "app.js".to_string(),
            OneOrMany::Many(vec!["jquery".to_string(), "lodash".to_string()]),
        );

        match SchemaValidator.validate(&config) {
            Err(ConfigError::UnknownModule { bundle, module }) => {
                assert_eq!(bundle, "app.js");
                assert_eq!(module, "lodash");
            }
            other => panic!("expected UnknownModule, got {:?}", other),
        }
    }
}
