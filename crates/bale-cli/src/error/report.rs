use miette::Report;

use super::CliError;

/// Convert a [`CliError`] into a miette report for display.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Bundler(e) => Report::new(e),
        CliError::Config(e) => {
            let help = config_help(&e);
            miette::miette!(code = "bale::config", help = help, "Configuration error: {}", e)
        }
        CliError::Other(e) => miette::miette!("{:#}", e),
        other => miette::miette!("{}", other),
    }
}

fn config_help(err: &bale_config::ConfigError) -> &'static str {
    use bale_config::ConfigError;

    match err {
        ConfigError::NotFound { .. } => {
            "create bale.json or bale.toml, add a \"bale\" field to package.json, or pass --config"
        }
        ConfigError::MissingDest => "set \"dest\" to the output directory",
        ConfigError::MissingModules => "declare at least one entry under \"modules\"",
        ConfigError::MissingBundles => "declare at least one entry under \"bundles\"",
        ConfigError::UnknownModule { .. } => "every module a bundle lists must exist under \"modules\"",
        ConfigError::SourceNotFound { .. } => "source paths are resolved relative to the configuration file",
        ConfigError::InvalidValue { .. } | ConfigError::Io(_) => "check the configuration file syntax",
    }
}
