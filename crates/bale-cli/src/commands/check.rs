//! `bale check`: validate configuration without building.

use bale_bundler::{Bundler, Staleness};
use bale_config::validate_fs;

use crate::cli::ProjectArgs;
use crate::commands::utils;
use crate::error::Result;
use crate::ui;

/// Execute the check command.
///
/// 1. load and validate the configuration (every bundle's modules exist)
/// 2. check every declared source file exists
/// 3. resolve each bundle and report whether a build would rebuild it
pub async fn execute(args: ProjectArgs) -> Result<()> {
    let config = utils::load_config(&args)?;
    validate_fs(&config)?;

    let bundler = Bundler::new(config);
    let names: Vec<String> = bundler.config().bundle_names().map(str::to_string).collect();

    for name in &names {
        let bundle = bundler.resolve(name)?;
        let sources = ui::plural(bundle.sources.len(), &format!(".{} source", bundle.ext));

        if bundle.sources.is_empty() {
            ui::warning(&format!("{}: no .{} sources in its modules", name, bundle.ext));
            continue;
        }

        match bundler.staleness(name).await? {
            Staleness::Fresh => ui::info(&format!("{}: {}, up to date", name, sources)),
            Staleness::Stale(reason) => {
                ui::info(&format!("{}: {}, needs rebuild ({})", name, sources, reason))
            }
        }
    }

    ui::success(&format!(
        "Configuration is valid ({})",
        ui::plural(names.len(), "bundle")
    ));
    Ok(())
}
