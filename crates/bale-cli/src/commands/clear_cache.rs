//! `bale clear-cache`: forget all recorded source timestamps.

use bale_bundler::Bundler;

use crate::cli::ProjectArgs;
use crate::commands::utils;
use crate::error::Result;
use crate::ui;

pub async fn execute(args: ProjectArgs) -> Result<()> {
    let config = utils::load_config(&args)?;
    let root = config.root.clone();
    let mut bundler = Bundler::new(config);

    bundler.clear_cache().await?;

    ui::success(&format!(
        "Cleared cache {}",
        utils::display_path(bundler.cache_path(), &root)
    ));
    Ok(())
}
