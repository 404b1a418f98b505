//! `bale list`: print every bundle with its resolved sources to stdout.

use std::io::{self, Write};

use anyhow::{Context, Result};
use bale_bundler::Bundle;

use crate::cli::ProjectArgs;
use crate::commands::utils;

pub fn execute(args: ProjectArgs) -> Result<()> {
    let config = utils::load_config(&args)?;
    let bundles = bale_bundler::bundle::resolve_all(&config)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_listing(&mut out, &bundles, &config.root).context("failed to write bundle listing")?;
    Ok(())
}

fn write_listing(out: &mut impl Write, bundles: &[Bundle], root: &std::path::Path) -> io::Result<()> {
    for bundle in bundles {
        writeln!(
            out,
            "{} -> {}",
            bundle.name,
            utils::display_path(&bundle.output, root)
        )?;
        for source in &bundle.sources {
            writeln!(out, "  {}", utils::display_path(source, root))?;
        }
    }
    out.flush()
}
