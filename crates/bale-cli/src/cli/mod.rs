//! Command-line interface definition.
//!
//! - `bale build [BUNDLE...]` - build stale bundles
//! - `bale clear-cache` - forget recorded source timestamps
//! - `bale check` - validate configuration and report staleness
//! - `bale list` - print bundles and their resolved sources

mod commands;

use clap::Parser;

pub use commands::{BuildArgs, Command, ProjectArgs};

/// Bale - cached JavaScript and CSS bundling
#[derive(Parser, Debug)]
#[command(
    name = "bale",
    version,
    about = "Concatenate and minify JavaScript and CSS bundles",
    long_about = "Bale concatenates and minifies configured JavaScript and CSS bundles.\n\
                  Source modification times are cached between runs, so a bundle is\n\
                  only rebuilt when one of its sources changed."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    ///
    /// Shows per-source staleness decisions and output writes.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}
