use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Available bale subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build bundles whose sources changed
    ///
    /// Without arguments every configured bundle is considered. Bundles
    /// whose sources are unchanged since the last build are left untouched.
    Build(BuildArgs),

    /// Clear the staleness cache
    ///
    /// Every bundle is rebuilt by the next `bale build`.
    ClearCache(ProjectArgs),

    /// Validate configuration and report which bundles are stale
    Check(ProjectArgs),

    /// Print each bundle with its resolved source files
    List(ProjectArgs),
}

/// Where to find the project and its configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Configuration file (bale.json, bale.toml or package.json)
    ///
    /// When omitted, the project directory is searched for bale.json,
    /// bale.toml, then a "bale" field in package.json.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Project directory (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,
}

/// Arguments for the build command
#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Bundles to build (all configured bundles when omitted)
    ///
    /// Examples:
    ///   bale build
    ///   bale build main.js site.css
    #[arg(value_name = "BUNDLE")]
    pub bundles: Vec<String>,

    /// Rebuild even when sources are unchanged
    #[arg(short, long)]
    pub force: bool,

    #[command(flatten)]
    pub project: ProjectArgs,
}
