//! `bale` binary entry point: parse arguments, set up logging, dispatch.

use bale_cli::{cli, commands, error, logger, ui};
use clap::Parser;
use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let result = match args.command {
        cli::Command::Build(build_args) => commands::build_execute(build_args).await,
        cli::Command::ClearCache(project) => commands::clear_cache_execute(project).await,
        cli::Command::Check(project) => commands::check_execute(project).await,
        cli::Command::List(project) => commands::list_execute(project).map_err(error::CliError::from),
    };

    result.map_err(error::cli_error_to_miette)
}
