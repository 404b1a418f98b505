//! Logging setup for the `bale` binary.
//!
//! Library crates only emit `tracing` events; the subscriber is installed
//! here, once, from the global flags.
//!
//! ```rust,no_run
//! use bale_cli::logger::init_logger;
//!
//! init_logger(false, false, false);
//! tracing::info!("starting build");
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used with `--verbose`.
pub const VERBOSE_FILTER: &str = "bale=debug,bale_bundler=debug,bale_config=debug,bale_cli=debug";

/// Filter used with `--quiet`.
pub const QUIET_FILTER: &str = "error";

/// Filter used when neither flag nor `RUST_LOG` is given.
pub const DEFAULT_FILTER: &str = "bale=info,bale_bundler=info,bale_config=info,bale_cli=info";

/// Install the global tracing subscriber.
///
/// Precedence: `--verbose`, then `--quiet`, then `RUST_LOG`, then
/// [`DEFAULT_FILTER`]. Calling it a second time has no effect.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let _ = tracing_subscriber::registry()
        .with(filter_for(verbose, quiet))
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_ansi(!no_color)
                .with_writer(std::io::stderr)
                .without_time()
                .compact(),
        )
        .try_init();
}

fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}
