//! Command-line interface for the bale asset bundler.
//!
//! - [`cli`] - argument definitions (clap derive)
//! - [`commands`] - one module per subcommand
//! - [`error`] - `CliError` and conversion to miette reports
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - status lines and formatting for the terminal
//!
//! ```rust,no_run
//! use bale_cli::{logger, ui};
//!
//! logger::init_logger(false, false, false);
//! ui::init_colors(false);
//! ui::success("ready");
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, Result};
