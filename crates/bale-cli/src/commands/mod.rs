//! Command implementations.
//!
//! Each subcommand lives in its own module and exposes an `execute`
//! function taking its parsed arguments.

pub mod build;
pub mod check;
pub mod clear_cache;
pub mod list;
pub(crate) mod utils;

pub use build::execute as build_execute;
pub use check::execute as check_execute;
pub use clear_cache::execute as clear_cache_execute;
pub use list::execute as list_execute;
