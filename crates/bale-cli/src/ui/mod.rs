//! Terminal output: status lines and small formatting helpers.
//!
//! Status lines go to stderr so `bale list` output on stdout stays clean
//! for piping.

mod format;
mod messages;

use std::sync::atomic::{AtomicBool, Ordering};

pub use format::{format_duration, plural};
pub use messages::{error, info, success, warning};

static COLORS: AtomicBool = AtomicBool::new(true);

/// Whether color should be used on stderr.
///
/// `NO_COLOR` disables and `FORCE_COLOR` enables colors; otherwise they are
/// used when stderr is a terminal.
pub fn should_use_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::user_attended_stderr()
}

/// Decide once whether status lines are colored. `--no-color` always wins.
pub fn init_colors(no_color: bool) {
    COLORS.store(!no_color && should_use_color(), Ordering::Relaxed);
}

pub(crate) fn colors_enabled() -> bool {
    COLORS.load(Ordering::Relaxed)
}
