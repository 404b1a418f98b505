//! Status message functions for terminal output.

use owo_colors::OwoColorize;

use super::colors_enabled;

/// Print a success message to stderr.
///
/// ```no_run
/// bale_cli::ui::success("Built 2 bundles");
/// ```
pub fn success(message: &str) {
    if colors_enabled() {
        eprintln!("{} {}", "✓".green().bold(), message);
    } else {
        eprintln!("✓ {}", message);
    }
}

pub fn info(message: &str) {
    if colors_enabled() {
        eprintln!("{} {}", "ℹ".blue().bold(), message);
    } else {
        eprintln!("ℹ {}", message);
    }
}

pub fn warning(message: &str) {
    if colors_enabled() {
        eprintln!("{} {}", "⚠".yellow().bold(), message.yellow());
    } else {
        eprintln!("⚠ {}", message);
    }
}

/// Print an error message to stderr.
pub fn error(message: &str) {
    if colors_enabled() {
        eprintln!("{} {}", "✗".red().bold(), message.red());
    } else {
        eprintln!("✗ {}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_messages_do_not_panic() {
        super::super::init_colors(true);
        success("Success message");
        info("Info message");
        warning("Warning message");
        error("Error message");
    }
}
