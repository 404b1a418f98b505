//! `bale build`: rebuild stale bundles and print a summary.

use std::time::Instant;

use bale_bundler::{BuildReport, Bundler};

use crate::cli::BuildArgs;
use crate::commands::utils;
use crate::error::Result;
use crate::ui;

/// Execute the build command.
///
/// Builds the named bundles, or every configured bundle when none are
/// named. On partial failure the bundles that did build are still listed
/// before the error is returned.
pub async fn execute(args: BuildArgs) -> Result<()> {
    let start = Instant::now();

    let config = utils::load_config(&args.project)?;
    let mut bundler = Bundler::new(config);

    let result = if args.bundles.is_empty() {
        bundler.all(args.force).await
    } else {
        bundler.bundles(&args.bundles, args.force).await
    };

    match result {
        Ok(report) => {
            print_report(&report);
            ui::success(&format!(
                "{} in {}",
                summary(&report),
                ui::format_duration(start.elapsed())
            ));
            Ok(())
        }
        Err(err) => {
            if let bale_bundler::Error::Batch { report, failures, .. } = &err {
                print_report(report);
                for failure in failures {
                    ui::error(&format!("{} failed", failure.bundle));
                }
            }
            Err(err.into())
        }
    }
}

fn print_report(report: &BuildReport) {
    for name in &report.built {
        ui::info(&format!("built {}", name));
    }
    for name in &report.fresh {
        ui::info(&format!("{} is up to date", name));
    }
}

fn summary(report: &BuildReport) -> String {
    match (report.built.len(), report.fresh.len()) {
        (0, 0) => "Nothing to build".to_string(),
        (0, fresh) => format!("All {} up to date", ui::plural(fresh, "bundle")),
        (built, 0) => format!("Built {}", ui::plural(built, "bundle")),
        (built, fresh) => format!("Built {}, {} up to date", ui::plural(built, "bundle"), fresh),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(built: &[&str], fresh: &[&str]) -> BuildReport {
        BuildReport {
            built: built.iter().map(|s| s.to_string()).collect(),
            fresh: fresh.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn summary_wording() {
        assert_eq!(summary(&report(&[], &[])), "Nothing to build");
        assert_eq!(summary(&report(&["a.js"], &[])), "Built 1 bundle");
        assert_eq!(summary(&report(&[], &["a.js", "b.css"])), "All 2 bundles up to date");
        assert_eq!(
            summary(&report(&["a.js", "b.css"], &["c.js"])),
            "Built 2 bundles, 1 up to date"
        );
    }
}
