//! Terminal output for a run: banner, progress bar and summary table.

use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use texfetch_core::{BatchSummary, Config, LedgerAction};

pub fn print_banner(total: usize, workers: usize, config: &Config, retrying: bool) {
    let source = if retrying {
        config.ledger_path()
    } else {
        config.catalog_path()
    };
    eprintln!("  Items:     {total} (from {})", source.display());
    eprintln!("  Workers:   {}", workers.min(total.max(1)));
    eprintln!("  Existing:  {}", config.processing.overwrite);
    eprintln!("  Output:    {}", config.output_dir().display());
    eprintln!();
}

pub fn create_progress_bar(total: u64, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

/// Print a formatted summary table after the run.
pub fn print_summary(summary: &BatchSummary, ledger: LedgerAction, ledger_path: &Path) {
    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Succeeded:    {:>8}", summary.succeeded);
    if summary.failed > 0 {
        eprintln!("    Failed:       {:>8}", summary.failed);
    }
    if summary.skipped > 0 {
        eprintln!("    Skipped:      {:>8}", summary.skipped);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", summary.total());
    eprintln!("    Duration:     {:>7.1}s", summary.elapsed.as_secs_f64());
    eprintln!("    Rate:         {:>7.1} items/sec", summary.rate());
    eprintln!("  ====================================");

    match ledger {
        LedgerAction::Written(count) => {
            eprintln!("  {count} failure(s) recorded in {}", ledger_path.display());
            eprintln!("  Re-run them with `texfetch run --retry-failed`.");
        }
        LedgerAction::Removed => {
            eprintln!("  No failures; removed {}", ledger_path.display());
        }
        LedgerAction::Unchanged => {}
    }
}
