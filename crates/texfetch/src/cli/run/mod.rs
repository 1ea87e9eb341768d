//! The `texfetch run` command: fetch, convert and save every catalog item.

mod report;

use std::path::PathBuf;

use clap::Args;
use texfetch_core::{
    load_catalog, BatchController, Config, FailureLedger, ItemId, ItemOutcome, OverwritePolicy,
};

/// Arguments for the `run` command.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Catalog JSON file (array of objects carrying `itemID`)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Directory where `{id}.png` files are written
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Failure ledger path
    #[arg(long)]
    pub ledger: Option<PathBuf>,

    /// Number of concurrent workers
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Re-process items whose PNG already exists
    #[arg(long)]
    pub overwrite: bool,

    /// Process only the items listed in the previous failure ledger
    #[arg(long)]
    pub retry_failed: bool,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// Execute the run command.
pub async fn execute(args: RunArgs, mut config: Config) -> anyhow::Result<()> {
    apply_overrides(&mut config, &args);
    config.validate()?;

    let ids = load_ids(&config, &args)?;
    if args.retry_failed && ids.is_empty() {
        eprintln!("No failed items recorded in {:?}, nothing to retry.", config.ledger_path());
        return Ok(());
    }

    let output_dir = config.output_dir();
    std::fs::create_dir_all(&output_dir)?;

    let controller = BatchController::new(&config);
    report::print_banner(ids.len(), controller.workers(), &config, args.retry_failed);

    let progress = report::create_progress_bar(ids.len() as u64, args.no_progress);
    let summary = controller
        .run(ids, |outcome| {
            if !outcome.is_skipped() {
                progress.suspend(|| println!("{outcome}"));
            }
            if let ItemOutcome::Failed(record) = outcome {
                progress.set_message(format!("last failure: {}", record.item_id));
            }
            progress.inc(1);
        })
        .await;
    progress.finish_and_clear();

    let ledger = FailureLedger::new(config.ledger_path());
    let action = ledger.persist(&summary.failures)?;
    report::print_summary(&summary, action, ledger.path());

    Ok(())
}

/// Fold command-line overrides into the loaded config.
fn apply_overrides(config: &mut Config, args: &RunArgs) {
    if let Some(catalog) = &args.catalog {
        config.paths.catalog = catalog.clone();
    }
    if let Some(output_dir) = &args.output_dir {
        config.paths.output_dir = output_dir.clone();
    }
    if let Some(ledger) = &args.ledger {
        config.paths.failure_ledger = ledger.clone();
    }
    if let Some(workers) = args.workers {
        config.processing.workers = workers;
        // Every worker needs an idle slot in its own client's pool.
        if config.transport.pool_max_idle_per_host < workers {
            config.transport.pool_max_idle_per_host = workers;
        }
    }
    if args.overwrite {
        config.processing.overwrite = OverwritePolicy::Overwrite;
    }
}

/// The ids to process: the previous run's failures, or the whole catalog.
///
/// A missing catalog is an error; nothing is dispatched in that case.
fn load_ids(config: &Config, args: &RunArgs) -> anyhow::Result<Vec<ItemId>> {
    if args.retry_failed {
        let ids = FailureLedger::new(config.ledger_path()).failed_ids()?;
        tracing::info!("Retrying {} failed item(s) from {:?}", ids.len(), config.ledger_path());
        return Ok(ids);
    }

    let ids = load_catalog(&config.catalog_path())?;
    tracing::info!("Loaded {} item(s) from {:?}", ids.len(), config.catalog_path());
    Ok(ids)
}
