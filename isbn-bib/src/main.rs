//! isbn-bib - ISBN bibliography builder
//!
//! Batch mode reads ISBNs from a CSV column and writes one bibliographic
//! record per ISBN. Scan mode reads ISBNs line by line (barcode scanner or
//! keyboard) and appends the results to an existing record set.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use isbn_bib::{
    build_source, CsvStore, Orchestrator, Progress, ResolutionPipeline, RunSummary, StdinScanner,
};
use isbn_common::{BibConfig, BibliographicRecord};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for isbn-bib
#[derive(Parser, Debug)]
#[command(name = "isbn-bib")]
#[command(about = "Build a bibliography from ISBNs via online metadata sources")]
#[command(version)]
struct Args {
    /// Configuration file (TOML, or JSON when the extension is .json)
    #[arg(short, long, global = true, env = "ISBN_BIB_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve every ISBN in a CSV file and write the bibliography
    Batch {
        /// CSV file with a column of ISBNs
        input: PathBuf,
        /// Destination CSV file (overwritten)
        output: PathBuf,
    },
    /// Read ISBNs interactively and append them to a bibliography
    Scan {
        /// Destination CSV file (existing records are kept)
        output: PathBuf,
    },
}

type FilterHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter_handle = init_tracing(args.verbose);

    info!(
        "Starting isbn-bib v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let config = Arc::new(BibConfig::load(args.config.as_deref()));
    apply_config_log_level(&filter_handle, &config, args.verbose);

    let source = build_source(&config).context("Failed to initialize metadata source")?;
    let pipeline = ResolutionPipeline::with_default_formatter(source);
    let orchestrator = Orchestrator::new(config.clone(), pipeline, Arc::new(CsvStore::new()));

    match args.command {
        Command::Batch { input, output } => {
            let summary = orchestrator
                .run_batch(&input, &output, print_batch_progress)
                .await?;

            if summary.stats.processed == 0 {
                println!("No ISBNs to process. Exiting.");
                return Ok(());
            }
            println!("\nProcessing complete.");
            print_summary(&summary);
        }
        Command::Scan { output } => {
            let cancel = CancellationToken::new();
            tokio::spawn(cancel_on_shutdown(cancel.clone()));

            println!(
                "Scanning into {}. Type '{}' or press Ctrl+C to finish.",
                output.display(),
                config.scan_sentinel
            );

            let mut scanner = StdinScanner::new(&config.scan_sentinel);
            let summary = orchestrator
                .run_interactive(&output, &mut scanner, &cancel, print_scan_result)
                .await;

            if let Some(exit) = summary.exit {
                println!("\nScanning finished ({}).", exit);
            }
            print_summary(&summary);

            // The stdin reader thread may still be parked on a read
            std::io::stdout().flush().ok();
            std::process::exit(0);
        }
    }

    Ok(())
}

/// Initialize tracing on stderr; stdout carries prompts and progress.
///
/// `RUST_LOG` wins over everything else. The returned handle lets the
/// configured level be applied once the config file has been read.
fn init_tracing(verbose: bool) -> FilterHandle {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let (filter_layer, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    handle
}

fn apply_config_log_level(handle: &FilterHandle, config: &BibConfig, verbose: bool) {
    if verbose || std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        return;
    }

    match EnvFilter::try_new(&config.logging.level) {
        Ok(filter) => {
            if let Err(e) = handle.reload(filter) {
                warn!("Failed to apply configured log level: {}", e);
            }
        }
        Err(e) => warn!(
            "Invalid logging.level '{}' ({}), keeping 'info'",
            config.logging.level, e
        ),
    }
}

/// Cancel `token` on Ctrl+C or SIGTERM
async fn cancel_on_shutdown(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, finishing scan session");
        },
        _ = terminate => {
            info!("Received terminate signal, finishing scan session");
        },
    }

    token.cancel();
}

fn print_batch_progress(progress: Progress<'_>) {
    if let Progress::Batch {
        index,
        total,
        stats,
        ..
    } = progress
    {
        print!(
            "\rProgress: {}/{} (Success: {}, Fail: {})",
            index, total, stats.succeeded, stats.failed
        );
        std::io::stdout().flush().ok();
    }
}

fn print_scan_result(progress: Progress<'_>) {
    if let Progress::Scanned { record, .. } = progress {
        println!("  {}", describe(record));
    }
}

fn describe(record: &BibliographicRecord) -> String {
    match (&record.error, &record.title) {
        (Some(error), _) if !error.is_empty() => {
            format!("{}: {}", record.input_identifier, error)
        }
        (_, Some(title)) => format!("{}: {}", record.input_identifier, title),
        _ => format!("{}: (untitled)", record.input_identifier),
    }
}

fn print_summary(summary: &RunSummary) {
    println!("\nSummary:");
    println!("Total ISBNs processed: {}", summary.stats.processed);
    println!("Successful lookups: {}", summary.stats.succeeded);
    println!("Failed lookups: {}", summary.stats.failed);
    if summary.prior_records > 0 {
        println!("Existing records kept: {}", summary.prior_records);
    }
    match &summary.persist_error {
        Some(e) => eprintln!("Failed to save bibliography: {}", e),
        None if summary.records_written > 0 => {
            println!("Records saved: {}", summary.records_written)
        }
        None => {}
    }
}
