//! merge-results - consolidate per-run training results
//!
//! A CLI tool that collects the per-configuration result CSVs written by
//! the BERT, DistilBERT and RoBERTa training jobs, labels every row with
//! the run settings encoded in its file name, and writes one sorted table.
//!
//! Exit codes:
//!   0 - Success, including "no files found"
//!   1 - Runtime error (bad config, unreadable directory, unwritable output)

mod analysis;
mod cli;
mod config;
mod loader;
mod models;
mod pipeline;
mod report;
mod scanner;

use anyhow::{Context, Result};
use cli::{Args, SummaryFormat};
use config::{Config, DEFAULT_CONFIG_FILE};
use pipeline::MergeOptions;
use std::path::Path;
use tracing::{debug, error, info};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Load configuration before logging so the file can request verbosity
    let mut config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(&args, &config);

    info!("merge-results v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Configuration: {:?}", config);

    if let Err(e) = run_merge(&args, &config) {
        error!("Merge failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .merge-results.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to customize the results directory, patterns, and columns.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config: &Config) {
    let level = if config.general.verbose && !args.quiet {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete merge workflow.
fn run_merge(args: &Args, config: &Config) -> Result<()> {
    config.validate()?;

    info!(
        "Results directory: {}",
        config.discovery.results_dir.display()
    );

    if args.dry_run {
        return handle_dry_run(config);
    }

    let options = MergeOptions { quiet: args.quiet };

    let Some(outcome) = pipeline::merge_results(config, &options)? else {
        println!("No CSV files found to merge!");
        return Ok(());
    };

    debug!("Output columns: {}", outcome.table.headers.join(","));

    let output = match args.summary_format {
        SummaryFormat::Json => report::generate_json_summary(&outcome.summary)?,
        SummaryFormat::Text => report::generate_text_summary(&outcome.summary),
    };
    println!("{}", output);

    Ok(())
}

/// Handle --dry-run: list the files that would be merged, write nothing.
fn handle_dry_run(config: &Config) -> Result<()> {
    println!("\n🔍 Dry run: scanning for result files...\n");

    let file_scanner = scanner::FileScanner::new(
        config.discovery.results_dir.clone(),
        scanner::ScanConfig::from(config),
    );
    let files = file_scanner.scan()?;

    if files.is_empty() {
        println!("   No CSV files found to merge!");
    } else {
        println!("   Found {} files that would be merged:\n", files.len());
        for file in &files {
            let labels = analysis::infer_labels(&file.path);
            println!(
                "     📄 {} ({} bytes) -> {} / {} / {}",
                file.file_name, file.size, labels.model, labels.preprocessing, labels.learning_rate
            );
        }
        println!("\n   Output would be written to: {}", config.output_path().display());
    }

    println!("\n✅ Dry run complete. Nothing was written.");
    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is set up, so problems are reported on stderr.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Ok(Config::default()),
        Err(e) => {
            eprintln!("⚠️  Failed to load config, using defaults: {:#}", e);
            Ok(Config::default())
        }
    }
}
