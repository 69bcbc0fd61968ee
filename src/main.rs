//! Shrinkset CLI - Batch Dataset Image Downsampler
//!
//! Command-line front end: resolves configuration, discovers class folders,
//! and drives the worker pool while reporting progress and a final summary.

use std::path::PathBuf;
use std::process;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use shrinkset::{discover_class_folders, init, Dispatcher, JobConfig, RunPlan, RunSummary};

/// Shrinkset - Batch Dataset Image Downsampler
#[derive(Parser)]
#[command(
    name = "shrinkset",
    version,
    about = "Rebuilds per-class image trees at a fixed square resolution",
    long_about = "Shrinkset downsamples a directory tree of per-class image folders: every \
                  image is decoded, normalized to three-channel color, forcibly resized to a \
                  square target with a selectable resampling kernel, and re-encoded as PNG \
                  into a mirror tree. Intended for preparing reduced-resolution variants of \
                  benchmark image corpora."
)]
struct Cli {
    /// Input root containing one subdirectory per class
    #[arg(short, long, value_name = "PATH")]
    input: Option<PathBuf>,

    /// Output root for the downsampled tree
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Resampling algorithm: lanczos, nearest, bilinear, bicubic, hamming, box
    #[arg(short, long, value_name = "NAME")]
    algorithm: Option<String>,

    /// Target square size in pixels
    #[arg(short, long, value_name = "PIXELS")]
    size: Option<u32>,

    /// Worker pool size
    #[arg(short, long, value_name = "COUNT")]
    workers: Option<usize>,

    /// Failure log file
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Configuration file path (.toml or .yaml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// List class folders without processing anything
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short = 'Q', long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    std::env::set_var("RUST_LOG", log_level);

    if let Err(e) = init() {
        eprintln!(
            "{}: Failed to initialize Shrinkset: {}",
            style("Error").red().bold(),
            e
        );
        process::exit(1);
    }

    // Resolve configuration (file defaults, then CLI overrides)
    let plan = match resolve_plan(&cli) {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("{}: {:#}", style("Error").red().bold(), e);
            eprintln!("Run with --help for usage information");
            process::exit(1);
        }
    };

    // Discover class folders up front so progress has a denominator
    let folders = match discover_class_folders(&plan.input_root) {
        Ok(folders) => folders,
        Err(e) => {
            eprintln!("{}: {}", style("Error").red().bold(), e);
            process::exit(1);
        }
    };

    if folders.is_empty() {
        println!(
            "No class folders found under {}",
            plan.input_root.display()
        );
        return;
    }

    if cli.dry_run {
        println!("{} folders would be processed:", style(folders.len()).bold());
        for folder in &folders {
            println!("  {}", folder.display());
        }
        return;
    }

    info!("Input: {:?}", plan.input_root);
    info!("Output: {:?}", plan.output_root);

    let progress = make_progress_bar(folders.len() as u64, cli.quiet);

    let dispatcher = {
        let dispatcher = Dispatcher::new(plan.clone());
        match &progress {
            Some(pb) => {
                let pb = pb.clone();
                dispatcher.with_progress(move || pb.inc(1))
            }
            None => dispatcher,
        }
    };

    let start_time = Instant::now();
    let summary = match dispatcher.run_folders(folders).await {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("{}: Processing failed: {}", style("Error").red().bold(), e);
            process::exit(1);
        }
    };

    if let Some(pb) = &progress {
        pb.finish_with_message("Processing complete");
    }

    print_summary(&summary, start_time.elapsed(), &plan);

    // Per-file failures are reported through the summary and the failure
    // log; they never change the exit status
}

/// Build the run plan from defaults, an optional config file, and CLI flags
fn resolve_plan(cli: &Cli) -> anyhow::Result<RunPlan> {
    let mut config = match &cli.config {
        Some(path) => JobConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => JobConfig::default(),
    };

    if let Some(input) = &cli.input {
        config.input_root = Some(input.clone());
    }
    if let Some(output) = &cli.output {
        config.output_root = Some(output.clone());
    }
    if let Some(algorithm) = &cli.algorithm {
        config.algorithm = algorithm.clone();
    }
    if let Some(size) = cli.size {
        config.size = size;
    }
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    if let Some(log_file) = &cli.log_file {
        config.log_file = log_file.clone();
    }

    let plan = config.resolve()?;
    Ok(plan)
}

/// Set up the folder-level progress bar
fn make_progress_bar(total: u64, quiet: bool) -> Option<ProgressBar> {
    if quiet {
        return None;
    }

    let template = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} folders")
        .ok()?;

    let pb = ProgressBar::new(total);
    pb.set_style(template.progress_chars("#>-"));
    Some(pb)
}

/// Print the run summary
fn print_summary(summary: &RunSummary, duration: std::time::Duration, plan: &RunPlan) {
    println!();
    println!("{}", style("Run Summary:").bold());
    println!(
        "  {}: {}",
        style("Folders").green(),
        summary.folders_completed
    );
    if summary.folders_skipped > 0 {
        println!(
            "  {}: {} (unsupported algorithm '{}')",
            style("Skipped").yellow(),
            summary.folders_skipped,
            plan.algorithm
        );
    }
    println!(
        "  {}: {}",
        style("Resized").green(),
        summary.images_resized
    );
    if summary.images_failed > 0 {
        println!(
            "  {}: {} (see {})",
            style("Failed").red(),
            summary.images_failed,
            plan.log_file.display()
        );
    }
    println!(
        "  {}: {:.2}s",
        style("Duration").blue(),
        duration.as_secs_f64()
    );

    if summary.images_resized > 0 {
        let per_second = summary.images_resized as f64 / duration.as_secs_f64();
        println!("  {}: {:.1} images/sec", style("Speed").cyan(), per_second);
    }

    if !summary.task_errors.is_empty() {
        println!();
        println!("{}", style("Task errors:").red().bold());
        for (i, error) in summary.task_errors.iter().enumerate() {
            println!("  {}: {}", i + 1, error);
        }
    }
}
