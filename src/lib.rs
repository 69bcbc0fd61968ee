//! Shrinkset - Batch Dataset Image Downsampler
//!
//! Rebuilds a directory tree of per-class image folders at a fixed square
//! resolution: every image is decoded, normalized to three-channel color,
//! forcibly resized with a selectable resampling kernel, and re-encoded
//! as PNG into a mirror tree. Designed for preparing reduced-resolution
//! variants of benchmark image corpora.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use shrinkset::{Dispatcher, JobConfig};
//! use std::path::PathBuf;
//!
//! #[tokio::main]
//! async fn main() -> shrinkset::Result<()> {
//!     let mut config = JobConfig::default();
//!     config.input_root = Some(PathBuf::from("data/full"));
//!     config.output_root = Some(PathBuf::from("data/small"));
//!
//!     let summary = Dispatcher::new(config.resolve()?).run().await?;
//!     println!("{} images resized", summary.images_resized);
//!     Ok(())
//! }
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod dispatch;
pub mod error;
pub mod faillog;
pub mod processing;

// Re-export commonly used types
pub use config::{JobConfig, RunPlan};
pub use dispatch::{discover_class_folders, Dispatcher, RunSummary};
pub use error::{Result, ShrinkError};
pub use faillog::FailureLog;
pub use processing::{resize_folder, FolderOutcome, FolderTask, ResizeAlgorithm};

use tracing::info;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the Shrinkset library with default settings
///
/// Installs a tracing subscriber driven by `RUST_LOG`. Safe to call more
/// than once; later calls are no-ops.
pub fn init() -> Result<()> {
    if tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .finish(),
    )
    .is_ok()
    {
        info!("Shrinkset v{} initialized", VERSION);
    }

    Ok(())
}
