//! Configuration management for Shrinkset

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, ShrinkError};

/// Default resampling algorithm name
pub const DEFAULT_ALGORITHM: &str = "box";
/// Default target edge length in pixels
pub const DEFAULT_SIZE: u32 = 32;
/// Default worker pool size
pub const DEFAULT_WORKERS: usize = 16;
/// Default failure log location, relative to the working directory
pub const DEFAULT_LOG_FILE: &str = "log.txt";

/// Job configuration, loadable from a TOML or YAML file and overridable
/// from the command line. Paths stay optional here; [`JobConfig::resolve`]
/// turns a complete configuration into a [`RunPlan`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    /// Root directory holding one subdirectory per class
    pub input_root: Option<PathBuf>,

    /// Root directory for the downsampled tree
    pub output_root: Option<PathBuf>,

    /// Resampling algorithm name (case-insensitive)
    pub algorithm: String,

    /// Target square size in pixels
    pub size: u32,

    /// Worker pool size
    pub workers: usize,

    /// Failure log file
    pub log_file: PathBuf,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            input_root: None,
            output_root: None,
            algorithm: DEFAULT_ALGORITHM.to_string(),
            size: DEFAULT_SIZE,
            workers: DEFAULT_WORKERS,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl JobConfig {
    /// Load configuration from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            ShrinkError::config(format!(
                "Failed to read config file {:?}: {}",
                path.as_ref(),
                e
            ))
        })?;

        let extension = path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        match extension.to_lowercase().as_str() {
            "toml" => toml::from_str(&content).map_err(Into::into),
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(Into::into),
            _ => Err(ShrinkError::config(
                "Unsupported config file format. Use .toml or .yaml",
            )),
        }
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let extension = path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        let content = match extension.to_lowercase().as_str() {
            "toml" => toml::to_string_pretty(self)
                .map_err(|e| ShrinkError::config(format!("TOML serialization failed: {}", e)))?,
            "yaml" | "yml" => serde_yaml::to_string(self)
                .map_err(|e| ShrinkError::config(format!("YAML serialization failed: {}", e)))?,
            _ => {
                return Err(ShrinkError::config(
                    "Unsupported config file format. Use .toml or .yaml",
                ))
            }
        };

        std::fs::write(&path, content).map_err(|e| {
            ShrinkError::config(format!(
                "Failed to write config file {:?}: {}",
                path.as_ref(),
                e
            ))
        })?;

        Ok(())
    }

    /// Validate configuration
    ///
    /// The algorithm name is deliberately not checked against the supported
    /// set here; membership is resolved per folder task so an unsupported
    /// name skips folders instead of failing the whole invocation.
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(ShrinkError::config("Target size must be greater than 0"));
        }

        if self.workers == 0 {
            return Err(ShrinkError::config("Worker count must be greater than 0"));
        }

        if self.algorithm.trim().is_empty() {
            return Err(ShrinkError::config("Algorithm name must not be empty"));
        }

        let cpus = num_cpus::get();
        if self.workers > cpus * 4 {
            warn!(
                "Worker count {} is far above the {} available CPUs",
                self.workers, cpus
            );
        }

        Ok(())
    }

    /// Resolve into an immutable plan, requiring both roots to be present
    pub fn resolve(&self) -> Result<RunPlan> {
        self.validate()?;

        let input_root = self
            .input_root
            .clone()
            .ok_or_else(|| ShrinkError::config("Input root is required"))?;
        let output_root = self
            .output_root
            .clone()
            .ok_or_else(|| ShrinkError::config("Output root is required"))?;

        Ok(RunPlan {
            input_root,
            output_root,
            algorithm: self.algorithm.clone(),
            size: self.size,
            workers: self.workers,
            log_file: self.log_file.clone(),
        })
    }
}

/// Fully resolved invocation parameters consumed by the dispatcher
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    pub algorithm: String,
    pub size: u32,
    pub workers: usize,
    pub log_file: PathBuf,
}
