//! Folder discovery and the fixed-size worker pool

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{error, info};
use walkdir::WalkDir;

use crate::config::RunPlan;
use crate::error::{Result, ShrinkError};
use crate::faillog::FailureLog;
use crate::processing::{resize_folder, FolderTask};

/// List the immediate subdirectories of `input_root`, sorted by name.
///
/// Non-directories are excluded. A missing or unreadable root is an error.
pub fn discover_class_folders(input_root: &Path) -> Result<Vec<PathBuf>> {
    let mut folders = Vec::new();

    for entry in WalkDir::new(input_root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| {
            ShrinkError::system(format!(
                "Failed to list input root {:?}: {}",
                input_root, e
            ))
        })?;
        if entry.file_type().is_dir() {
            folders.push(entry.into_path());
        }
    }

    Ok(folders)
}

/// Aggregate result of one dispatch run
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Folder tasks that ran to completion
    pub folders_completed: usize,

    /// Folder tasks skipped because the algorithm name did not resolve
    pub folders_skipped: usize,

    /// Images resized and written across all folders
    pub images_resized: usize,

    /// Images that failed and were appended to the failure log
    pub images_failed: usize,

    /// Task-level errors (directory creation, listing, log writes);
    /// captured here instead of aborting sibling tasks
    pub task_errors: Vec<ShrinkError>,
}

impl RunSummary {
    /// Total folder tasks submitted
    pub fn total_folders(&self) -> usize {
        self.folders_completed + self.folders_skipped + self.task_errors.len()
    }

    /// True when anything at all went wrong
    pub fn has_failures(&self) -> bool {
        self.images_failed > 0 || !self.task_errors.is_empty()
    }
}

type FolderNotify = Arc<dyn Fn() + Send + Sync>;

/// Submits one independent task per class folder to a fixed-size pool
/// and waits for all of them.
pub struct Dispatcher {
    plan: RunPlan,
    log: Arc<FailureLog>,
    on_folder_done: Option<FolderNotify>,
}

impl Dispatcher {
    /// Create a dispatcher for a resolved plan
    pub fn new(plan: RunPlan) -> Self {
        let log = Arc::new(FailureLog::new(plan.log_file.clone()));
        Self {
            plan,
            log,
            on_folder_done: None,
        }
    }

    /// Register a callback invoked after each folder task finishes,
    /// whatever its outcome
    #[must_use]
    pub fn with_progress<F>(mut self, notify: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_folder_done = Some(Arc::new(notify));
        self
    }

    /// Discover class folders and process all of them
    pub async fn run(&self) -> Result<RunSummary> {
        let folders = discover_class_folders(&self.plan.input_root)?;
        self.run_folders(folders).await
    }

    /// Process an already-discovered set of class folders.
    ///
    /// Submission closes once every folder is enqueued; the call then
    /// blocks until every task has completed. Per-file failures are
    /// invisible here, and a task-level error is captured into the
    /// summary rather than aborting its siblings.
    pub async fn run_folders(&self, folders: Vec<PathBuf>) -> Result<RunSummary> {
        info!(
            "Dispatching {} folder tasks across {} workers (algorithm: {}, size: {})",
            folders.len(),
            self.plan.workers,
            self.plan.algorithm,
            self.plan.size
        );

        let semaphore = Arc::new(Semaphore::new(self.plan.workers));
        let mut tasks = Vec::with_capacity(folders.len());

        for input_dir in folders {
            // Discovery yields real directory entries, so a name is
            // always present; fall back to the full path otherwise
            let output_dir = match input_dir.file_name() {
                Some(name) => self.plan.output_root.join(name),
                None => self.plan.output_root.clone(),
            };

            let task = FolderTask {
                input_dir,
                output_dir,
                algorithm: self.plan.algorithm.clone(),
                size: self.plan.size,
            };
            let semaphore = Arc::clone(&semaphore);
            let log = Arc::clone(&self.log);
            let notify = self.on_folder_done.clone();

            tasks.push(tokio::spawn(async move {
                let _permit = semaphore.acquire().await.unwrap();

                let result = tokio::task::spawn_blocking(move || resize_folder(&task, &log))
                    .await
                    .map_err(|e| ShrinkError::system(format!("Folder task join error: {}", e)))
                    .and_then(|inner| inner);

                if let Some(notify) = notify {
                    notify();
                }

                result
            }));
        }

        // Full barrier: wait for every submitted task
        let joined = futures::future::join_all(tasks).await;

        let mut summary = RunSummary::default();
        for task_result in joined {
            let result = task_result
                .map_err(|e| ShrinkError::system(format!("Folder task join error: {}", e)))
                .and_then(|inner| inner);

            match result {
                Ok(outcome) if outcome.skipped => summary.folders_skipped += 1,
                Ok(outcome) => {
                    summary.folders_completed += 1;
                    summary.images_resized += outcome.resized;
                    summary.images_failed += outcome.failed;
                }
                Err(err) => {
                    error!("Folder task failed: {}", err);
                    summary.task_errors.push(err);
                }
            }
        }

        info!(
            "Dispatch finished: {} folders completed, {} skipped, {} images resized, {} failed",
            summary.folders_completed,
            summary.folders_skipped,
            summary.images_resized,
            summary.images_failed
        );

        Ok(summary)
    }

    /// The shared failure log for this run
    pub fn failure_log(&self) -> &FailureLog {
        &self.log
    }
}
