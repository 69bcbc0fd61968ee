//! Append-only journal of files that could not be resized

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::Result;

/// Shared failure log, appended to by every worker.
///
/// The file is opened in append mode and closed again for each record,
/// so the log survives however the run ends. A mutex serializes appends
/// across workers; records are whole lines of the form
/// `Couldn't resize: <input path>`.
#[derive(Debug)]
pub struct FailureLog {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FailureLog {
    /// Create a handle for the log at `path`. The file itself is only
    /// created on the first append.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    /// Path this log writes to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record one failed input file
    pub fn append(&self, input: &Path) -> Result<()> {
        let _guard = self.guard.lock().unwrap();

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "Couldn't resize: {}", input.display())?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_append_creates_file_with_record() {
        let dir = TempDir::new().unwrap();
        let log = FailureLog::new(dir.path().join("log.txt"));

        log.append(Path::new("data/catA/broken.jpg")).unwrap();

        let text = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(text, "Couldn't resize: data/catA/broken.jpg\n");
    }

    #[test]
    fn test_appends_accumulate() {
        let dir = TempDir::new().unwrap();
        let log = FailureLog::new(dir.path().join("log.txt"));

        log.append(Path::new("a.jpg")).unwrap();
        log.append(Path::new("b.jpg")).unwrap();
        log.append(Path::new("a.jpg")).unwrap();

        let text = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Couldn't resize: a.jpg");
        assert_eq!(lines[2], "Couldn't resize: a.jpg");
    }

    #[test]
    fn test_no_file_until_first_failure() {
        let dir = TempDir::new().unwrap();
        let log = FailureLog::new(dir.path().join("log.txt"));
        assert!(!log.path().exists());
    }
}
