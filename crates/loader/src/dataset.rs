// Data File Loading

use serde::Serialize;
use std::path::{Path, PathBuf};
use taskq_core::{Completion, Task};
use thiserror::Error;
use tracing::{debug, info};

/// Summary of one loaded data file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataSet {
    pub path: PathBuf,
    /// Non-empty lines, header excluded
    pub records: usize,
    pub bytes: usize,
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Count non-empty lines, skipping the first one when it is a header
pub fn count_records(text: &str, header: bool) -> usize {
    let lines = text.lines().filter(|line| !line.trim().is_empty()).count();
    if header {
        lines.saturating_sub(1)
    } else {
        lines
    }
}

/// Queue task reading one file from disk
pub struct LoadFile {
    path: PathBuf,
    header: bool,
}

impl LoadFile {
    pub fn new(path: impl AsRef<Path>, header: bool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            header,
        }
    }

    pub async fn load(self) -> Result<DataSet, LoadError> {
        debug!(path = %self.path.display(), "Reading data file");

        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| LoadError::Io {
                path: self.path.clone(),
                source,
            })?;

        let data = DataSet {
            records: count_records(&text, self.header),
            bytes: text.len(),
            path: self.path,
        };
        info!(
            path = %data.path.display(),
            records = data.records,
            bytes = data.bytes,
            "Data file loaded"
        );
        Ok(data)
    }
}

impl Task<DataSet, LoadError> for LoadFile {
    fn run(self: Box<Self>, done: Completion<DataSet, LoadError>) {
        let file = *self;
        tokio::task::spawn_local(async move {
            done.complete(file.load().await);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskq_core::TaskQueue;
    use tempfile::TempDir;
    use tokio::task::LocalSet;

    /// Fixture files live in `dir` and are removed when it is dropped
    fn write_fixture(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_count_records_skips_header_and_blank_lines() {
        let text = "datetime,points,competition\n2015-08-09,3,Eredivisie\n\n2015-08-16,1,Eredivisie\n";
        assert_eq!(count_records(text, true), 2);
        assert_eq!(count_records(text, false), 3);
        assert_eq!(count_records("", true), 0);
    }

    #[tokio::test]
    async fn test_load_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = write_fixture(&dir, "matches.csv", "a,b\n1,2\n3,4\n");
        let data = LoadFile::new(&path, true).load().await.unwrap();

        assert_eq!(data.records, 2);
        assert_eq!(data.bytes, 12);
        assert_eq!(data.path, path);
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let result = LoadFile::new("/nonexistent/taskq/data.csv", true).load().await;
        let err = result.unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("data.csv"));
    }

    #[tokio::test]
    async fn test_queue_reports_files_in_submission_order() {
        let dir = TempDir::new().unwrap();
        let first = write_fixture(&dir, "first.csv", "h\n1\n2\n3\n");
        let second = write_fixture(&dir, "second.csv", "h\n1\n");

        let outcome = LocalSet::new()
            .run_until(async {
                let queue: TaskQueue<DataSet, LoadError> = TaskQueue::new(1);
                queue
                    .defer_task(LoadFile::new(&first, true))
                    .defer_task(LoadFile::new(&second, true));
                queue.settled().await
            })
            .await
            .unwrap()
            .unwrap();

        let records: Vec<_> = outcome.iter().map(|d| d.records).collect();
        assert_eq!(records, vec![3, 1]);
        assert_eq!(outcome[0].path, first);
    }

    #[test]
    fn test_fixtures_removed_with_directory() {
        let dir = TempDir::new().unwrap();
        let path = write_fixture(&dir, "standings.csv", "h\n1\n");
        let root = dir.path().to_path_buf();
        assert!(path.exists());

        drop(dir);
        assert!(!path.exists());
        assert!(!root.exists());
    }
}
