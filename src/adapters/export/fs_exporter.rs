//! Implements ExportPort. Writes the categorized CSV and the summary report to disk.

use super::csv_utils::records_to_csv;
use crate::domain::{ClassifiedRecord, DomainError};
use crate::ports::ExportPort;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// File-system exporter. Both files are overwritten on every run.
pub struct FsExporter {
    export_path: PathBuf,
    summary_path: PathBuf,
}

impl FsExporter {
    pub fn new(export_path: impl AsRef<Path>, summary_path: impl AsRef<Path>) -> Self {
        Self {
            export_path: export_path.as_ref().to_path_buf(),
            summary_path: summary_path.as_ref().to_path_buf(),
        }
    }

    async fn write_file(path: &Path, contents: &str) -> Result<PathBuf, DomainError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DomainError::Export(format!("create {}: {}", parent.display(), e)))?;
        }
        fs::write(path, contents)
            .await
            .map_err(|e| DomainError::Export(format!("write {}: {}", path.display(), e)))?;
        Ok(path.canonicalize().unwrap_or_else(|_| path.to_path_buf()))
    }
}

#[async_trait::async_trait]
impl ExportPort for FsExporter {
    async fn write_records(&self, records: &[ClassifiedRecord]) -> Result<PathBuf, DomainError> {
        let csv = records_to_csv(records)
            .map_err(|e| DomainError::Export(format!("Failed to generate CSV: {}", e)))?;
        let path = Self::write_file(&self.export_path, &csv).await?;
        info!(
            path = %path.display(),
            count = records.len(),
            "exported categorized comments"
        );
        Ok(path)
    }

    async fn write_summary(&self, summary: &str) -> Result<PathBuf, DomainError> {
        let path = Self::write_file(&self.summary_path, summary).await?;
        info!(path = %path.display(), "summary written");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Category;

    #[tokio::test]
    async fn test_writes_both_files_creating_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = FsExporter::new(
            dir.path().join("out/comments.csv"),
            dir.path().join("out/summary.txt"),
        );

        let records = vec![ClassifiedRecord {
            original_comment: "Crashes on launch".into(),
            created_utc: 1704067200,
            source_group: "BrawlStars".into(),
            category: Category::Bug,
        }];
        let csv_path = exporter.write_records(&records).await.unwrap();
        let summary_path = exporter.write_summary("Category: Bug\n").await.unwrap();

        let csv = std::fs::read_to_string(csv_path).unwrap();
        assert!(csv.contains("Crashes on launch,2024-01-01 00:00:00,BrawlStars,Bug"));
        assert_eq!(
            std::fs::read_to_string(summary_path).unwrap(),
            "Category: Bug\n"
        );
    }
}
