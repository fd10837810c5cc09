//! Output writing for generated documents

use docsmith_core::{DocsmithError, DocsmithResult, ErrorContext, Stage};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Write `content` to `path` through a sibling temp file and a rename, so a
/// reader never observes a half-written document. Overwrites any existing file.
pub async fn write_atomically(path: &Path, content: &str, stage: Stage) -> DocsmithResult<()> {
    let temp_path = temp_path_for(path);

    if let Err(e) = fs::write(&temp_path, content).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(write_error(path, stage, e));
    }

    if let Err(e) = fs::rename(&temp_path, path).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(write_error(path, stage, e));
    }

    debug!(path = %path.display(), bytes = content.len(), "Wrote document");
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    path.with_file_name(format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4()))
}

fn write_error(path: &Path, stage: Stage, source: std::io::Error) -> DocsmithError {
    DocsmithError::OutputWrite {
        stage,
        path: path.display().to_string(),
        source,
        context: ErrorContext::new("document_writer")
            .with_operation("write_atomically")
            .with_suggestion("Check that the repository directory is writable"),
    }
}
