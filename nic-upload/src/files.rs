//! File input sources for the CLI.
//!
//! Two independent producers feed the same working set:
//! - explicit selection: paths named on the command line, in the order given;
//! - drop directories: every regular file directly inside a directory, by file name.
//!
//! No filtering on type or size happens here.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use nic_upload_core::contract::FileRef;
use tracing::{debug, info, warn};

async fn read_file_ref(path: &Path) -> Result<FileRef> {
    let content = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read file {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    debug!(path = ?path, bytes = content.len(), "Read file for upload");
    Ok(FileRef::new(name, content))
}

/// Reads each selected path, keeping the given order.
pub async fn read_selection(paths: &[PathBuf]) -> Result<Vec<FileRef>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push(read_file_ref(path).await?);
    }
    info!(count = files.len(), "Read selected files");
    Ok(files)
}

/// Reads the regular files directly inside `dir`, sorted by file name.
/// Symlinks to files are followed; subdirectories are not descended into.
pub async fn read_drop_dir(dir: &Path) -> Result<Vec<FileRef>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to read drop directory {}", dir.display()))?;

    let mut paths = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .with_context(|| format!("Failed to list drop directory {}", dir.display()))?
    {
        let path = entry.path();
        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => paths.push(path),
            Ok(_) => debug!(path = ?path, "Skipping non-file drop directory entry"),
            Err(e) => warn!(path = ?path, error = %e, "Skipping unreadable drop directory entry"),
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let mut files = Vec::with_capacity(paths.len());
    for path in &paths {
        files.push(read_file_ref(path).await?);
    }
    info!(dir = ?dir, count = files.len(), "Read dropped files");
    Ok(files)
}
