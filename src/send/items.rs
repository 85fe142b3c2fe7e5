//! Builds the list of shareable items from command line paths.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use thiserror::Error;

use super::archive;
use crate::utils::security::sanitize_filename;

/// One downloadable entry: name shown to the client and the file served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareItem {
    pub display_name: String,
    pub path: PathBuf,
}

#[derive(Debug, Error)]
pub enum ShareError {
    /// Raised before the server starts; maps to exit status 2.
    #[error("Path does not exist: {}", .0.display())]
    MissingPath(PathBuf),
    #[error("Failed to create temporary archive directory: {0}")]
    TempDir(#[source] std::io::Error),
    #[error("Failed to archive {}: {reason}", .path.display())]
    Archive { path: PathBuf, reason: String },
}

/// Prepared items plus the temporary directory holding generated archives.
///
/// Dropping the bundle deletes the archives.
#[derive(Debug)]
pub struct ShareBundle {
    items: Vec<ShareItem>,
    archive_dir: Option<TempDir>,
}

impl ShareBundle {
    pub fn items(&self) -> &[ShareItem] {
        &self.items
    }

    pub fn archive_dir(&self) -> Option<&Path> {
        self.archive_dir.as_ref().map(TempDir::path)
    }

    /// Label used in terminal output.
    pub fn display_name(&self) -> String {
        match self.items.as_slice() {
            [single] => single.display_name.clone(),
            items => format!("{} files", items.len()),
        }
    }
}

/// Validate every path first, then share files as-is and zip directories.
///
/// Blocking: run it off the async runtime.
pub fn prepare_share_items(paths: &[PathBuf]) -> Result<ShareBundle, ShareError> {
    let mut normalized = Vec::with_capacity(paths.len());
    for path in paths {
        let resolved =
            std::fs::canonicalize(path).map_err(|_| ShareError::MissingPath(path.clone()))?;
        normalized.push(resolved);
    }

    let archive_dir = if normalized.iter().any(|p| p.is_dir()) {
        let dir = tempfile::Builder::new()
            .prefix("qrdrop-share-")
            .tempdir()
            .map_err(ShareError::TempDir)?;
        Some(dir)
    } else {
        None
    };

    let mut items = Vec::with_capacity(normalized.len());
    let mut archive_names = HashSet::new();

    for path in normalized {
        if path.is_file() {
            let display_name = sanitize_filename(&file_name_of(&path));
            items.push(ShareItem { display_name, path });
        } else if path.is_dir() {
            let Some(dir) = archive_dir.as_ref() else {
                continue;
            };
            let base = match path.file_name() {
                Some(_) => sanitize_filename(&file_name_of(&path)),
                None => "dir".to_string(),
            };
            let archive_name =
                archive::unique_archive_name(&format!("{base}.zip"), &mut archive_names);
            let archive_path = dir.path().join(&archive_name);

            archive::zip_directory(&path, &archive_path).map_err(|e| ShareError::Archive {
                path: path.clone(),
                reason: format!("{e:#}"),
            })?;

            tracing::info!(source = %path.display(), archive = %archive_name, "directory packaged for sharing");
            items.push(ShareItem {
                display_name: archive_name,
                path: archive_path,
            });
        } else {
            tracing::warn!(path = %path.display(), "skipping special file");
        }
    }

    Ok(ShareBundle { items, archive_dir })
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
