//! Writes uploaded files under generated, collision-resistant names with RAII cleanup.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::utils::security;

/// Format of the timestamp prefix, e.g. `20250101T120000`.
pub const UPLOAD_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S";

/// UTC timestamp prefix shared by every file of one upload request.
pub fn upload_timestamp(now: DateTime<Utc>) -> String {
    now.format(UPLOAD_TIMESTAMP_FORMAT).to_string()
}

/// Attempts at `name-2`, `name-3`, ... before giving up on a crowded directory.
const MAX_NAME_ATTEMPTS: usize = 1000;

/// `{timestamp}_{sanitized name}`
pub fn stored_name(timestamp: &str, sanitized: &str) -> String {
    format!("{timestamp}_{sanitized}")
}

/// `report.pdf` -> `report-2.pdf`; names without an extension get a plain suffix.
fn numbered_name(name: &str, n: usize) -> String {
    let path = Path::new(name);
    match (
        path.file_stem().and_then(|s| s.to_str()),
        path.extension().and_then(|e| e.to_str()),
    ) {
        (Some(stem), Some(ext)) => format!("{stem}-{n}.{ext}"),
        _ => format!("{name}-{n}"),
    }
}

pub async fn ensure_directory(path: &Path) -> Result<()> {
    tokio::fs::create_dir_all(path)
        .await
        .with_context(|| format!("Failed to create upload directory {}", path.display()))
}

/// One uploaded file being streamed to disk.
///
/// RAII: `disarmed=false` → Drop deletes the partial file. `finish` disarms.
pub struct UploadSink {
    file: File,
    path: PathBuf,
    bytes_written: u64,
    disarmed: bool,
}

impl UploadSink {
    /// Create `destination/name`, failing with `AlreadyExists` if it is taken.
    /// `name` must be a bare filename.
    pub async fn create(destination: &Path, name: &str) -> std::io::Result<Self> {
        security::validate_filename(name).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
        })?;

        let path = destination.join(name);
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;

        Ok(Self {
            file,
            path,
            bytes_written: 0,
            disarmed: false,
        })
    }

    /// Create `{timestamp}_{sanitized}`, numbering the name when an earlier
    /// file (possibly from the same request) already holds it.
    pub async fn create_unique(
        destination: &Path,
        timestamp: &str,
        sanitized: &str,
    ) -> std::io::Result<Self> {
        let base = stored_name(timestamp, sanitized);
        match Self::create(destination, &base).await {
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            other => return other,
        }

        for n in 2..=MAX_NAME_ATTEMPTS {
            match Self::create(destination, &numbered_name(&base, n)).await {
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                other => return other,
            }
        }

        Err(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("no free name left for {base}"),
        ))
    }

    pub async fn write(&mut self, data: &[u8]) -> std::io::Result<()> {
        self.file.write_all(data).await?;
        self.bytes_written += data.len() as u64;
        Ok(())
    }

    /// Flush to disk and keep the file.
    pub async fn finish(mut self) -> std::io::Result<PathBuf> {
        self.file.flush().await?;
        self.file.sync_all().await?;
        self.disarmed = true;
        tracing::debug!(
            path = %self.path.display(),
            bytes = self.bytes_written,
            "upload stored"
        );
        Ok(self.path.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name the file was stored under.
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }
}

impl Drop for UploadSink {
    fn drop(&mut self) {
        if self.disarmed {
            return;
        }
        if let Err(err) = std::fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %err, "failed to remove partial upload");
        }
    }
}
