//! Local filesystem backend.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::StreamExt;
use seqstore_utils::human_readable_bytes;
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::warn;

use crate::{
    append::COPY_CHUNK_SIZE,
    error::FileStorageError,
    traits::{ByteStream, FileStorage},
    FileResult,
};

/// Pass-through backend over the local filesystem.
///
/// Materialization is a no-op and every query delegates directly to the
/// filesystem; this backend never produces `Service` errors.
pub struct LocalFileStorage;

impl LocalFileStorage {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFileStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn materialize(&self, file: &Path) -> FileResult<PathBuf> {
        Ok(file.to_path_buf())
    }

    async fn size_bytes(&self, file: &Path) -> u64 {
        match tokio::fs::metadata(file).await {
            Ok(meta) => meta.len(),
            Err(e) => {
                warn!(path = %file.display(), error = %e, "unable to determine local file size");
                0
            }
        }
    }

    async fn human_readable_size(&self, file: &Path) -> String {
        match tokio::fs::metadata(file).await {
            Ok(meta) => human_readable_bytes(meta.len()),
            Err(e) => {
                warn!(path = %file.display(), error = %e, "unable to determine local file size");
                "N/A".to_string()
            }
        }
    }

    async fn exists(&self, file: &Path) -> FileResult<bool> {
        match tokio::fs::metadata(file).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(FileStorageError::io(
                format!("could not probe local file {}", file.display()),
                e,
            )),
        }
    }

    async fn open_read_stream(&self, file: &Path) -> FileResult<ByteStream> {
        let handle = File::open(file).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => FileStorageError::NotFound {
                path: file.display().to_string(),
            },
            _ => FileStorageError::io(
                format!("could not open local file {} for reading", file.display()),
                e,
            ),
        })?;
        let path = file.to_path_buf();
        let stream = ReaderStream::with_capacity(handle, COPY_CHUNK_SIZE).map(move |chunk| {
            chunk.map_err(|e| {
                FileStorageError::io(format!("could not read local file {}", path.display()), e)
            })
        });
        Ok(Box::pin(stream))
    }

    async fn write(&self, source: &Path, target: &Path) -> FileResult<()> {
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                FileStorageError::io(
                    format!("could not create directory {}", parent.display()),
                    e,
                )
            })?;
        }
        tokio::fs::copy(source, target).await.map_err(|e| {
            FileStorageError::io(
                format!(
                    "could not copy {} to {}",
                    source.display(),
                    target.display()
                ),
                e,
            )
        })?;
        Ok(())
    }

    fn file_name(&self, file: &Path) -> String {
        file.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn is_local(&self) -> bool {
        true
    }
}
