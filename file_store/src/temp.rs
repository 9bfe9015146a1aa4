//! Temporary-file lifecycle for materialized scratch copies.

use std::{
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use tracing::debug;
use uuid::Uuid;

use crate::{append, error::FileStorageError, traits::FileStorage, FileResult};

/// Caller-owned lease over a locally readable copy of a storage location.
///
/// On a local backend the lease points at the canonical file itself; on
/// remote backends it points at a scratch copy. Scratch bytes are deleted
/// exactly once through [`TempFileManager::release`] — dropping a handle
/// never deletes anything.
pub struct TemporaryFile {
    local_path: PathBuf,
    source: PathBuf,
    purpose: String,
    scratch_dir: Option<PathBuf>,
    released: AtomicBool,
}

impl TemporaryFile {
    /// Local, directly readable path for the lease's bytes.
    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    /// The canonical storage location this lease was taken on.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Tag identifying the pipeline step that requested the lease.
    pub fn purpose(&self) -> &str {
        &self.purpose
    }
}

/// Issues and releases [`TemporaryFile`] leases for one backend.
///
/// Scratch copies land in uuid-suffixed directories under the scratch root
/// (the system temp directory unless overridden), so concurrent workers
/// holding leases on the same logical file never collide.
pub struct TempFileManager {
    store: Arc<dyn FileStorage>,
    scratch_root: PathBuf,
}

impl TempFileManager {
    pub fn new(store: Arc<dyn FileStorage>) -> Self {
        Self {
            store,
            scratch_root: std::env::temp_dir(),
        }
    }

    pub fn with_scratch_root(store: Arc<dyn FileStorage>, scratch_root: impl Into<PathBuf>) -> Self {
        Self {
            store,
            scratch_root: scratch_root.into(),
        }
    }

    /// Materialize `file` for exclusive local use, tagged with `purpose`.
    ///
    /// On a local backend the lease is a passthrough and release is a
    /// no-op. On remote backends the object is streamed into a fresh
    /// scratch directory; a failed transfer leaves nothing behind.
    pub async fn acquire(&self, file: &Path, purpose: &str) -> FileResult<TemporaryFile> {
        if self.store.is_local() {
            return Ok(TemporaryFile {
                local_path: file.to_path_buf(),
                source: file.to_path_buf(),
                purpose: purpose.to_string(),
                scratch_dir: None,
                released: AtomicBool::new(false),
            });
        }

        let scratch_dir = self
            .scratch_root
            .join(format!("{purpose}-{}", Uuid::new_v4()));
        tokio::fs::create_dir_all(&scratch_dir).await.map_err(|e| {
            FileStorageError::io(
                format!("could not create scratch directory {}", scratch_dir.display()),
                e,
            )
        })?;
        let local_path = scratch_dir.join(self.store.file_name(file));

        let transfer = async {
            let stream = self.store.open_read_stream(file).await?;
            append::copy_stream_to_file(stream, &local_path).await
        }
        .await;
        if let Err(e) = transfer {
            let _ = tokio::fs::remove_dir_all(&scratch_dir).await;
            return Err(e);
        }

        debug!(
            source = %file.display(),
            scratch = %local_path.display(),
            purpose,
            "materialized scratch copy"
        );

        Ok(TemporaryFile {
            local_path,
            source: file.to_path_buf(),
            purpose: purpose.to_string(),
            scratch_dir: Some(scratch_dir),
            released: AtomicBool::new(false),
        })
    }

    /// Release a lease.
    ///
    /// Idempotent, including under concurrent calls on the same handle:
    /// the first claim deletes the scratch copy iff the backend is remote,
    /// every later call is a no-op. A scratch file already removed by
    /// someone else counts as released. The canonical object is never
    /// touched.
    pub async fn release(&self, handle: &TemporaryFile) -> FileResult<()> {
        if handle.released.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let Some(scratch_dir) = &handle.scratch_dir else {
            return Ok(());
        };

        match tokio::fs::remove_dir_all(scratch_dir).await {
            Ok(()) => {
                debug!(
                    scratch = %scratch_dir.display(),
                    source = %handle.source.display(),
                    "released scratch copy"
                );
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(FileStorageError::io(
                format!(
                    "could not delete scratch directory {}",
                    scratch_dir.display()
                ),
                e,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use tempfile::TempDir;

    use super::*;
    use crate::{
        backends::LocalFileStorage,
        traits::{ByteStream, FileStorage},
    };

    /// Local files served through a backend that claims to be remote, so
    /// acquire takes the scratch-copy path.
    struct RemoteFixture {
        inner: LocalFileStorage,
    }

    impl RemoteFixture {
        fn new() -> Self {
            Self {
                inner: LocalFileStorage::new(),
            }
        }
    }

    #[async_trait]
    impl FileStorage for RemoteFixture {
        async fn materialize(&self, file: &Path) -> FileResult<PathBuf> {
            self.inner.materialize(file).await
        }

        async fn size_bytes(&self, file: &Path) -> u64 {
            self.inner.size_bytes(file).await
        }

        async fn human_readable_size(&self, file: &Path) -> String {
            self.inner.human_readable_size(file).await
        }

        async fn exists(&self, file: &Path) -> FileResult<bool> {
            self.inner.exists(file).await
        }

        async fn open_read_stream(&self, file: &Path) -> FileResult<ByteStream> {
            self.inner.open_read_stream(file).await
        }

        async fn write(&self, source: &Path, target: &Path) -> FileResult<()> {
            self.inner.write(source, target).await
        }

        fn file_name(&self, file: &Path) -> String {
            self.inner.file_name(file)
        }

        fn is_local(&self) -> bool {
            false
        }
    }

    #[tokio::test]
    async fn local_backend_leases_are_passthrough() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("reads.fastq");
        tokio::fs::write(&file, b"@read1\nACGT\n").await.unwrap();

        let manager = TempFileManager::new(Arc::new(LocalFileStorage::new()));
        let handle = manager.acquire(&file, "concatenate").await.unwrap();
        assert_eq!(handle.local_path(), file.as_path());

        manager.release(&handle).await.unwrap();
        manager.release(&handle).await.unwrap();
        // The canonical file is untouched by release.
        assert!(file.exists());
    }

    #[tokio::test]
    async fn remote_leases_copy_into_scratch_and_release_deletes_once() {
        let data_dir = TempDir::new().unwrap();
        let scratch_root = TempDir::new().unwrap();
        let file = data_dir.path().join("reads_1.fastq.gz");
        tokio::fs::write(&file, b"paired-end payload").await.unwrap();

        let manager = TempFileManager::with_scratch_root(
            Arc::new(RemoteFixture::new()),
            scratch_root.path(),
        );
        let handle = manager.acquire(&file, "concatenate").await.unwrap();

        assert_ne!(handle.local_path(), file.as_path());
        assert!(handle.local_path().starts_with(scratch_root.path()));
        assert_eq!(
            tokio::fs::read(handle.local_path()).await.unwrap(),
            b"paired-end payload"
        );
        assert_eq!(handle.source(), file.as_path());
        assert_eq!(handle.purpose(), "concatenate");

        manager.release(&handle).await.unwrap();
        assert!(!handle.local_path().exists());
        // The canonical object survives its scratch copy.
        assert!(file.exists());

        manager.release(&handle).await.unwrap();
    }

    #[tokio::test]
    async fn release_tolerates_externally_removed_scratch() {
        let data_dir = TempDir::new().unwrap();
        let scratch_root = TempDir::new().unwrap();
        let file = data_dir.path().join("reads_1.fastq.gz");
        tokio::fs::write(&file, b"payload").await.unwrap();

        let manager = TempFileManager::with_scratch_root(
            Arc::new(RemoteFixture::new()),
            scratch_root.path(),
        );
        let handle = manager.acquire(&file, "sniff").await.unwrap();

        let scratch_dir = handle.local_path().parent().unwrap().to_path_buf();
        tokio::fs::remove_dir_all(&scratch_dir).await.unwrap();

        manager.release(&handle).await.unwrap();
    }

    #[tokio::test]
    async fn failed_acquire_leaves_no_scratch_behind() {
        let scratch_root = TempDir::new().unwrap();

        let manager = TempFileManager::with_scratch_root(
            Arc::new(RemoteFixture::new()),
            scratch_root.path(),
        );
        let err = manager
            .acquire(Path::new("/nonexistent/reads.fastq"), "concatenate")
            .await
            .err()
            .unwrap();
        assert!(matches!(err, FileStorageError::NotFound { .. }));

        let mut entries = tokio::fs::read_dir(scratch_root.path()).await.unwrap();
        assert!(entries.next_entry().await.unwrap().is_none());
    }
}
