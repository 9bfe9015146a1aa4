//! Core storage contract.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::{stream::BoxStream, StreamExt};

use crate::FileResult;

/// Chunked byte stream handed out by [`FileStorage::open_read_stream`].
///
/// Dropping the stream releases the backing connection, on every exit path
/// including errors mid-read.
pub type ByteStream = BoxStream<'static, FileResult<Bytes>>;

/// Capability contract implemented by every storage backend.
///
/// One independent implementation exists per storage substrate: the local
/// filesystem, S3-compatible object stores, and Azure blob containers. A
/// backend is selected once at construction and shared across pipeline
/// workers as `Arc<dyn FileStorage>`; the core performs no scheduling or
/// retries of its own.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Produce a local, directly readable file for `file`.
    ///
    /// The returned path's bytes are byte-identical to the canonical
    /// object's bytes at call time. On the local backend this returns
    /// `file` unchanged without copying anything.
    async fn materialize(&self, file: &Path) -> FileResult<PathBuf>;

    /// Object size in bytes.
    ///
    /// Best-effort: backend failures are logged and degrade to `0`.
    async fn size_bytes(&self, file: &Path) -> u64;

    /// Human-readable object size for display surfaces.
    ///
    /// Best-effort: backend failures are logged and degrade to `"N/A"`.
    async fn human_readable_size(&self, file: &Path) -> String;

    /// Whether a metadata probe for `file` succeeds.
    ///
    /// An absent object yields `Ok(false)`; backend failures other than
    /// absence propagate.
    async fn exists(&self, file: &Path) -> FileResult<bool>;

    /// Open a chunked read stream over the object's bytes.
    async fn open_read_stream(&self, file: &Path) -> FileResult<ByteStream>;

    /// Upload/copy the local file at `source` to `target`.
    async fn write(&self, source: &Path, target: &Path) -> FileResult<()>;

    /// Last segment of the normalized location.
    ///
    /// On remote backends the "directory" is encoded entirely inside the
    /// object key, so this splits the key on `/` and returns the final
    /// token.
    fn file_name(&self, file: &Path) -> String;

    /// True when [`materialize`](Self::materialize) is a no-op.
    fn is_local(&self) -> bool;

    /// Read the full object into memory.
    ///
    /// Intended for small ancillary files; large sequencing files should go
    /// through [`open_read_stream`](Self::open_read_stream).
    async fn read_all_bytes(&self, file: &Path) -> FileResult<Vec<u8>> {
        let mut stream = self.open_read_stream(file).await?;
        let mut bytes = BytesMut::new();
        while let Some(chunk) = stream.next().await {
            bytes.extend_from_slice(&chunk?);
        }
        Ok(bytes.to_vec())
    }
}
