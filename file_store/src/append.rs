//! Chunked byte transfer between local files and from backend streams.

use std::path::Path;

use futures::StreamExt;
use tokio::{
    fs::{File, OpenOptions},
    io::{AsyncReadExt, AsyncWriteExt},
};

use crate::{
    error::FileStorageError,
    traits::{ByteStream, FileStorage},
    FileResult,
};

/// Transfer unit for chunked copies. Bounds peak memory regardless of the
/// size of the file being moved.
pub(crate) const COPY_CHUNK_SIZE: usize = 64 * 1024;

/// Append the bytes of `source` onto `target`, materializing `source`
/// first when the backend is remote.
///
/// The target is opened create-or-append, so appending to a missing file
/// creates it. Bytes move in [`COPY_CHUNK_SIZE`] chunks until the full
/// source length has been copied.
pub async fn append_to_file(
    store: &dyn FileStorage,
    target: &Path,
    source: &Path,
) -> FileResult<()> {
    let local_source = store.materialize(source).await?;

    let mut out = OpenOptions::new()
        .create(true)
        .append(true)
        .open(target)
        .await
        .map_err(|e| {
            FileStorageError::io(
                format!("could not open target file {} for writing", target.display()),
                e,
            )
        })?;
    let mut input = File::open(&local_source).await.map_err(|e| {
        FileStorageError::io(
            format!(
                "could not open input file {} for reading",
                local_source.display()
            ),
            e,
        )
    })?;

    let mut buf = vec![0u8; COPY_CHUNK_SIZE];
    loop {
        let n = input.read(&mut buf).await.map_err(|e| {
            FileStorageError::io(
                format!("could not read input file {}", local_source.display()),
                e,
            )
        })?;
        if n == 0 {
            break;
        }
        out.write_all(&buf[..n]).await.map_err(|e| {
            FileStorageError::io(
                format!("could not write to target file {}", target.display()),
                e,
            )
        })?;
    }
    out.flush().await.map_err(|e| {
        FileStorageError::io(
            format!("could not write to target file {}", target.display()),
            e,
        )
    })?;
    Ok(())
}

/// Drain a backend read stream into a fresh local file, creating parent
/// directories as needed. Returns the number of bytes written.
///
/// Backend errors surfacing through the stream propagate unchanged; local
/// write failures surface as `Io` with target context. The stream is
/// dropped on every exit path, releasing the backend connection.
pub(crate) async fn copy_stream_to_file(mut stream: ByteStream, target: &Path) -> FileResult<u64> {
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            FileStorageError::io(
                format!("could not create directory {}", parent.display()),
                e,
            )
        })?;
    }
    let mut out = File::create(target).await.map_err(|e| {
        FileStorageError::io(
            format!("could not create local file {}", target.display()),
            e,
        )
    })?;

    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        out.write_all(&chunk).await.map_err(|e| {
            FileStorageError::io(
                format!("could not write to local file {}", target.display()),
                e,
            )
        })?;
        written += chunk.len() as u64;
    }
    out.flush().await.map_err(|e| {
        FileStorageError::io(
            format!("could not write to local file {}", target.display()),
            e,
        )
    })?;
    Ok(written)
}
