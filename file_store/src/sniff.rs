//! Gzip magic-number detection.

use std::path::Path;

use futures::StreamExt;

use crate::{traits::FileStorage, FileResult};

/// Two-byte prefix identifying gzip-compressed content.
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// True when the object at `file` starts with the gzip magic number.
///
/// Streams shorter than two bytes are reported as not gzipped rather than
/// failing. At most the chunks covering the first two bytes are pulled from
/// the backend; the stream is dropped afterwards, releasing the connection
/// whatever the outcome.
pub async fn is_gzipped(store: &dyn FileStorage, file: &Path) -> FileResult<bool> {
    let mut stream = store.open_read_stream(file).await?;
    let mut prefix = [0u8; 2];
    let mut filled = 0;

    while filled < prefix.len() {
        match stream.next().await {
            Some(chunk) => {
                let chunk = chunk?;
                for byte in chunk.iter() {
                    if filled == prefix.len() {
                        break;
                    }
                    prefix[filled] = *byte;
                    filled += 1;
                }
            }
            None => return Ok(false),
        }
    }

    Ok(prefix == GZIP_MAGIC)
}

#[cfg(test)]
mod tests {
    use std::{
        io::Write,
        path::{Path, PathBuf},
    };

    use async_trait::async_trait;
    use bytes::Bytes;
    use flate2::{write::GzEncoder, Compression};
    use tempfile::TempDir;

    use super::*;
    use crate::{
        backends::LocalFileStorage,
        traits::{ByteStream, FileStorage},
    };

    #[tokio::test]
    async fn detects_real_gzip_output() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("reads.fastq.gz");

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"@read1\nACGT\n+\nFFFF\n").unwrap();
        std::fs::write(&file, encoder.finish().unwrap()).unwrap();

        let store = LocalFileStorage::new();
        assert!(is_gzipped(&store, &file).await.unwrap());
    }

    #[tokio::test]
    async fn plain_text_is_not_gzipped() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("reads.fastq");
        std::fs::write(&file, b"@read1\nACGT\n").unwrap();

        let store = LocalFileStorage::new();
        assert!(!is_gzipped(&store, &file).await.unwrap());
    }

    #[tokio::test]
    async fn half_magic_is_not_gzipped() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("truncated");
        std::fs::write(&file, [0x1f, 0x00]).unwrap();

        let store = LocalFileStorage::new();
        assert!(!is_gzipped(&store, &file).await.unwrap());
    }

    #[tokio::test]
    async fn streams_shorter_than_the_magic_do_not_fail() {
        let temp_dir = TempDir::new().unwrap();

        let one_byte = temp_dir.path().join("one");
        std::fs::write(&one_byte, [0x1f]).unwrap();
        let empty = temp_dir.path().join("empty");
        std::fs::write(&empty, []).unwrap();

        let store = LocalFileStorage::new();
        assert!(!is_gzipped(&store, &one_byte).await.unwrap());
        assert!(!is_gzipped(&store, &empty).await.unwrap());
    }

    /// Serves a fixed chunk sequence, so the magic can arrive split across
    /// chunk boundaries.
    struct ChunkedFixture {
        chunks: Vec<Bytes>,
    }

    #[async_trait]
    impl FileStorage for ChunkedFixture {
        async fn materialize(&self, file: &Path) -> FileResult<PathBuf> {
            Ok(file.to_path_buf())
        }

        async fn size_bytes(&self, _file: &Path) -> u64 {
            unimplemented!()
        }

        async fn human_readable_size(&self, _file: &Path) -> String {
            unimplemented!()
        }

        async fn exists(&self, _file: &Path) -> FileResult<bool> {
            Ok(true)
        }

        async fn open_read_stream(&self, _file: &Path) -> FileResult<ByteStream> {
            let chunks: Vec<FileResult<Bytes>> =
                self.chunks.iter().cloned().map(Ok).collect();
            Ok(Box::pin(futures::stream::iter(chunks)))
        }

        async fn write(&self, _source: &Path, _target: &Path) -> FileResult<()> {
            unimplemented!()
        }

        fn file_name(&self, _file: &Path) -> String {
            unimplemented!()
        }

        fn is_local(&self) -> bool {
            false
        }
    }

    #[tokio::test]
    async fn magic_split_across_chunks_is_detected() {
        let store = ChunkedFixture {
            chunks: vec![
                Bytes::from_static(&[]),
                Bytes::from_static(&[0x1f]),
                Bytes::from_static(&[0x8b]),
                Bytes::from_static(b"rest of the payload"),
            ],
        };
        assert!(is_gzipped(&store, Path::new("/chunked")).await.unwrap());
    }
}
