//! Backend-agnostic file storage for sequencing pipelines.
//!
//! Sequencing data files may live on the local filesystem, in an
//! S3-compatible bucket, or in an Azure blob container. This crate hides
//! those substrates behind one contract so pipeline workers can
//! materialize, inspect, stream, and discard files without knowing where
//! they live:
//!
//! - [`FileStorage`] — the capability contract, one independent
//!   implementation per backend.
//! - [`LocalFileStorage`], [`S3FileStorage`], [`AzureFileStorage`] — the
//!   backends, selected once via [`build_storage`].
//! - [`is_gzipped`] — magic-number format sniffing on any backend.
//! - [`consistent_extension`] — extension agreement across a file group
//!   before batch operations such as paired-end concatenation.
//! - [`append_to_file`] — chunked append of one file onto another.
//! - [`TempFileManager`] — scratch-copy lifecycle with idempotent cleanup.
//!
//! No retries, timeouts, or caching live here; transient failures
//! propagate immediately and retry policy belongs to the caller.
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use file_store::{build_storage, is_gzipped, StorageConfig, TempFileManager};
//!
//! # async fn example() -> Result<(), file_store::FileStorageError> {
//! let store = build_storage(&StorageConfig::Local)?;
//!
//! let reads = Path::new("/data/run1/reads_1.fastq.gz");
//! if is_gzipped(store.as_ref(), reads).await? {
//!     let manager = TempFileManager::new(store.clone());
//!     let lease = manager.acquire(reads, "decompress").await?;
//!     // ... decompress lease.local_path() ...
//!     manager.release(&lease).await?;
//! }
//! # Ok(())
//! # }
//! ```

mod append;
mod backends;
mod config;
mod error;
mod extension;
mod sniff;
mod temp;
mod traits;

pub use append::append_to_file;
pub use backends::{
    AzureConfig, AzureFileStorage, LocalFileStorage, S3Config, S3FileStorage,
};
pub use config::{build_storage, StorageConfig};
pub use error::{FileResult, FileStorageError};
pub use extension::{consistent_extension, CONCATENATION_EXTENSIONS};
pub use sniff::{is_gzipped, GZIP_MAGIC};
pub use temp::{TempFileManager, TemporaryFile};
pub use traits::{ByteStream, FileStorage};
