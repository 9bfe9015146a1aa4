//! Azure blob container backend.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use futures::StreamExt;
use object_store::{
    azure::{MicrosoftAzure, MicrosoftAzureBuilder},
    path::Path as ObjectPath,
    ObjectStore, WriteMultipart,
};
use seqstore_utils::human_readable_bytes;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncReadExt;
use tracing::{debug, warn};

use crate::{
    append::{self, COPY_CHUNK_SIZE},
    backends::object_key,
    error::FileStorageError,
    traits::{ByteStream, FileStorage},
    FileResult,
};

/// Connection parameters for an Azure blob container.
///
/// Captured once at backend construction and never mutated afterward. The
/// connection string is the standard `Key=Value;…` form carrying at least
/// `AccountName` and `AccountKey`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureConfig {
    pub connection_string: String,
    pub container: String,
}

/// Storage backend for Azure blob containers.
///
/// Absolute paths are normalized into blob names by stripping the leading
/// separator; the container's "directories" exist only inside those names.
pub struct AzureFileStorage {
    store: Arc<MicrosoftAzure>,
    container: String,
}

impl AzureFileStorage {
    pub fn new(config: &AzureConfig) -> FileResult<Self> {
        if config.container.is_empty() {
            return Err(FileStorageError::Configuration(
                "azure container name is empty".to_string(),
            ));
        }
        let (account, access_key) = parse_connection_string(&config.connection_string)?;
        let store = MicrosoftAzureBuilder::new()
            .with_account(account)
            .with_access_key(access_key)
            .with_container_name(&config.container)
            .build()
            .map_err(|e| FileStorageError::Configuration(e.to_string()))?;

        debug!(container = %config.container, "created azure file storage");

        Ok(Self {
            store: Arc::new(store),
            container: config.container.clone(),
        })
    }

    fn blob_name(&self, file: &Path) -> ObjectPath {
        ObjectPath::from(object_key(file).as_str())
    }
}

/// Pull `AccountName` and `AccountKey` out of an Azure connection string.
///
/// Account keys are base64 and may themselves contain `=`, so each segment
/// splits on the first `=` only.
fn parse_connection_string(raw: &str) -> FileResult<(String, String)> {
    let mut account = None;
    let mut key = None;
    for segment in raw.split(';').filter(|s| !s.is_empty()) {
        let Some((name, value)) = segment.split_once('=') else {
            return Err(FileStorageError::Configuration(format!(
                "malformed connection string segment: {segment}"
            )));
        };
        match name {
            "AccountName" => account = Some(value.to_string()),
            "AccountKey" => key = Some(value.to_string()),
            _ => {}
        }
    }
    match (account, key) {
        (Some(account), Some(key)) => Ok((account, key)),
        (None, _) => Err(FileStorageError::Configuration(
            "connection string is missing AccountName".to_string(),
        )),
        (_, None) => Err(FileStorageError::Configuration(
            "connection string is missing AccountKey".to_string(),
        )),
    }
}

#[async_trait]
impl FileStorage for AzureFileStorage {
    async fn materialize(&self, file: &Path) -> FileResult<PathBuf> {
        let stream = self.open_read_stream(file).await?;
        let target = file.to_path_buf();
        let written = append::copy_stream_to_file(stream, &target).await?;
        debug!(
            container = %self.container,
            blob = %object_key(file),
            bytes = written,
            "materialized blob into local file"
        );
        Ok(target)
    }

    async fn size_bytes(&self, file: &Path) -> u64 {
        match self.store.head(&self.blob_name(file)).await {
            Ok(meta) => meta.size,
            Err(e) => {
                warn!(
                    container = %self.container,
                    blob = %object_key(file),
                    error = %e,
                    "unable to get blob size from azure container"
                );
                0
            }
        }
    }

    async fn human_readable_size(&self, file: &Path) -> String {
        match self.store.head(&self.blob_name(file)).await {
            Ok(meta) => human_readable_bytes(meta.size),
            Err(e) => {
                warn!(
                    container = %self.container,
                    blob = %object_key(file),
                    error = %e,
                    "unable to get blob size from azure container"
                );
                "N/A".to_string()
            }
        }
    }

    async fn exists(&self, file: &Path) -> FileResult<bool> {
        match self.store.head(&self.blob_name(file)).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(FileStorageError::from_object_store(file, e)),
        }
    }

    async fn open_read_stream(&self, file: &Path) -> FileResult<ByteStream> {
        let result = self
            .store
            .get(&self.blob_name(file))
            .await
            .map_err(|e| FileStorageError::from_object_store(file, e))?;
        let path = file.to_path_buf();
        let stream = result
            .into_stream()
            .map(move |chunk| chunk.map_err(|e| FileStorageError::from_object_store(&path, e)));
        Ok(Box::pin(stream))
    }

    async fn write(&self, source: &Path, target: &Path) -> FileResult<()> {
        let blob = object_key(target);
        let mut input = tokio::fs::File::open(source).await.map_err(|e| {
            FileStorageError::io(
                format!(
                    "could not open upload source {} for reading",
                    source.display()
                ),
                e,
            )
        })?;

        let upload = self
            .store
            .put_multipart(&ObjectPath::from(blob.as_str()))
            .await
            .map_err(|e| FileStorageError::from_object_store(target, e))?;
        let mut writer = WriteMultipart::new(upload);

        let mut buf = vec![0u8; COPY_CHUNK_SIZE];
        loop {
            let n = input.read(&mut buf).await.map_err(|e| {
                FileStorageError::io(
                    format!("could not read upload source {}", source.display()),
                    e,
                )
            })?;
            if n == 0 {
                break;
            }
            writer
                .wait_for_capacity(1)
                .await
                .map_err(|e| FileStorageError::from_object_store(target, e))?;
            writer.write(&buf[..n]);
        }
        writer
            .finish()
            .await
            .map_err(|e| FileStorageError::from_object_store(target, e))?;

        debug!(container = %self.container, blob = %blob, "uploaded file to azure container");
        Ok(())
    }

    fn file_name(&self, file: &Path) -> String {
        let blob = object_key(file);
        blob.rsplit('/').next().unwrap_or_default().to_string()
    }

    fn is_local(&self) -> bool {
        false
    }
}
