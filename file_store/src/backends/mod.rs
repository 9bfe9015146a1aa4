//! Storage backend implementations.

mod azure;
mod local;
mod s3;

use std::path::Path;

pub use azure::{AzureConfig, AzureFileStorage};
pub use local::LocalFileStorage;
pub use s3::{S3Config, S3FileStorage};

/// Normalize an absolute path into an object key/blob name by stripping the
/// leading separator. Idempotent: keys pass through unchanged.
pub(crate) fn object_key(file: &Path) -> String {
    let raw = file.to_string_lossy();
    raw.strip_prefix('/').unwrap_or(&raw).to_string()
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::*;

    #[test]
    fn object_key_strips_the_leading_separator() {
        assert_eq!(
            object_key(Path::new("/data/run1/reads_1.fastq.gz")),
            "data/run1/reads_1.fastq.gz"
        );
    }

    #[test]
    fn object_key_is_idempotent() {
        let paths = [
            "/data/run1/reads_1.fastq.gz",
            "/reads.fastq",
            "relative/reads.fastq",
        ];
        for p in paths {
            let once = object_key(Path::new(p));
            let twice = object_key(&PathBuf::from(&once));
            assert_eq!(once, twice);
        }
    }
}
