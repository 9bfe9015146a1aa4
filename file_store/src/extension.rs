//! Extension agreement across multi-file groups.

use std::{cmp::Reverse, path::PathBuf};

use crate::{error::FileStorageError, traits::FileStorage, FileResult};

/// Extensions recognized for multi-file sequencing operations such as
/// concatenating paired-end reads.
pub const CONCATENATION_EXTENSIONS: &[&str] = &[".fastq", ".fastq.gz"];

/// Validate that every file in `group` carries the same recognized
/// extension and return it.
///
/// Matching is longest-first, so `.fastq.gz` wins over `.fastq` for
/// `reads_1.fastq.gz` no matter how `allowed` is ordered. The first file
/// fixes the extension for the whole group; any later file matching a
/// different one fails the group.
pub fn consistent_extension(
    store: &dyn FileStorage,
    group: &[PathBuf],
    allowed: &[&str],
) -> FileResult<String> {
    let mut candidates = allowed.to_vec();
    candidates.sort_by_key(|ext| Reverse(ext.len()));

    let mut selected: Option<(String, String)> = None;
    for file in group {
        let file_name = store.file_name(file);
        let matched = candidates
            .iter()
            .find(|ext| file_name.ends_with(**ext))
            .copied()
            .ok_or_else(|| {
                FileStorageError::Validation(format!("file extension is not valid: {file_name}"))
            })?;

        match &selected {
            None => selected = Some((matched.to_string(), file_name)),
            Some((chosen, first)) if chosen != matched => {
                return Err(FileStorageError::Validation(format!(
                    "extensions of files do not match: {matched} ({file_name}) vs {chosen} ({first})"
                )));
            }
            Some(_) => {}
        }
    }

    selected
        .map(|(extension, _)| extension)
        .ok_or_else(|| FileStorageError::Validation("file group is empty".to_string()))
}
