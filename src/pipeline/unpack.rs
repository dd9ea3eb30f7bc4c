//! Outer unpacker: archive file -> populated scratch directory -> batch folder.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::error::PipelineError;
use crate::io::LocalFileReader;
use crate::zip::ZipExtractor;

/// Extract every file entry of `archive` into `scratch` and locate the
/// batch folder.
///
/// The scratch directory must already exist and be empty; the caller owns
/// its lifetime. On success returns the path of the single digit-named
/// top-level directory the export put its members under.
pub async fn unpack_archive(archive: &Path, scratch: &Path) -> Result<PathBuf, PipelineError> {
    let reader = Arc::new(LocalFileReader::new(archive)?);
    let extractor = ZipExtractor::new(reader);

    let entries = extractor.list_entries().await?;
    debug!(entries = entries.len(), "parsed archive central directory");

    for entry in entries.iter().filter(|e| !e.is_directory) {
        let relative = sanitized_entry_path(&entry.file_name)?;
        extractor
            .extract_to_file(entry, &scratch.join(relative))
            .await?;
    }

    locate_batch_dir(scratch).await
}

/// Turn an archive entry name into a path that stays inside the
/// extraction directory.
///
/// Absolute names and any `..` component are rejected rather than
/// normalized; an export archive has no business containing either.
pub(crate) fn sanitized_entry_path(name: &str) -> Result<PathBuf, PipelineError> {
    let path = Path::new(name);
    let mut sanitized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Normal(part) => sanitized.push(part),
            Component::CurDir => {}
            _ => return Err(PipelineError::UnsafeEntryPath(name.to_string())),
        }
    }

    if sanitized.as_os_str().is_empty() {
        return Err(PipelineError::UnsafeEntryPath(name.to_string()));
    }

    Ok(sanitized)
}

/// Select the single digit-named top-level directory of the scratch area.
///
/// Zero or multiple candidates mean the vendor changed the export layout;
/// both cases abort the run rather than guessing.
async fn locate_batch_dir(scratch: &Path) -> Result<PathBuf, PipelineError> {
    let mut candidates = Vec::new();

    let mut dir = tokio::fs::read_dir(scratch).await?;
    while let Some(entry) = dir.next_entry().await? {
        if !entry.file_type().await?.is_dir() {
            continue;
        }
        let name = entry.file_name();
        if is_batch_name(&name.to_string_lossy()) {
            candidates.push(entry.path());
        }
    }

    match candidates.as_slice() {
        [single] => Ok(single.clone()),
        _ => Err(PipelineError::AmbiguousBatch {
            count: candidates.len(),
        }),
    }
}

fn is_batch_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_names_are_all_digits() {
        assert!(is_batch_name("100011471"));
        assert!(is_batch_name("0"));
        assert!(!is_batch_name(""));
        assert!(!is_batch_name("100011471a"));
        assert!(!is_batch_name("2025-11-04"));
    }

    #[test]
    fn sanitizes_nested_entry_names() {
        assert_eq!(
            sanitized_entry_path("100011471/2025-11-04/events.gz").unwrap(),
            PathBuf::from("100011471/2025-11-04/events.gz")
        );
        assert_eq!(
            sanitized_entry_path("./100011471/events.gz").unwrap(),
            PathBuf::from("100011471/events.gz")
        );
    }

    #[test]
    fn rejects_escaping_entry_names() {
        for bad in ["../evil", "a/../../evil", "/etc/passwd", ""] {
            assert!(
                matches!(
                    sanitized_entry_path(bad),
                    Err(PipelineError::UnsafeEntryPath(_))
                ),
                "expected rejection for {bad:?}"
            );
        }
    }

    #[tokio::test]
    async fn locates_single_digit_dir() {
        let scratch = tempfile::tempdir().unwrap();
        tokio::fs::create_dir(scratch.path().join("100011471"))
            .await
            .unwrap();
        tokio::fs::write(scratch.path().join("manifest.txt"), b"x")
            .await
            .unwrap();

        let batch = locate_batch_dir(scratch.path()).await.unwrap();
        assert_eq!(batch, scratch.path().join("100011471"));
    }

    #[tokio::test]
    async fn ambiguous_when_zero_or_many() {
        let scratch = tempfile::tempdir().unwrap();
        assert!(matches!(
            locate_batch_dir(scratch.path()).await,
            Err(PipelineError::AmbiguousBatch { count: 0 })
        ));

        tokio::fs::create_dir(scratch.path().join("100011471"))
            .await
            .unwrap();
        tokio::fs::create_dir(scratch.path().join("100011472"))
            .await
            .unwrap();
        assert!(matches!(
            locate_batch_dir(scratch.path()).await,
            Err(PipelineError::AmbiguousBatch { count: 2 })
        ));
    }

    #[tokio::test]
    async fn digit_named_files_are_not_batch_dirs() {
        let scratch = tempfile::tempdir().unwrap();
        tokio::fs::create_dir(scratch.path().join("100011471"))
            .await
            .unwrap();
        tokio::fs::write(scratch.path().join("100011472"), b"not a dir")
            .await
            .unwrap();

        let batch = locate_batch_dir(scratch.path()).await.unwrap();
        assert_eq!(batch, scratch.path().join("100011471"));
    }
}
