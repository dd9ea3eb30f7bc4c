//! Inner decompressor: batch folder -> flat output directory.
//!
//! The export nests members under date/hour subfolders, so the batch
//! folder is walked recursively and every output lands flat in the
//! output directory under its suffix-stripped filename.

use flate2::read::GzDecoder;
use std::collections::HashSet;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::report::{MemberOutcome, MemberRecord};

/// Decompress every suffix-matching member under `batch_dir` into
/// `output_dir`, one record per member examined.
///
/// A member that fails to decompress is recorded and skipped over; it
/// never aborts the batch and never leaves a partial output file. Members
/// without the suffix are recorded as skipped. When two members flatten
/// to the same output name the later one in sorted path order wins.
pub async fn decompress_batch(
    batch_dir: &Path,
    output_dir: &Path,
    suffix: &str,
) -> std::io::Result<Vec<MemberRecord>> {
    let members = collect_members(batch_dir).await?;

    let mut records = Vec::with_capacity(members.len());
    let mut produced: HashSet<String> = HashSet::new();

    for path in members {
        let name = member_name(&path, batch_dir);

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let Some(stem) = file_name.strip_suffix(suffix) else {
            debug!(member = %name, "skipping member without compression suffix");
            records.push(MemberRecord {
                name,
                outcome: MemberOutcome::Skipped,
            });
            continue;
        };

        let outcome = if stem.is_empty() {
            MemberOutcome::Failed("member name is only the compression suffix".to_string())
        } else {
            if !produced.insert(stem.to_string()) {
                warn!(member = %name, output = %stem, "duplicate output name, overwriting");
            }
            match decompress_member(&path, &output_dir.join(stem)) {
                Ok(bytes) => {
                    debug!(member = %name, output = %stem, bytes, "member decompressed");
                    MemberOutcome::Extracted
                }
                Err(err) => MemberOutcome::Failed(err.to_string()),
            }
        };

        if let MemberOutcome::Failed(reason) = &outcome {
            warn!(member = %name, reason = %reason, "failed to decompress member");
        }
        records.push(MemberRecord { name, outcome });
    }

    Ok(records)
}

/// Every file under `batch_dir`, recursively, in sorted path order.
///
/// Sorting makes the duplicate-output-name policy deterministic across
/// platforms (directory read order is not).
async fn collect_members(batch_dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![batch_dir.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let file_type = entry.file_type().await?;
            if file_type.is_dir() {
                pending.push(entry.path());
            } else if file_type.is_file() {
                files.push(entry.path());
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Gunzip one member into `dest`, all or nothing.
///
/// The stream is decoded into a temp file beside the destination and
/// renamed over it only once fully written, so a reader of the output
/// directory never observes a truncated file.
fn decompress_member(src: &Path, dest: &Path) -> std::io::Result<u64> {
    // Same directory as the destination, so persist() is a plain rename
    let dir = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;

    let mut decoder = GzDecoder::new(BufReader::new(std::fs::File::open(src)?));
    let bytes = std::io::copy(&mut decoder, &mut tmp)?;

    tmp.persist(dest).map_err(|e| e.error)?;
    Ok(bytes)
}

fn member_name(path: &Path, batch_dir: &Path) -> String {
    path.strip_prefix(batch_dir)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[tokio::test]
    async fn decompresses_nested_members_flat() {
        let batch = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();

        let hour_dir = batch.path().join("2025-11-04").join("00");
        std::fs::create_dir_all(&hour_dir).unwrap();
        std::fs::write(hour_dir.join("events_0.json.gz"), gzip(b"{\"n\":1}\n")).unwrap();
        std::fs::write(batch.path().join("events_1.json.gz"), gzip(b"{\"n\":2}\n")).unwrap();

        let records = decompress_batch(batch.path(), out.path(), ".gz")
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert!(records
            .iter()
            .all(|r| r.outcome == MemberOutcome::Extracted));
        assert_eq!(
            std::fs::read(out.path().join("events_0.json")).unwrap(),
            b"{\"n\":1}\n"
        );
        assert_eq!(
            std::fs::read(out.path().join("events_1.json")).unwrap(),
            b"{\"n\":2}\n"
        );
    }

    #[tokio::test]
    async fn corrupt_member_is_recorded_not_fatal() {
        let batch = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();

        let good = gzip(b"intact");
        let mut corrupt = gzip(b"this stream gets truncated");
        corrupt.truncate(corrupt.len() / 2);

        std::fs::write(batch.path().join("a.gz"), &good).unwrap();
        std::fs::write(batch.path().join("b.gz"), &corrupt).unwrap();

        let records = decompress_batch(batch.path(), out.path(), ".gz")
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].outcome, MemberOutcome::Extracted);
        assert!(matches!(records[1].outcome, MemberOutcome::Failed(_)));

        // The failed member must not leave a partial output behind
        assert!(out.path().join("a").exists());
        assert!(!out.path().join("b").exists());
    }

    #[tokio::test]
    async fn non_suffix_members_are_skipped() {
        let batch = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();

        std::fs::write(batch.path().join("checksums.txt"), b"abc").unwrap();

        let records = decompress_batch(batch.path(), out.path(), ".gz")
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].outcome, MemberOutcome::Skipped);
        assert!(!out.path().join("checksums.txt").exists());
        assert!(!out.path().join("checksums").exists());
    }

    #[tokio::test]
    async fn duplicate_flattened_names_last_write_wins() {
        let batch = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();

        std::fs::create_dir_all(batch.path().join("00")).unwrap();
        std::fs::create_dir_all(batch.path().join("01")).unwrap();
        std::fs::write(batch.path().join("00").join("events.gz"), gzip(b"first")).unwrap();
        std::fs::write(batch.path().join("01").join("events.gz"), gzip(b"second")).unwrap();

        let records = decompress_batch(batch.path(), out.path(), ".gz")
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        // Sorted walk: 01/events.gz is processed after 00/events.gz
        assert_eq!(std::fs::read(out.path().join("events")).unwrap(), b"second");
    }

    #[tokio::test]
    async fn suffix_only_name_is_a_member_failure() {
        let batch = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();

        std::fs::write(batch.path().join(".gz"), gzip(b"x")).unwrap();

        let records = decompress_batch(batch.path(), out.path(), ".gz")
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert!(matches!(records[0].outcome, MemberOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn respects_configured_suffix() {
        let batch = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();

        std::fs::write(batch.path().join("events.gzip"), gzip(b"payload")).unwrap();
        std::fs::write(batch.path().join("events.gz"), gzip(b"wrong suffix")).unwrap();

        let records = decompress_batch(batch.path(), out.path(), ".gzip")
            .await
            .unwrap();

        let extracted: Vec<_> = records
            .iter()
            .filter(|r| r.outcome == MemberOutcome::Extracted)
            .collect();
        assert_eq!(extracted.len(), 1);
        assert_eq!(extracted[0].name, "events.gzip");
        assert_eq!(std::fs::read(out.path().join("events")).unwrap(), b"payload");
    }
}
