//! Input materialization: check the input directory and expand archives.
//!
//! Expansion is a single pass over a snapshot of the top-level listing.
//! Files produced by extraction are never re-scanned, so an archive nested
//! inside another archive stays packed.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{ExtractionCause, ProofError, Result};

/// What a materialization pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterializeReport {
    /// Top-level entries in the snapshot.
    pub entries_scanned: usize,

    /// Archives that were expanded, in extraction order.
    pub archives_expanded: Vec<PathBuf>,

    /// Regular files written by extraction (directories not counted).
    pub files_extracted: usize,
}

/// Verify `input_dir` is a non-empty directory, then expand every top-level
/// zip archive into it.
///
/// Archive detection reads the file's zip structure; the file name is not
/// consulted. Extracted members keep their relative paths and overwrite any
/// existing file of the same name. A failure midway leaves whatever was
/// already extracted in place.
pub fn validate_and_extract(input_dir: &Path) -> Result<MaterializeReport> {
    let entries = snapshot_entries(input_dir)?;

    let mut report = MaterializeReport {
        entries_scanned: entries.len(),
        ..Default::default()
    };

    for entry in entries {
        if !is_archive(&entry) {
            debug!(path = %entry.display(), "Not an archive, leaving as-is");
            continue;
        }

        let extracted = extract_archive(&entry, input_dir)?;
        info!(
            archive = %entry.display(),
            files = extracted,
            "Expanded archive"
        );
        report.files_extracted += extracted;
        report.archives_expanded.push(entry);
    }

    Ok(report)
}

/// List the immediate entries of `input_dir`, sorted by file name.
///
/// Fails with [`ProofError::InputNotFound`] when the directory is missing,
/// unreadable, or empty.
fn snapshot_entries(input_dir: &Path) -> Result<Vec<PathBuf>> {
    if !input_dir.is_dir() {
        return Err(ProofError::InputNotFound(input_dir.to_path_buf()));
    }

    let read_dir = std::fs::read_dir(input_dir).map_err(|e| {
        warn!(input_dir = %input_dir.display(), error = %e, "Cannot list input directory");
        ProofError::InputNotFound(input_dir.to_path_buf())
    })?;

    let mut entries = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|e| {
            warn!(input_dir = %input_dir.display(), error = %e, "Cannot read input entry");
            ProofError::InputNotFound(input_dir.to_path_buf())
        })?;
        entries.push(entry.path());
    }

    if entries.is_empty() {
        return Err(ProofError::InputNotFound(input_dir.to_path_buf()));
    }

    entries.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(entries)
}

/// End of central directory record signature.
const EOCD_SIGNATURE: &[u8; 4] = b"PK\x05\x06";
/// Fixed part of the end of central directory record.
const EOCD_MIN_LEN: u64 = 22;
/// The record may be followed by a comment of up to this many bytes.
const EOCD_MAX_COMMENT_LEN: u64 = u16::MAX as u64;

/// Whether `path` is a regular file ending in a zip end of central directory
/// record.
///
/// Only the trailing record is looked for. A file that carries one but whose
/// central directory is damaged still counts as an archive, and fails when
/// extracted. Any I/O error while probing counts as "not an archive".
pub fn is_archive(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    has_end_of_central_directory(path).unwrap_or(false)
}

fn has_end_of_central_directory(path: &Path) -> std::io::Result<bool> {
    let mut file = File::open(path)?;
    let len = file.metadata()?.len();
    if len < EOCD_MIN_LEN {
        return Ok(false);
    }

    let tail_len = len.min(EOCD_MIN_LEN + EOCD_MAX_COMMENT_LEN);
    file.seek(SeekFrom::Start(len - tail_len))?;
    let mut tail = Vec::with_capacity(tail_len as usize);
    file.take(tail_len).read_to_end(&mut tail)?;

    // The record itself is 22 bytes, so the signature cannot start in the
    // last 21.
    let searchable = tail.len().saturating_sub(EOCD_MIN_LEN as usize - EOCD_SIGNATURE.len());
    Ok(tail[..searchable]
        .windows(EOCD_SIGNATURE.len())
        .any(|window| window == EOCD_SIGNATURE))
}

/// Expand `archive` into `target_dir`, returning the number of files written.
fn extract_archive(archive: &Path, target_dir: &Path) -> Result<usize> {
    let to_error = |source: ExtractionCause| ProofError::Extraction {
        archive: archive.to_path_buf(),
        source,
    };

    let file = File::open(archive).map_err(|e| to_error(e.into()))?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| to_error(e.into()))?;

    let files = zip.file_names().filter(|name| !name.ends_with('/')).count();
    zip.extract(target_dir).map_err(|e| to_error(e.into()))?;

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).expect("create zip");
        let mut writer = zip::ZipWriter::new(file);
        for (name, data) in entries {
            if name.ends_with('/') {
                writer
                    .add_directory(*name, SimpleFileOptions::default())
                    .expect("add zip directory");
                continue;
            }
            writer
                .start_file(*name, SimpleFileOptions::default())
                .expect("start zip entry");
            writer.write_all(data).expect("write zip entry");
        }
        writer.finish().expect("finish zip");
    }

    #[test]
    fn test_is_archive_uses_content_not_extension() {
        let dir = TempDir::new().expect("tempdir");

        let disguised = dir.path().join("upload.bin");
        write_zip(&disguised, &[("a.txt", b"a")]);
        assert!(is_archive(&disguised));

        let fake = dir.path().join("fake.zip");
        std::fs::write(&fake, b"PK but not really a zip").expect("write");
        assert!(!is_archive(&fake));
    }

    #[test]
    fn test_is_archive_finds_end_record_after_comment() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("commented.zip");
        let mut writer = zip::ZipWriter::new(File::create(&path).expect("create zip"));
        writer.set_comment("uploaded by batch tool");
        writer
            .start_file("a.txt", SimpleFileOptions::default())
            .expect("start zip entry");
        writer.write_all(b"a").expect("write zip entry");
        writer.finish().expect("finish zip");

        assert!(is_archive(&path));
    }

    #[test]
    fn test_damaged_central_directory_is_detected_then_fails() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("damaged.zip");
        write_zip(&path, &[("a.txt", b"a")]);

        let mut bytes = std::fs::read(&path).expect("read zip");
        let header = bytes
            .windows(4)
            .position(|w| w == b"PK\x01\x02")
            .expect("central directory header");
        bytes[header + 2] = 0xff;
        std::fs::write(&path, &bytes).expect("rewrite zip");

        assert!(is_archive(&path));
        let err = validate_and_extract(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            ProofError::Extraction { source: ExtractionCause::Zip(_), .. }
        ));
    }

    #[test]
    fn test_is_archive_false_for_directory() {
        let dir = TempDir::new().expect("tempdir");
        assert!(!is_archive(dir.path()));
    }

    #[test]
    fn test_missing_dir_is_input_not_found() {
        let dir = TempDir::new().expect("tempdir");
        let missing = dir.path().join("nope");

        let err = validate_and_extract(&missing).unwrap_err();
        assert!(matches!(err, ProofError::InputNotFound(p) if p == missing));
    }

    #[test]
    fn test_regular_file_is_input_not_found() {
        let dir = TempDir::new().expect("tempdir");
        let file = dir.path().join("input");
        std::fs::write(&file, b"not a directory").expect("write");

        let err = validate_and_extract(&file).unwrap_err();
        assert!(matches!(err, ProofError::InputNotFound(_)));
    }

    #[test]
    fn test_member_clashing_with_directory_is_extraction_error() {
        let dir = TempDir::new().expect("tempdir");
        std::fs::create_dir(dir.path().join("clash")).expect("mkdir");
        write_zip(&dir.path().join("data.zip"), &[("clash", b"file")]);

        let err = validate_and_extract(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            ProofError::Extraction { ref archive, .. } if archive == &dir.path().join("data.zip")
        ));
    }

    #[test]
    fn test_report_counts() {
        let dir = TempDir::new().expect("tempdir");
        write_zip(
            &dir.path().join("data.zip"),
            &[("one.txt", b"1"), ("nested/", b""), ("nested/two.txt", b"2")],
        );
        std::fs::write(dir.path().join("notes.txt"), b"plain").expect("write");

        let report = validate_and_extract(dir.path()).expect("materialize");
        assert_eq!(report.entries_scanned, 2);
        assert_eq!(report.archives_expanded, vec![dir.path().join("data.zip")]);
        assert_eq!(report.files_extracted, 2);
        assert!(dir.path().join("nested/two.txt").is_file());
    }
}
