//! Implements ArchivePort with a deflate zip file.
//!
//! Walks the source tree on the blocking pool; entry names are relative to the source
//! root and always use `/`.

use crate::domain::DomainError;
use crate::ports::ArchivePort;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Zip archiver for result directories.
#[derive(Debug, Default)]
pub struct ZipArchiver;

impl ZipArchiver {
    pub fn new() -> Self {
        Self
    }
}

fn archive_err(e: impl std::fmt::Display) -> DomainError {
    DomainError::Archive(e.to_string())
}

/// Relative path rendered as a zip entry name.
fn entry_name(source_dir: &Path, path: &Path) -> Result<String, DomainError> {
    let rel = path.strip_prefix(source_dir).map_err(archive_err)?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}

/// Sorted list of regular files under `source_dir`, excluding `exclude` itself.
fn collect_files(source_dir: &Path, exclude: &Path) -> Result<Vec<PathBuf>, DomainError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(source_dir).sort_by_file_name() {
        let entry = entry.map_err(archive_err)?;
        if entry.file_type().is_file() && entry.path() != exclude {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// In-progress sibling of `dest`; renamed over `dest` once the archive is complete.
fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}

fn write_zip(source_dir: &Path, files: &[PathBuf], out: &Path) -> Result<(), DomainError> {
    let file = File::create(out)
        .map_err(|e| DomainError::Archive(format!("create {}: {}", out.display(), e)))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in files {
        let name = entry_name(source_dir, path)?;
        let bytes = std::fs::read(path)
            .map_err(|e| DomainError::Archive(format!("read {}: {}", path.display(), e)))?;
        zip.start_file(name.as_str(), options).map_err(archive_err)?;
        zip.write_all(&bytes).map_err(archive_err)?;
        debug!(entry = %name, bytes = bytes.len(), "added to archive");
    }

    let mut writer = zip.finish().map_err(archive_err)?;
    writer.flush().map_err(archive_err)?;
    writer.get_ref().sync_all().map_err(archive_err)?;
    Ok(())
}

/// Never leaves a truncated archive at `dest`: the zip is built next to it and renamed
/// into place only after `finish()`.
fn write_archive(source_dir: &Path, dest: &Path) -> Result<usize, DomainError> {
    let partial = partial_path(dest);
    let files = collect_files(source_dir, dest)?
        .into_iter()
        .filter(|p| *p != partial)
        .collect::<Vec<_>>();

    let written = write_zip(source_dir, &files, &partial).and_then(|()| {
        std::fs::rename(&partial, dest).map_err(|e| {
            DomainError::Archive(format!("rename into {}: {}", dest.display(), e))
        })
    });
    if let Err(e) = written {
        let _ = std::fs::remove_file(&partial);
        return Err(e);
    }
    Ok(files.len())
}

#[async_trait::async_trait]
impl ArchivePort for ZipArchiver {
    async fn archive_dir(&self, source_dir: &Path, dest: &Path) -> Result<usize, DomainError> {
        let source = source_dir.to_path_buf();
        let target = dest.to_path_buf();
        let entries = tokio::task::spawn_blocking(move || write_archive(&source, &target))
            .await
            .map_err(|e| DomainError::Archive(format!("archive task failed: {}", e)))??;
        info!(
            source = %source_dir.display(),
            dest = %dest.display(),
            entries,
            "archive written"
        );
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn entries_of(path: &Path) -> Vec<(String, String)> {
        let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut out = Vec::new();
        for i in 0..archive.len() {
            let mut f = archive.by_index(i).unwrap();
            let mut body = String::new();
            f.read_to_string(&mut body).unwrap();
            out.push((f.name().to_string(), body));
        }
        out.sort();
        out
    }

    #[tokio::test]
    async fn test_archive_preserves_relative_paths() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("analysis_results");
        std::fs::create_dir_all(src.join("nested")).unwrap();
        std::fs::write(src.join("analysis_alice.txt"), "итог").unwrap();
        std::fs::write(src.join("error_bob.txt"), "boom").unwrap();
        std::fs::write(src.join("nested").join("extra.txt"), "x").unwrap();
        let dest = tmp.path().join("out.zip");

        let count = ZipArchiver::new().archive_dir(&src, &dest).await.unwrap();

        assert_eq!(count, 3);
        assert_eq!(
            entries_of(&dest),
            vec![
                ("analysis_alice.txt".to_string(), "итог".to_string()),
                ("error_bob.txt".to_string(), "boom".to_string()),
                ("nested/extra.txt".to_string(), "x".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_archive_empty_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("empty");
        std::fs::create_dir_all(&src).unwrap();
        let dest = tmp.path().join("empty.zip");

        let count = ZipArchiver::new().archive_dir(&src, &dest).await.unwrap();
        assert_eq!(count, 0);
        assert!(entries_of(&dest).is_empty());
    }

    #[tokio::test]
    async fn test_failed_archive_leaves_nothing_behind() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("analysis_results");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("analysis_alice.txt"), "итог").unwrap();
        // A non-empty directory at the destination makes the final rename fail.
        let dest = tmp.path().join("out.zip");
        std::fs::create_dir_all(dest.join("keep")).unwrap();

        let err = ZipArchiver::new().archive_dir(&src, &dest).await.unwrap_err();

        assert!(matches!(err, DomainError::Archive(_)));
        assert!(!tmp.path().join("out.zip.part").exists());
        assert!(dest.join("keep").is_dir());
    }

    #[tokio::test]
    async fn test_archive_replaces_previous() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("analysis_results");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("error_bob.txt"), "boom").unwrap();
        let dest = tmp.path().join("out.zip");
        std::fs::write(&dest, b"truncated garbage").unwrap();

        ZipArchiver::new().archive_dir(&src, &dest).await.unwrap();

        assert_eq!(
            entries_of(&dest),
            vec![("error_bob.txt".to_string(), "boom".to_string())]
        );
        assert!(!tmp.path().join("out.zip.part").exists());
    }

    #[tokio::test]
    async fn test_archive_missing_source_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let err = ZipArchiver::new()
            .archive_dir(&tmp.path().join("nope"), &tmp.path().join("nope.zip"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Archive(_)));
        assert!(!tmp.path().join("nope.zip").exists());
    }
}
