//! Bulk import of certificate files from disk.

use certdeck_core::CertificateRecord;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{ParseError, Result};
use crate::x509::CertificateParser;

/// File extensions picked up when walking a directory.
pub const CERTIFICATE_EXTENSIONS: &[&str] = &["pem", "crt", "cer", "der"];

/// A file that could not be imported.
#[derive(Debug)]
pub struct ImportFailure {
    pub path: PathBuf,
    pub error: ParseError,
}

/// Outcome of [`import_path`].
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Parsed records, unique by fingerprint, in discovery order
    pub records: Vec<CertificateRecord>,
    /// Files that were read but rejected
    pub failures: Vec<ImportFailure>,
    /// Certificates dropped because an identical one was already imported
    pub duplicates: usize,
}

impl ImportReport {
    fn absorb(&mut self, seen: &mut HashSet<String>, found: Vec<CertificateRecord>) {
        for record in found {
            if seen.insert(record.fingerprint.clone()) {
                self.records.push(record);
            } else {
                debug!(fingerprint = %record.fingerprint, "duplicate certificate skipped");
                self.duplicates += 1;
            }
        }
    }
}

/// Import every certificate under `root`.
///
/// A file path is parsed as a bundle. A directory is walked recursively and
/// every file with a known certificate extension is parsed; per-file
/// failures are collected in the report instead of aborting the walk.
///
/// # Errors
///
/// Returns `ParseError::Io` if `root` itself cannot be read.
pub async fn import_path<P>(parser: &P, root: &Path, now: DateTime<Utc>) -> Result<ImportReport>
where
    P: CertificateParser + ?Sized,
{
    let meta = tokio::fs::metadata(root)
        .await
        .map_err(|e| ParseError::io(root.display().to_string(), e))?;

    let mut report = ImportReport::default();
    let mut seen = HashSet::new();

    if meta.is_file() {
        let found = import_file(parser, root, now).await?;
        report.absorb(&mut seen, found);
        return Ok(report);
    }

    let files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                warn!(error = %e, "skipping unreadable directory entry");
                None
            }
        })
        .filter(|e| e.file_type().is_file() && has_certificate_extension(e.path()))
        .map(walkdir::DirEntry::into_path)
        .collect();

    debug!(root = %root.display(), files = files.len(), "importing certificate files");

    for path in files {
        match import_file(parser, &path, now).await {
            Ok(found) => report.absorb(&mut seen, found),
            Err(error) => {
                debug!(path = %path.display(), error = %error, "import failed");
                report.failures.push(ImportFailure { path, error });
            }
        }
    }

    Ok(report)
}

async fn import_file<P>(parser: &P, path: &Path, now: DateTime<Utc>) -> Result<Vec<CertificateRecord>>
where
    P: CertificateParser + ?Sized,
{
    let path_str = path.display().to_string();
    let content = tokio::fs::read(path)
        .await
        .map_err(|e| ParseError::io(&path_str, e))?;
    let hint = path.file_name().and_then(|n| n.to_str());
    parser.parse_bundle_at(&content, hint, now)
}

fn has_certificate_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            CERTIFICATE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}
