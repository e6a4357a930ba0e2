//! Zip extraction for archive-backed cache entries.
//!
//! The requested member lands at the cache target; the other files sharing its
//! archive directory are unpacked next to it so later entries pointing into the
//! same archive resolve without another download.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use zip::ZipArchive;

use crate::constants::cache::EXTRACT_EXTENSION;
use crate::errors::DatasetError;
use crate::transport::CancellationToken;
use crate::transport::fs::{discard, ensure_parent, publish, staging_path};

/// What an extraction pass wrote into the cache.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtractionSummary {
    /// Archive path of the member published at the requested target.
    pub member: PathBuf,
    /// Sibling files published alongside the target.
    pub siblings: Vec<PathBuf>,
}

#[derive(Debug)]
struct ArchiveEntry {
    index: usize,
    name: PathBuf,
}

/// Extract the member of `archive_path` matching `relative` into `target`.
///
/// Members are matched by exact path, then by shared path suffix, then by file
/// name. Fails with `Archive` when the archive is unreadable, no member
/// matches, or the member's size differs from `expected_bytes`. A rejected
/// member is never published.
pub fn extract_member(
    archive_path: &Path,
    relative: &Path,
    target: &Path,
    expected_bytes: Option<u64>,
    cancel: Option<&CancellationToken>,
) -> Result<ExtractionSummary, DatasetError> {
    let file = File::open(archive_path)
        .map_err(|err| DatasetError::archive(archive_path, format!("failed opening: {err}")))?;
    let mut archive = ZipArchive::new(file)
        .map_err(|err| DatasetError::archive(archive_path, format!("not a zip archive: {err}")))?;

    let entries = list_entries(&mut archive, archive_path)?;
    let member = select_member(&entries, relative).ok_or_else(|| {
        DatasetError::archive(
            archive_path,
            format!("no member matches '{}'", relative.display()),
        )
    })?;
    let member_name = member.name.clone();
    let member_dir = member_name.parent().map(Path::to_path_buf).unwrap_or_default();
    let target_dir = target.parent().map(Path::to_path_buf).unwrap_or_default();

    let mut summary = ExtractionSummary {
        member: member_name.clone(),
        siblings: Vec::new(),
    };
    for entry in &entries {
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            return Err(DatasetError::Cancelled {
                url: archive_path.display().to_string(),
            });
        }
        let is_member = entry.name == member_name;
        let dest = if is_member {
            target.to_path_buf()
        } else {
            let Ok(rest) = entry.name.strip_prefix(&member_dir) else {
                continue;
            };
            let dest = target_dir.join(rest);
            if dest.exists() {
                debug!("[recdata:archive] keeping cached sibling {}", dest.display());
                continue;
            }
            dest
        };
        let expected = if is_member { expected_bytes } else { None };
        unpack_entry(&mut archive, archive_path, entry, &dest, expected)?;
        if !is_member {
            summary.siblings.push(dest);
        }
    }

    info!(
        "[recdata:archive] extracted {} from {} (+{} siblings)",
        member_name.display(),
        archive_path.display(),
        summary.siblings.len()
    );
    Ok(summary)
}

fn list_entries(
    archive: &mut ZipArchive<File>,
    archive_path: &Path,
) -> Result<Vec<ArchiveEntry>, DatasetError> {
    let mut entries = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let file = archive.by_index(index).map_err(|err| {
            DatasetError::archive(archive_path, format!("unreadable entry #{index}: {err}"))
        })?;
        if file.is_dir() {
            continue;
        }
        match file.enclosed_name() {
            Some(name) => entries.push(ArchiveEntry {
                index,
                name: name.to_path_buf(),
            }),
            None => warn!(
                "[recdata:archive] ignoring unsafe entry name '{}' in {}",
                file.name(),
                archive_path.display()
            ),
        }
    }
    Ok(entries)
}

fn select_member<'a>(entries: &'a [ArchiveEntry], relative: &Path) -> Option<&'a ArchiveEntry> {
    let exact = entries.iter().find(|entry| entry.name == relative);
    let suffix = || {
        entries
            .iter()
            .filter(|entry| relative.ends_with(&entry.name) || entry.name.ends_with(relative))
            .max_by_key(|entry| entry.name.components().count())
    };
    let by_file_name = || {
        let wanted = relative.file_name()?;
        entries
            .iter()
            .find(|entry| entry.name.file_name() == Some(wanted))
    };
    exact.or_else(suffix).or_else(by_file_name)
}

fn unpack_entry(
    archive: &mut ZipArchive<File>,
    archive_path: &Path,
    entry: &ArchiveEntry,
    dest: &Path,
    expected_bytes: Option<u64>,
) -> Result<(), DatasetError> {
    ensure_parent(dest)?;
    let staged = staging_path(dest, EXTRACT_EXTENSION);
    let result = (|| {
        let mut member = archive.by_index(entry.index).map_err(|err| {
            DatasetError::archive(
                archive_path,
                format!("unreadable entry {}: {err}", entry.name.display()),
            )
        })?;
        let mut out = File::create(&staged)
            .map_err(|err| DatasetError::cache_io(&staged, format!("failed creating: {err}")))?;
        let written = io::copy(&mut member, &mut out).map_err(|err| {
            DatasetError::archive(
                archive_path,
                format!("failed inflating {}: {err}", entry.name.display()),
            )
        })?;
        if let Some(expected) = expected_bytes
            && written != expected
        {
            return Err(DatasetError::archive(
                archive_path,
                format!(
                    "member {} is {written} bytes, expected {expected}",
                    entry.name.display()
                ),
            ));
        }
        out.sync_all()
            .map_err(|err| DatasetError::cache_io(&staged, format!("failed flushing: {err}")))
    })();
    if let Err(err) = result {
        discard(&staged);
        return Err(err);
    }
    publish(&staged, dest)
}
